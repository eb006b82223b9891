//! Storage provider implementations.

pub mod memory;
pub mod surreal;

pub use memory::InMemoryProvider;
pub use surreal::SurrealDbProvider;
