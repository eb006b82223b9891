//! Request security: JWT verification and global rate limiting.

pub mod claims;
pub mod middleware;
pub mod rate_limit;

pub use claims::{UserClaims, UserContext};
