//! Domain records stored in the document database.
//!
//! Wire and stored field names are camelCase (`imageUrls`, `coupleId`, and
//! so on), matching the document format the frontend already speaks.

pub mod couple;
pub mod memory;

pub use couple::{Couple, PartnerInfo, UserProfile};
pub use memory::{Location, Memory};
