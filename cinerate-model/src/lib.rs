//! Core data model definitions shared across cinerate crates.
#![allow(missing_docs)]

pub mod error;
pub mod ids;
pub mod media_type;
pub mod movie;
pub mod review;

// Intentionally curated re-exports for downstream consumers.
pub use error::{ModelError, Result as ModelResult};
pub use ids::{ReviewId, UserId};
pub use media_type::MediaType;
pub use movie::{CreditEntry, MovieRecord, RatingStats};
pub use review::Review;
