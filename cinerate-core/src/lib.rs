//! Core library for cinerate: wraps the third-party metadata service,
//! imports and caches movie records, aggregates review ratings, and shapes
//! response payloads.
#![allow(missing_docs)]

// Re-exported so downstream crates can name database error types without a
// direct sqlx dependency.
pub use sqlx;

pub mod error;
pub mod format;
pub mod import;
pub mod provider;
pub mod rating;
pub mod reviews;
pub mod store;

pub use error::{CoreError, Result};
pub use format::{CreditGroups, ImageQuality, ListingCard, ListingFormatter};
pub use import::ImportPipeline;
pub use provider::{ImageUrls, MetadataProvider, TmdbClient};
pub use rating::{RankOrder, RankedMovie, RatingEngine, DEFAULT_PAGE_SIZE};
pub use reviews::ReviewService;
pub use store::postgres::PostgresMovieStore;
pub use store::{InsertOutcome, MovieStore, RatingRow};
