//! # cinerate Server
//!
//! Movie-review web backend.
//!
//! ## Overview
//!
//! The server proxies a third-party movie metadata API, caches imported
//! records in Postgres, and layers review/rating aggregation on top:
//!
//! - **Get-or-import**: the first request for a record drives the import
//!   pipeline; later requests are served from the cache
//! - **Rankings**: most/top/least/bottom-rated queries with an optional
//!   genre filter
//! - **Reviews**: per-user ratings with reconciled aggregation fields,
//!   likes/dislikes, and tags
//!
//! ## Architecture
//!
//! Built on Axum; PostgreSQL for the record cache, reqwest against the
//! TMDB-shaped metadata API. Authentication mechanics live upstream; the
//! server consumes identity headers injected by that layer.

pub mod auth;
pub mod infra;
pub mod movie_handlers;
pub mod review_handlers;
pub mod routes;

pub use infra::app_state::AppState;
pub use infra::errors::{ApiError, ApiResult};
pub use routes::create_api_router;
