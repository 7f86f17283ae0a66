//! Movie cache store: the persistence port and its Postgres implementation.

pub mod postgres;

use async_trait::async_trait;

use crate::error::Result;
use cinerate_model::{MediaType, MovieRecord, Review, ReviewId, UserId};

/// Outcome of a conflict-detecting insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The record was written.
    Inserted,
    /// A record with the same `(external_id, media_type)` already exists;
    /// the caller should read the winner back.
    AlreadyCached,
}

/// Rating aggregation row for one cached record with at least one review.
///
/// Counts come from the stored review references, never from re-scanning
/// review rows; the rating invariant is the single source of truth.
#[derive(Debug, Clone, PartialEq)]
pub struct RatingRow {
    pub external_id: String,
    pub rating_sum: i64,
    pub review_count: i64,
}

impl RatingRow {
    /// Mean rating; rows always carry `review_count > 0`.
    pub fn average(&self) -> f64 {
        self.rating_sum as f64 / self.review_count as f64
    }
}

/// Persistence port for cached movie records and their reviews.
///
/// Review mutations persist the (review, parent record) pair atomically so a
/// crash cannot leave `rating_sum` out of step with the stored reviews.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MovieStore: Send + Sync {
    async fn find_movie(
        &self,
        external_id: &str,
        media_type: MediaType,
    ) -> Result<Option<MovieRecord>>;

    /// Insert a freshly imported record; uniqueness of the natural key is
    /// enforced by the store, and losing the race reports
    /// [`InsertOutcome::AlreadyCached`] instead of overwriting.
    async fn insert_movie(&self, record: &MovieRecord) -> Result<InsertOutcome>;

    /// Persist mutations of an already-cached record (tags).
    async fn update_movie(&self, record: &MovieRecord) -> Result<()>;

    /// Aggregation rows for every record of the media type with a non-empty
    /// review set.
    async fn rated_movies(&self, media_type: MediaType) -> Result<Vec<RatingRow>>;

    async fn find_review(&self, id: ReviewId) -> Result<Option<Review>>;

    async fn find_review_by_owner(
        &self,
        owner: UserId,
        external_id: &str,
        media_type: MediaType,
    ) -> Result<Option<Review>>;

    async fn reviews_for_movie(
        &self,
        external_id: &str,
        media_type: MediaType,
    ) -> Result<Vec<Review>>;

    /// Upsert a review together with its reconciled parent record in a
    /// single transaction.
    async fn persist_review(&self, movie: &MovieRecord, review: &Review) -> Result<()>;

    /// Delete a review and save its reconciled parent record in a single
    /// transaction.
    async fn delete_review(&self, movie: &MovieRecord, review: ReviewId) -> Result<()>;

    /// Persist review-only mutations (likes/dislikes).
    async fn save_review(&self, review: &Review) -> Result<()>;
}
