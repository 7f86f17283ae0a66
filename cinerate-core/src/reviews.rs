//! Review service: rating mutations that keep the parent record's
//! aggregation fields reconciled.
//!
//! Every mutation loads the parent record, adjusts it through the model's
//! invariant-preserving methods, and hands the (review, record) pair to the
//! store, which persists both inside one transaction.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::error::{CoreError, Result};
use crate::import::ImportPipeline;
use crate::store::MovieStore;
use cinerate_model::{MediaType, MovieRecord, Review, ReviewId, UserId};

/// Review projection with owner info, as returned by the review endpoints.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewView {
    pub id: ReviewId,
    pub owner: OwnerView,
    pub content: String,
    pub rating: i32,
    pub likes: Vec<UserId>,
    pub dislikes: Vec<UserId>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerView {
    pub id: UserId,
    pub name: String,
}

impl From<&Review> for ReviewView {
    fn from(review: &Review) -> Self {
        Self {
            id: review.id,
            owner: OwnerView {
                id: review.owner_id,
                name: review.owner_name.clone(),
            },
            content: review.content.clone(),
            rating: review.rating,
            likes: review.likes.clone(),
            dislikes: review.dislikes.clone(),
        }
    }
}

#[derive(Clone)]
pub struct ReviewService {
    store: Arc<dyn MovieStore>,
    pipeline: ImportPipeline,
}

impl std::fmt::Debug for ReviewService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReviewService").finish_non_exhaustive()
    }
}

impl ReviewService {
    pub fn new(store: Arc<dyn MovieStore>, pipeline: ImportPipeline) -> Self {
        Self { store, pipeline }
    }

    /// Add a review, importing the parent record on a cache miss. One review
    /// per owner per record.
    pub async fn add_review(
        &self,
        owner_id: UserId,
        owner_name: &str,
        external_id: &str,
        media_type: MediaType,
        content: String,
        rating: i32,
    ) -> Result<(Review, MovieRecord)> {
        let mut movie = self.pipeline.get_or_import(external_id, media_type).await?;

        if self
            .store
            .find_review_by_owner(owner_id, external_id, media_type)
            .await?
            .is_some()
        {
            return Err(CoreError::Validation(format!(
                "{media_type} is already reviewed by this user"
            )));
        }

        let review = Review::new(owner_id, owner_name, external_id, media_type, content, rating)?;
        movie.attach_review(&review);
        self.store.persist_review(&movie, &review).await?;
        info!(%review.id, external_id, %media_type, "review added");
        Ok((review, movie))
    }

    /// Update an owned review's content and rating, repricing the parent.
    pub async fn update_review(
        &self,
        owner_id: UserId,
        review_id: ReviewId,
        content: String,
        rating: i32,
    ) -> Result<(Review, MovieRecord)> {
        let mut review = self.owned_review(owner_id, review_id).await?;
        let mut movie = self.parent_of(&review).await?;

        let old_rating = review.set_rating(rating)?;
        review.content = content;
        movie.reprice_review(old_rating, rating);

        self.store.persist_review(&movie, &review).await?;
        info!(%review.id, "review updated");
        Ok((review, movie))
    }

    /// Remove an owned review and reconcile the parent's sum and refs.
    pub async fn remove_review(&self, owner_id: UserId, review_id: ReviewId) -> Result<()> {
        let review = self.owned_review(owner_id, review_id).await?;
        let mut movie = self.parent_of(&review).await?;

        movie.detach_review(&review);
        self.store.delete_review(&movie, review.id).await?;
        info!(%review.id, "review removed");
        Ok(())
    }

    pub async fn like_review(&self, user: UserId, review_id: ReviewId) -> Result<()> {
        let mut review = self.existing_review(review_id).await?;
        review.like(user)?;
        self.store.save_review(&review).await
    }

    pub async fn dislike_review(&self, user: UserId, review_id: ReviewId) -> Result<()> {
        let mut review = self.existing_review(review_id).await?;
        review.dislike(user)?;
        self.store.save_review(&review).await
    }

    /// Append a tag to the record, importing it on a cache miss; duplicates
    /// are rejected.
    pub async fn add_tag(
        &self,
        external_id: &str,
        media_type: MediaType,
        tag: &str,
    ) -> Result<()> {
        let mut movie = self.pipeline.get_or_import(external_id, media_type).await?;
        movie.add_tag(tag)?;
        self.store.update_movie(&movie).await
    }

    /// Formatted reviews for a cached record.
    pub async fn reviews_for_movie(
        &self,
        external_id: &str,
        media_type: MediaType,
    ) -> Result<Vec<ReviewView>> {
        if self
            .store
            .find_movie(external_id, media_type)
            .await?
            .is_none()
        {
            return Err(CoreError::NotFound(format!(
                "no cached record for {media_type}/{external_id}"
            )));
        }
        let reviews = self.store.reviews_for_movie(external_id, media_type).await?;
        Ok(reviews.iter().map(ReviewView::from).collect())
    }

    pub async fn review_by_owner(
        &self,
        owner_id: UserId,
        external_id: &str,
        media_type: MediaType,
    ) -> Result<Option<Review>> {
        self.store
            .find_review_by_owner(owner_id, external_id, media_type)
            .await
    }

    async fn existing_review(&self, review_id: ReviewId) -> Result<Review> {
        self.store
            .find_review(review_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("review {review_id} not found")))
    }

    /// Owner-scoped lookup; someone else's review reads as absent.
    async fn owned_review(&self, owner_id: UserId, review_id: ReviewId) -> Result<Review> {
        let review = self.existing_review(review_id).await?;
        if review.owner_id != owner_id {
            return Err(CoreError::NotFound(format!("review {review_id} not found")));
        }
        Ok(review)
    }

    async fn parent_of(&self, review: &Review) -> Result<MovieRecord> {
        self.store
            .find_movie(&review.external_id, review.media_type)
            .await?
            .ok_or_else(|| {
                CoreError::NotFound(format!(
                    "no cached record for {}/{}",
                    review.media_type, review.external_id
                ))
            })
    }
}
