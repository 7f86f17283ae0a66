use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::ids::{ReviewId, UserId};
use crate::media_type::MediaType;

/// One user's rating and text for one cached record.
///
/// The parent is addressed by the record's natural key so a movie and a show
/// sharing an external id cannot swallow each other's reviews.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: ReviewId,
    pub owner_id: UserId,
    pub owner_name: String,
    pub external_id: String,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    pub content: String,
    pub rating: i32,
    pub likes: Vec<UserId>,
    pub dislikes: Vec<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Review {
    pub const MIN_RATING: i32 = 1;
    pub const MAX_RATING: i32 = 10;

    pub fn new(
        owner_id: UserId,
        owner_name: &str,
        external_id: &str,
        media_type: MediaType,
        content: String,
        rating: i32,
    ) -> Result<Self> {
        Self::check_rating(rating)?;
        let now = Utc::now();
        Ok(Self {
            id: ReviewId::new_uuid(),
            owner_id,
            owner_name: owner_name.to_string(),
            external_id: external_id.to_string(),
            media_type,
            content,
            rating,
            likes: Vec::new(),
            dislikes: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }

    fn check_rating(rating: i32) -> Result<()> {
        if !(Self::MIN_RATING..=Self::MAX_RATING).contains(&rating) {
            return Err(ModelError::InvalidRating(rating));
        }
        Ok(())
    }

    /// Replace the rating, returning the previous value so the parent record
    /// can be repriced.
    pub fn set_rating(&mut self, rating: i32) -> Result<i32> {
        Self::check_rating(rating)?;
        let old = self.rating;
        self.rating = rating;
        self.updated_at = Utc::now();
        Ok(old)
    }

    /// Add a like; each user votes at most once.
    pub fn like(&mut self, user: UserId) -> Result<()> {
        if self.likes.contains(&user) {
            return Err(ModelError::DuplicateVote);
        }
        self.likes.push(user);
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Add a dislike; each user votes at most once.
    pub fn dislike(&mut self, user: UserId) -> Result<()> {
        if self.dislikes.contains(&user) {
            return Err(ModelError::DuplicateVote);
        }
        self.dislikes.push(user);
        self.updated_at = Utc::now();
        Ok(())
    }
}
