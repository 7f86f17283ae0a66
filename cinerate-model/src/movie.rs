use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ModelError, Result};
use crate::ids::ReviewId;
use crate::media_type::MediaType;
use crate::review::Review;

/// One credited person on a movie or show.
///
/// `external_id` is the person id assigned by the metadata provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditEntry {
    pub external_id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
}

/// Aggregated rating statistics for one cached record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingStats {
    pub rating_sum: i64,
    pub review_count: i64,
}

impl RatingStats {
    pub const ZERO: RatingStats = RatingStats {
        rating_sum: 0,
        review_count: 0,
    };

    /// Mean rating, undefined while no reviews exist.
    pub fn average(&self) -> Option<f64> {
        if self.review_count == 0 {
            None
        } else {
            Some(self.rating_sum as f64 / self.review_count as f64)
        }
    }
}

/// Normalized, cached representation of one external movie or TV show.
///
/// Created only by the import pipeline; mutated by review add/update/remove
/// and by tag addition; never deleted by normal flow. The natural key is
/// `(external_id, media_type)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieRecord {
    pub id: Uuid,
    pub external_id: String,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    pub title: String,
    pub storyline: String,
    /// 0 when upstream reported neither `runtime` nor an `episode_run_time`
    /// entry.
    pub runtime_minutes: i32,
    pub languages: Vec<String>,
    pub genre_ids: Vec<i32>,
    pub release_date: Option<NaiveDate>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub trailer_key: Option<String>,
    pub directors: Vec<CreditEntry>,
    pub writers: Vec<CreditEntry>,
    pub cast: Vec<CreditEntry>,
    pub homepage: Option<String>,
    pub tags: Vec<String>,
    pub review_refs: Vec<ReviewId>,
    pub rating_sum: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MovieRecord {
    pub fn review_count(&self) -> usize {
        self.review_refs.len()
    }

    pub fn rating_stats(&self) -> RatingStats {
        RatingStats {
            rating_sum: self.rating_sum,
            review_count: self.review_refs.len() as i64,
        }
    }

    /// Mean rating over the attached reviews, undefined while none exist.
    pub fn rating_average(&self) -> Option<f64> {
        self.rating_stats().average()
    }

    /// Record a new review: its rating joins `rating_sum` and its id joins
    /// `review_refs`. Attaching an already-referenced review is a no-op so
    /// the sum cannot drift.
    pub fn attach_review(&mut self, review: &Review) {
        if self.review_refs.contains(&review.id) {
            return;
        }
        self.review_refs.push(review.id);
        self.rating_sum += i64::from(review.rating);
        self.updated_at = Utc::now();
    }

    /// Reverse of [`attach_review`](Self::attach_review). Only adjusts the
    /// sum when the reference was actually present.
    pub fn detach_review(&mut self, review: &Review) {
        let before = self.review_refs.len();
        self.review_refs.retain(|id| *id != review.id);
        if self.review_refs.len() != before {
            self.rating_sum -= i64::from(review.rating);
            self.updated_at = Utc::now();
        }
    }

    /// Adjust the sum when an attached review changes its rating.
    pub fn reprice_review(&mut self, old_rating: i32, new_rating: i32) {
        self.rating_sum += i64::from(new_rating) - i64::from(old_rating);
        self.updated_at = Utc::now();
    }

    /// Append a tag; duplicates are rejected.
    pub fn add_tag(&mut self, tag: &str) -> Result<()> {
        if self.tags.iter().any(|existing| existing == tag) {
            return Err(ModelError::DuplicateTag(tag.to_string()));
        }
        self.tags.push(tag.to_string());
        self.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::UserId;

    fn record() -> MovieRecord {
        let now = Utc::now();
        MovieRecord {
            id: Uuid::new_v4(),
            external_id: "603".to_string(),
            media_type: MediaType::Movie,
            title: "The Matrix".to_string(),
            storyline: String::new(),
            runtime_minutes: 136,
            languages: vec!["English".to_string()],
            genre_ids: vec![28, 878],
            release_date: None,
            poster_path: None,
            backdrop_path: None,
            trailer_key: None,
            directors: Vec::new(),
            writers: Vec::new(),
            cast: Vec::new(),
            homepage: None,
            tags: Vec::new(),
            review_refs: Vec::new(),
            rating_sum: 0,
            created_at: now,
            updated_at: now,
        }
    }

    fn review(rating: i32) -> Review {
        Review::new(
            UserId::new_uuid(),
            "reviewer",
            "603",
            MediaType::Movie,
            String::new(),
            rating,
        )
        .unwrap()
    }

    #[test]
    fn rating_average_is_undefined_without_reviews() {
        assert_eq!(record().rating_average(), None);
    }

    #[test]
    fn attach_and_detach_keep_sum_consistent() {
        let mut movie = record();
        let first = review(8);
        let second = review(4);

        movie.attach_review(&first);
        movie.attach_review(&second);
        assert_eq!(movie.rating_sum, 12);
        assert_eq!(movie.review_count(), 2);
        assert_eq!(movie.rating_average(), Some(6.0));

        movie.detach_review(&first);
        assert_eq!(movie.rating_sum, 4);
        assert_eq!(movie.review_refs, vec![second.id]);
    }

    #[test]
    fn attaching_the_same_review_twice_is_a_noop() {
        let mut movie = record();
        let only = review(7);
        movie.attach_review(&only);
        movie.attach_review(&only);
        assert_eq!(movie.rating_sum, 7);
        assert_eq!(movie.review_count(), 1);
    }

    #[test]
    fn detaching_an_unknown_review_leaves_the_sum_alone() {
        let mut movie = record();
        movie.attach_review(&review(9));
        movie.detach_review(&review(3));
        assert_eq!(movie.rating_sum, 9);
    }

    #[test]
    fn reprice_applies_the_delta() {
        let mut movie = record();
        let mut owned = review(3);
        movie.attach_review(&owned);
        let old = owned.set_rating(9).unwrap();
        movie.reprice_review(old, owned.rating);
        assert_eq!(movie.rating_sum, 9);
    }

    #[test]
    fn duplicate_tags_are_rejected() {
        let mut movie = record();
        movie.add_tag("cyberpunk").unwrap();
        assert!(matches!(
            movie.add_tag("cyberpunk"),
            Err(ModelError::DuplicateTag(_))
        ));
        assert_eq!(movie.tags, vec!["cyberpunk".to_string()]);
    }
}
