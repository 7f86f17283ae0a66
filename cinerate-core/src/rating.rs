//! Rating aggregation engine: ranking queries over cached records.

use std::cmp::Ordering;
use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::error::{CoreError, Result};
use crate::provider::{ImageUrls, MetadataProvider};
use crate::store::{MovieStore, RatingRow};
use cinerate_model::{MediaType, RatingStats};

/// Default number of ranked records returned per query.
pub const DEFAULT_PAGE_SIZE: usize = 5;

/// Ranking orders; each row pair is compared on a primary key with a
/// secondary tiebreak.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankOrder {
    /// review count desc, then rating average desc
    MostRated,
    /// rating average desc, then review count desc
    TopRated,
    /// review count asc, then rating average desc
    LeastRated,
    /// rating average asc, then review count desc
    BottomRated,
}

impl RankOrder {
    pub fn compare(&self, a: &RatingRow, b: &RatingRow) -> Ordering {
        let count = |row: &RatingRow| row.review_count;
        let average = |row: &RatingRow| row.average();
        match self {
            RankOrder::MostRated => count(b)
                .cmp(&count(a))
                .then_with(|| average(b).total_cmp(&average(a))),
            RankOrder::TopRated => average(b)
                .total_cmp(&average(a))
                .then_with(|| count(b).cmp(&count(a))),
            RankOrder::LeastRated => count(a)
                .cmp(&count(b))
                .then_with(|| average(b).total_cmp(&average(a))),
            RankOrder::BottomRated => average(a)
                .total_cmp(&average(b))
                .then_with(|| count(b).cmp(&count(a))),
        }
    }
}

impl FromStr for RankOrder {
    type Err = CoreError;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "most-rated" => Ok(RankOrder::MostRated),
            "top-rated" => Ok(RankOrder::TopRated),
            "least-rated" => Ok(RankOrder::LeastRated),
            "bottom-rated" => Ok(RankOrder::BottomRated),
            other => Err(CoreError::Validation(format!(
                "unknown ranking order: {other:?}"
            ))),
        }
    }
}

/// One entry of a ranking response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedMovie {
    pub id: String,
    pub title: String,
    pub storyline: String,
    pub poster: Option<String>,
    pub reviews: RatingStats,
}

/// Computes ranking queries from the cache store's aggregation rows.
///
/// Ratings are local: the store rows are the only source of sums and counts.
/// The genre filter re-fetches each candidate's full genre list from the
/// metadata client, an N+1 external call per page, accepted as a known cost.
#[derive(Clone)]
pub struct RatingEngine {
    store: Arc<dyn MovieStore>,
    provider: Arc<dyn MetadataProvider>,
    urls: ImageUrls,
}

impl std::fmt::Debug for RatingEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RatingEngine").finish_non_exhaustive()
    }
}

impl RatingEngine {
    pub fn new(
        store: Arc<dyn MovieStore>,
        provider: Arc<dyn MetadataProvider>,
        urls: ImageUrls,
    ) -> Self {
        Self {
            store,
            provider,
            urls,
        }
    }

    pub async fn rank(
        &self,
        order: RankOrder,
        media_type: MediaType,
        genre_filter: Option<&str>,
        limit: usize,
    ) -> Result<Vec<RankedMovie>> {
        let wanted_genres = parse_genre_filter(genre_filter)?;

        let mut rows = self.store.rated_movies(media_type).await?;
        rows.sort_by(|a, b| order.compare(a, b));
        rows.truncate(limit);
        debug!(?order, %media_type, candidates = rows.len(), "ranking candidates selected");

        let mut ranked = Vec::with_capacity(rows.len());
        for row in rows {
            let details = self.provider.details(&row.external_id, media_type).await?;
            if !wanted_genres.is_empty() {
                let genre_ids: Vec<i32> = details.genres.iter().map(|genre| genre.id).collect();
                if !wanted_genres.iter().all(|wanted| genre_ids.contains(wanted)) {
                    continue;
                }
            }
            ranked.push(RankedMovie {
                id: row.external_id.clone(),
                title: details.display_title(media_type),
                storyline: details.overview,
                poster: self.urls.image(details.poster_path.as_deref()),
                reviews: RatingStats {
                    rating_sum: row.rating_sum,
                    review_count: row.review_count,
                },
            });
        }
        Ok(ranked)
    }
}

/// Parse a comma-separated genre code list; blank input means no filter.
fn parse_genre_filter(filter: Option<&str>) -> Result<Vec<i32>> {
    let Some(raw) = filter else {
        return Ok(Vec::new());
    };
    raw.split(',')
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(|code| {
            code.parse::<i32>()
                .map_err(|_| CoreError::Validation(format!("invalid genre code: {code:?}")))
        })
        .collect()
}
