//! Import pipeline: fetch external metadata, normalize it into the cache
//! schema, and persist exactly once.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{CoreError, Result};
use crate::provider::{
    first_trailer, CreditsPayload, ImageUrls, MetadataPayload, MetadataProvider, VideoPayload,
};
use crate::store::{InsertOutcome, MovieStore};
use cinerate_model::{CreditEntry, MediaType, MovieRecord};

/// Upstream cast lists run to hundreds of entries; only the top billing is
/// cached.
pub const CAST_LIMIT: usize = 18;

#[derive(Clone)]
pub struct ImportPipeline {
    provider: Arc<dyn MetadataProvider>,
    store: Arc<dyn MovieStore>,
    urls: ImageUrls,
}

impl std::fmt::Debug for ImportPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImportPipeline").finish_non_exhaustive()
    }
}

impl ImportPipeline {
    pub fn new(
        provider: Arc<dyn MetadataProvider>,
        store: Arc<dyn MovieStore>,
        urls: ImageUrls,
    ) -> Self {
        Self {
            provider,
            store,
            urls,
        }
    }

    /// Return the cached record, importing it on a miss.
    pub async fn get_or_import(
        &self,
        external_id: &str,
        media_type: MediaType,
    ) -> Result<MovieRecord> {
        if let Some(record) = self.store.find_movie(external_id, media_type).await? {
            return Ok(record);
        }
        self.import(external_id, media_type).await
    }

    /// Fetch details, credits, and videos; normalize; persist exactly once.
    ///
    /// Callers are expected to check the cache first; no existence check
    /// happens here. Two tasks racing past that check both reach the insert;
    /// the store's natural-key constraint picks the winner and the loser
    /// reads the winner's record back instead of failing.
    pub async fn import(&self, external_id: &str, media_type: MediaType) -> Result<MovieRecord> {
        let details = self.provider.details(external_id, media_type).await?;
        let credits = self.provider.credits(external_id, media_type).await?;
        let videos = self.provider.videos(external_id, media_type).await?;

        let record = self.normalize(external_id, media_type, details, credits, &videos);

        match self.store.insert_movie(&record).await? {
            InsertOutcome::Inserted => {
                info!(external_id, %media_type, "imported movie record");
                Ok(record)
            }
            InsertOutcome::AlreadyCached => {
                debug!(external_id, %media_type, "lost import race, reading winner back");
                self.store
                    .find_movie(external_id, media_type)
                    .await?
                    .ok_or_else(|| {
                        CoreError::Consistency(format!(
                            "record {media_type}/{external_id} vanished after insert conflict"
                        ))
                    })
            }
        }
    }

    fn normalize(
        &self,
        external_id: &str,
        media_type: MediaType,
        details: MetadataPayload,
        credits: CreditsPayload,
        videos: &[VideoPayload],
    ) -> MovieRecord {
        let cast: Vec<CreditEntry> = credits
            .cast
            .iter()
            .take(CAST_LIMIT)
            .map(|member| CreditEntry {
                external_id: member.id,
                name: member.name.clone(),
                role_label: member.character.clone(),
                profile: self.urls.image(member.profile_path.as_deref()),
            })
            .collect();

        let mut directors = Vec::new();
        let mut writers: Vec<CreditEntry> = Vec::new();
        for member in &credits.crew {
            if member.job == "Director" {
                directors.push(CreditEntry {
                    external_id: member.id,
                    name: member.name.clone(),
                    role_label: None,
                    profile: None,
                });
            } else if member.department == "Writing"
                && !writers.iter().any(|w| w.external_id == member.id)
            {
                writers.push(CreditEntry {
                    external_id: member.id,
                    name: member.name.clone(),
                    role_label: None,
                    profile: None,
                });
            }
        }

        // Upstream quirk, preserved: a show's non-empty creator list replaces
        // the directors computed from crew credits.
        if !details.created_by.is_empty() {
            directors = details
                .created_by
                .iter()
                .map(|creator| CreditEntry {
                    external_id: creator.id,
                    name: creator.name.clone(),
                    role_label: None,
                    profile: None,
                })
                .collect();
        }

        // `runtime` for movies, the first episode runtime for shows; 0 is the
        // documented sentinel when upstream reports neither.
        let runtime_minutes = details
            .runtime
            .or_else(|| details.episode_run_time.first().copied())
            .unwrap_or(0);

        let release_date = details
            .release_date
            .as_deref()
            .or(details.first_air_date.as_deref())
            .and_then(|raw| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok());

        let now = Utc::now();
        MovieRecord {
            id: Uuid::new_v4(),
            external_id: external_id.to_string(),
            media_type,
            title: details.display_title(media_type),
            storyline: details.overview,
            runtime_minutes,
            languages: details
                .spoken_languages
                .iter()
                .map(|language| language.english_name.clone())
                .collect(),
            genre_ids: details.genres.iter().map(|genre| genre.id).collect(),
            release_date,
            poster_path: details.poster_path,
            backdrop_path: details.backdrop_path,
            trailer_key: first_trailer(videos).map(str::to_string),
            directors,
            writers,
            cast,
            homepage: details.homepage,
            tags: Vec::new(),
            review_refs: Vec::new(),
            rating_sum: 0,
            created_at: now,
            updated_at: now,
        }
    }
}
