//! Presentation formatters: shape provider payloads and cached records into
//! response projections.
//!
//! The grouping and projection functions are pure; [`ListingFormatter`]
//! performs the per-item trailer and rating-stat reads the listing endpoints
//! need.

use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use crate::error::Result;
use crate::provider::{
    first_trailer, CreditsPayload, ImageUrls, ImagesPayload, ListedPayload, MetadataProvider,
    VideoPayload, VIDEO_HOST,
};
use crate::store::MovieStore;
use cinerate_model::{MediaType, RatingStats};

/// Credits grouped by department.
#[derive(Debug, Default, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditGroups {
    pub cast: Vec<CastCredit>,
    pub directors: Vec<CrewCredit>,
    pub writers: Vec<CrewCredit>,
    pub producers: Vec<CrewCredit>,
    pub sound: Vec<CrewCredit>,
    pub art: Vec<CrewCredit>,
    pub visual_effects: Vec<CrewCredit>,
    pub editors: Vec<CrewCredit>,
    pub costume: Vec<CrewCredit>,
    pub camera: Vec<CrewCredit>,
    pub lighting: Vec<CrewCredit>,
    pub thanks: Vec<CrewCredit>,
    pub others: Vec<CrewCredit>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CastCredit {
    pub id: i64,
    pub name: String,
    pub profile: Option<String>,
    pub character: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrewCredit {
    pub id: i64,
    pub name: String,
    pub job: String,
}

/// Group crew credits into fixed department buckets.
///
/// Matching is case-sensitive and exact against the provider's taxonomy;
/// anything unmatched lands in `others`. The thanks bucket is keyed on the
/// job, not the department, and wins over the department match.
pub fn group_credits(credits: &CreditsPayload, urls: &ImageUrls) -> CreditGroups {
    let mut groups = CreditGroups {
        cast: credits
            .cast
            .iter()
            .map(|member| CastCredit {
                id: member.id,
                name: member.name.clone(),
                profile: urls.image(member.profile_path.as_deref()),
                character: member.character.clone(),
            })
            .collect(),
        ..Default::default()
    };

    for member in &credits.crew {
        let person = CrewCredit {
            id: member.id,
            name: member.name.clone(),
            job: member.job.clone(),
        };
        let bucket = if member.job == "Thanks" || member.job == "In Memory Of" {
            &mut groups.thanks
        } else {
            match member.department.as_str() {
                "Directing" => &mut groups.directors,
                "Writing" => &mut groups.writers,
                "Production" => &mut groups.producers,
                "Sound" => &mut groups.sound,
                "Art" => &mut groups.art,
                "Visual Effects" => &mut groups.visual_effects,
                "Editing" => &mut groups.editors,
                "Costume & Make-Up" => &mut groups.costume,
                "Camera" => &mut groups.camera,
                "Lighting" => &mut groups.lighting,
                _ => &mut groups.others,
            }
        };
        bucket.push(person);
    }

    groups
}

/// Video projection for the videos endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoItem {
    pub name: String,
    pub key: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub published_at: Option<String>,
}

/// Keep only videos on the supported host and project the display fields.
pub fn format_videos(videos: &[VideoPayload]) -> Vec<VideoItem> {
    videos
        .iter()
        .filter(|video| video.site == VIDEO_HOST)
        .map(|video| VideoItem {
            name: video.name.clone(),
            key: video.key.clone(),
            kind: video.kind.clone(),
            published_at: video.published_at.clone(),
        })
        .collect()
}

/// Artwork path collections for the images endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageCollections {
    pub backdrops: Vec<String>,
    pub logos: Vec<String>,
    pub posters: Vec<String>,
}

pub fn format_images(images: &ImagesPayload) -> ImageCollections {
    ImageCollections {
        backdrops: images.backdrops.iter().map(|i| i.file_path.clone()).collect(),
        logos: images.logos.iter().map(|i| i.file_path.clone()).collect(),
        posters: images.posters.iter().map(|i| i.file_path.clone()).collect(),
    }
}

/// Image quality for listing cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageQuality {
    Standard,
    Original,
}

/// One card in a discovery/listing response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingCard {
    pub id: String,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    pub title: String,
    pub storyline: String,
    pub backdrop: Option<String>,
    pub poster: Option<String>,
    pub trailer: Option<String>,
    pub reviews: RatingStats,
}

/// Assembles listing cards: one trailer lookup per item plus local rating
/// stats for anything already cached.
#[derive(Clone)]
pub struct ListingFormatter {
    provider: Arc<dyn MetadataProvider>,
    store: Arc<dyn MovieStore>,
    urls: ImageUrls,
}

impl std::fmt::Debug for ListingFormatter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListingFormatter").finish_non_exhaustive()
    }
}

impl ListingFormatter {
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

    pub async fn cards(
        &self,
        items: Vec<ListedPayload>,
        quality: ImageQuality,
    ) -> Result<Vec<ListingCard>> {
        let mut cards = Vec::with_capacity(items.len());
        for item in items {
            let media_type = item.media_type();
            let external_id = item.id.to_string();

            let reviews = match self.store.find_movie(&external_id, media_type).await? {
                Some(record) => record.rating_stats(),
                None => RatingStats::ZERO,
            };

            // Trailer enrichment is best effort; a failed lookup costs the
            // card its trailer, not the whole listing.
            let trailer = match self.provider.videos(&external_id, media_type).await {
                Ok(videos) => first_trailer(&videos).map(|key| self.urls.youtube(key)),
                Err(err) => {
                    warn!(external_id, %media_type, error = %err, "trailer lookup failed");
                    None
                }
            };

            let (backdrop, poster) = match quality {
                ImageQuality::Standard => (
                    self.urls.image(item.backdrop_path.as_deref()),
                    self.urls.image(item.poster_path.as_deref()),
                ),
                ImageQuality::Original => (
                    self.urls.image_original(item.backdrop_path.as_deref()),
                    self.urls.image_original(item.poster_path.as_deref()),
                ),
            };

            cards.push(ListingCard {
                id: external_id,
                media_type,
                title: item.display_title(),
                storyline: item.overview,
                backdrop,
                poster,
                trailer,
                reviews,
            });
        }
        Ok(cards)
    }
}
