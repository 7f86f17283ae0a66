//! External metadata client: the provider seam and its upstream payload
//! schemas.
//!
//! Upstream JSON is deserialized into explicit schemas at the client
//! boundary; optional fields carry defaulting rules so the import pipeline
//! never sees duck-typed data.

pub mod tmdb;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::Result;
use cinerate_model::MediaType;
use cinerate_config::TmdbConfig;

pub use tmdb::TmdbClient;

/// Details payload for one movie or TV show.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetadataPayload {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub first_air_date: Option<String>,
    #[serde(default)]
    pub genres: Vec<GenrePayload>,
    #[serde(default)]
    pub spoken_languages: Vec<LanguagePayload>,
    #[serde(default)]
    pub runtime: Option<i32>,
    #[serde(default)]
    pub episode_run_time: Vec<i32>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub created_by: Vec<CreatorPayload>,
    #[serde(default)]
    pub homepage: Option<String>,
}

impl MetadataPayload {
    /// Movies are titled, shows are named.
    pub fn display_title(&self, media_type: MediaType) -> String {
        let preferred = match media_type {
            MediaType::Movie => self.title.as_ref(),
            MediaType::Tv => self.name.as_ref(),
        };
        preferred
            .or(self.title.as_ref())
            .or(self.name.as_ref())
            .cloned()
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenrePayload {
    pub id: i32,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LanguagePayload {
    #[serde(default)]
    pub english_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatorPayload {
    pub id: i64,
    pub name: String,
}

/// Cast and crew for one movie or TV show.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreditsPayload {
    #[serde(default)]
    pub cast: Vec<CastPayload>,
    #[serde(default)]
    pub crew: Vec<CrewPayload>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CastPayload {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub profile_path: Option<String>,
    #[serde(default)]
    pub character: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CrewPayload {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub job: String,
}

/// One hosted video (trailer, teaser, clip, ...).
#[derive(Debug, Clone, Deserialize)]
pub struct VideoPayload {
    #[serde(default)]
    pub name: String,
    pub key: String,
    #[serde(default)]
    pub site: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub published_at: Option<String>,
}

/// Lightweight list item from trending/search/similar/discover endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct ListedPayload {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
}

impl ListedPayload {
    /// Upstream list items carry no media-type discriminator; titled entries
    /// are movies, named entries are shows.
    pub fn media_type(&self) -> MediaType {
        if self.title.is_some() {
            MediaType::Movie
        } else {
            MediaType::Tv
        }
    }

    pub fn display_title(&self) -> String {
        self.title
            .as_ref()
            .or(self.name.as_ref())
            .cloned()
            .unwrap_or_default()
    }
}

/// Artwork collections for one movie or TV show.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImagesPayload {
    #[serde(default)]
    pub backdrops: Vec<ImageEntryPayload>,
    #[serde(default)]
    pub logos: Vec<ImageEntryPayload>,
    #[serde(default)]
    pub posters: Vec<ImageEntryPayload>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageEntryPayload {
    pub file_path: String,
}

/// Seam to the third-party metadata service.
///
/// Pure network calls, no local state. Any transport failure or non-2xx
/// response surfaces as [`CoreError::Upstream`](crate::CoreError::Upstream)
/// or [`CoreError::Network`](crate::CoreError::Network); there is a single
/// attempt per call and the caller decides retry policy.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    async fn details(&self, external_id: &str, media_type: MediaType) -> Result<MetadataPayload>;

    async fn credits(&self, external_id: &str, media_type: MediaType) -> Result<CreditsPayload>;

    async fn videos(&self, external_id: &str, media_type: MediaType) -> Result<Vec<VideoPayload>>;

    async fn images(&self, external_id: &str, media_type: MediaType) -> Result<ImagesPayload>;

    async fn genres(&self, media_type: MediaType) -> Result<Vec<GenrePayload>>;

    /// `None` asks for the cross-media trending feed.
    async fn trending(&self, media_type: Option<MediaType>) -> Result<Vec<ListedPayload>>;

    async fn now_playing(&self, media_type: MediaType) -> Result<Vec<ListedPayload>>;

    async fn similar(&self, external_id: &str, media_type: MediaType)
        -> Result<Vec<ListedPayload>>;

    async fn search(&self, media_type: MediaType, text: &str) -> Result<Vec<ListedPayload>>;

    async fn discover(
        &self,
        media_type: MediaType,
        genre_ids: &str,
        sort_by: &str,
        page: u32,
    ) -> Result<Vec<ListedPayload>>;
}

/// The video host trailers are resolved against.
pub const VIDEO_HOST: &str = "YouTube";

/// First hosted video that is named as a trailer.
pub fn first_trailer(videos: &[VideoPayload]) -> Option<&str> {
    videos
        .iter()
        .find(|video| video.site == VIDEO_HOST && video.name.contains("Trailer"))
        .map(|video| video.key.as_str())
}

/// Resolves provider-relative artwork paths and video keys into URLs.
#[derive(Debug, Clone)]
pub struct ImageUrls {
    image_base: String,
    image_origin_base: String,
    youtube_base: String,
}

impl ImageUrls {
    pub fn new(config: &TmdbConfig) -> Self {
        Self {
            image_base: config.image_base.clone(),
            image_origin_base: config.image_origin_base.clone(),
            youtube_base: config.youtube_base.clone(),
        }
    }

    /// Standard-quality image URL.
    pub fn image(&self, path: Option<&str>) -> Option<String> {
        path.map(|p| format!("{}{}", self.image_base, p))
    }

    /// Original-quality image URL.
    pub fn image_original(&self, path: Option<&str>) -> Option<String> {
        path.map(|p| format!("{}{}", self.image_origin_base, p))
    }

    /// Watch URL for a hosted video key.
    pub fn youtube(&self, key: &str) -> String {
        format!("{}{}", self.youtube_base, key)
    }
}
