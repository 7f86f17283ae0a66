//! Reqwest-backed implementation of the metadata provider seam.

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::{CoreError, Result};
use cinerate_config::TmdbConfig;
use cinerate_model::MediaType;

use super::{
    CreditsPayload, GenrePayload, ImagesPayload, ListedPayload, MetadataPayload, MetadataProvider,
    VideoPayload,
};

/// Client for the TMDB-shaped metadata API.
///
/// All connection parameters come from the [`TmdbConfig`] handed to the
/// constructor; nothing here reads process-wide state.
#[derive(Debug, Clone)]
pub struct TmdbClient {
    http: reqwest::Client,
    config: TmdbConfig,
}

#[derive(Debug, Deserialize)]
struct ResultsEnvelope<T> {
    #[serde(default = "Vec::new")]
    results: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct GenreListEnvelope {
    #[serde(default)]
    genres: Vec<GenrePayload>,
}

#[derive(Debug, Deserialize)]
struct UpstreamErrorBody {
    #[serde(default)]
    status_message: Option<String>,
}

impl TmdbClient {
    pub fn new(config: TmdbConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    /// Single-attempt GET; non-2xx becomes `CoreError::Upstream` carrying the
    /// upstream status message when one is present.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        localized: bool,
    ) -> Result<T> {
        let mut request = self
            .http
            .get(self.endpoint(path))
            .query(&[("api_key", self.config.api_key.as_str())]);
        if localized {
            request = request.query(&[("language", self.config.language.as_str())]);
        }
        let response = request.query(query).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<UpstreamErrorBody>()
                .await
                .ok()
                .and_then(|body| body.status_message)
                .unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("upstream request failed")
                        .to_string()
                });
            return Err(CoreError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl MetadataProvider for TmdbClient {
    async fn details(&self, external_id: &str, media_type: MediaType) -> Result<MetadataPayload> {
        self.get_json(&format!("/{media_type}/{external_id}"), &[], true)
            .await
    }

    async fn credits(&self, external_id: &str, media_type: MediaType) -> Result<CreditsPayload> {
        self.get_json(&format!("/{media_type}/{external_id}/credits"), &[], true)
            .await
    }

    async fn videos(&self, external_id: &str, media_type: MediaType) -> Result<Vec<VideoPayload>> {
        let envelope: ResultsEnvelope<VideoPayload> = self
            .get_json(&format!("/{media_type}/{external_id}/videos"), &[], true)
            .await?;
        Ok(envelope.results)
    }

    // Artwork is requested unlocalized so every language variant comes back.
    async fn images(&self, external_id: &str, media_type: MediaType) -> Result<ImagesPayload> {
        self.get_json(&format!("/{media_type}/{external_id}/images"), &[], false)
            .await
    }

    async fn genres(&self, media_type: MediaType) -> Result<Vec<GenrePayload>> {
        let envelope: GenreListEnvelope = self
            .get_json(&format!("/genre/{media_type}/list"), &[], true)
            .await?;
        Ok(envelope.genres)
    }

    async fn trending(&self, media_type: Option<MediaType>) -> Result<Vec<ListedPayload>> {
        let scope = media_type.map(|t| t.as_str()).unwrap_or("all");
        let envelope: ResultsEnvelope<ListedPayload> = self
            .get_json(&format!("/trending/{scope}/day"), &[], true)
            .await?;
        Ok(envelope.results)
    }

    async fn now_playing(&self, media_type: MediaType) -> Result<Vec<ListedPayload>> {
        let path = match media_type {
            MediaType::Movie => "/movie/now_playing",
            MediaType::Tv => "/tv/on_the_air",
        };
        let envelope: ResultsEnvelope<ListedPayload> = self.get_json(path, &[], true).await?;
        Ok(envelope.results)
    }

    async fn similar(
        &self,
        external_id: &str,
        media_type: MediaType,
    ) -> Result<Vec<ListedPayload>> {
        let envelope: ResultsEnvelope<ListedPayload> = self
            .get_json(&format!("/{media_type}/{external_id}/similar"), &[], true)
            .await?;
        Ok(envelope.results)
    }

    async fn search(&self, media_type: MediaType, text: &str) -> Result<Vec<ListedPayload>> {
        let envelope: ResultsEnvelope<ListedPayload> = self
            .get_json(&format!("/search/{media_type}"), &[("query", text)], true)
            .await?;
        Ok(envelope.results)
    }

    async fn discover(
        &self,
        media_type: MediaType,
        genre_ids: &str,
        sort_by: &str,
        page: u32,
    ) -> Result<Vec<ListedPayload>> {
        let page = page.to_string();
        let envelope: ResultsEnvelope<ListedPayload> = self
            .get_json(
                &format!("/discover/{media_type}"),
                &[
                    ("sort_by", sort_by),
                    ("page", page.as_str()),
                    ("with_genres", genre_ids),
                ],
                true,
            )
            .await?;
        Ok(envelope.results)
    }
}
