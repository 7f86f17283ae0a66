//! Shared test fixtures: an in-memory store, a scripted metadata provider,
//! and an app builder wiring both into the real router.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use chrono::Utc;
use uuid::Uuid;

use cinerate_config::Config;
use cinerate_core::provider::{
    CreditsPayload, GenrePayload, ImagesPayload, ListedPayload, MetadataPayload, MetadataProvider,
    VideoPayload,
};
use cinerate_core::{CoreError, InsertOutcome, MovieStore, RatingRow, Result};
use cinerate_model::{MediaType, MovieRecord, Review, ReviewId, UserId};
use cinerate_server::{AppState, create_api_router};

type Key = (String, MediaType);

/// Store double backed by hash maps; trait methods mirror the Postgres
/// implementation's semantics (conflict-detecting insert included).
#[derive(Debug, Default)]
pub struct InMemoryMovieStore {
    movies: Mutex<HashMap<Key, MovieRecord>>,
    reviews: Mutex<HashMap<ReviewId, Review>>,
}

impl InMemoryMovieStore {
    pub fn seed_movie(&self, record: MovieRecord) {
        self.movies
            .lock()
            .unwrap()
            .insert((record.external_id.clone(), record.media_type), record);
    }

    pub fn movie(&self, external_id: &str, media_type: MediaType) -> Option<MovieRecord> {
        self.movies
            .lock()
            .unwrap()
            .get(&(external_id.to_string(), media_type))
            .cloned()
    }

    pub fn review_count(&self) -> usize {
        self.reviews.lock().unwrap().len()
    }
}

#[async_trait]
impl MovieStore for InMemoryMovieStore {
    async fn find_movie(
        &self,
        external_id: &str,
        media_type: MediaType,
    ) -> Result<Option<MovieRecord>> {
        Ok(self.movie(external_id, media_type))
    }

    async fn insert_movie(&self, record: &MovieRecord) -> Result<InsertOutcome> {
        let mut movies = self.movies.lock().unwrap();
        let key = (record.external_id.clone(), record.media_type);
        if movies.contains_key(&key) {
            return Ok(InsertOutcome::AlreadyCached);
        }
        movies.insert(key, record.clone());
        Ok(InsertOutcome::Inserted)
    }

    async fn update_movie(&self, record: &MovieRecord) -> Result<()> {
        self.seed_movie(record.clone());
        Ok(())
    }

    async fn rated_movies(&self, media_type: MediaType) -> Result<Vec<RatingRow>> {
        Ok(self
            .movies
            .lock()
            .unwrap()
            .values()
            .filter(|record| record.media_type == media_type && !record.review_refs.is_empty())
            .map(|record| RatingRow {
                external_id: record.external_id.clone(),
                rating_sum: record.rating_sum,
                review_count: record.review_refs.len() as i64,
            })
            .collect())
    }

    async fn find_review(&self, id: ReviewId) -> Result<Option<Review>> {
        Ok(self.reviews.lock().unwrap().get(&id).cloned())
    }

    async fn find_review_by_owner(
        &self,
        owner: UserId,
        external_id: &str,
        media_type: MediaType,
    ) -> Result<Option<Review>> {
        Ok(self
            .reviews
            .lock()
            .unwrap()
            .values()
            .find(|review| {
                review.owner_id == owner
                    && review.external_id == external_id
                    && review.media_type == media_type
            })
            .cloned())
    }

    async fn reviews_for_movie(
        &self,
        external_id: &str,
        media_type: MediaType,
    ) -> Result<Vec<Review>> {
        let mut reviews: Vec<Review> = self
            .reviews
            .lock()
            .unwrap()
            .values()
            .filter(|review| {
                review.external_id == external_id && review.media_type == media_type
            })
            .cloned()
            .collect();
        reviews.sort_by_key(|review| review.created_at);
        Ok(reviews)
    }

    async fn persist_review(&self, movie: &MovieRecord, review: &Review) -> Result<()> {
        self.reviews
            .lock()
            .unwrap()
            .insert(review.id, review.clone());
        self.seed_movie(movie.clone());
        Ok(())
    }

    async fn delete_review(&self, movie: &MovieRecord, review: ReviewId) -> Result<()> {
        self.reviews.lock().unwrap().remove(&review);
        self.seed_movie(movie.clone());
        Ok(())
    }

    async fn save_review(&self, review: &Review) -> Result<()> {
        self.reviews
            .lock()
            .unwrap()
            .insert(review.id, review.clone());
        Ok(())
    }
}

/// Provider double with preloaded responses; unscripted lookups answer with
/// the upstream's 404 shape.
#[derive(Debug, Default)]
pub struct ScriptedProvider {
    details: Mutex<HashMap<Key, MetadataPayload>>,
    credits: Mutex<HashMap<Key, CreditsPayload>>,
    videos: Mutex<HashMap<Key, Vec<VideoPayload>>>,
    genre_list: Mutex<Vec<GenrePayload>>,
    listed: Mutex<Vec<ListedPayload>>,
    pub details_calls: AtomicUsize,
}

impl ScriptedProvider {
    pub fn script_details(&self, external_id: &str, media_type: MediaType, payload: MetadataPayload) {
        self.details
            .lock()
            .unwrap()
            .insert((external_id.to_string(), media_type), payload);
    }

    pub fn script_credits(&self, external_id: &str, media_type: MediaType, payload: CreditsPayload) {
        self.credits
            .lock()
            .unwrap()
            .insert((external_id.to_string(), media_type), payload);
    }

    pub fn script_videos(&self, external_id: &str, media_type: MediaType, videos: Vec<VideoPayload>) {
        self.videos
            .lock()
            .unwrap()
            .insert((external_id.to_string(), media_type), videos);
    }

    pub fn script_genres(&self, genres: Vec<GenrePayload>) {
        *self.genre_list.lock().unwrap() = genres;
    }

    pub fn script_listed(&self, items: Vec<ListedPayload>) {
        *self.listed.lock().unwrap() = items;
    }

    fn upstream_not_found() -> CoreError {
        CoreError::Upstream {
            status: 404,
            message: "The resource you requested could not be found.".to_string(),
        }
    }
}

#[async_trait]
impl MetadataProvider for ScriptedProvider {
    async fn details(&self, external_id: &str, media_type: MediaType) -> Result<MetadataPayload> {
        self.details_calls.fetch_add(1, Ordering::SeqCst);
        self.details
            .lock()
            .unwrap()
            .get(&(external_id.to_string(), media_type))
            .cloned()
            .ok_or_else(Self::upstream_not_found)
    }

    async fn credits(&self, external_id: &str, media_type: MediaType) -> Result<CreditsPayload> {
        Ok(self
            .credits
            .lock()
            .unwrap()
            .get(&(external_id.to_string(), media_type))
            .cloned()
            .unwrap_or_default())
    }

    async fn videos(&self, external_id: &str, media_type: MediaType) -> Result<Vec<VideoPayload>> {
        Ok(self
            .videos
            .lock()
            .unwrap()
            .get(&(external_id.to_string(), media_type))
            .cloned()
            .unwrap_or_default())
    }

    async fn images(&self, _external_id: &str, _media_type: MediaType) -> Result<ImagesPayload> {
        Ok(ImagesPayload::default())
    }

    async fn genres(&self, _media_type: MediaType) -> Result<Vec<GenrePayload>> {
        Ok(self.genre_list.lock().unwrap().clone())
    }

    async fn trending(&self, _media_type: Option<MediaType>) -> Result<Vec<ListedPayload>> {
        Ok(self.listed.lock().unwrap().clone())
    }

    async fn now_playing(&self, _media_type: MediaType) -> Result<Vec<ListedPayload>> {
        Ok(self.listed.lock().unwrap().clone())
    }

    async fn similar(
        &self,
        _external_id: &str,
        _media_type: MediaType,
    ) -> Result<Vec<ListedPayload>> {
        Ok(self.listed.lock().unwrap().clone())
    }

    async fn search(&self, _media_type: MediaType, _text: &str) -> Result<Vec<ListedPayload>> {
        Ok(self.listed.lock().unwrap().clone())
    }

    async fn discover(
        &self,
        _media_type: MediaType,
        _genre_ids: &str,
        _sort_by: &str,
        _page: u32,
    ) -> Result<Vec<ListedPayload>> {
        Ok(self.listed.lock().unwrap().clone())
    }
}

pub struct TestApp {
    pub router: Router,
    pub provider: Arc<ScriptedProvider>,
    pub store: Arc<InMemoryMovieStore>,
}

pub fn build_test_app() -> TestApp {
    let provider = Arc::new(ScriptedProvider::default());
    let store = Arc::new(InMemoryMovieStore::default());

    let state = AppState::new(
        Arc::new(Config {
            server: Default::default(),
            database: Default::default(),
            tmdb: Default::default(),
            cors: Default::default(),
            dev_mode: true,
        }),
        provider.clone(),
        store.clone(),
    );

    TestApp {
        router: create_api_router(state),
        provider,
        store,
    }
}

/// Minimal details payload for a movie.
pub fn movie_details(external_id: i64, title: &str, runtime: i32) -> MetadataPayload {
    MetadataPayload {
        id: external_id,
        title: Some(title.to_string()),
        overview: format!("{title} storyline"),
        runtime: Some(runtime),
        ..Default::default()
    }
}

/// A cached record carrying the given rating stats, for ranking tests.
pub fn rated_record(
    external_id: &str,
    media_type: MediaType,
    rating_sum: i64,
    review_count: usize,
) -> MovieRecord {
    let now = Utc::now();
    MovieRecord {
        id: Uuid::new_v4(),
        external_id: external_id.to_string(),
        media_type,
        title: format!("Movie {external_id}"),
        storyline: String::new(),
        runtime_minutes: 100,
        languages: Vec::new(),
        genre_ids: Vec::new(),
        release_date: None,
        poster_path: None,
        backdrop_path: None,
        trailer_key: None,
        directors: Vec::new(),
        writers: Vec::new(),
        cast: Vec::new(),
        homepage: None,
        tags: Vec::new(),
        review_refs: (0..review_count).map(|_| ReviewId::new_uuid()).collect(),
        rating_sum,
        created_at: now,
        updated_at: now,
    }
}
