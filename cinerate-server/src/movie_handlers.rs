use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use crate::AppState;
use crate::infra::errors::{ApiError, ApiResult};
use cinerate_core::format::{format_images, format_videos, group_credits};
use cinerate_core::{ImageQuality, RankOrder, DEFAULT_PAGE_SIZE};
use cinerate_model::MediaType;

#[derive(Debug, Default, Deserialize)]
pub struct TypeQuery {
    #[serde(rename = "type")]
    pub media_type: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(rename = "type")]
    pub media_type: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RankQuery {
    #[serde(rename = "type")]
    pub media_type: Option<String>,
    pub genre: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(rename = "type")]
    pub media_type: Option<String>,
    pub text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DiscoverQuery {
    #[serde(rename = "type")]
    pub media_type: Option<String>,
    pub sort_by: Option<String>,
    pub page: Option<u32>,
}

/// `type` defaults to `movie`; anything besides `movie`/`tv` is a 400.
pub fn media_type_param(raw: Option<&str>) -> Result<MediaType, ApiError> {
    match raw {
        None => Ok(MediaType::Movie),
        Some(raw) => raw
            .parse()
            .map_err(|err: cinerate_model::ModelError| ApiError::bad_request(err.to_string())),
    }
}

/// Like [`media_type_param`] but `all` (the default here) selects the
/// cross-media trending feed.
fn trending_scope_param(raw: Option<&str>) -> Result<Option<MediaType>, ApiError> {
    match raw {
        None | Some("all") => Ok(None),
        Some(raw) => media_type_param(Some(raw)).map(Some),
    }
}

pub async fn get_movie_handler(
    State(state): State<AppState>,
    Path(movie_id): Path<String>,
    Query(query): Query<TypeQuery>,
) -> ApiResult<Json<Value>> {
    let media_type = media_type_param(query.media_type.as_deref())?;
    let movie = state.pipeline.get_or_import(&movie_id, media_type).await?;
    Ok(Json(json!({ "movie": movie })))
}

async fn ranked(
    state: AppState,
    order: RankOrder,
    query: RankQuery,
) -> ApiResult<Json<Value>> {
    let media_type = media_type_param(query.media_type.as_deref())?;
    let genre = query.genre.as_deref().filter(|genre| !genre.is_empty());
    let movies = state
        .rating
        .rank(order, media_type, genre, DEFAULT_PAGE_SIZE)
        .await?;
    Ok(Json(json!(movies)))
}

pub async fn most_rated_handler(
    State(state): State<AppState>,
    Query(query): Query<RankQuery>,
) -> ApiResult<Json<Value>> {
    ranked(state, RankOrder::MostRated, query).await
}

pub async fn top_rated_handler(
    State(state): State<AppState>,
    Query(query): Query<RankQuery>,
) -> ApiResult<Json<Value>> {
    ranked(state, RankOrder::TopRated, query).await
}

pub async fn least_rated_handler(
    State(state): State<AppState>,
    Query(query): Query<RankQuery>,
) -> ApiResult<Json<Value>> {
    ranked(state, RankOrder::LeastRated, query).await
}

pub async fn bottom_rated_handler(
    State(state): State<AppState>,
    Query(query): Query<RankQuery>,
) -> ApiResult<Json<Value>> {
    ranked(state, RankOrder::BottomRated, query).await
}

pub async fn get_credits_handler(
    State(state): State<AppState>,
    Path(movie_id): Path<String>,
    Query(query): Query<TypeQuery>,
) -> ApiResult<Json<Value>> {
    let media_type = media_type_param(query.media_type.as_deref())?;
    let credits = state.provider.credits(&movie_id, media_type).await?;
    Ok(Json(json!(group_credits(&credits, &state.urls))))
}

pub async fn get_videos_handler(
    State(state): State<AppState>,
    Path(movie_id): Path<String>,
    Query(query): Query<TypeQuery>,
) -> ApiResult<Json<Value>> {
    let media_type = media_type_param(query.media_type.as_deref())?;
    let videos = state.provider.videos(&movie_id, media_type).await?;
    Ok(Json(json!({ "videos": format_videos(&videos) })))
}

pub async fn get_images_handler(
    State(state): State<AppState>,
    Path(movie_id): Path<String>,
    Query(query): Query<TypeQuery>,
) -> ApiResult<Json<Value>> {
    let media_type = media_type_param(query.media_type.as_deref())?;
    let images = state.provider.images(&movie_id, media_type).await?;
    Ok(Json(json!(format_images(&images))))
}

pub async fn trending_handler(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Value>> {
    let scope = trending_scope_param(query.media_type.as_deref())?;
    let limit = query.limit.unwrap_or(10);
    let mut items = state.provider.trending(scope).await?;
    items.truncate(limit);
    let movies = state.listings.cards(items, ImageQuality::Standard).await?;
    Ok(Json(json!({ "movies": movies })))
}

pub async fn now_playing_handler(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Value>> {
    let media_type = media_type_param(query.media_type.as_deref())?;
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE);
    let mut items = state.provider.now_playing(media_type).await?;
    items.truncate(limit);
    let movies = state.listings.cards(items, ImageQuality::Original).await?;
    Ok(Json(json!({ "movies": movies })))
}

pub async fn search_handler(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Value>> {
    let media_type = media_type_param(query.media_type.as_deref())?;
    let text = query
        .text
        .as_deref()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .ok_or_else(|| ApiError::bad_request("search text is required"))?;
    info!(%media_type, text, "searching upstream");
    let items = state.provider.search(media_type, text).await?;
    let movies = state.listings.cards(items, ImageQuality::Standard).await?;
    Ok(Json(json!({ "movies": movies })))
}

pub async fn similar_movies_handler(
    State(state): State<AppState>,
    Path(movie_id): Path<String>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Value>> {
    let media_type = media_type_param(query.media_type.as_deref())?;
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE);
    let mut items = state.provider.similar(&movie_id, media_type).await?;
    items.truncate(limit);
    let movies = state.listings.cards(items, ImageQuality::Standard).await?;
    Ok(Json(json!({ "movies": movies })))
}

pub async fn movies_by_genre_handler(
    State(state): State<AppState>,
    Path(genre_ids): Path<String>,
    Query(query): Query<DiscoverQuery>,
) -> ApiResult<Json<Value>> {
    let media_type = media_type_param(query.media_type.as_deref())?;

    let known = state.provider.genres(media_type).await?;
    for code in genre_ids.split(',').map(str::trim).filter(|c| !c.is_empty()) {
        let id: i32 = code
            .parse()
            .map_err(|_| ApiError::bad_request(format!("invalid genre code: {code:?}")))?;
        if !known.iter().any(|genre| genre.id == id) {
            return Err(ApiError::not_found(format!("genre id {id} not found")));
        }
    }

    let sort_by = query.sort_by.as_deref().unwrap_or("popularity.desc");
    let page = query.page.unwrap_or(1);
    let items = state
        .provider
        .discover(media_type, &genre_ids, sort_by, page)
        .await?;
    let movies = state.listings.cards(items, ImageQuality::Standard).await?;
    Ok(Json(json!({ "movies": movies })))
}
