use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::AppState;
use crate::auth::Principal;
use crate::infra::errors::ApiResult;
use crate::movie_handlers::{TypeQuery, media_type_param};
use cinerate_core::reviews::ReviewView;
use cinerate_model::ReviewId;

#[derive(Debug, Deserialize)]
pub struct ReviewBody {
    #[serde(default)]
    pub content: String,
    pub rating: i32,
}

#[derive(Debug, Deserialize)]
pub struct TagBody {
    pub tag: String,
}

pub async fn add_review_handler(
    State(state): State<AppState>,
    principal: Principal,
    Path(movie_id): Path<String>,
    Query(query): Query<TypeQuery>,
    Json(body): Json<ReviewBody>,
) -> ApiResult<Json<Value>> {
    let media_type = media_type_param(query.media_type.as_deref())?;
    let (review, movie) = state
        .reviews
        .add_review(
            principal.id,
            &principal.name,
            &movie_id,
            media_type,
            body.content,
            body.rating,
        )
        .await?;
    let reviews = state.reviews.reviews_for_movie(&movie_id, media_type).await?;

    Ok(Json(json!({
        "message": "Your review has been added.",
        "ratingSum": movie.rating_sum,
        "reviews": reviews,
        "singleReview": ReviewView::from(&review),
    })))
}

pub async fn update_review_handler(
    State(state): State<AppState>,
    principal: Principal,
    Path(review_id): Path<Uuid>,
    Json(body): Json<ReviewBody>,
) -> ApiResult<Json<Value>> {
    let (review, movie) = state
        .reviews
        .update_review(
            principal.id,
            ReviewId::from(review_id),
            body.content,
            body.rating,
        )
        .await?;
    let reviews = state
        .reviews
        .reviews_for_movie(&review.external_id, review.media_type)
        .await?;

    Ok(Json(json!({
        "message": "Your review has been updated.",
        "ratingSum": movie.rating_sum,
        "reviews": reviews,
        "singleReview": ReviewView::from(&review),
    })))
}

pub async fn remove_review_handler(
    State(state): State<AppState>,
    principal: Principal,
    Path(review_id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    state
        .reviews
        .remove_review(principal.id, ReviewId::from(review_id))
        .await?;
    Ok(Json(json!({ "message": "Your review has been removed." })))
}

pub async fn reviews_by_movie_handler(
    State(state): State<AppState>,
    Path(movie_id): Path<String>,
    Query(query): Query<TypeQuery>,
) -> ApiResult<Json<Value>> {
    let media_type = media_type_param(query.media_type.as_deref())?;
    let reviews = state.reviews.reviews_for_movie(&movie_id, media_type).await?;
    Ok(Json(json!({ "reviews": reviews })))
}

pub async fn review_by_user_and_movie_handler(
    State(state): State<AppState>,
    principal: Principal,
    Path(movie_id): Path<String>,
    Query(query): Query<TypeQuery>,
) -> ApiResult<Json<Value>> {
    let media_type = media_type_param(query.media_type.as_deref())?;
    let review = state
        .reviews
        .review_by_owner(principal.id, &movie_id, media_type)
        .await?;
    match review {
        Some(review) => Ok(Json(json!(ReviewView::from(&review)))),
        None => Ok(Json(json!({}))),
    }
}

pub async fn add_tag_handler(
    State(state): State<AppState>,
    _principal: Principal,
    Path(movie_id): Path<String>,
    Query(query): Query<TypeQuery>,
    Json(body): Json<TagBody>,
) -> ApiResult<Json<Value>> {
    let media_type = media_type_param(query.media_type.as_deref())?;
    state.reviews.add_tag(&movie_id, media_type, &body.tag).await?;
    Ok(Json(json!({ "message": "Your tag has been added." })))
}

pub async fn like_review_handler(
    State(state): State<AppState>,
    principal: Principal,
    Path(review_id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    state
        .reviews
        .like_review(principal.id, ReviewId::from(review_id))
        .await?;
    Ok(Json(json!({ "message": "You have liked this review." })))
}

pub async fn dislike_review_handler(
    State(state): State<AppState>,
    principal: Principal,
    Path(review_id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    state
        .reviews
        .dislike_review(principal.id, ReviewId::from(review_id))
        .await?;
    Ok(Json(json!({ "message": "You have disliked this review." })))
}
