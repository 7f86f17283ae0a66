//! API route tree.

use axum::http::HeaderValue;
use axum::{
    Router,
    routing::{get, patch, post},
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::infra::errors::ApiError;
use crate::{AppState, movie_handlers, review_handlers};
use cinerate_config::CorsConfig;

/// Create the full API router.
pub fn create_api_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors);
    Router::new()
        .nest("/api/movie", movie_routes())
        .nest("/api/review", review_routes())
        .fallback(handle_not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn movie_routes() -> Router<AppState> {
    Router::new()
        .route("/trending", get(movie_handlers::trending_handler))
        .route("/now-playing", get(movie_handlers::now_playing_handler))
        .route("/search", get(movie_handlers::search_handler))
        .route("/most-rated", get(movie_handlers::most_rated_handler))
        .route("/top-rated", get(movie_handlers::top_rated_handler))
        .route("/least-rated", get(movie_handlers::least_rated_handler))
        .route("/bottom-rated", get(movie_handlers::bottom_rated_handler))
        .route(
            "/genre/{genre_ids}",
            get(movie_handlers::movies_by_genre_handler),
        )
        .route("/{movie_id}", get(movie_handlers::get_movie_handler))
        .route(
            "/{movie_id}/similar",
            get(movie_handlers::similar_movies_handler),
        )
        .route(
            "/{movie_id}/credits",
            get(movie_handlers::get_credits_handler),
        )
        .route("/{movie_id}/videos", get(movie_handlers::get_videos_handler))
        .route("/{movie_id}/images", get(movie_handlers::get_images_handler))
}

fn review_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/add/{movie_id}",
            post(review_handlers::add_review_handler),
        )
        .route(
            "/get-reviews-by-movie/{movie_id}",
            get(review_handlers::reviews_by_movie_handler),
        )
        .route(
            "/get-review-by-user-and-movie/{movie_id}",
            get(review_handlers::review_by_user_and_movie_handler),
        )
        .route("/tag/{movie_id}", post(review_handlers::add_tag_handler))
        .route(
            "/like/{review_id}",
            patch(review_handlers::like_review_handler),
        )
        .route(
            "/dislike/{review_id}",
            patch(review_handlers::dislike_review_handler),
        )
        .route(
            "/{review_id}",
            patch(review_handlers::update_review_handler)
                .delete(review_handlers::remove_review_handler),
        )
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    if config.allowed_origins.is_empty() || config.is_wildcard_included() {
        return CorsLayer::permissive();
    }
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn handle_not_found() -> ApiError {
    ApiError::not_found("Not found")
}
