mod support;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{Value, json};
use uuid::Uuid;

use cinerate_model::MediaType;
use support::{TestApp, build_test_app, movie_details};

fn server_with_matrix(app: &TestApp) -> TestServer {
    app.provider
        .script_details("603", MediaType::Movie, movie_details(603, "The Matrix", 136));
    TestServer::new(app.router.clone()).unwrap()
}

struct Identity {
    id: Uuid,
    name: &'static str,
}

impl Identity {
    fn new(name: &'static str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
        }
    }
}

async fn add_review(server: &TestServer, who: &Identity, movie_id: &str, rating: i32) -> Value {
    let response = server
        .post(&format!("/api/review/add/{movie_id}"))
        .add_header("x-user-id", who.id.to_string())
        .add_header("x-user-name", who.name)
        .json(&json!({ "content": "notes", "rating": rating }))
        .await;
    response.assert_status_ok();
    response.json()
}

#[tokio::test]
async fn review_routes_require_identity_headers() {
    let app = build_test_app();
    let server = server_with_matrix(&app);

    let response = server
        .post("/api/review/add/603")
        .json(&json!({ "content": "x", "rating": 5 }))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn adding_a_review_imports_the_movie_and_updates_the_sum() {
    let app = build_test_app();
    let server = server_with_matrix(&app);
    let alice = Identity::new("alice");

    let body = add_review(&server, &alice, "603", 8).await;
    assert_eq!(body["message"], "Your review has been added.");
    assert_eq!(body["ratingSum"], 8);
    assert_eq!(body["singleReview"]["owner"]["name"], "alice");
    assert_eq!(body["reviews"].as_array().unwrap().len(), 1);

    let movie = app.store.movie("603", MediaType::Movie).unwrap();
    assert_eq!(movie.rating_sum, 8);
    assert_eq!(movie.review_refs.len(), 1);
}

#[tokio::test]
async fn two_reviews_aggregate_into_sum_count_and_average_order() {
    let app = build_test_app();
    let server = server_with_matrix(&app);

    add_review(&server, &Identity::new("alice"), "603", 8).await;
    add_review(&server, &Identity::new("bob"), "603", 4).await;

    let movie = app.store.movie("603", MediaType::Movie).unwrap();
    assert_eq!(movie.rating_sum, 12);
    assert_eq!(movie.review_refs.len(), 2);
    assert_eq!(movie.rating_average(), Some(6.0));
}

#[tokio::test]
async fn a_second_review_from_the_same_user_is_rejected() {
    let app = build_test_app();
    let server = server_with_matrix(&app);
    let alice = Identity::new("alice");

    add_review(&server, &alice, "603", 8).await;
    let response = server
        .post("/api/review/add/603")
        .add_header("x-user-id", alice.id.to_string())
        .add_header("x-user-name", alice.name)
        .json(&json!({ "content": "again", "rating": 2 }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let movie = app.store.movie("603", MediaType::Movie).unwrap();
    assert_eq!(movie.rating_sum, 8);
}

#[tokio::test]
async fn out_of_bounds_ratings_are_rejected() {
    let app = build_test_app();
    let server = server_with_matrix(&app);
    let alice = Identity::new("alice");

    for rating in [0, 11] {
        let response = server
            .post("/api/review/add/603")
            .add_header("x-user-id", alice.id.to_string())
            .add_header("x-user-name", alice.name)
            .json(&json!({ "content": "x", "rating": rating }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }
    assert_eq!(app.store.review_count(), 0);
}

#[tokio::test]
async fn updating_a_review_reprices_the_parent() {
    let app = build_test_app();
    let server = server_with_matrix(&app);
    let alice = Identity::new("alice");

    let body = add_review(&server, &alice, "603", 3).await;
    let review_id = body["singleReview"]["id"].as_str().unwrap().to_string();

    let response = server
        .patch(&format!("/api/review/{review_id}"))
        .add_header("x-user-id", alice.id.to_string())
        .add_header("x-user-name", alice.name)
        .json(&json!({ "content": "rewatched", "rating": 9 }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["message"], "Your review has been updated.");
    assert_eq!(body["ratingSum"], 9);

    let movie = app.store.movie("603", MediaType::Movie).unwrap();
    assert_eq!(movie.rating_sum, 9);
    assert_eq!(movie.review_refs.len(), 1);
}

#[tokio::test]
async fn removing_a_review_reconciles_sum_and_refs() {
    let app = build_test_app();
    let server = server_with_matrix(&app);
    let alice = Identity::new("alice");
    let bob = Identity::new("bob");

    add_review(&server, &alice, "603", 8).await;
    let body = add_review(&server, &bob, "603", 4).await;
    let bob_review_id = body["singleReview"]["id"].as_str().unwrap().to_string();

    let response = server
        .delete(&format!("/api/review/{bob_review_id}"))
        .add_header("x-user-id", bob.id.to_string())
        .add_header("x-user-name", bob.name)
        .await;
    response.assert_status_ok();

    let movie = app.store.movie("603", MediaType::Movie).unwrap();
    assert_eq!(movie.rating_sum, 8);
    assert_eq!(movie.review_refs.len(), 1);
    assert_eq!(app.store.review_count(), 1);
}

#[tokio::test]
async fn only_the_owner_may_remove_a_review() {
    let app = build_test_app();
    let server = server_with_matrix(&app);
    let alice = Identity::new("alice");
    let mallory = Identity::new("mallory");

    let body = add_review(&server, &alice, "603", 8).await;
    let review_id = body["singleReview"]["id"].as_str().unwrap().to_string();

    let response = server
        .delete(&format!("/api/review/{review_id}"))
        .add_header("x-user-id", mallory.id.to_string())
        .add_header("x-user-name", mallory.name)
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(app.store.review_count(), 1);
}

#[tokio::test]
async fn likes_are_one_per_user() {
    let app = build_test_app();
    let server = server_with_matrix(&app);
    let alice = Identity::new("alice");
    let carol = Identity::new("carol");

    let body = add_review(&server, &alice, "603", 8).await;
    let review_id = body["singleReview"]["id"].as_str().unwrap().to_string();

    let like = |who: &Identity| {
        server
            .patch(&format!("/api/review/like/{review_id}"))
            .add_header("x-user-id", who.id.to_string())
            .add_header("x-user-name", who.name)
    };
    like(&carol).await.assert_status_ok();
    like(&carol).await.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn duplicate_tags_are_rejected() {
    let app = build_test_app();
    let server = server_with_matrix(&app);
    let alice = Identity::new("alice");

    let tag = |value: &str| {
        server
            .post("/api/review/tag/603")
            .add_header("x-user-id", alice.id.to_string())
            .add_header("x-user-name", alice.name)
            .json(&json!({ "tag": value }))
    };
    tag("cyberpunk").await.assert_status_ok();
    tag("cyberpunk").await.assert_status(StatusCode::BAD_REQUEST);

    let movie = app.store.movie("603", MediaType::Movie).unwrap();
    assert_eq!(movie.tags, vec!["cyberpunk".to_string()]);
}

#[tokio::test]
async fn review_by_user_and_movie_returns_empty_object_when_absent() {
    let app = build_test_app();
    let server = server_with_matrix(&app);
    let alice = Identity::new("alice");

    let response = server
        .get("/api/review/get-review-by-user-and-movie/603")
        .add_header("x-user-id", alice.id.to_string())
        .add_header("x-user-name", alice.name)
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body, json!({}));
}

#[tokio::test]
async fn listing_reviews_for_an_uncached_movie_is_a_404() {
    let app = build_test_app();
    let server = TestServer::new(app.router.clone()).unwrap();

    server
        .get("/api/review/get-reviews-by-movie/42")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
