use axum::{
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};

use super::{films, reference, users, AppState};

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        // Films and the like-graph
        .route("/films", post(films::create_film))
        .route("/films", put(films::update_film))
        .route("/films", get(films::get_films))
        .route("/films/popular", get(films::most_popular))
        .route("/films/:id", get(films::get_film))
        .route(
            "/films/:id/like/:user_id",
            put(films::add_like).delete(films::remove_like),
        )
        .route("/films/:id/likes", get(films::like_count))
        // Users and the friend-graph
        .route("/users", post(users::create_user))
        .route("/users", put(users::update_user))
        .route("/users", get(users::get_users))
        .route("/users/:id", get(users::get_user))
        .route("/users/:id/friends", get(users::get_friends))
        .route(
            "/users/:id/friends/:friend_id",
            put(users::add_friend).delete(users::remove_friend),
        )
        .route(
            "/users/:id/friends/common/:other_id",
            get(users::common_friends),
        )
        // Read-only reference data
        .route("/genres", get(reference::get_genres))
        .route("/genres/:id", get(reference::get_genre))
        .route("/mpa", get(reference::get_mpa_ratings))
        .route("/mpa/:id", get(reference::get_mpa_rating))
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
