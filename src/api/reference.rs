use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    error::AppResult,
    models::{Genre, MpaRating},
};

use super::AppState;

/// List all genres
pub async fn get_genres(State(state): State<AppState>) -> AppResult<Json<Vec<Genre>>> {
    Ok(Json(state.reference.all_genres().await?))
}

/// Get a genre by id
pub async fn get_genre(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Genre>> {
    Ok(Json(state.reference.get_genre(id).await?))
}

/// List all MPA ratings
pub async fn get_mpa_ratings(State(state): State<AppState>) -> AppResult<Json<Vec<MpaRating>>> {
    Ok(Json(state.reference.all_ratings().await?))
}

/// Get an MPA rating by id
pub async fn get_mpa_rating(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<MpaRating>> {
    Ok(Json(state.reference.get_rating(id).await?))
}
