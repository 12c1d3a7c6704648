use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::{
    error::AppResult,
    models::{Film, Genre, MpaRating},
};

use super::AppState;

/// Reference entities arrive from clients as bare ids; names are resolved
/// server-side against the reference collaborator.
#[derive(Debug, Deserialize)]
pub struct RefId {
    pub id: i32,
}

#[derive(Debug, Deserialize)]
pub struct CreateFilmRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub release_date: NaiveDate,
    pub duration: i32,
    pub mpa: RefId,
    #[serde(default)]
    pub genres: Vec<RefId>,
}

impl CreateFilmRequest {
    fn into_film(self, id: i64) -> Film {
        Film {
            id,
            name: self.name,
            description: self.description,
            release_date: self.release_date,
            duration: self.duration,
            mpa: MpaRating { id: self.mpa.id, name: String::new() },
            genres: self
                .genres
                .into_iter()
                .map(|genre| Genre { id: genre.id, name: String::new() })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateFilmRequest {
    pub id: i64,
    #[serde(flatten)]
    pub fields: CreateFilmRequest,
}

#[derive(Debug, Deserialize)]
pub struct PopularParams {
    #[serde(default = "default_popular_count")]
    pub count: i64,
}

fn default_popular_count() -> i64 {
    10
}

/// Create a new film
pub async fn create_film(
    State(state): State<AppState>,
    Json(request): Json<CreateFilmRequest>,
) -> AppResult<(StatusCode, Json<Film>)> {
    let film = state.films.create(request.into_film(0)).await?;
    Ok((StatusCode::CREATED, Json(film)))
}

/// Update an existing film (full replacement)
pub async fn update_film(
    State(state): State<AppState>,
    Json(request): Json<UpdateFilmRequest>,
) -> AppResult<Json<Film>> {
    let id = request.id;
    let film = state.films.update(request.fields.into_film(id)).await?;
    Ok(Json(film))
}

/// Get all films
pub async fn get_films(State(state): State<AppState>) -> AppResult<Json<Vec<Film>>> {
    Ok(Json(state.films.get_all().await?))
}

/// Get a film by id
pub async fn get_film(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Film>> {
    Ok(Json(state.films.get(id).await?))
}

/// Record that a user likes a film (idempotent)
pub async fn add_like(
    State(state): State<AppState>,
    Path((film_id, user_id)): Path<(i64, i64)>,
) -> AppResult<StatusCode> {
    state.films.add_like(film_id, user_id).await?;
    Ok(StatusCode::OK)
}

/// Remove a user's like from a film
pub async fn remove_like(
    State(state): State<AppState>,
    Path((film_id, user_id)): Path<(i64, i64)>,
) -> AppResult<StatusCode> {
    state.films.remove_like(film_id, user_id).await?;
    Ok(StatusCode::OK)
}

/// Number of distinct users currently liking a film
pub async fn like_count(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<u64>> {
    Ok(Json(state.films.like_count(id).await?))
}

/// Most liked films, descending, ties broken by ascending id
pub async fn most_popular(
    State(state): State<AppState>,
    Query(params): Query<PopularParams>,
) -> AppResult<Json<Vec<Film>>> {
    Ok(Json(state.films.most_popular(params.count).await?))
}
