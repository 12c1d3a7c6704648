use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::{error::AppResult, models::User};

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub login: String,
    #[serde(default)]
    pub name: String,
    pub birthday: NaiveDate,
}

impl CreateUserRequest {
    fn into_user(self, id: i64) -> User {
        User {
            id,
            email: self.email,
            login: self.login,
            name: self.name,
            birthday: self.birthday,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub id: i64,
    #[serde(flatten)]
    pub fields: CreateUserRequest,
}

/// Create a new user
pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<User>)> {
    let user = state.users.create(request.into_user(0)).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Update an existing user (full replacement)
pub async fn update_user(
    State(state): State<AppState>,
    Json(request): Json<UpdateUserRequest>,
) -> AppResult<Json<User>> {
    let id = request.id;
    let user = state.users.update(request.fields.into_user(id)).await?;
    Ok(Json(user))
}

/// Get all users
pub async fn get_users(State(state): State<AppState>) -> AppResult<Json<Vec<User>>> {
    Ok(Json(state.users.get_all().await?))
}

/// Get a user by id
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<User>> {
    Ok(Json(state.users.get(id).await?))
}

/// Add a directed friend edge
pub async fn add_friend(
    State(state): State<AppState>,
    Path((user_id, friend_id)): Path<(i64, i64)>,
) -> AppResult<StatusCode> {
    state.users.add_friend(user_id, friend_id).await?;
    Ok(StatusCode::OK)
}

/// Remove a directed friend edge
pub async fn remove_friend(
    State(state): State<AppState>,
    Path((user_id, friend_id)): Path<(i64, i64)>,
) -> AppResult<StatusCode> {
    state.users.remove_friend(user_id, friend_id).await?;
    Ok(StatusCode::OK)
}

/// List a user's friends
pub async fn get_friends(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<User>>> {
    Ok(Json(state.users.get_friends(id).await?))
}

/// Friends two users have in common
pub async fn common_friends(
    State(state): State<AppState>,
    Path((user_id, other_id)): Path<(i64, i64)>,
) -> AppResult<Json<Vec<User>>> {
    Ok(Json(state.users.common_friends(user_id, other_id).await?))
}
