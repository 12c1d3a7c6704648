//! Storage backend abstraction
//!
//! The pluggable persistence seam: an ephemeral in-memory backend and a
//! PostgreSQL backend implement the same traits and must produce
//! behaviorally identical results. The backend is chosen once, at
//! composition time.

use crate::{
    error::AppResult,
    models::{Film, Genre, MpaRating, User},
};

pub mod memory;
pub mod postgres;

#[cfg(test)]
use mockall::automock;

/// Film persistence plus the like-graph hanging off films.
///
/// `create` assigns a fresh identifier and returns the stored form;
/// identifiers are monotonic from 1 and never reassigned. `update` is a
/// full field replacement, including the genre set.
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait FilmStorage: Send + Sync {
    async fn create(&self, film: Film) -> AppResult<Film>;

    /// Fails with `NotFound` when the film id is absent.
    async fn update(&self, film: Film) -> AppResult<Film>;

    async fn get(&self, id: i64) -> AppResult<Film>;

    /// Snapshot of all films; ordering is backend-defined.
    async fn get_all(&self) -> AppResult<Vec<Film>>;

    /// Records a like edge. Re-adding an existing like is a no-op.
    /// Endpoint existence is checked by the service layer.
    async fn add_like(&self, film_id: i64, user_id: i64) -> AppResult<()>;

    /// Removes a like edge; removing an absent edge is a no-op.
    async fn remove_like(&self, film_id: i64, user_id: i64) -> AppResult<()>;

    /// Count of distinct users currently liking the film, derived from
    /// the edge set.
    async fn like_count(&self, film_id: i64) -> AppResult<u64>;

    /// All films ordered by like count descending, ties broken by
    /// ascending film id, truncated to `limit`.
    async fn most_popular(&self, limit: usize) -> AppResult<Vec<Film>>;
}

/// User persistence plus the directed friend-graph.
///
/// Friendships are directed edges carrying a confirmation flag: a friend
/// list is everyone the user points to, plus everyone pointing at the
/// user with the flag set. The reverse edge is never auto-created.
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait UserStorage: Send + Sync {
    async fn create(&self, user: User) -> AppResult<User>;

    /// Fails with `NotFound` when the user id is absent.
    async fn update(&self, user: User) -> AppResult<User>;

    async fn get(&self, id: i64) -> AppResult<User>;

    async fn get_all(&self) -> AppResult<Vec<User>>;

    /// Inserts the directed edge user -> friend, unconfirmed.
    /// Re-adding an existing edge is a no-op.
    async fn add_friend(&self, user_id: i64, friend_id: i64) -> AppResult<()>;

    /// Removes only the user -> friend direction; absent edge is a no-op.
    async fn remove_friend(&self, user_id: i64, friend_id: i64) -> AppResult<()>;

    async fn get_friends(&self, user_id: i64) -> AppResult<Vec<User>>;
}

/// Read-only reference data: genres and MPA ratings are closed sets owned
/// by a seed collaborator, never mutated through the catalogue.
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait ReferenceData: Send + Sync {
    async fn genre_exists(&self, id: i32) -> AppResult<bool>;

    async fn rating_exists(&self, id: i32) -> AppResult<bool>;

    /// Fails with `NotFound` when the genre id is absent.
    async fn get_genre(&self, id: i32) -> AppResult<Genre>;

    /// Fails with `NotFound` when the rating id is absent.
    async fn get_rating(&self, id: i32) -> AppResult<MpaRating>;

    async fn all_genres(&self) -> AppResult<Vec<Genre>>;

    async fn all_ratings(&self) -> AppResult<Vec<MpaRating>>;
}
