use std::collections::{BTreeSet, HashMap, HashSet};

use tokio::sync::RwLock;

use crate::{
    error::{AppError, AppResult},
    models::{Film, Genre, MpaRating, User},
    storage::{FilmStorage, ReferenceData, UserStorage},
};

/// Ephemeral film storage backed by in-process maps.
///
/// The id counter lives inside the same lock as the maps it feeds, so an
/// increment is always serialized with the insert it pairs with.
pub struct MemoryFilmStorage {
    inner: RwLock<FilmStore>,
}

struct FilmStore {
    films: HashMap<i64, Film>,
    likes: HashMap<i64, HashSet<i64>>,
    next_id: i64,
}

impl MemoryFilmStorage {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(FilmStore {
                films: HashMap::new(),
                likes: HashMap::new(),
                next_id: 1,
            }),
        }
    }
}

impl Default for MemoryFilmStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl FilmStorage for MemoryFilmStorage {
    async fn create(&self, mut film: Film) -> AppResult<Film> {
        let mut store = self.inner.write().await;
        film.id = store.next_id;
        store.next_id += 1;
        store.films.insert(film.id, film.clone());
        store.likes.insert(film.id, HashSet::new());
        Ok(film)
    }

    async fn update(&self, film: Film) -> AppResult<Film> {
        let mut store = self.inner.write().await;
        if !store.films.contains_key(&film.id) {
            return Err(AppError::NotFound(format!("film with id {} not found", film.id)));
        }
        store.films.insert(film.id, film.clone());
        Ok(film)
    }

    async fn get(&self, id: i64) -> AppResult<Film> {
        let store = self.inner.read().await;
        store
            .films
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("film with id {} not found", id)))
    }

    async fn get_all(&self) -> AppResult<Vec<Film>> {
        let store = self.inner.read().await;
        Ok(store.films.values().cloned().collect())
    }

    async fn add_like(&self, film_id: i64, user_id: i64) -> AppResult<()> {
        let mut store = self.inner.write().await;
        store.likes.entry(film_id).or_default().insert(user_id);
        Ok(())
    }

    async fn remove_like(&self, film_id: i64, user_id: i64) -> AppResult<()> {
        let mut store = self.inner.write().await;
        if let Some(likes) = store.likes.get_mut(&film_id) {
            likes.remove(&user_id);
        }
        Ok(())
    }

    async fn like_count(&self, film_id: i64) -> AppResult<u64> {
        let store = self.inner.read().await;
        Ok(store.likes.get(&film_id).map_or(0, |likes| likes.len() as u64))
    }

    async fn most_popular(&self, limit: usize) -> AppResult<Vec<Film>> {
        let store = self.inner.read().await;
        let mut ranked: Vec<&Film> = store.films.values().collect();
        ranked.sort_by(|a, b| {
            let likes_a = store.likes.get(&a.id).map_or(0, HashSet::len);
            let likes_b = store.likes.get(&b.id).map_or(0, HashSet::len);
            likes_b.cmp(&likes_a).then(a.id.cmp(&b.id))
        });
        Ok(ranked.into_iter().take(limit).cloned().collect())
    }
}

/// Ephemeral user storage with a directed friend-graph.
pub struct MemoryUserStorage {
    inner: RwLock<UserStore>,
}

struct UserStore {
    users: HashMap<i64, User>,
    /// user id -> (friend id -> confirmed)
    friends: HashMap<i64, HashMap<i64, bool>>,
    next_id: i64,
}

impl MemoryUserStorage {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(UserStore {
                users: HashMap::new(),
                friends: HashMap::new(),
                next_id: 1,
            }),
        }
    }
}

impl Default for MemoryUserStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl UserStorage for MemoryUserStorage {
    async fn create(&self, mut user: User) -> AppResult<User> {
        let mut store = self.inner.write().await;
        user.id = store.next_id;
        store.next_id += 1;
        store.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, user: User) -> AppResult<User> {
        let mut store = self.inner.write().await;
        if !store.users.contains_key(&user.id) {
            return Err(AppError::NotFound(format!("user with id {} not found", user.id)));
        }
        store.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get(&self, id: i64) -> AppResult<User> {
        let store = self.inner.read().await;
        store
            .users
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("user with id {} not found", id)))
    }

    async fn get_all(&self) -> AppResult<Vec<User>> {
        let store = self.inner.read().await;
        Ok(store.users.values().cloned().collect())
    }

    async fn add_friend(&self, user_id: i64, friend_id: i64) -> AppResult<()> {
        let mut store = self.inner.write().await;
        store
            .friends
            .entry(user_id)
            .or_default()
            .entry(friend_id)
            .or_insert(false);
        Ok(())
    }

    async fn remove_friend(&self, user_id: i64, friend_id: i64) -> AppResult<()> {
        let mut store = self.inner.write().await;
        if let Some(edges) = store.friends.get_mut(&user_id) {
            edges.remove(&friend_id);
        }
        Ok(())
    }

    async fn get_friends(&self, user_id: i64) -> AppResult<Vec<User>> {
        let store = self.inner.read().await;

        // Outgoing edges regardless of confirmation, plus incoming edges
        // that were confirmed. BTreeSet keeps the listing deterministic.
        let mut friend_ids: BTreeSet<i64> = store
            .friends
            .get(&user_id)
            .map(|edges| edges.keys().copied().collect())
            .unwrap_or_default();

        for (other, edges) in &store.friends {
            if edges.get(&user_id).copied().unwrap_or(false) {
                friend_ids.insert(*other);
            }
        }

        let mut friends = Vec::with_capacity(friend_ids.len());
        for id in friend_ids {
            match store.users.get(&id) {
                Some(user) => friends.push(user.clone()),
                None => {
                    tracing::warn!(user_id = id, "friend edge references a missing user, dropping")
                }
            }
        }
        Ok(friends)
    }
}

const GENRES: &[(i32, &str)] = &[
    (1, "Comedy"),
    (2, "Drama"),
    (3, "Cartoon"),
    (4, "Thriller"),
    (5, "Documentary"),
    (6, "Action"),
];

const MPA_RATINGS: &[(i32, &str)] =
    &[(1, "G"), (2, "PG"), (3, "PG-13"), (4, "R"), (5, "NC-17")];

/// Seeded, immutable reference sets for the in-memory backend. Mirrors
/// the rows the Postgres migration seeds.
pub struct SeededReferenceData;

#[async_trait::async_trait]
impl ReferenceData for SeededReferenceData {
    async fn genre_exists(&self, id: i32) -> AppResult<bool> {
        Ok(GENRES.iter().any(|(genre_id, _)| *genre_id == id))
    }

    async fn rating_exists(&self, id: i32) -> AppResult<bool> {
        Ok(MPA_RATINGS.iter().any(|(mpa_id, _)| *mpa_id == id))
    }

    async fn get_genre(&self, id: i32) -> AppResult<Genre> {
        GENRES
            .iter()
            .find(|(genre_id, _)| *genre_id == id)
            .map(|(id, name)| Genre { id: *id, name: name.to_string() })
            .ok_or_else(|| AppError::NotFound(format!("genre with id {} not found", id)))
    }

    async fn get_rating(&self, id: i32) -> AppResult<MpaRating> {
        MPA_RATINGS
            .iter()
            .find(|(mpa_id, _)| *mpa_id == id)
            .map(|(id, name)| MpaRating { id: *id, name: name.to_string() })
            .ok_or_else(|| AppError::NotFound(format!("MPA rating with id {} not found", id)))
    }

    async fn all_genres(&self) -> AppResult<Vec<Genre>> {
        Ok(GENRES
            .iter()
            .map(|(id, name)| Genre { id: *id, name: name.to_string() })
            .collect())
    }

    async fn all_ratings(&self) -> AppResult<Vec<MpaRating>> {
        Ok(MPA_RATINGS
            .iter()
            .map(|(id, name)| MpaRating { id: *id, name: name.to_string() })
            .collect())
    }
}
