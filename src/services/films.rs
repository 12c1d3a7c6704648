use std::collections::HashSet;
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::Film,
    storage::{FilmStorage, ReferenceData, UserStorage},
};

/// Film catalogue facade: runs domain and reference validation before any
/// write reaches the storage backend, and checks edge endpoints before
/// like mutations.
pub struct FilmService {
    films: Arc<dyn FilmStorage>,
    users: Arc<dyn UserStorage>,
    reference: Arc<dyn ReferenceData>,
}

impl FilmService {
    pub fn new(
        films: Arc<dyn FilmStorage>,
        users: Arc<dyn UserStorage>,
        reference: Arc<dyn ReferenceData>,
    ) -> Self {
        Self { films, users, reference }
    }

    pub async fn create(&self, film: Film) -> AppResult<Film> {
        film.validate()?;
        let film = self.resolve_references(film).await?;
        let stored = self.films.create(film).await?;
        tracing::info!(film_id = stored.id, name = %stored.name, "film created");
        Ok(stored)
    }

    pub async fn update(&self, film: Film) -> AppResult<Film> {
        film.validate()?;
        self.films.get(film.id).await?;
        let film = self.resolve_references(film).await?;
        let stored = self.films.update(film).await?;
        tracing::info!(film_id = stored.id, "film updated");
        Ok(stored)
    }

    pub async fn get(&self, id: i64) -> AppResult<Film> {
        self.films.get(id).await
    }

    pub async fn get_all(&self) -> AppResult<Vec<Film>> {
        self.films.get_all().await
    }

    pub async fn add_like(&self, film_id: i64, user_id: i64) -> AppResult<()> {
        self.films.get(film_id).await?;
        self.users.get(user_id).await?;
        self.films.add_like(film_id, user_id).await?;
        tracing::info!(film_id, user_id, "like added");
        Ok(())
    }

    /// Removing a like that was never recorded is a no-op; only the
    /// endpoints are required to exist.
    pub async fn remove_like(&self, film_id: i64, user_id: i64) -> AppResult<()> {
        self.films.get(film_id).await?;
        self.users.get(user_id).await?;
        self.films.remove_like(film_id, user_id).await?;
        tracing::info!(film_id, user_id, "like removed");
        Ok(())
    }

    pub async fn like_count(&self, film_id: i64) -> AppResult<u64> {
        self.films.get(film_id).await?;
        self.films.like_count(film_id).await
    }

    pub async fn most_popular(&self, limit: i64) -> AppResult<Vec<Film>> {
        if limit <= 0 {
            return Err(AppError::Validation(format!(
                "popular film count must be positive, got {}",
                limit
            )));
        }
        self.films.most_popular(limit as usize).await
    }

    /// Checks every cross-referenced id against the reference collaborator
    /// before anything is written, and replaces the incoming stubs with
    /// resolved reference entities. Genre duplicates collapse to the first
    /// occurrence.
    async fn resolve_references(&self, mut film: Film) -> AppResult<Film> {
        if !self.reference.rating_exists(film.mpa.id).await? {
            return Err(AppError::Validation(format!(
                "MPA rating with id {} does not exist",
                film.mpa.id
            )));
        }
        film.mpa = self.reference.get_rating(film.mpa.id).await?;

        let mut seen = HashSet::new();
        let mut genres = Vec::new();
        for genre in film.genres {
            if !self.reference.genre_exists(genre.id).await? {
                return Err(AppError::Validation(format!(
                    "genre with id {} does not exist",
                    genre.id
                )));
            }
            if seen.insert(genre.id) {
                genres.push(self.reference.get_genre(genre.id).await?);
            }
        }
        film.genres = genres;
        Ok(film)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Genre, MpaRating, User};
    use crate::storage::{MockFilmStorage, MockReferenceData, MockUserStorage};
    use chrono::NaiveDate;
    use mockall::predicate::eq;

    fn film_with(mpa_id: i32, genre_ids: &[i32]) -> Film {
        Film {
            id: 0,
            name: "Seven Samurai".to_string(),
            description: String::new(),
            release_date: NaiveDate::from_ymd_opt(1954, 4, 26).unwrap(),
            duration: 207,
            mpa: MpaRating { id: mpa_id, name: String::new() },
            genres: genre_ids
                .iter()
                .map(|id| Genre { id: *id, name: String::new() })
                .collect(),
        }
    }

    fn stored_user(id: i64) -> User {
        User {
            id,
            email: "a@b.c".to_string(),
            login: "a".to_string(),
            name: "a".to_string(),
            birthday: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
        }
    }

    fn service(
        films: MockFilmStorage,
        users: MockUserStorage,
        reference: MockReferenceData,
    ) -> FilmService {
        FilmService::new(Arc::new(films), Arc::new(users), Arc::new(reference))
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_rating_before_write() {
        let mut reference = MockReferenceData::new();
        reference
            .expect_rating_exists()
            .with(eq(9))
            .returning(|_| Ok(false));

        let mut films = MockFilmStorage::new();
        films.expect_create().never();

        let svc = service(films, MockUserStorage::new(), reference);
        let err = svc.create(film_with(9, &[])).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("MPA rating with id 9")));
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_genre_before_write() {
        let mut reference = MockReferenceData::new();
        reference.expect_rating_exists().returning(|_| Ok(true));
        reference
            .expect_get_rating()
            .returning(|id| Ok(MpaRating { id, name: "G".to_string() }));
        reference
            .expect_genre_exists()
            .with(eq(42))
            .returning(|_| Ok(false));

        let mut films = MockFilmStorage::new();
        films.expect_create().never();

        let svc = service(films, MockUserStorage::new(), reference);
        let err = svc.create(film_with(1, &[42])).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("genre with id 42")));
    }

    #[tokio::test]
    async fn test_create_dedupes_genres_and_resolves_names() {
        let mut reference = MockReferenceData::new();
        reference.expect_rating_exists().returning(|_| Ok(true));
        reference
            .expect_get_rating()
            .returning(|id| Ok(MpaRating { id, name: "G".to_string() }));
        reference.expect_genre_exists().returning(|_| Ok(true));
        reference
            .expect_get_genre()
            .returning(|id| Ok(Genre { id, name: format!("genre-{}", id) }));

        let mut films = MockFilmStorage::new();
        films.expect_create().returning(|mut film| {
            film.id = 1;
            Ok(film)
        });

        let svc = service(films, MockUserStorage::new(), reference);
        let stored = svc.create(film_with(1, &[2, 2, 4])).await.unwrap();

        let genre_ids: Vec<i32> = stored.genres.iter().map(|g| g.id).collect();
        assert_eq!(genre_ids, vec![2, 4]);
        assert_eq!(stored.genres[0].name, "genre-2");
        assert_eq!(stored.mpa.name, "G");
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_domain_fields() {
        let svc = service(
            MockFilmStorage::new(),
            MockUserStorage::new(),
            MockReferenceData::new(),
        );
        let mut film = film_with(1, &[]);
        film.duration = -1;
        assert!(matches!(svc.create(film).await, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_missing_film_is_not_found() {
        let mut films = MockFilmStorage::new();
        films
            .expect_get()
            .with(eq(7))
            .returning(|id| Err(AppError::NotFound(format!("film with id {} not found", id))));
        films.expect_update().never();

        let svc = service(films, MockUserStorage::new(), MockReferenceData::new());
        let mut film = film_with(1, &[]);
        film.id = 7;
        assert!(matches!(svc.update(film).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_add_like_requires_both_endpoints() {
        let mut films = MockFilmStorage::new();
        films
            .expect_get()
            .with(eq(1))
            .returning(|_| Ok(film_with(1, &[])));
        films.expect_add_like().never();

        let mut users = MockUserStorage::new();
        users
            .expect_get()
            .with(eq(99))
            .returning(|id| Err(AppError::NotFound(format!("user with id {} not found", id))));

        let svc = service(films, users, MockReferenceData::new());
        assert!(matches!(svc.add_like(1, 99).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_add_like_writes_edge_after_checks() {
        let mut films = MockFilmStorage::new();
        films.expect_get().returning(|_| Ok(film_with(1, &[])));
        films
            .expect_add_like()
            .with(eq(1), eq(2))
            .times(1)
            .returning(|_, _| Ok(()));

        let mut users = MockUserStorage::new();
        users.expect_get().returning(|id| Ok(stored_user(id)));

        let svc = service(films, users, MockReferenceData::new());
        svc.add_like(1, 2).await.unwrap();
    }

    #[tokio::test]
    async fn test_most_popular_rejects_nonpositive_limit() {
        let mut films = MockFilmStorage::new();
        films.expect_most_popular().never();

        let svc = service(films, MockUserStorage::new(), MockReferenceData::new());
        assert!(matches!(svc.most_popular(0).await, Err(AppError::Validation(_))));
        assert!(matches!(svc.most_popular(-3).await, Err(AppError::Validation(_))));
    }
}
