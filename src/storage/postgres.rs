use chrono::NaiveDate;
use sqlx::PgPool;

use crate::{
    error::{AppError, AppResult},
    models::{Film, Genre, MpaRating, User},
    storage::{FilmStorage, ReferenceData, UserStorage},
};

const SELECT_FILM: &str = "SELECT f.film_id, f.name, f.description, f.release_date, f.duration, \
                           m.mpa_id, m.name AS mpa_name \
                           FROM films f JOIN mpa_ratings m ON m.mpa_id = f.mpa_id";

#[derive(sqlx::FromRow)]
struct FilmRow {
    film_id: i64,
    name: String,
    description: String,
    release_date: NaiveDate,
    duration: i32,
    mpa_id: i32,
    mpa_name: String,
}

impl FilmRow {
    fn into_film(self, genres: Vec<Genre>) -> Film {
        Film {
            id: self.film_id,
            name: self.name,
            description: self.description,
            release_date: self.release_date,
            duration: self.duration,
            mpa: MpaRating { id: self.mpa_id, name: self.mpa_name },
            genres,
        }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: i64,
    email: String,
    login: String,
    name: String,
    birthday: NaiveDate,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.user_id,
            email: row.email,
            login: row.login,
            name: row.name,
            birthday: row.birthday,
        }
    }
}

/// Film storage backed by PostgreSQL. Identifier assignment is delegated
/// to the `films` sequence; the genre set replacement on update runs in a
/// transaction so no half-replaced state is observable.
pub struct PgFilmStorage {
    pool: PgPool,
}

impl PgFilmStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn genres_of(&self, film_id: i64) -> AppResult<Vec<Genre>> {
        let rows: Vec<(i32, String)> = sqlx::query_as(
            "SELECT g.genre_id, g.name \
             FROM genres g JOIN film_genres fg ON fg.genre_id = g.genre_id \
             WHERE fg.film_id = $1 ORDER BY g.genre_id",
        )
        .bind(film_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|(id, name)| Genre { id, name }).collect())
    }
}

#[async_trait::async_trait]
impl FilmStorage for PgFilmStorage {
    async fn create(&self, mut film: Film) -> AppResult<Film> {
        let mut tx = self.pool.begin().await?;

        let (film_id,): (i64,) = sqlx::query_as(
            "INSERT INTO films (name, description, release_date, duration, mpa_id) \
             VALUES ($1, $2, $3, $4, $5) RETURNING film_id",
        )
        .bind(&film.name)
        .bind(&film.description)
        .bind(film.release_date)
        .bind(film.duration)
        .bind(film.mpa.id)
        .fetch_one(&mut *tx)
        .await?;

        for genre in &film.genres {
            sqlx::query("INSERT INTO film_genres (film_id, genre_id) VALUES ($1, $2)")
                .bind(film_id)
                .bind(genre.id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        film.id = film_id;
        Ok(film)
    }

    async fn update(&self, film: Film) -> AppResult<Film> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            "UPDATE films SET name = $1, description = $2, release_date = $3, \
             duration = $4, mpa_id = $5 WHERE film_id = $6",
        )
        .bind(&film.name)
        .bind(&film.description)
        .bind(film.release_date)
        .bind(film.duration)
        .bind(film.mpa.id)
        .bind(film.id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if updated == 0 {
            return Err(AppError::NotFound(format!("film with id {} not found", film.id)));
        }

        sqlx::query("DELETE FROM film_genres WHERE film_id = $1")
            .bind(film.id)
            .execute(&mut *tx)
            .await?;

        for genre in &film.genres {
            sqlx::query("INSERT INTO film_genres (film_id, genre_id) VALUES ($1, $2)")
                .bind(film.id)
                .bind(genre.id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(film)
    }

    async fn get(&self, id: i64) -> AppResult<Film> {
        let row: Option<FilmRow> =
            sqlx::query_as(&format!("{SELECT_FILM} WHERE f.film_id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        match row {
            Some(row) => {
                let genres = self.genres_of(row.film_id).await?;
                Ok(row.into_film(genres))
            }
            None => Err(AppError::NotFound(format!("film with id {} not found", id))),
        }
    }

    async fn get_all(&self) -> AppResult<Vec<Film>> {
        let rows: Vec<FilmRow> = sqlx::query_as(SELECT_FILM).fetch_all(&self.pool).await?;

        let mut films = Vec::with_capacity(rows.len());
        for row in rows {
            let genres = self.genres_of(row.film_id).await?;
            films.push(row.into_film(genres));
        }
        Ok(films)
    }

    async fn add_like(&self, film_id: i64, user_id: i64) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO film_likes (film_id, user_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(film_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn remove_like(&self, film_id: i64, user_id: i64) -> AppResult<()> {
        sqlx::query("DELETE FROM film_likes WHERE film_id = $1 AND user_id = $2")
            .bind(film_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn like_count(&self, film_id: i64) -> AppResult<u64> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM film_likes WHERE film_id = $1")
                .bind(film_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count as u64)
    }

    async fn most_popular(&self, limit: usize) -> AppResult<Vec<Film>> {
        let rows: Vec<FilmRow> = sqlx::query_as(
            "SELECT f.film_id, f.name, f.description, f.release_date, f.duration, \
             m.mpa_id, m.name AS mpa_name \
             FROM films f \
             JOIN mpa_ratings m ON m.mpa_id = f.mpa_id \
             LEFT JOIN film_likes fl ON fl.film_id = f.film_id \
             GROUP BY f.film_id, m.mpa_id \
             ORDER BY COUNT(fl.user_id) DESC, f.film_id ASC \
             LIMIT $1",
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        let mut films = Vec::with_capacity(rows.len());
        for row in rows {
            let genres = self.genres_of(row.film_id).await?;
            films.push(row.into_film(genres));
        }
        Ok(films)
    }
}

/// User storage backed by PostgreSQL, friendships as directed rows.
pub struct PgUserStorage {
    pool: PgPool,
}

impl PgUserStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl UserStorage for PgUserStorage {
    async fn create(&self, mut user: User) -> AppResult<User> {
        let (user_id,): (i64,) = sqlx::query_as(
            "INSERT INTO users (email, login, name, birthday) \
             VALUES ($1, $2, $3, $4) RETURNING user_id",
        )
        .bind(&user.email)
        .bind(&user.login)
        .bind(&user.name)
        .bind(user.birthday)
        .fetch_one(&self.pool)
        .await?;

        user.id = user_id;
        Ok(user)
    }

    async fn update(&self, user: User) -> AppResult<User> {
        let updated = sqlx::query(
            "UPDATE users SET email = $1, login = $2, name = $3, birthday = $4 \
             WHERE user_id = $5",
        )
        .bind(&user.email)
        .bind(&user.login)
        .bind(&user.name)
        .bind(user.birthday)
        .bind(user.id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if updated == 0 {
            return Err(AppError::NotFound(format!("user with id {} not found", user.id)));
        }
        Ok(user)
    }

    async fn get(&self, id: i64) -> AppResult<User> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT user_id, email, login, name, birthday FROM users WHERE user_id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::from)
            .ok_or_else(|| AppError::NotFound(format!("user with id {} not found", id)))
    }

    async fn get_all(&self) -> AppResult<Vec<User>> {
        let rows: Vec<UserRow> =
            sqlx::query_as("SELECT user_id, email, login, name, birthday FROM users")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn add_friend(&self, user_id: i64, friend_id: i64) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO friendships (user_id, friend_id, confirmed) \
             VALUES ($1, $2, FALSE) ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(friend_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn remove_friend(&self, user_id: i64, friend_id: i64) -> AppResult<()> {
        sqlx::query("DELETE FROM friendships WHERE user_id = $1 AND friend_id = $2")
            .bind(user_id)
            .bind(friend_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_friends(&self, user_id: i64) -> AppResult<Vec<User>> {
        let rows: Vec<UserRow> = sqlx::query_as(
            "SELECT u.user_id, u.email, u.login, u.name, u.birthday \
             FROM users u JOIN friendships f ON u.user_id = f.friend_id \
             WHERE f.user_id = $1 \
             UNION \
             SELECT u.user_id, u.email, u.login, u.name, u.birthday \
             FROM users u JOIN friendships f ON u.user_id = f.user_id \
             WHERE f.friend_id = $1 AND f.confirmed = TRUE \
             ORDER BY user_id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(User::from).collect())
    }
}

/// Reference data resolved from the seeded `genres` and `mpa_ratings`
/// tables.
pub struct PgReferenceData {
    pool: PgPool,
}

impl PgReferenceData {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ReferenceData for PgReferenceData {
    async fn genre_exists(&self, id: i32) -> AppResult<bool> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM genres WHERE genre_id = $1")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count > 0)
    }

    async fn rating_exists(&self, id: i32) -> AppResult<bool> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM mpa_ratings WHERE mpa_id = $1")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count > 0)
    }

    async fn get_genre(&self, id: i32) -> AppResult<Genre> {
        let row: Option<(i32, String)> =
            sqlx::query_as("SELECT genre_id, name FROM genres WHERE genre_id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(|(id, name)| Genre { id, name })
            .ok_or_else(|| AppError::NotFound(format!("genre with id {} not found", id)))
    }

    async fn get_rating(&self, id: i32) -> AppResult<MpaRating> {
        let row: Option<(i32, String)> =
            sqlx::query_as("SELECT mpa_id, name FROM mpa_ratings WHERE mpa_id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(|(id, name)| MpaRating { id, name })
            .ok_or_else(|| AppError::NotFound(format!("MPA rating with id {} not found", id)))
    }

    async fn all_genres(&self) -> AppResult<Vec<Genre>> {
        let rows: Vec<(i32, String)> =
            sqlx::query_as("SELECT genre_id, name FROM genres ORDER BY genre_id")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(|(id, name)| Genre { id, name }).collect())
    }

    async fn all_ratings(&self) -> AppResult<Vec<MpaRating>> {
        let rows: Vec<(i32, String)> =
            sqlx::query_as("SELECT mpa_id, name FROM mpa_ratings ORDER BY mpa_id")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(|(id, name)| MpaRating { id, name }).collect())
    }
}
