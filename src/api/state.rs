use std::sync::Arc;

use sqlx::PgPool;

use crate::{
    services::{FilmService, UserService},
    storage::{
        memory::{MemoryFilmStorage, MemoryUserStorage, SeededReferenceData},
        postgres::{PgFilmStorage, PgReferenceData, PgUserStorage},
        ReferenceData,
    },
};

/// Shared application state: the catalogue facade plus the read-only
/// reference collaborator. The storage backend is fixed here, at
/// composition time.
#[derive(Clone)]
pub struct AppState {
    pub films: Arc<FilmService>,
    pub users: Arc<UserService>,
    pub reference: Arc<dyn ReferenceData>,
}

impl AppState {
    /// Composes the ephemeral in-memory backend with seeded reference
    /// sets. Used by default and by the integration tests.
    pub fn in_memory() -> Self {
        let films = Arc::new(MemoryFilmStorage::new());
        let users = Arc::new(MemoryUserStorage::new());
        let reference: Arc<dyn ReferenceData> = Arc::new(SeededReferenceData);

        Self {
            films: Arc::new(FilmService::new(films, users.clone(), reference.clone())),
            users: Arc::new(UserService::new(users)),
            reference,
        }
    }

    /// Composes the PostgreSQL backend over an already-migrated pool.
    pub fn postgres(pool: PgPool) -> Self {
        let films = Arc::new(PgFilmStorage::new(pool.clone()));
        let users = Arc::new(PgUserStorage::new(pool.clone()));
        let reference: Arc<dyn ReferenceData> = Arc::new(PgReferenceData::new(pool));

        Self {
            films: Arc::new(FilmService::new(films, users.clone(), reference.clone())),
            users: Arc::new(UserService::new(users)),
            reference,
        }
    }
}
