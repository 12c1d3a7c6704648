use std::collections::HashSet;
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::User,
    storage::UserStorage,
};

/// User catalogue facade: domain validation, the display-name default, and
/// endpoint checks before friend-edge mutations.
pub struct UserService {
    users: Arc<dyn UserStorage>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserStorage>) -> Self {
        Self { users }
    }

    pub async fn create(&self, user: User) -> AppResult<User> {
        user.validate()?;
        let stored = self.users.create(user.normalize()).await?;
        tracing::info!(user_id = stored.id, login = %stored.login, "user created");
        Ok(stored)
    }

    pub async fn update(&self, user: User) -> AppResult<User> {
        user.validate()?;
        self.users.get(user.id).await?;
        let stored = self.users.update(user.normalize()).await?;
        tracing::info!(user_id = stored.id, "user updated");
        Ok(stored)
    }

    pub async fn get(&self, id: i64) -> AppResult<User> {
        self.users.get(id).await
    }

    pub async fn get_all(&self) -> AppResult<Vec<User>> {
        self.users.get_all().await
    }

    pub async fn add_friend(&self, user_id: i64, friend_id: i64) -> AppResult<()> {
        self.users.get(user_id).await?;
        self.users.get(friend_id).await?;
        self.users.add_friend(user_id, friend_id).await?;
        tracing::info!(user_id, friend_id, "friend added");
        Ok(())
    }

    /// Removing an edge that was never added is a no-op; only the
    /// endpoints are required to exist.
    pub async fn remove_friend(&self, user_id: i64, friend_id: i64) -> AppResult<()> {
        self.users.get(user_id).await?;
        self.users.get(friend_id).await?;
        self.users.remove_friend(user_id, friend_id).await?;
        tracing::info!(user_id, friend_id, "friend removed");
        Ok(())
    }

    pub async fn get_friends(&self, user_id: i64) -> AppResult<Vec<User>> {
        self.users.get(user_id).await?;
        self.users.get_friends(user_id).await
    }

    /// Intersection of the two friend lists, materialized as users and
    /// ordered by id. An id present in the friend graph but missing from
    /// the user store is dropped with a warning rather than failing the
    /// read.
    pub async fn common_friends(&self, user_id: i64, other_id: i64) -> AppResult<Vec<User>> {
        self.users.get(user_id).await?;
        self.users.get(other_id).await?;

        let friends = self.users.get_friends(user_id).await?;
        let other_friend_ids: HashSet<i64> = self
            .users
            .get_friends(other_id)
            .await?
            .into_iter()
            .map(|user| user.id)
            .collect();

        let mut common_ids: Vec<i64> = friends
            .into_iter()
            .map(|user| user.id)
            .filter(|id| other_friend_ids.contains(id))
            .collect();
        common_ids.sort_unstable();

        let mut common = Vec::with_capacity(common_ids.len());
        for id in common_ids {
            match self.users.get(id).await {
                Ok(user) => common.push(user),
                Err(AppError::NotFound(_)) => {
                    tracing::warn!(user_id = id, "common friend id no longer resolves, dropping")
                }
                Err(e) => return Err(e),
            }
        }
        Ok(common)
    }
}
