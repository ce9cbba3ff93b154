//! User management service

use std::sync::Arc;

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{user::UserPayload, User},
    repository::UserStore,
};

#[derive(Clone)]
pub struct UsersService {
    store: Arc<dyn UserStore>,
}

impl UsersService {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> AppResult<Vec<User>> {
        self.store.list().await
    }

    pub async fn create(&self, data: UserPayload) -> AppResult<User> {
        data.validate()?;
        let user = self.store.create(&User::from(data)).await?;
        tracing::info!(user_id = %user.id, "user created");
        Ok(user)
    }

    pub async fn update(&self, data: UserPayload) -> AppResult<User> {
        data.validate()?;
        let user = self.store.update(&User::from(data)).await?;
        tracing::info!(user_id = %user.id, "user updated");
        Ok(user)
    }

    pub async fn delete(&self, ids: &[String]) -> AppResult<u64> {
        if ids.is_empty() {
            return Err(AppError::Validation("No user ids provided".to_string()));
        }
        let deleted = self.store.delete_many(ids).await?;
        tracing::info!(requested = ids.len(), deleted, "users deleted");
        Ok(deleted)
    }
}
