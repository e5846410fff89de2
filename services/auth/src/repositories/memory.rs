//! Process-lifetime user store
//!
//! Used by tests and by local runs without `DATABASE_URL`. Users vanish on
//! restart.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{UserStore, UserStoreError};
use crate::models::{NewUser, User};

#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<String, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn create(&self, new_user: &NewUser) -> Result<User, UserStoreError> {
        let mut users = self.users.write().await;
        if users.contains_key(&new_user.email) {
            return Err(UserStoreError::Duplicate);
        }

        let user = User {
            email: new_user.email.clone(),
            password_hash: new_user.password_hash.clone(),
            full_name: new_user.full_name.clone(),
            is_active: true,
            created_at: Utc::now(),
        };
        users.insert(user.email.clone(), user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self.users.read().await.get(email).cloned())
    }

    async fn set_active(&self, email: &str, is_active: bool) -> Result<bool> {
        match self.users.write().await.get_mut(email) {
            Some(user) => {
                user.is_active = is_active;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
