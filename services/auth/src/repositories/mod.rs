//! Credential store backends

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{NewUser, User};

pub mod memory;
pub mod user;

pub use memory::InMemoryUserStore;
pub use user::UserRepository;

/// Errors raised while writing users
#[derive(Debug, Error)]
pub enum UserStoreError {
    /// A user with this email already exists
    #[error("Email already registered")]
    Duplicate,

    /// The backend failed
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// Durable user record storage keyed by email
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user, failing with [`UserStoreError::Duplicate`] if the email is taken
    async fn create(&self, new_user: &NewUser) -> Result<User, UserStoreError>;

    /// Find a user by email
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;

    /// Flip the active flag, returning false when the user does not exist
    async fn set_active(&self, email: &str, is_active: bool) -> anyhow::Result<bool>;
}
