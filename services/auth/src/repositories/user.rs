//! User repository for database operations

use anyhow::Result;
use async_trait::async_trait;
use common::error::DatabaseError;
use sqlx::PgPool;
use tracing::info;

use super::{UserStore, UserStoreError};
use crate::models::{NewUser, User};

/// Postgres error code for unique constraint violations
const UNIQUE_VIOLATION: &str = "23505";

/// User repository
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the users table if it does not exist
    pub async fn init_schema(&self) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                email TEXT PRIMARY KEY,
                password_hash TEXT NOT NULL,
                full_name TEXT NOT NULL,
                is_active BOOLEAN NOT NULL DEFAULT TRUE,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::Migration(e.to_string()))?;

        info!("Users table ready");
        Ok(())
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn create(&self, new_user: &NewUser) -> Result<User, UserStoreError> {
        info!("Creating new user: {}", new_user.email);

        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash, full_name, is_active)
            VALUES ($1, $2, $3, TRUE)
            RETURNING email, password_hash, full_name, is_active, created_at
            "#,
        )
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(&new_user.full_name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            let duplicate = matches!(
                &e,
                sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION)
            );
            if duplicate {
                UserStoreError::Duplicate
            } else {
                UserStoreError::Backend(DatabaseError::Query(e).into())
            }
        })
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT email, password_hash, full_name, is_active, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        Ok(user)
    }

    async fn set_active(&self, email: &str, is_active: bool) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET is_active = $2
            WHERE email = $1
            "#,
        )
        .bind(email)
        .bind(is_active)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        Ok(result.rows_affected() > 0)
    }
}
