//! # User Repository
//!
//! Data access for operator accounts.
//!
//! Usernames arrive already normalized (trimmed, lowercase) from the service
//! layer; lookups here are exact matches against that canonical form.

use billar_core::User;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};

/// Repository for operator account operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new user repository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Inserts a new operator account.
    ///
    /// ## Errors
    /// * `DbError::UniqueViolation` - The username is taken
    pub async fn insert(&self, user: &User) -> DbResult<()> {
        sqlx::query(
            "INSERT INTO users (id, username, password_hash, password_salt, iterations,
                                is_admin, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.password_salt)
        .bind(user.iterations)
        .bind(user.is_admin)
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;

        info!(username = %user.username, is_admin = user.is_admin, "User created");
        Ok(())
    }

    /// Finds an account by username.
    pub async fn find_by_username(&self, username: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, password_salt, iterations, is_admin, created_at
             FROM users
             WHERE username = ?1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Finds an account by id.
    pub async fn find_by_id(&self, id: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, password_salt, iterations, is_admin, created_at
             FROM users
             WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Lists all accounts ordered by username.
    pub async fn list(&self) -> DbResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, password_salt, iterations, is_admin, created_at
             FROM users
             ORDER BY username",
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = users.len(), "Listed users");
        Ok(users)
    }

    /// Deletes an account by username.
    ///
    /// ## Errors
    /// * `DbError::NotFound` - No account with that username
    pub async fn delete(&self, username: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE username = ?1")
            .bind(username)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", username));
        }

        info!(username = %username, "User deleted");
        Ok(())
    }

    /// Counts all accounts.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Generates a new unique user id.
    pub fn generate_user_id() -> String {
        Uuid::new_v4().to_string()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
