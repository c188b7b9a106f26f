//! User repository for Agora.

use std::collections::HashMap;

use sqlx::{QueryBuilder, SqlitePool};

use super::user::{NewUser, User, UserRef, UserUpdate};
use crate::{AgoraError, Result};

const USER_COLUMNS: &str =
    "id, username, email, password, role, post_count, reputation, bio, created_at";

/// Repository for user records.
pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Create a new UserRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new user in the database.
    ///
    /// Returns the created user with the assigned ID.
    pub async fn create(&self, new_user: &NewUser) -> Result<User> {
        let result = sqlx::query(
            "INSERT INTO users (username, email, password, role) VALUES (?, ?, ?, ?)",
        )
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&new_user.password)
        .bind(new_user.role.as_str())
        .execute(self.pool)
        .await
        .map_err(|e| AgoraError::Database(e.to_string()))?;

        let id = result.last_insert_rowid();
        self.get_by_id(id)
            .await?
            .ok_or_else(|| AgoraError::NotFound("User".to_string()))
    }

    /// Get a user by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| AgoraError::Database(e.to_string()))?;

        Ok(user)
    }

    /// Get a user by email (case-insensitive).
    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ? COLLATE NOCASE"
        ))
        .bind(email)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| AgoraError::Database(e.to_string()))?;

        Ok(user)
    }

    /// Get a user by username (case-insensitive).
    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = ? COLLATE NOCASE"
        ))
        .bind(username)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| AgoraError::Database(e.to_string()))?;

        Ok(user)
    }

    /// Check whether the username or the email is already taken.
    pub async fn exists(&self, username: &str, email: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users
                           WHERE username = ? COLLATE NOCASE OR email = ? COLLATE NOCASE)",
        )
        .bind(username)
        .bind(email)
        .fetch_one(self.pool)
        .await
        .map_err(|e| AgoraError::Database(e.to_string()))?;

        Ok(exists)
    }

    /// Update a user by ID.
    ///
    /// Only fields that are set in the update will be modified.
    /// Returns the updated user, or None if not found.
    pub async fn update(&self, id: i64, update: &UserUpdate) -> Result<Option<User>> {
        if update.is_empty() {
            return self.get_by_id(id).await;
        }

        let mut query: QueryBuilder<sqlx::Sqlite> = QueryBuilder::new("UPDATE users SET ");
        let mut separated = query.separated(", ");

        if let Some(role) = update.role {
            separated.push("role = ");
            separated.push_bind_unseparated(role.as_str());
        }
        if let Some(ref bio) = update.bio {
            separated.push("bio = ");
            separated.push_bind_unseparated(bio.clone());
        }
        if let Some(reputation) = update.reputation {
            separated.push("reputation = ");
            separated.push_bind_unseparated(reputation);
        }

        query.push(" WHERE id = ");
        query.push_bind(id);

        let result = query
            .build()
            .execute(self.pool)
            .await
            .map_err(|e| AgoraError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get_by_id(id).await
    }

    /// Atomically add one to the user's post counter.
    pub async fn increment_post_count(&self, id: i64) -> Result<()> {
        let result = sqlx::query("UPDATE users SET post_count = post_count + 1 WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| AgoraError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(AgoraError::NotFound("User".to_string()));
        }
        Ok(())
    }

    /// Resolve user references for a set of IDs.
    ///
    /// Unknown IDs are simply absent from the returned map.
    pub async fn get_refs(&self, ids: &[i64]) -> Result<HashMap<i64, UserRef>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let mut query: QueryBuilder<sqlx::Sqlite> =
            QueryBuilder::new("SELECT id, username, role FROM users WHERE id IN (");
        let mut separated = query.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");

        let refs = query
            .build_query_as::<UserRef>()
            .fetch_all(self.pool)
            .await
            .map_err(|e| AgoraError::Database(e.to_string()))?;

        Ok(refs.into_iter().map(|r| (r.id, r)).collect())
    }

    /// Count all users.
    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(self.pool)
            .await
            .map_err(|e| AgoraError::Database(e.to_string()))?;
        Ok(count)
    }
}
