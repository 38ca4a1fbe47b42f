// src/users/store.rs
//! Credential store: CRUD over user records and their friend edges

use sqlx::SqlitePool;
use std::collections::HashMap;
use tracing::{debug, error, info};

use super::models::{ProfileFields, User};
use crate::auth::password::{hash_password, verify_password, PasswordError, DUMMY_HASH};
use crate::common::{generate_user_id, ApiError};
use crate::spotify::models::TokenPair;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("User already exists")]
    DuplicateUser,

    #[error("User not found")]
    NotFound,

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateUser => ApiError::Conflict("User already exists".to_string()),
            StoreError::NotFound => ApiError::NotFound("User not found".to_string()),
            StoreError::Password(e) => {
                error!(error = %e, "Password hashing failed");
                ApiError::InternalServer("Failed to process password".to_string())
            }
            StoreError::Database(e) => ApiError::DatabaseError(e),
        }
    }
}

pub(crate) fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[derive(Debug, Clone)]
pub struct UserStore {
    db: SqlitePool,
}

impl UserStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Inserts a new user; the username must not be taken
    pub async fn create(&self, fields: &ProfileFields, admin: bool) -> Result<User, StoreError> {
        if self.find_by_username(&fields.username).await?.is_some() {
            return Err(StoreError::DuplicateUser);
        }

        let id = generate_user_id();
        let password_hash = hash_password(&fields.password)?;

        sqlx::query(
            r#"
            INSERT INTO users (id, first_name, last_name, email, username, password_hash, admin)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&fields.first_name)
        .bind(&fields.last_name)
        .bind(&fields.email)
        .bind(&fields.username)
        .bind(&password_hash)
        .bind(admin)
        .execute(&self.db)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::DuplicateUser
            } else {
                StoreError::Database(e)
            }
        })?;

        info!(user_id = %id, username = %fields.username, admin, "User created");

        self.find_by_id(&id).await?.ok_or(StoreError::NotFound)
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        self.with_friends(user).await
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.db)
            .await?;
        self.with_friends(user).await
    }

    /// Username first, then id
    pub async fn find_by_username_or_id(&self, target: &str) -> Result<Option<User>, StoreError> {
        match self.find_by_username(target).await? {
            Some(user) => Ok(Some(user)),
            None => self.find_by_id(target).await,
        }
    }

    pub async fn find_by_spotify_id(&self, spotify_id: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE spotify_id = ? ORDER BY updated_at DESC LIMIT 1",
        )
        .bind(spotify_id)
        .fetch_optional(&self.db)
        .await?;
        self.with_friends(user).await
    }

    /// Checks a username/password pair. `None` covers both an unknown
    /// username and a wrong password.
    pub async fn verify_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, StoreError> {
        let user = match self.find_by_username(username).await? {
            Some(u) => u,
            None => {
                verify_password(password, DUMMY_HASH);
                return Ok(None);
            }
        };

        if verify_password(password, &user.password_hash) {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }

    /// Overwrites every mutable profile field and re-hashes the password
    pub async fn update(&self, id: &str, fields: &ProfileFields) -> Result<User, StoreError> {
        if let Some(existing) = self.find_by_username(&fields.username).await? {
            if existing.id != id {
                return Err(StoreError::DuplicateUser);
            }
        }

        let password_hash = hash_password(&fields.password)?;

        let result = sqlx::query(
            r#"
            UPDATE users
            SET first_name = ?, last_name = ?, email = ?, username = ?, password_hash = ?,
                updated_at = datetime('now')
            WHERE id = ?
            "#,
        )
        .bind(&fields.first_name)
        .bind(&fields.last_name)
        .bind(&fields.email)
        .bind(&fields.username)
        .bind(&password_hash)
        .bind(id)
        .execute(&self.db)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::DuplicateUser
            } else {
                StoreError::Database(e)
            }
        })?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        info!(user_id = %id, "User profile updated");
        self.find_by_id(id).await?.ok_or(StoreError::NotFound)
    }

    /// Deletes a user together with every friend edge that mentions it
    pub async fn delete(&self, username: &str) -> Result<User, StoreError> {
        let user = self
            .find_by_username(username)
            .await?
            .ok_or(StoreError::NotFound)?;

        let mut tx = self.db.begin().await?;

        let edges = sqlx::query("DELETE FROM user_friends WHERE user_id = ? OR friend_id = ?")
            .bind(&user.id)
            .bind(&user.id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(&user.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(
            user_id = %user.id,
            username = %user.username,
            removed_friend_edges = edges,
            "User deleted"
        );
        Ok(user)
    }

    pub async fn set_admin(&self, id: &str, admin: bool) -> Result<User, StoreError> {
        let result =
            sqlx::query("UPDATE users SET admin = ?, updated_at = datetime('now') WHERE id = ?")
                .bind(admin)
                .bind(id)
                .execute(&self.db)
                .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        info!(user_id = %id, admin, "Admin flag updated");
        self.find_by_id(id).await?.ok_or(StoreError::NotFound)
    }

    pub async fn list_all(&self) -> Result<Vec<User>, StoreError> {
        let mut users =
            sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY created_at, username")
                .fetch_all(&self.db)
                .await?;

        let edges: Vec<(String, String)> = sqlx::query_as(
            "SELECT user_id, friend_id FROM user_friends ORDER BY created_at, friend_id",
        )
        .fetch_all(&self.db)
        .await?;

        let mut by_user: HashMap<String, Vec<String>> = HashMap::new();
        for (user_id, friend_id) in edges {
            by_user.entry(user_id).or_default().push(friend_id);
        }

        for user in &mut users {
            user.friends = by_user.remove(&user.id).unwrap_or_default();
        }

        Ok(users)
    }

    /// Stores a token pair, replacing the previous one wholesale.
    /// `spotify_id` is only written when given.
    pub async fn set_spotify_tokens(
        &self,
        id: &str,
        spotify_id: Option<&str>,
        tokens: &TokenPair,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET spotify_id = COALESCE(?, spotify_id),
                spotify_access_token = ?,
                spotify_refresh_token = ?,
                spotify_token_updated_at = datetime('now'),
                updated_at = datetime('now')
            WHERE id = ?
            "#,
        )
        .bind(spotify_id)
        .bind(&tokens.access_token)
        .bind(&tokens.refresh_token)
        .bind(id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        debug!(user_id = %id, linked = spotify_id.is_some(), "Spotify tokens stored");
        Ok(())
    }

    /// Friend ids in the order the friendships were created
    pub async fn friend_ids(&self, id: &str) -> Result<Vec<String>, StoreError> {
        let ids = sqlx::query_scalar::<_, String>(
            "SELECT friend_id FROM user_friends WHERE user_id = ? ORDER BY created_at, friend_id",
        )
        .bind(id)
        .fetch_all(&self.db)
        .await?;
        Ok(ids)
    }

    async fn with_friends(&self, user: Option<User>) -> Result<Option<User>, StoreError> {
        match user {
            Some(mut u) => {
                u.friends = self.friend_ids(&u.id).await?;
                Ok(Some(u))
            }
            None => Ok(None),
        }
    }
}
