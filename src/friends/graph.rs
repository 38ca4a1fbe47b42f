// src/friends/graph.rs
//! Symmetric friend relation stored as two directed edges per friendship

use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::common::ApiError;
use crate::users::store::{is_unique_violation, StoreError};
use crate::users::{User, UserStore};

#[derive(Debug, Error)]
pub enum FriendError {
    #[error("User not found")]
    NotFound,

    #[error("Already friends")]
    AlreadyFriends,

    #[error("Not friends")]
    NotFriends,

    #[error("Cannot befriend yourself")]
    SelfFriendship,

    /// Only one direction of the friendship could be written
    #[error("Friendship could not be recorded in both directions")]
    PartialFriendship,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<sqlx::Error> for FriendError {
    fn from(e: sqlx::Error) -> Self {
        FriendError::Store(StoreError::Database(e))
    }
}

impl From<FriendError> for ApiError {
    fn from(e: FriendError) -> Self {
        match e {
            FriendError::NotFound | FriendError::NotFriends => ApiError::NotFound(e.to_string()),
            FriendError::AlreadyFriends => ApiError::Conflict(e.to_string()),
            FriendError::SelfFriendship => ApiError::ValidationError(e.to_string()),
            FriendError::PartialFriendship => {
                error!("Friendship write left incomplete");
                ApiError::InternalServer(e.to_string())
            }
            FriendError::Store(e) => e.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FriendGraph {
    db: SqlitePool,
    users: UserStore,
}

impl FriendGraph {
    pub fn new(db: SqlitePool, users: UserStore) -> Self {
        Self { db, users }
    }

    /// Records the friendship in both directions inside one transaction
    /// and returns the friend's record
    pub async fn add(&self, user_id: &str, friend_id: &str) -> Result<User, FriendError> {
        if user_id == friend_id {
            return Err(FriendError::SelfFriendship);
        }
        if self.users.find_by_id(user_id).await?.is_none() {
            return Err(FriendError::NotFound);
        }
        if self.users.find_by_id(friend_id).await?.is_none() {
            return Err(FriendError::NotFound);
        }

        let mut tx = self.db.begin().await?;

        let existing: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM user_friends WHERE user_id = ? AND friend_id = ?",
        )
        .bind(user_id)
        .bind(friend_id)
        .fetch_one(&mut *tx)
        .await?;
        if existing > 0 {
            return Err(FriendError::AlreadyFriends);
        }

        sqlx::query("INSERT INTO user_friends (user_id, friend_id) VALUES (?, ?)")
            .bind(user_id)
            .bind(friend_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    FriendError::AlreadyFriends
                } else {
                    FriendError::from(e)
                }
            })?;

        // The reverse edge may survive from an earlier one-sided write
        sqlx::query("INSERT OR IGNORE INTO user_friends (user_id, friend_id) VALUES (?, ?)")
            .bind(friend_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                error!(error = %e, user_id = %user_id, friend_id = %friend_id, "Reverse friend edge failed");
                FriendError::PartialFriendship
            })?;

        tx.commit().await?;

        info!(user_id = %user_id, friend_id = %friend_id, "Friend added");
        self.users
            .find_by_id(friend_id)
            .await?
            .ok_or(FriendError::NotFound)
    }

    /// Removes both directions; fails when `user_id` does not list `friend_id`
    pub async fn remove(&self, user_id: &str, friend_id: &str) -> Result<(), FriendError> {
        let mut tx = self.db.begin().await?;

        let removed = sqlx::query("DELETE FROM user_friends WHERE user_id = ? AND friend_id = ?")
            .bind(user_id)
            .bind(friend_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if removed == 0 {
            return Err(FriendError::NotFriends);
        }

        sqlx::query("DELETE FROM user_friends WHERE user_id = ? AND friend_id = ?")
            .bind(friend_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(user_id = %user_id, friend_id = %friend_id, "Friend removed");
        Ok(())
    }

    /// Friend records in the order the friendships were made. Ids that no
    /// longer resolve are skipped.
    pub async fn list(&self, user_id: &str) -> Result<Vec<User>, FriendError> {
        let ids = self.users.friend_ids(user_id).await?;
        let mut friends = Vec::with_capacity(ids.len());

        for id in ids {
            match self.users.find_by_id(&id).await? {
                Some(friend) => friends.push(friend),
                None => warn!(user_id = %user_id, friend_id = %id, "Skipping dangling friend id"),
            }
        }

        Ok(friends)
    }
}
