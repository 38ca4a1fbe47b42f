// src/users/models.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::spotify::models::TokenPair;

/// User database model
///
/// Holds the password hash and Spotify credentials, so it is never
/// serialized directly; responses go through [`UserProfile`].
#[derive(FromRow, Debug, Clone)]
pub struct User {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub profile_pic_url: String,
    pub spotify_id: Option<String>,
    pub spotify_access_token: Option<String>,
    pub spotify_refresh_token: Option<String>,
    pub spotify_token_updated_at: Option<String>,
    pub admin: bool,
    pub created_at: String,
    pub updated_at: String,
    /// Filled from `user_friends` by the store
    #[sqlx(skip)]
    pub friends: Vec<String>,
}

impl User {
    /// The stored token pair, if the account has been linked
    pub fn spotify_tokens(&self) -> Option<TokenPair> {
        match (&self.spotify_access_token, &self.spotify_refresh_token) {
            (Some(access), Some(refresh)) => Some(TokenPair {
                access_token: access.clone(),
                refresh_token: refresh.clone(),
            }),
            _ => None,
        }
    }

    /// Replaces the in-memory pair after a refresh
    pub fn replace_spotify_tokens(&mut self, pair: TokenPair) {
        self.spotify_access_token = Some(pair.access_token);
        self.spotify_refresh_token = Some(pair.refresh_token);
    }

    pub fn is_spotify_linked(&self) -> bool {
        self.spotify_tokens().is_some()
    }

    pub fn has_friend(&self, user_id: &str) -> bool {
        self.friends.iter().any(|f| f == user_id)
    }
}

/// Public view of a user record
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub username: String,
    pub profile_pic_url: String,
    pub spotify_id: Option<String>,
    pub spotify_linked: bool,
    pub friends: Vec<String>,
    pub admin: bool,
    pub created_at: String,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            username: user.username.clone(),
            profile_pic_url: user.profile_pic_url.clone(),
            spotify_id: user.spotify_id.clone(),
            spotify_linked: user.is_spotify_linked(),
            friends: user.friends.clone(),
            admin: user.admin,
            created_at: user.created_at.clone(),
        }
    }
}

/// Validated profile fields, used for both signup and full profile updates
#[derive(Debug, Clone)]
pub struct ProfileFields {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub username: String,
    /// Plaintext; hashed by the store before it is written
    pub password: String,
}

/// Body of `POST /auth/signup` and `PATCH /user/me`
///
/// Fields are optional so missing values produce validation errors rather
/// than deserialization failures.
#[derive(Deserialize, Debug, Default)]
pub struct ProfileRequest {
    pub fname: Option<String>,
    pub lname: Option<String>,
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl ProfileRequest {
    /// Call only after validation passed
    pub fn into_fields(self) -> ProfileFields {
        ProfileFields {
            first_name: self.fname.unwrap_or_default().trim().to_string(),
            last_name: self.lname.unwrap_or_default().trim().to_string(),
            email: self.email.unwrap_or_default().trim().to_string(),
            username: self.username.unwrap_or_default().trim().to_string(),
            password: self.password.unwrap_or_default(),
        }
    }
}
