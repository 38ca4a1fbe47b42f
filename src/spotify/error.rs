// src/spotify/error.rs

use thiserror::Error;
use tracing::error;

use crate::common::ApiError;
use crate::users::store::StoreError;

#[derive(Debug, Error)]
pub enum SpotifyError {
    #[error("Spotify account not linked")]
    NotLinked,

    #[error("Spotify account is already linked to another user")]
    AlreadyLinked,

    /// The provider rejected the access token (HTTP 401)
    #[error("Spotify access token rejected")]
    Unauthorized,

    /// Code exchange or token refresh failed
    #[error("Spotify authorization failed: {0}")]
    AuthFailed(String),

    #[error("Spotify API error (HTTP {status}): {message}")]
    Upstream { status: u16, message: String },

    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<SpotifyError> for ApiError {
    fn from(e: SpotifyError) -> Self {
        match e {
            SpotifyError::NotLinked => {
                ApiError::BadRequest("Spotify account not linked".to_string())
            }
            SpotifyError::AlreadyLinked => ApiError::Conflict(e.to_string()),
            SpotifyError::Unauthorized | SpotifyError::AuthFailed(_) => {
                ApiError::SpotifyAuth(e.to_string())
            }
            SpotifyError::Upstream { .. }
            | SpotifyError::RequestFailed(_)
            | SpotifyError::Serialization(_) => {
                error!(error = %e, "Spotify request failed");
                ApiError::Upstream("Spotify request failed".to_string())
            }
            SpotifyError::Store(e) => e.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum BlendError {
    #[error("Friend not found")]
    FriendNotFound,

    #[error("Can only blend with friends")]
    NotFriends,

    #[error("Friend has not linked a Spotify account")]
    FriendNotLinked,

    #[error(transparent)]
    Spotify(#[from] SpotifyError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<BlendError> for ApiError {
    fn from(e: BlendError) -> Self {
        match e {
            BlendError::FriendNotFound => ApiError::NotFound(e.to_string()),
            BlendError::NotFriends => ApiError::Forbidden(e.to_string()),
            BlendError::FriendNotLinked => ApiError::BadRequest(e.to_string()),
            BlendError::Spotify(e) => e.into(),
            BlendError::Store(e) => e.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum RecommendError {
    #[error("At least one seed track is required")]
    MissingSeed,

    #[error("At most {max} seed tracks are allowed, got {got}")]
    TooManySeeds { max: usize, got: usize },

    #[error("Recommendation service error: {0}")]
    Upstream(String),
}

impl From<RecommendError> for ApiError {
    fn from(e: RecommendError) -> Self {
        match e {
            RecommendError::MissingSeed | RecommendError::TooManySeeds { .. } => {
                ApiError::ValidationError(e.to_string())
            }
            RecommendError::Upstream(msg) => {
                error!(error = %msg, "Recommendation request failed");
                ApiError::Upstream("Recommendation service failed".to_string())
            }
        }
    }
}
