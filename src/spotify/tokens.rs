// src/spotify/tokens.rs
//! Per-user Spotify token lifecycle
//!
//! `Unlinked -> Linked` happens in [`SpotifyTokens::link`]. Expiry is only
//! ever detected lazily: a call fails with HTTP 401, the stored refresh
//! token is exchanged for a new pair, and the call is retried exactly once.

use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::client::SpotifyApi;
use super::error::SpotifyError;
use super::models::{SpotifyProfile, TokenPair};
use crate::users::{User, UserStore};

#[derive(Clone)]
pub struct SpotifyTokens {
    api: Arc<dyn SpotifyApi>,
    users: UserStore,
}

impl SpotifyTokens {
    pub fn new(api: Arc<dyn SpotifyApi>, users: UserStore) -> Self {
        Self { api, users }
    }

    /// Completes the authorization-code flow for `user_id`, storing the
    /// Spotify id and token pair against that user
    pub async fn link(
        &self,
        user_id: &str,
        code: &str,
        redirect_uri: &str,
    ) -> Result<SpotifyProfile, SpotifyError> {
        let tokens = self.api.exchange_code(code, redirect_uri).await?;
        let profile = self.api.current_user(&tokens.access_token).await?;

        if let Some(owner) = self.users.find_by_spotify_id(&profile.id).await? {
            if owner.id != user_id {
                warn!(
                    user_id = %user_id,
                    spotify_id = %profile.id,
                    "Spotify account already linked to another user"
                );
                return Err(SpotifyError::AlreadyLinked);
            }
        }

        self.users
            .set_spotify_tokens(user_id, Some(&profile.id), &tokens)
            .await?;

        info!(user_id = %user_id, spotify_id = %profile.id, "Spotify account linked");
        Ok(profile)
    }

    /// Exchanges the user's stored refresh token for a new pair and
    /// persists it. A response without a refresh token keeps the old one.
    pub async fn refresh(&self, user: &User) -> Result<TokenPair, SpotifyError> {
        let current = user.spotify_tokens().ok_or(SpotifyError::NotLinked)?;

        let response = self
            .api
            .refresh(&current.refresh_token)
            .await
            .map_err(|e| match e {
                SpotifyError::AuthFailed(_) => e,
                other => SpotifyError::AuthFailed(other.to_string()),
            })?;

        let pair = TokenPair {
            access_token: response.access_token,
            refresh_token: response.refresh_token.unwrap_or(current.refresh_token),
        };

        self.users.set_spotify_tokens(&user.id, None, &pair).await?;
        debug!(user_id = %user.id, "Spotify access token refreshed");
        Ok(pair)
    }

    /// Runs `op` with the user's access token. On a 401 the token is
    /// refreshed and `op` runs once more; a failed refresh or a second 401
    /// ends in [`SpotifyError::AuthFailed`]. `user` is left holding the
    /// pair that was last used, so later calls start from the fresh token.
    pub async fn with_access_token<T, F, Fut>(
        &self,
        user: &mut User,
        op: F,
    ) -> Result<T, SpotifyError>
    where
        F: Fn(Arc<dyn SpotifyApi>, String) -> Fut,
        Fut: Future<Output = Result<T, SpotifyError>>,
    {
        let tokens = user.spotify_tokens().ok_or(SpotifyError::NotLinked)?;

        match op(self.api.clone(), tokens.access_token.clone()).await {
            Err(SpotifyError::Unauthorized) => {}
            other => return other,
        }

        warn!(user_id = %user.id, "Spotify access token rejected, refreshing");

        // Another request may have refreshed since `user` was loaded
        let latest = self
            .users
            .find_by_id(&user.id)
            .await?
            .ok_or(SpotifyError::NotLinked)?;
        let pair = match latest.spotify_tokens() {
            Some(stored) if stored.access_token != tokens.access_token => stored,
            _ => self.refresh(&latest).await?,
        };
        let access_token = pair.access_token.clone();
        user.replace_spotify_tokens(pair);

        match op(self.api.clone(), access_token).await {
            Err(SpotifyError::Unauthorized) => Err(SpotifyError::AuthFailed(
                "access token rejected after refresh".to_string(),
            )),
            other => other,
        }
    }
}
