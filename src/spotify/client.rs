// src/spotify/client.rs
//! Spotify Web API client
//!
//! [`SpotifyApi`] is the seam the rest of the service talks to. The HTTP
//! implementation knows nothing about users or token storage; a rejected
//! access token is reported as [`SpotifyError::Unauthorized`] and the
//! caller decides whether to refresh.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, error, warn};

use super::error::SpotifyError;
use super::models::{
    Paging, PlayHistory, PlaylistItem, SpotifyPlaylist, SpotifyProfile, SpotifyTrack, TokenPair,
    TokenResponse,
};
use crate::common::config::SpotifyConfig;

/// Page size used for every paginated listing
const PAGE_LIMIT: u32 = 50;
/// Upper bound on pages followed per listing
const MAX_PAGES: usize = 100;
/// Spotify accepts at most 100 URIs per add-items call
pub const ADD_TRACKS_BATCH: usize = 100;

#[async_trait]
pub trait SpotifyApi: Send + Sync {
    /// URL the browser is sent to for the authorization-code flow
    fn authorize_url(&self, redirect_uri: &str, state: &str) -> String;

    async fn exchange_code(&self, code: &str, redirect_uri: &str)
        -> Result<TokenPair, SpotifyError>;

    async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, SpotifyError>;

    async fn current_user(&self, access_token: &str) -> Result<SpotifyProfile, SpotifyError>;

    async fn current_user_playlists(
        &self,
        access_token: &str,
    ) -> Result<Vec<SpotifyPlaylist>, SpotifyError>;

    /// Music tracks of a playlist in playlist order; removed tracks,
    /// episodes and local files are dropped
    async fn playlist_tracks(
        &self,
        access_token: &str,
        playlist_id: &str,
    ) -> Result<Vec<SpotifyTrack>, SpotifyError>;

    async fn top_tracks(
        &self,
        access_token: &str,
        limit: u32,
        time_range: &str,
    ) -> Result<Vec<SpotifyTrack>, SpotifyError>;

    async fn recently_played(
        &self,
        access_token: &str,
        limit: u32,
    ) -> Result<Vec<PlayHistory>, SpotifyError>;

    async fn create_playlist(
        &self,
        access_token: &str,
        owner_id: &str,
        name: &str,
        description: &str,
    ) -> Result<SpotifyPlaylist, SpotifyError>;

    /// Appends one batch of at most [`ADD_TRACKS_BATCH`] URIs
    async fn add_tracks(
        &self,
        access_token: &str,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<(), SpotifyError>;
}

#[derive(Debug, Clone)]
pub struct HttpSpotifyClient {
    config: SpotifyConfig,
    client: Client,
}

impl HttpSpotifyClient {
    pub fn new(config: SpotifyConfig, timeout: Duration) -> Result<Self, SpotifyError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SpotifyError::RequestFailed(e.to_string()))?;

        Ok(Self { config, client })
    }

    fn api(&self, path: &str) -> String {
        format!("{}{}", self.config.api_url.trim_end_matches('/'), path)
    }

    fn token_url(&self) -> String {
        format!("{}/api/token", self.config.accounts_url.trim_end_matches('/'))
    }

    async fn send(request: RequestBuilder) -> Result<Response, SpotifyError> {
        let response = request.send().await.map_err(|e| {
            error!(error = %e, "Spotify request could not be sent");
            SpotifyError::RequestFailed(e.to_string())
        })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            debug!("Spotify rejected the access token");
            return Err(SpotifyError::Unauthorized);
        }

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            warn!(status = %status, error = %message, "Spotify API returned an error");
            return Err(SpotifyError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response)
    }

    async fn json<T: DeserializeOwned>(response: Response) -> Result<T, SpotifyError> {
        response
            .json::<T>()
            .await
            .map_err(|e| SpotifyError::Serialization(e.to_string()))
    }

    async fn get<T: DeserializeOwned>(
        &self,
        access_token: &str,
        url: &str,
    ) -> Result<T, SpotifyError> {
        let response = Self::send(self.client.get(url).bearer_auth(access_token)).await?;
        Self::json(response).await
    }

    /// Follows `next` links until exhausted or [`MAX_PAGES`] is reached
    async fn get_all<T: DeserializeOwned>(
        &self,
        access_token: &str,
        first: String,
    ) -> Result<Vec<T>, SpotifyError> {
        let mut items = Vec::new();
        let mut next = Some(first);
        let mut pages = 0;

        while let Some(url) = next {
            if pages == MAX_PAGES {
                warn!(url = %url, "Stopped following Spotify pagination at page cap");
                break;
            }
            let page: Paging<T> = self.get(access_token, &url).await?;
            items.extend(page.items);
            next = page.next;
            pages += 1;
        }

        Ok(items)
    }

    async fn token_request(&self, params: &[(&str, &str)]) -> Result<TokenResponse, SpotifyError> {
        let response = self
            .client
            .post(self.token_url())
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(params)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to send Spotify token request");
                SpotifyError::AuthFailed(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!(status = %status, error = %error_text, "Spotify token request failed");
            return Err(SpotifyError::AuthFailed(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| SpotifyError::AuthFailed(e.to_string()))
    }
}

#[async_trait]
impl SpotifyApi for HttpSpotifyClient {
    fn authorize_url(&self, redirect_uri: &str, state: &str) -> String {
        format!(
            "{}/authorize?response_type=code&client_id={}&scope={}&redirect_uri={}&state={}",
            self.config.accounts_url.trim_end_matches('/'),
            urlencoding::encode(&self.config.client_id),
            urlencoding::encode(&self.config.scopes),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(state),
        )
    }

    async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<TokenPair, SpotifyError> {
        debug!("Exchanging Spotify authorization code");

        let token = self
            .token_request(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", redirect_uri),
            ])
            .await?;

        let refresh_token = token.refresh_token.ok_or_else(|| {
            SpotifyError::AuthFailed("token response carried no refresh token".to_string())
        })?;

        Ok(TokenPair {
            access_token: token.access_token,
            refresh_token,
        })
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, SpotifyError> {
        debug!("Refreshing Spotify access token");
        self.token_request(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ])
        .await
    }

    async fn current_user(&self, access_token: &str) -> Result<SpotifyProfile, SpotifyError> {
        self.get(access_token, &self.api("/me")).await
    }

    async fn current_user_playlists(
        &self,
        access_token: &str,
    ) -> Result<Vec<SpotifyPlaylist>, SpotifyError> {
        let first = self.api(&format!("/me/playlists?limit={}", PAGE_LIMIT));
        self.get_all(access_token, first).await
    }

    async fn playlist_tracks(
        &self,
        access_token: &str,
        playlist_id: &str,
    ) -> Result<Vec<SpotifyTrack>, SpotifyError> {
        let first = self.api(&format!(
            "/playlists/{}/tracks?limit={}",
            urlencoding::encode(playlist_id),
            PAGE_LIMIT
        ));
        let items: Vec<PlaylistItem> = self.get_all(access_token, first).await?;

        Ok(items
            .into_iter()
            .filter_map(|item| item.track)
            .filter(SpotifyTrack::is_music_track)
            .collect())
    }

    async fn top_tracks(
        &self,
        access_token: &str,
        limit: u32,
        time_range: &str,
    ) -> Result<Vec<SpotifyTrack>, SpotifyError> {
        let url = self.api(&format!(
            "/me/top/tracks?limit={}&time_range={}",
            limit,
            urlencoding::encode(time_range)
        ));
        let page: Paging<SpotifyTrack> = self.get(access_token, &url).await?;
        Ok(page.items)
    }

    async fn recently_played(
        &self,
        access_token: &str,
        limit: u32,
    ) -> Result<Vec<PlayHistory>, SpotifyError> {
        let url = self.api(&format!("/me/player/recently-played?limit={}", limit));
        let page: Paging<PlayHistory> = self.get(access_token, &url).await?;
        Ok(page.items)
    }

    async fn create_playlist(
        &self,
        access_token: &str,
        owner_id: &str,
        name: &str,
        description: &str,
    ) -> Result<SpotifyPlaylist, SpotifyError> {
        let url = self.api(&format!("/users/{}/playlists", urlencoding::encode(owner_id)));
        let body = serde_json::json!({
            "name": name,
            "description": description,
            "public": false,
        });

        let response =
            Self::send(self.client.post(url).bearer_auth(access_token).json(&body)).await?;
        Self::json(response).await
    }

    async fn add_tracks(
        &self,
        access_token: &str,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<(), SpotifyError> {
        let url = self.api(&format!(
            "/playlists/{}/tracks",
            urlencoding::encode(playlist_id)
        ));

        if uris.len() > ADD_TRACKS_BATCH {
            return Err(SpotifyError::RequestFailed(format!(
                "at most {} tracks per request, got {}",
                ADD_TRACKS_BATCH,
                uris.len()
            )));
        }

        let body = serde_json::json!({ "uris": uris });
        Self::send(self.client.post(url).bearer_auth(access_token).json(&body)).await?;
        Ok(())
    }
}
