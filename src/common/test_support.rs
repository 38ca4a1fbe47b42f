// src/common/test_support.rs
//! In-memory stand-ins for the external providers, plus helpers that drive
//! the composed router

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

use super::{AppConfig, AppState};
use crate::auth::session::issue_session_token;
use crate::spotify::client::ADD_TRACKS_BATCH;
use crate::spotify::error::{RecommendError, SpotifyError};
use crate::spotify::models::{
    ExternalUrls, PlayHistory, SpotifyAlbum, SpotifyArtist, SpotifyImage, SpotifyPlaylist,
    SpotifyProfile, SpotifyTrack, TokenPair, TokenResponse,
};
use crate::spotify::{RecommendationApi, SpotifyApi};
use crate::users::models::ProfileFields;
use crate::users::User;

/// A complete, blendable track
pub fn track(id: &str) -> SpotifyTrack {
    SpotifyTrack {
        id: Some(id.to_string()),
        name: Some(format!("Song {}", id)),
        artists: vec![SpotifyArtist {
            name: format!("Artist {}", id),
        }],
        album: Some(SpotifyAlbum {
            name: Some("Album".to_string()),
            images: vec![SpotifyImage {
                url: format!("http://img.test/{}.jpg", id),
            }],
        }),
        popularity: Some(50),
        available_markets: Some(vec!["US".to_string()]),
        kind: Some("track".to_string()),
        ..Default::default()
    }
}

#[derive(Default)]
struct FakeAccount {
    playlists: Vec<(SpotifyPlaylist, Vec<SpotifyTrack>)>,
    top: Vec<SpotifyTrack>,
    recent: Vec<PlayHistory>,
}

#[derive(Default)]
struct FakeSpotifyState {
    accounts: HashMap<String, FakeAccount>,
    access: HashMap<String, String>,
    refresh: HashMap<String, String>,
    codes: HashMap<String, String>,
    issued: usize,
    refresh_calls: usize,
    fail_refresh: bool,
    reject_all: bool,
    created: Vec<(String, String)>,
    added: Vec<String>,
    add_calls: usize,
    rejected_calls: usize,
    expire_after_adds: Option<usize>,
}

/// Spotify account server and Web API kept in memory. Access tokens are
/// only accepted while registered, so tests expire them to script 401s.
#[derive(Default)]
pub struct FakeSpotify {
    inner: Mutex<FakeSpotifyState>,
}

impl FakeSpotify {
    fn lock(&self) -> std::sync::MutexGuard<'_, FakeSpotifyState> {
        self.inner.lock().unwrap()
    }

    /// Registers a fresh token pair for `spotify_id`
    pub fn issue(&self, spotify_id: &str) -> TokenPair {
        let mut s = self.lock();
        s.issued += 1;
        let pair = TokenPair {
            access_token: format!("access-{}-{}", spotify_id, s.issued),
            refresh_token: format!("refresh-{}", spotify_id),
        };
        s.accounts.entry(spotify_id.to_string()).or_default();
        s.access
            .insert(pair.access_token.clone(), spotify_id.to_string());
        s.refresh
            .insert(pair.refresh_token.clone(), spotify_id.to_string());
        pair
    }

    pub fn expire(&self, access_token: &str) {
        self.lock().access.remove(access_token);
    }

    pub fn add_code(&self, code: &str, spotify_id: &str) {
        self.lock()
            .codes
            .insert(code.to_string(), spotify_id.to_string());
    }

    pub fn add_playlist(&self, spotify_id: &str, playlist_id: &str, tracks: Vec<SpotifyTrack>) {
        let playlist = SpotifyPlaylist {
            id: playlist_id.to_string(),
            name: playlist_id.to_string(),
            external_urls: ExternalUrls::default(),
        };
        self.lock()
            .accounts
            .entry(spotify_id.to_string())
            .or_default()
            .playlists
            .push((playlist, tracks));
    }

    pub fn set_top(&self, spotify_id: &str, tracks: Vec<SpotifyTrack>) {
        self.lock()
            .accounts
            .entry(spotify_id.to_string())
            .or_default()
            .top = tracks;
    }

    pub fn set_recent(&self, spotify_id: &str, history: Vec<PlayHistory>) {
        self.lock()
            .accounts
            .entry(spotify_id.to_string())
            .or_default()
            .recent = history;
    }

    pub fn fail_refresh(&self) {
        self.lock().fail_refresh = true;
    }

    /// Every access token is rejected, even freshly refreshed ones
    pub fn reject_all(&self) {
        self.lock().reject_all = true;
    }

    /// The access token in use stops being accepted once `adds` add-track
    /// calls have succeeded
    pub fn expire_after_adds(&self, adds: usize) {
        self.lock().expire_after_adds = Some(adds);
    }

    /// API calls turned away with a 401
    pub fn rejected_calls(&self) -> usize {
        self.lock().rejected_calls
    }

    pub fn add_calls(&self) -> usize {
        self.lock().add_calls
    }

    pub fn refresh_calls(&self) -> usize {
        self.lock().refresh_calls
    }

    pub fn created_playlists(&self) -> Vec<(String, String)> {
        self.lock().created.clone()
    }

    pub fn added_uris(&self) -> Vec<String> {
        self.lock().added.clone()
    }

    fn account_for(&self, access_token: &str) -> Result<String, SpotifyError> {
        let mut s = self.lock();
        let account = if s.reject_all {
            None
        } else {
            s.access.get(access_token).cloned()
        };
        if account.is_none() {
            s.rejected_calls += 1;
        }
        account.ok_or(SpotifyError::Unauthorized)
    }
}

#[async_trait]
impl SpotifyApi for FakeSpotify {
    fn authorize_url(&self, redirect_uri: &str, state: &str) -> String {
        format!(
            "http://accounts.test/authorize?redirect_uri={}&state={}",
            redirect_uri, state
        )
    }

    async fn exchange_code(
        &self,
        code: &str,
        _redirect_uri: &str,
    ) -> Result<TokenPair, SpotifyError> {
        let spotify_id = self
            .lock()
            .codes
            .remove(code)
            .ok_or_else(|| SpotifyError::AuthFailed("invalid_grant".to_string()))?;
        Ok(self.issue(&spotify_id))
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, SpotifyError> {
        let spotify_id = {
            let mut s = self.lock();
            s.refresh_calls += 1;
            if s.fail_refresh {
                return Err(SpotifyError::AuthFailed("invalid_grant".to_string()));
            }
            s.refresh
                .get(refresh_token)
                .cloned()
                .ok_or_else(|| SpotifyError::AuthFailed("unknown refresh token".to_string()))?
        };

        let pair = self.issue(&spotify_id);
        Ok(TokenResponse {
            access_token: pair.access_token,
            refresh_token: None,
            expires_in: Some(3600),
            scope: None,
        })
    }

    async fn current_user(&self, access_token: &str) -> Result<SpotifyProfile, SpotifyError> {
        let id = self.account_for(access_token)?;
        Ok(SpotifyProfile {
            display_name: Some(id.clone()),
            id,
            email: None,
        })
    }

    async fn current_user_playlists(
        &self,
        access_token: &str,
    ) -> Result<Vec<SpotifyPlaylist>, SpotifyError> {
        let id = self.account_for(access_token)?;
        let s = self.lock();
        Ok(s.accounts
            .get(&id)
            .map(|a| a.playlists.iter().map(|(p, _)| p.clone()).collect())
            .unwrap_or_default())
    }

    async fn playlist_tracks(
        &self,
        access_token: &str,
        playlist_id: &str,
    ) -> Result<Vec<SpotifyTrack>, SpotifyError> {
        let id = self.account_for(access_token)?;
        let s = self.lock();
        s.accounts
            .get(&id)
            .and_then(|a| a.playlists.iter().find(|(p, _)| p.id == playlist_id))
            .map(|(_, tracks)| tracks.clone())
            .ok_or(SpotifyError::Upstream {
                status: 404,
                message: "playlist not found".to_string(),
            })
    }

    async fn top_tracks(
        &self,
        access_token: &str,
        limit: u32,
        _time_range: &str,
    ) -> Result<Vec<SpotifyTrack>, SpotifyError> {
        let id = self.account_for(access_token)?;
        let s = self.lock();
        Ok(s.accounts
            .get(&id)
            .map(|a| a.top.iter().take(limit as usize).cloned().collect())
            .unwrap_or_default())
    }

    async fn recently_played(
        &self,
        access_token: &str,
        limit: u32,
    ) -> Result<Vec<PlayHistory>, SpotifyError> {
        let id = self.account_for(access_token)?;
        let s = self.lock();
        Ok(s.accounts
            .get(&id)
            .map(|a| {
                a.recent
                    .iter()
                    .take(limit as usize)
                    .map(|h| PlayHistory {
                        track: h.track.clone(),
                        played_at: h.played_at.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn create_playlist(
        &self,
        access_token: &str,
        owner_id: &str,
        name: &str,
        _description: &str,
    ) -> Result<SpotifyPlaylist, SpotifyError> {
        self.account_for(access_token)?;
        let mut s = self.lock();
        s.created.push((owner_id.to_string(), name.to_string()));
        let id = format!("created-{}", s.created.len());
        Ok(SpotifyPlaylist {
            external_urls: ExternalUrls {
                spotify: Some(format!("https://open.spotify.com/playlist/{}", id)),
            },
            id,
            name: name.to_string(),
        })
    }

    async fn add_tracks(
        &self,
        access_token: &str,
        _playlist_id: &str,
        uris: &[String],
    ) -> Result<(), SpotifyError> {
        self.account_for(access_token)?;
        if uris.len() > ADD_TRACKS_BATCH {
            return Err(SpotifyError::Upstream {
                status: 400,
                message: "too many uris".to_string(),
            });
        }

        let mut s = self.lock();
        s.added.extend(uris.iter().cloned());
        s.add_calls += 1;
        if s.expire_after_adds == Some(s.add_calls) {
            s.access.remove(access_token);
        }
        Ok(())
    }
}

/// Recommendation service returning a canned result
pub struct FakeRecommender {
    result: Mutex<Result<Vec<SpotifyTrack>, String>>,
    seeds: Mutex<Vec<String>>,
}

impl Default for FakeRecommender {
    fn default() -> Self {
        Self {
            result: Mutex::new(Ok(Vec::new())),
            seeds: Mutex::new(Vec::new()),
        }
    }
}

impl FakeRecommender {
    pub fn respond_with(&self, result: Result<Vec<SpotifyTrack>, String>) {
        *self.result.lock().unwrap() = result;
    }

    pub fn last_seeds(&self) -> Vec<String> {
        self.seeds.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecommendationApi for FakeRecommender {
    async fn recommendations(
        &self,
        seeds: &[String],
        _market: &str,
        _limit: u32,
    ) -> Result<Vec<SpotifyTrack>, RecommendError> {
        *self.seeds.lock().unwrap() = seeds.to_vec();
        self.result
            .lock()
            .unwrap()
            .clone()
            .map_err(RecommendError::Upstream)
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: serde_json::Value,
}

impl TestResponse {
    pub fn header(&self, name: header::HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn set_cookies(&self) -> Vec<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(str::to_string)
            .collect()
    }
}

pub struct TestContext {
    pub state: Arc<AppState>,
    pub spotify: Arc<FakeSpotify>,
    pub recommender: Arc<FakeRecommender>,
}

pub async fn context() -> TestContext {
    let pool = super::migrations::test_pool().await;
    let spotify = Arc::new(FakeSpotify::default());
    let recommender = Arc::new(FakeRecommender::default());
    let state = Arc::new(AppState::new(
        pool,
        AppConfig::for_tests(),
        spotify.clone(),
        recommender.clone(),
    ));

    TestContext {
        state,
        spotify,
        recommender,
    }
}

pub fn profile_fields(username: &str) -> ProfileFields {
    ProfileFields {
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
        email: format!("{}@example.com", username),
        username: username.to_string(),
        password: "Password123".to_string(),
    }
}

impl TestContext {
    pub fn app(&self) -> Router {
        crate::app(self.state.clone())
    }

    pub async fn create_user(&self, username: &str, admin: bool) -> User {
        self.state
            .users
            .create(&profile_fields(username), admin)
            .await
            .unwrap()
    }

    pub async fn reload(&self, user: &User) -> User {
        self.state.users.find_by_id(&user.id).await.unwrap().unwrap()
    }

    /// Links `user` to a fake Spotify account and returns the stored pair
    pub async fn link(&self, user: &User, spotify_id: &str) -> TokenPair {
        let pair = self.spotify.issue(spotify_id);
        self.state
            .users
            .set_spotify_tokens(&user.id, Some(spotify_id), &pair)
            .await
            .unwrap();
        pair
    }

    pub fn token_for(&self, user: &User) -> String {
        issue_session_token(&user.id, &self.state.config.jwt_secret, 1).unwrap()
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.send_request(request).await
    }

    pub async fn send_request(&self, request: Request<Body>) -> TestResponse {
        let response = self.app().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);

        TestResponse {
            status,
            headers,
            body,
        }
    }
}
