//! Spotify route handlers

use axum::{
    extract::{rejection::JsonRejection, Extension, Json, Query},
    http::StatusCode,
    response::Redirect,
};
use axum_extra::extract::CookieJar;
use std::sync::Arc;
use tracing::info;

use super::blend::blend as blend_tracks;
use super::client::ADD_TRACKS_BATCH;
use super::error::SpotifyError;
use super::models::{
    BlendQuery, BlendedTrack, CreatePlaylistRequest, CreatedPlaylist, RecentlyPlayedQuery,
    RecommendQuery, TopTracksQuery, TrackSummary,
};
use super::oauth::{callback_code, clear_state_cookie, state_cookie, verify_state};
use super::recommend::recommend as recommend_tracks;
use crate::auth::models::OAuthCallbackQuery;
use crate::auth::AuthedUser;
use crate::common::{generate_state_nonce, json_body, ApiError, AppState};

const DEFAULT_LIMIT: u32 = 20;
const MAX_LIMIT: u32 = 50;
const MAX_RECOMMEND_LIMIT: u32 = 100;
const TIME_RANGES: &[&str] = &["short_term", "medium_term", "long_term"];
const DEFAULT_PLAYLIST_NAME: &str = "TrackMates Blend";

fn limit_param(limit: Option<u32>, max: u32) -> Result<u32, ApiError> {
    match limit {
        None => Ok(DEFAULT_LIMIT.min(max)),
        Some(n) if (1..=max).contains(&n) => Ok(n),
        Some(_) => Err(ApiError::ValidationError(format!(
            "limit: must be between 1 and {}",
            max
        ))),
    }
}

/// GET /spotify/login
///
/// With a session this links Spotify to the signed-in account, without
/// one it signs in with an already linked Spotify account.
pub async fn spotify_login(
    Extension(state): Extension<Arc<AppState>>,
    jar: CookieJar,
    authed: Option<AuthedUser>,
) -> (CookieJar, Redirect) {
    let nonce = generate_state_nonce();
    let redirect_uri = match &authed {
        Some(a) => {
            info!(user_id = %a.user.id, "Starting Spotify link flow");
            &state.config.spotify.redirect_uri
        }
        None => {
            info!("Starting Spotify sign-in flow");
            &state.config.spotify.login_redirect_uri
        }
    };

    let url = state.spotify.authorize_url(redirect_uri, &nonce);
    (
        jar.add(state_cookie(nonce, state.config.cookie_secure)),
        Redirect::to(&url),
    )
}

/// GET /spotify/callback?code=&state=
///
/// The session identifies which local user began the link flow.
pub async fn spotify_callback(
    Extension(state): Extension<Arc<AppState>>,
    jar: CookieJar,
    AuthedUser { user, .. }: AuthedUser,
    Query(query): Query<OAuthCallbackQuery>,
) -> Result<(CookieJar, Redirect), ApiError> {
    verify_state(&jar, query.state.as_deref())?;
    let code = callback_code(&query)?;

    state
        .spotify_tokens
        .link(&user.id, &code, &state.config.spotify.redirect_uri)
        .await?;

    Ok((
        jar.add(clear_state_cookie()),
        Redirect::to(&format!("{}/profile", state.config.frontend_url)),
    ))
}

/// GET /spotify/recommend?seed_tracks=a,b&limit=
pub async fn recommend(
    Extension(state): Extension<Arc<AppState>>,
    AuthedUser { user, .. }: AuthedUser,
    Query(query): Query<RecommendQuery>,
) -> Result<Json<Vec<TrackSummary>>, ApiError> {
    let limit = limit_param(query.limit, MAX_RECOMMEND_LIMIT)?;
    let tracks = recommend_tracks(
        state.recommender.as_ref(),
        &state.config.recommendations.market,
        query.seed_tracks.as_deref(),
        limit,
    )
    .await?;

    info!(user_id = %user.id, tracks = tracks.len(), "Recommendations served");
    Ok(Json(tracks))
}

/// GET /spotify/blend?friend_id=
pub async fn blend(
    Extension(state): Extension<Arc<AppState>>,
    AuthedUser { user, .. }: AuthedUser,
    Query(query): Query<BlendQuery>,
) -> Result<Json<Vec<BlendedTrack>>, ApiError> {
    let friend_ref = query
        .friend_id
        .as_deref()
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .ok_or_else(|| ApiError::ValidationError("friend_id: is required".to_string()))?;

    let tracks = blend_tracks(&state.spotify_tokens, &state.users, &user, friend_ref).await?;
    Ok(Json(tracks))
}

/// POST /spotify/create_playlist
///
/// # Request Body
/// ```json
/// { "track_ids": ["4uLU6hMCjMI75M1A2tKUQC"], "name": "Road trip" }
/// ```
pub async fn create_playlist(
    Extension(state): Extension<Arc<AppState>>,
    AuthedUser { mut user, .. }: AuthedUser,
    payload: Result<Json<CreatePlaylistRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedPlaylist>), ApiError> {
    let request = json_body(payload)?;

    let track_ids: Vec<String> = request
        .track_ids
        .unwrap_or_default()
        .into_iter()
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .collect();
    if track_ids.is_empty() {
        return Err(ApiError::ValidationError(
            "track_ids: at least one track is required".to_string(),
        ));
    }

    let name = request
        .name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| DEFAULT_PLAYLIST_NAME.to_string());
    let owner = user.spotify_id.clone().ok_or(SpotifyError::NotLinked)?;
    let uris: Vec<String> = track_ids
        .iter()
        .map(|id| format!("spotify:track:{}", id))
        .collect();

    let tokens = &state.spotify_tokens;
    let (owner, name) = (owner.as_str(), name.as_str());
    let playlist = tokens
        .with_access_token(&mut user, move |api, token| async move {
            api.create_playlist(&token, owner, name, "Created with TrackMates")
                .await
        })
        .await?;

    // One refresh-and-retry per batch; accepted batches are never re-sent
    let playlist_id = playlist.id.as_str();
    for batch in uris.chunks(ADD_TRACKS_BATCH) {
        tokens
            .with_access_token(&mut user, move |api, token| async move {
                api.add_tracks(&token, playlist_id, batch).await
            })
            .await?;
    }

    info!(
        user_id = %user.id,
        playlist_id = %playlist.id,
        tracks = uris.len(),
        "Playlist created"
    );

    Ok((
        StatusCode::CREATED,
        Json(CreatedPlaylist {
            id: playlist.id.clone(),
            name: playlist.name.clone(),
            link: playlist.external_urls.spotify.clone(),
            tracks_added: uris.len(),
        }),
    ))
}

/// GET /spotify/top-tracks?limit=&time_range=
pub async fn top_tracks(
    Extension(state): Extension<Arc<AppState>>,
    AuthedUser { mut user, .. }: AuthedUser,
    Query(query): Query<TopTracksQuery>,
) -> Result<Json<Vec<TrackSummary>>, ApiError> {
    let limit = limit_param(query.limit, MAX_LIMIT)?;
    let time_range = query
        .time_range
        .unwrap_or_else(|| "medium_term".to_string());
    if !TIME_RANGES.contains(&time_range.as_str()) {
        return Err(ApiError::ValidationError(format!(
            "time_range: must be one of {}",
            TIME_RANGES.join(", ")
        )));
    }

    let range = time_range.as_str();
    let tracks = state
        .spotify_tokens
        .with_access_token(&mut user, move |api, token| async move {
            api.top_tracks(&token, limit, range).await
        })
        .await?;

    Ok(Json(
        tracks.iter().filter_map(TrackSummary::from_track).collect(),
    ))
}

/// GET /spotify/recently-played?limit=
pub async fn recently_played(
    Extension(state): Extension<Arc<AppState>>,
    AuthedUser { mut user, .. }: AuthedUser,
    Query(query): Query<RecentlyPlayedQuery>,
) -> Result<Json<Vec<TrackSummary>>, ApiError> {
    let limit = limit_param(query.limit, MAX_LIMIT)?;

    let history = state
        .spotify_tokens
        .with_access_token(&mut user, move |api, token| async move {
            api.recently_played(&token, limit).await
        })
        .await?;

    let tracks = history
        .into_iter()
        .filter_map(|entry| {
            TrackSummary::from_track(&entry.track).map(|summary| TrackSummary {
                played_at: entry.played_at,
                ..summary
            })
        })
        .collect();

    Ok(Json(tracks))
}
