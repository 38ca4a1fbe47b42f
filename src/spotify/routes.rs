//! Spotify routes

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    blend, create_playlist, recently_played, recommend, spotify_callback, spotify_login,
    top_tracks,
};

pub fn spotify_routes() -> Router {
    Router::new()
        .route("/spotify/login", get(spotify_login))
        .route("/spotify/callback", get(spotify_callback))
        .route("/spotify/recommend", get(recommend))
        .route("/spotify/create_playlist", post(create_playlist))
        .route("/spotify/blend", get(blend))
        .route("/spotify/top-tracks", get(top_tracks))
        .route("/spotify/recently-played", get(recently_played))
}
