//! Authentication routes

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

/// Creates and returns the authentication router
///
/// # Routes
/// - `POST /auth/signup` - Create an account
/// - `POST /auth/login` - Password login, sets the session cookie
/// - `GET /auth/callback` - Spotify sign-in callback
/// - `POST /auth/logout` - Clear the session cookie
pub fn auth_routes() -> Router {
    Router::new()
        .route("/auth/signup", post(handlers::signup))
        .route("/auth/login", post(handlers::login))
        .route("/auth/callback", get(handlers::spotify_sign_in_callback))
        .route("/auth/logout", post(handlers::logout))
}
