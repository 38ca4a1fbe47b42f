//! Authentication data models

use serde::{Deserialize, Serialize};

/// JWT claims carried by the session token; `sub` is the user id
#[derive(Serialize, Deserialize, Debug)]
pub struct Claims {
    pub sub: String,
    pub iat: usize,
    pub exp: usize,
}

/// Body of `POST /auth/login`
#[derive(Deserialize, Debug, Default)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Query string Spotify appends when redirecting back to a callback
#[derive(Deserialize, Debug, Default)]
pub struct OAuthCallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}
