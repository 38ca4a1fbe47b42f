//! Authentication handlers

use axum::{
    extract::{rejection::JsonRejection, Extension, Json, Query},
    http::StatusCode,
    response::Redirect,
};
use axum_extra::extract::CookieJar;
use std::sync::Arc;
use tracing::{info, warn};

use super::models::{LoginRequest, OAuthCallbackQuery};
use super::session::{clear_session_cookie, issue_session_token, session_cookie};
use crate::common::{json_body, safe_email_log, ApiError, AppState, ValidationResult, Validator};
use crate::spotify::oauth::{callback_code, clear_state_cookie, verify_state};
use crate::users::models::{ProfileRequest, UserProfile};
use crate::users::validators::ProfileValidator;

/// POST /auth/signup
///
/// # Request Body
/// ```json
/// { "fname": "Test", "lname": "User", "email": "t@example.com",
///   "username": "tester", "password": "Password123" }
/// ```
///
/// Responds `201` with the created profile. A taken username is reported
/// before any other field is checked.
pub async fn signup(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<ProfileRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let request = json_body(payload)?;

    let username = request
        .username
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ApiError::ValidationError("username: is required".to_string()))?;

    if state.users.find_by_username(username).await?.is_some() {
        warn!(username = %username, "Signup rejected: username taken");
        return Err(ApiError::Conflict("User already exists".to_string()));
    }

    let validation = ProfileValidator.validate(&request);
    if !validation.is_valid {
        return Err(validation.into());
    }

    let fields = request.into_fields();
    let admin = state.config.is_admin_username(&fields.username);
    let user = state.users.create(&fields, admin).await?;

    info!(
        user_id = %user.id,
        email = %safe_email_log(&user.email),
        "User signed up"
    );

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "User created successfully",
            "user": UserProfile::from(&user),
        })),
    ))
}

/// POST /auth/login
///
/// Sets the session cookie and also returns the token for bearer use.
/// Unknown usernames and wrong passwords produce the same error.
pub async fn login(
    Extension(state): Extension<Arc<AppState>>,
    jar: CookieJar,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(CookieJar, Json<serde_json::Value>), ApiError> {
    let request = json_body(payload)?;

    let mut validation = ValidationResult::new();
    validation.require("username", request.username.as_deref());
    validation.require("password", request.password.as_deref());
    validation.into_result()?;

    let username = request.username.unwrap_or_default();
    let password = request.password.unwrap_or_default();

    let user = match state
        .users
        .verify_credentials(username.trim(), &password)
        .await?
    {
        Some(u) => u,
        None => {
            warn!(username = %username, "Login failed");
            return Err(ApiError::InvalidCredentials);
        }
    };

    let token = issue_session_token(
        &user.id,
        &state.config.jwt_secret,
        state.config.session_ttl_hours,
    )?;

    info!(user_id = %user.id, "Login successful");

    let jar = jar.add(session_cookie(token.clone(), state.config.cookie_secure));
    Ok((
        jar,
        Json(serde_json::json!({
            "message": "Login successful",
            "token": token,
            "user": UserProfile::from(&user),
        })),
    ))
}

/// POST /auth/logout
///
/// Tokens are stateless, so logout only clears the cookie.
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<serde_json::Value>) {
    info!("User logout");
    (
        jar.add(clear_session_cookie()),
        Json(serde_json::json!({ "message": "Logout successful" })),
    )
}

/// GET /auth/callback?code=&state=
///
/// Sign in with Spotify: the Spotify account must already be linked to a
/// local user. The fresh token pair replaces the stored one.
pub async fn spotify_sign_in_callback(
    Extension(state): Extension<Arc<AppState>>,
    jar: CookieJar,
    Query(query): Query<OAuthCallbackQuery>,
) -> Result<(CookieJar, Redirect), ApiError> {
    verify_state(&jar, query.state.as_deref())?;
    let code = callback_code(&query)?;

    let tokens = state
        .spotify
        .exchange_code(&code, &state.config.spotify.login_redirect_uri)
        .await?;
    let profile = state.spotify.current_user(&tokens.access_token).await?;

    let user = state
        .users
        .find_by_spotify_id(&profile.id)
        .await?
        .ok_or_else(|| {
            warn!(spotify_id = %profile.id, "Spotify sign-in for unlinked account");
            ApiError::NotFound("No account is linked to this Spotify user".to_string())
        })?;

    state
        .users
        .set_spotify_tokens(&user.id, Some(&profile.id), &tokens)
        .await?;

    let token = issue_session_token(
        &user.id,
        &state.config.jwt_secret,
        state.config.session_ttl_hours,
    )?;

    info!(user_id = %user.id, spotify_id = %profile.id, "Signed in with Spotify");

    let jar = jar
        .add(clear_state_cookie())
        .add(session_cookie(token, state.config.cookie_secure));
    Ok((
        jar,
        Redirect::to(&format!("{}/profile", state.config.frontend_url)),
    ))
}
