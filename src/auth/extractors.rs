//! Authentication extractors for Axum
//!
//! Handlers declare the capability they need by taking [`AuthedUser`] or
//! [`AdminUser`] as an argument. Both always carry the resolved user and the
//! raw session token.

use async_trait::async_trait;
use axum::{
    extract::{Extension, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use axum_extra::extract::CookieJar;
use std::sync::Arc;
use tracing::{debug, warn};

use super::session::{decode_session_token, SESSION_COOKIE};
use crate::common::{safe_token_log, ApiError, AppState};
use crate::users::User;

/// Any authenticated user
#[derive(Debug, Clone)]
pub struct AuthedUser {
    pub user: User,
    pub token: String,
}

/// An authenticated user with `admin == true`
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthedUser);

/// Bearer header first, then the session cookie
fn extract_token(headers: &HeaderMap) -> Option<String> {
    let from_header = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(|s| s.strip_prefix("Bearer ").unwrap_or(s).trim().to_string());

    from_header.or_else(|| {
        CookieJar::from_headers(headers)
            .get(SESSION_COOKIE)
            .map(|c| c.value().to_string())
    })
}

/// Maps a caller-supplied token to a stored user
pub async fn resolve_user(state: &AppState, token: Option<String>) -> Result<AuthedUser, ApiError> {
    let token = match token {
        Some(t) => t,
        None => {
            warn!("Authentication failed: token not set");
            return Err(ApiError::MissingToken("Token not set".to_string()));
        }
    };

    if token.is_empty() {
        return Err(ApiError::MissingToken("Invalid token".to_string()));
    }

    let claims = decode_session_token(&token, &state.config.jwt_secret).map_err(|e| {
        warn!(error = %e, token = %safe_token_log(&token), "Session token validation failed");
        ApiError::InvalidToken("Invalid token".to_string())
    })?;

    match state.users.find_by_id(&claims.sub).await? {
        Some(user) => {
            debug!(user_id = %user.id, admin = user.admin, "Session resolved");
            Ok(AuthedUser { user, token })
        }
        None => {
            warn!(user_id = %claims.sub, "Authentication failed: user not found");
            Err(ApiError::UserNotFound("User not found".to_string()))
        }
    }
}

async fn app_state<S: Send + Sync>(parts: &mut Parts, state: &S) -> Result<Arc<AppState>, ApiError> {
    let Extension(app_state): Extension<Arc<AppState>> =
        Extension::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::InternalServer("missing app state".to_string()))?;
    Ok(app_state)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = app_state(parts, state).await?;
        resolve_user(&app_state, extract_token(&parts.headers)).await
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let authed = AuthedUser::from_request_parts(parts, state).await?;

        if !authed.user.admin {
            warn!(user_id = %authed.user.id, "Admin route access denied");
            return Err(ApiError::Forbidden("Access denied".to_string()));
        }

        Ok(AdminUser(authed))
    }
}
