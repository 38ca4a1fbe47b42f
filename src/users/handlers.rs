//! Handlers for the signed-in user's own account and user lookup

use axum::extract::{rejection::JsonRejection, Extension, Json, Path};
use axum_extra::extract::CookieJar;
use std::sync::Arc;
use tracing::info;

use super::models::{ProfileRequest, UserProfile};
use super::validators::ProfileValidator;
use crate::auth::session::clear_session_cookie;
use crate::auth::AuthedUser;
use crate::common::{json_body, ApiError, AppState, Validator};

/// GET /user/me
pub async fn me(AuthedUser { user, .. }: AuthedUser) -> Json<UserProfile> {
    Json(UserProfile::from(&user))
}

/// PATCH /user/me
///
/// Full overwrite: every profile field is required and the password is
/// hashed again.
pub async fn update_me(
    Extension(state): Extension<Arc<AppState>>,
    AuthedUser { user, .. }: AuthedUser,
    payload: Result<Json<ProfileRequest>, JsonRejection>,
) -> Result<Json<UserProfile>, ApiError> {
    let request = json_body(payload)?;

    let validation = ProfileValidator.validate(&request);
    if !validation.is_valid {
        return Err(validation.into());
    }

    let updated = state.users.update(&user.id, &request.into_fields()).await?;
    Ok(Json(UserProfile::from(&updated)))
}

/// DELETE /user/me
///
/// Removes the account and every friendship it was part of.
pub async fn delete_me(
    Extension(state): Extension<Arc<AppState>>,
    jar: CookieJar,
    AuthedUser { user, .. }: AuthedUser,
) -> Result<(CookieJar, Json<serde_json::Value>), ApiError> {
    state.users.delete(&user.username).await?;
    info!(user_id = %user.id, "Account deleted by owner");

    Ok((
        jar.add(clear_session_cookie()),
        Json(serde_json::json!({ "message": "User deleted" })),
    ))
}

/// GET /user/find/:target
///
/// `target` is a username or a user id.
pub async fn find_user(
    Extension(state): Extension<Arc<AppState>>,
    _authed: AuthedUser,
    Path(target): Path<String>,
) -> Result<Json<UserProfile>, ApiError> {
    let user = state
        .users
        .find_by_username_or_id(target.trim())
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(UserProfile::from(&user)))
}
