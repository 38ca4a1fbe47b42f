// src/admin/handlers/users.rs

use axum::{
    extract::{Extension, Path},
    Json,
};
use std::sync::Arc;
use tracing::{info, warn};

use crate::auth::AdminUser;
use crate::common::{ApiError, AppState};
use crate::users::models::UserProfile;

/// GET /admin/users - Every user record
pub async fn list_users(
    Extension(state): Extension<Arc<AppState>>,
    AdminUser(admin): AdminUser,
) -> Result<Json<Vec<UserProfile>>, ApiError> {
    let users = state.users.list_all().await?;

    info!(
        admin_user_id = %admin.user.id,
        user_count = users.len(),
        "Admin user list fetched"
    );

    Ok(Json(users.iter().map(UserProfile::from).collect()))
}

/// GET /admin/users/:username
pub async fn get_user(
    Extension(state): Extension<Arc<AppState>>,
    _admin: AdminUser,
    Path(username): Path<String>,
) -> Result<Json<UserProfile>, ApiError> {
    let user = state
        .users
        .find_by_username(&username)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(UserProfile::from(&user)))
}

/// DELETE /admin/users/:username
pub async fn delete_user(
    Extension(state): Extension<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Path(username): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let deleted = state.users.delete(&username).await.map_err(|e| {
        warn!(admin_user_id = %admin.user.id, username = %username, error = %e, "Admin delete failed");
        ApiError::from(e)
    })?;

    info!(
        admin_user_id = %admin.user.id,
        target_user_id = %deleted.id,
        "User deleted by admin"
    );

    Ok(Json(serde_json::json!({
        "message": "User deleted",
        "user": UserProfile::from(&deleted),
    })))
}
