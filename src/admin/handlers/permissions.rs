// src/admin/handlers/permissions.rs

use axum::{
    extract::{Extension, Path},
    Json,
};
use std::sync::Arc;
use tracing::{info, warn};

use crate::auth::AdminUser;
use crate::common::{ApiError, AppState};
use crate::users::models::UserProfile;

/// POST /admin/permissions/:id - Grant the admin flag
pub async fn grant_admin(
    Extension(state): Extension<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
) -> Result<Json<UserProfile>, ApiError> {
    let user = state.users.set_admin(&id, true).await?;

    info!(admin_user_id = %admin.user.id, target_user_id = %id, "Admin granted");
    Ok(Json(UserProfile::from(&user)))
}

/// DELETE /admin/permissions/:id - Revoke the admin flag
///
/// Admins cannot revoke their own flag.
pub async fn revoke_admin(
    Extension(state): Extension<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
) -> Result<Json<UserProfile>, ApiError> {
    if admin.user.id == id {
        warn!(admin_user_id = %id, "Admin attempted to revoke own admin flag");
        return Err(ApiError::ValidationError(
            "id: cannot revoke your own admin permission".to_string(),
        ));
    }

    let user = state.users.set_admin(&id, false).await?;

    info!(admin_user_id = %admin.user.id, target_user_id = %id, "Admin revoked");
    Ok(Json(UserProfile::from(&user)))
}
