//! Friend list handlers

use axum::extract::{Extension, Json, Path};
use std::sync::Arc;
use tracing::info;

use super::graph::FriendError;
use crate::auth::AuthedUser;
use crate::common::{ApiError, AppState};
use crate::users::models::UserProfile;
use crate::users::User;

async fn friend_by_username(state: &AppState, username: &str) -> Result<User, ApiError> {
    state
        .users
        .find_by_username(username.trim())
        .await?
        .ok_or_else(|| FriendError::NotFound.into())
}

/// GET /user/friends
pub async fn list_friends(
    Extension(state): Extension<Arc<AppState>>,
    AuthedUser { user, .. }: AuthedUser,
) -> Result<Json<Vec<UserProfile>>, ApiError> {
    let friends = state.friends.list(&user.id).await?;
    Ok(Json(friends.iter().map(UserProfile::from).collect()))
}

/// POST /user/friends/:username
pub async fn add_friend(
    Extension(state): Extension<Arc<AppState>>,
    AuthedUser { user, .. }: AuthedUser,
    Path(username): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let friend = friend_by_username(&state, &username).await?;
    let friend = state.friends.add(&user.id, &friend.id).await?;

    info!(user_id = %user.id, friend = %friend.username, "Friend request accepted");

    Ok(Json(serde_json::json!({
        "message": "Friend added",
        "friend": UserProfile::from(&friend),
    })))
}

/// DELETE /user/friends/:username
pub async fn remove_friend(
    Extension(state): Extension<Arc<AppState>>,
    AuthedUser { user, .. }: AuthedUser,
    Path(username): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let friend = friend_by_username(&state, &username).await?;
    state.friends.remove(&user.id, &friend.id).await?;

    Ok(Json(serde_json::json!({ "message": "Friend removed" })))
}
