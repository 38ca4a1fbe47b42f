//! Friend routes

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

/// # Routes
/// - `GET /user/friends` - The caller's friends
/// - `POST /user/friends/:username` - Add a friend
/// - `DELETE /user/friends/:username` - Remove a friend
pub fn friend_routes() -> Router {
    Router::new()
        .route("/user/friends", get(handlers::list_friends))
        .route(
            "/user/friends/:username",
            post(handlers::add_friend).delete(handlers::remove_friend),
        )
}
