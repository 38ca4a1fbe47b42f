//! User routes

use axum::{routing::get, Router};

use super::handlers;

/// # Routes
/// - `GET|PATCH|DELETE /user/me` - The caller's own account
/// - `GET /user/find/:target` - Look up a user by username or id
pub fn user_routes() -> Router {
    Router::new()
        .route(
            "/user/me",
            get(handlers::me)
                .patch(handlers::update_me)
                .delete(handlers::delete_me),
        )
        .route("/user/find/:target", get(handlers::find_user))
}
