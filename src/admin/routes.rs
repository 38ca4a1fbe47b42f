// src/admin/routes.rs

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

pub fn admin_routes() -> Router {
    Router::new()
        // User management
        .route("/admin/users", get(handlers::users::list_users))
        .route(
            "/admin/users/:username",
            get(handlers::users::get_user).delete(handlers::users::delete_user),
        )
        // Admin flag
        .route(
            "/admin/permissions/:id",
            post(handlers::permissions::grant_admin)
                .delete(handlers::permissions::revoke_admin),
        )
}
