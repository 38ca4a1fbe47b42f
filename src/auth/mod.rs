//! # Auth Module
//!
//! Signup, password login, sign-in with Spotify, and the session token
//! resolver used by every protected route:
//! - [`AuthedUser`] for any signed-in user
//! - [`AdminUser`] for users with the admin flag

pub mod extractors;
pub mod handlers;
pub mod models;
pub mod password;
pub mod routes;
pub mod session;


pub use extractors::{AdminUser, AuthedUser};
pub use routes::auth_routes;
