//! # Users Module
//!
//! The credential store and the routes a user has over their own account.

pub mod handlers;
pub mod models;
pub mod routes;
pub mod store;
pub mod validators;


pub use models::User;
pub use routes::user_routes;
pub use store::UserStore;
