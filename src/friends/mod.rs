//! # Friends Module
//!
//! The mutual friend relation between users and the `/user/friends` routes.

pub mod graph;
pub mod handlers;
pub mod routes;


pub use graph::{FriendError, FriendGraph};
pub use routes::friend_routes;
