//! # Spotify Module
//!
//! OAuth linking, the per-user token lifecycle, and every feature built on
//! the Spotify Web API: blends, playlist creation, top tracks, recently
//! played and recommendations.

pub mod blend;
pub mod client;
pub mod error;
pub mod handlers;
pub mod models;
pub mod oauth;
pub mod recommend;
pub mod routes;
pub mod tokens;


pub use client::{HttpSpotifyClient, SpotifyApi};
pub use recommend::{HttpRecommendationClient, RecommendationApi};
pub use routes::spotify_routes;
pub use tokens::SpotifyTokens;
