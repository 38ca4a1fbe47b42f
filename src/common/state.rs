// Application state shared across all modules

use sqlx::SqlitePool;
use std::sync::Arc;

use crate::common::config::AppConfig;
use crate::friends::FriendGraph;
use crate::spotify::{RecommendationApi, SpotifyApi, SpotifyTokens};
use crate::users::UserStore;

/// Services constructed once at startup and handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<AppConfig>,
    pub users: UserStore,
    pub friends: FriendGraph,
    pub spotify: Arc<dyn SpotifyApi>,
    pub spotify_tokens: SpotifyTokens,
    pub recommender: Arc<dyn RecommendationApi>,
}

impl AppState {
    pub fn new(
        db: SqlitePool,
        config: AppConfig,
        spotify: Arc<dyn SpotifyApi>,
        recommender: Arc<dyn RecommendationApi>,
    ) -> Self {
        let users = UserStore::new(db.clone());
        let friends = FriendGraph::new(db.clone(), users.clone());
        let spotify_tokens = SpotifyTokens::new(spotify.clone(), users.clone());

        Self {
            db,
            config: Arc::new(config),
            users,
            friends,
            spotify,
            spotify_tokens,
            recommender,
        }
    }
}
