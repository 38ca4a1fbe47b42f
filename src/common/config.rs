// src/common/config.rs
//! Application configuration loaded from environment variables

use std::collections::HashSet;
use std::env;
use std::time::Duration;

/// Spotify OAuth client settings and endpoint bases
#[derive(Debug, Clone)]
pub struct SpotifyConfig {
    pub client_id: String,
    pub client_secret: String,
    /// Redirect URI used when an authenticated user links an account
    pub redirect_uri: String,
    /// Redirect URI used when signing in with an already linked account
    pub login_redirect_uri: String,
    pub scopes: String,
    pub accounts_url: String,
    pub api_url: String,
}

/// External recommendation service settings
#[derive(Debug, Clone)]
pub struct RecommendationConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    /// Region a recommended track must be available in
    pub market: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub port: u16,
    pub jwt_secret: String,
    pub session_ttl_hours: i64,
    pub cookie_secure: bool,
    pub cors_origins: Vec<String>,
    pub frontend_url: String,
    pub admin_usernames: HashSet<String>,
    pub http_timeout: Duration,
    pub spotify: SpotifyConfig,
    pub recommendations: RecommendationConfig,
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn flag(key: &str) -> bool {
    var_or(key, "false").to_lowercase() == "true"
}

/// Splits a comma separated list, trimming entries and dropping empties
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

impl AppConfig {
    pub fn from_env() -> Self {
        let admin_usernames = parse_list(&var_or("ADMIN_USERNAMES", ""))
            .into_iter()
            .map(|u| u.to_lowercase())
            .collect();

        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(8000);

        let session_ttl_hours = env::var("SESSION_TTL_HOURS")
            .ok()
            .and_then(|h| h.parse::<i64>().ok())
            .filter(|h| *h > 0)
            .unwrap_or(24);

        let http_timeout = env::var("HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|s| *s > 0)
            .unwrap_or(10);

        Self {
            database_url: var_or("DATABASE_URL", "sqlite://trackmates.db"),
            port,
            jwt_secret: var_or("JWT_SECRET", "replace_with_strong_secret"),
            session_ttl_hours,
            cookie_secure: flag("COOKIE_SECURE"),
            cors_origins: parse_list(&var_or(
                "CORS_ORIGINS",
                "http://localhost:5173,http://localhost:5500",
            )),
            frontend_url: var_or("FRONTEND_URL", "http://localhost:5173"),
            admin_usernames,
            http_timeout: Duration::from_secs(http_timeout),
            spotify: SpotifyConfig {
                client_id: var_or("SPOTIFY_CLIENT_ID", ""),
                client_secret: var_or("SPOTIFY_CLIENT_SECRET", ""),
                redirect_uri: var_or(
                    "SPOTIFY_REDIRECT_URI",
                    "http://localhost:8000/spotify/callback",
                ),
                login_redirect_uri: var_or(
                    "SPOTIFY_LOGIN_REDIRECT_URI",
                    "http://localhost:8000/auth/callback",
                ),
                scopes: var_or(
                    "SPOTIFY_SCOPES",
                    "user-read-email playlist-read-private playlist-read-collaborative \
                     playlist-modify-private user-top-read user-read-recently-played",
                ),
                accounts_url: var_or("SPOTIFY_ACCOUNTS_URL", "https://accounts.spotify.com"),
                api_url: var_or("SPOTIFY_API_URL", "https://api.spotify.com/v1"),
            },
            recommendations: RecommendationConfig {
                api_url: var_or("RECOMMENDATION_API_URL", "https://api.spotify.com/v1"),
                api_key: env::var("RECOMMENDATION_API_KEY")
                    .ok()
                    .filter(|k| !k.is_empty()),
                market: var_or("RECOMMENDATION_MARKET", "US"),
            },
        }
    }

    pub fn is_admin_username(&self, username: &str) -> bool {
        self.admin_usernames.contains(&username.to_lowercase())
    }
}

#[cfg(test)]
impl AppConfig {
    /// Deterministic configuration for tests, independent of the environment
    pub fn for_tests() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            port: 0,
            jwt_secret: "test_secret".to_string(),
            session_ttl_hours: 1,
            cookie_secure: false,
            cors_origins: Vec::new(),
            frontend_url: "http://frontend.test".to_string(),
            admin_usernames: ["root".to_string()].into_iter().collect(),
            http_timeout: Duration::from_secs(1),
            spotify: SpotifyConfig {
                client_id: "client-id".to_string(),
                client_secret: "client-secret".to_string(),
                redirect_uri: "http://localhost:8000/spotify/callback".to_string(),
                login_redirect_uri: "http://localhost:8000/auth/callback".to_string(),
                scopes: "playlist-read-private user-top-read".to_string(),
                accounts_url: "http://accounts.test".to_string(),
                api_url: "http://api.test/v1".to_string(),
            },
            recommendations: RecommendationConfig {
                api_url: "http://recs.test".to_string(),
                api_key: None,
                market: "US".to_string(),
            },
        }
    }
}
