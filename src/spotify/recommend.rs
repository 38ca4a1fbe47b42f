// src/spotify/recommend.rs
//! Recommendation adapter over an external recommendation service

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error};

use super::error::RecommendError;
use super::models::{RecommendationsResponse, SpotifyTrack, TrackSummary};
use crate::common::config::RecommendationConfig;

/// Most seed tracks a single request may carry
pub const MAX_SEEDS: usize = 5;

#[async_trait]
pub trait RecommendationApi: Send + Sync {
    async fn recommendations(
        &self,
        seeds: &[String],
        market: &str,
        limit: u32,
    ) -> Result<Vec<SpotifyTrack>, RecommendError>;
}

#[derive(Debug, Clone)]
pub struct HttpRecommendationClient {
    config: RecommendationConfig,
    client: Client,
}

impl HttpRecommendationClient {
    pub fn new(config: RecommendationConfig, timeout: Duration) -> Result<Self, RecommendError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RecommendError::Upstream(e.to_string()))?;

        Ok(Self { config, client })
    }
}

#[async_trait]
impl RecommendationApi for HttpRecommendationClient {
    async fn recommendations(
        &self,
        seeds: &[String],
        market: &str,
        limit: u32,
    ) -> Result<Vec<SpotifyTrack>, RecommendError> {
        let url = format!(
            "{}/recommendations",
            self.config.api_url.trim_end_matches('/')
        );
        let seed_tracks = seeds.join(",");
        let limit = limit.to_string();

        let mut request = self.client.get(&url).query(&[
            ("seed_tracks", seed_tracks.as_str()),
            ("market", market),
            ("limit", limit.as_str()),
        ]);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        debug!(seeds = seeds.len(), market = %market, "Requesting recommendations");

        let response = request
            .send()
            .await
            .map_err(|e| RecommendError::Upstream(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!(status = %status, error = %error_text, "Recommendation service error");
            return Err(RecommendError::Upstream(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let body = response
            .json::<RecommendationsResponse>()
            .await
            .map_err(|e| RecommendError::Upstream(e.to_string()))?;
        Ok(body.tracks)
    }
}

/// Splits the comma separated `seed_tracks` value
pub fn parse_seeds(raw: Option<&str>) -> Result<Vec<String>, RecommendError> {
    let seeds: Vec<String> = raw
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    match seeds.len() {
        0 => Err(RecommendError::MissingSeed),
        n if n > MAX_SEEDS => Err(RecommendError::TooManySeeds {
            max: MAX_SEEDS,
            got: n,
        }),
        _ => Ok(seeds),
    }
}

/// Keeps popular tracks available in `market`, most popular first.
/// Equal popularity keeps provider order.
pub fn rank_tracks(tracks: &[SpotifyTrack], market: &str) -> Vec<TrackSummary> {
    let mut ranked: Vec<TrackSummary> = tracks
        .iter()
        .filter(|t| t.popularity.unwrap_or(0) > 0 && t.is_available_in(market))
        .filter_map(TrackSummary::from_track)
        .collect();

    ranked.sort_by(|a, b| b.popularity.cmp(&a.popularity));
    ranked
}

pub async fn recommend(
    api: &dyn RecommendationApi,
    market: &str,
    raw_seeds: Option<&str>,
    limit: u32,
) -> Result<Vec<TrackSummary>, RecommendError> {
    let seeds = parse_seeds(raw_seeds)?;
    let tracks = api.recommendations(&seeds, market, limit).await?;
    let ranked = rank_tracks(&tracks, market);

    debug!(
        received = tracks.len(),
        kept = ranked.len(),
        "Recommendations ranked"
    );
    Ok(ranked)
}
