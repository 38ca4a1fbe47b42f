// src/spotify/models.rs
//! Spotify Web API payloads and the shapes this service returns

use serde::{Deserialize, Serialize};

/// Access token (short-lived) and refresh token (long-lived) owned by one user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Response of `POST /api/token`
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    #[allow(dead_code)]
    pub expires_in: Option<i64>,
    #[allow(dead_code)]
    pub scope: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SpotifyProfile {
    pub id: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
}

/// One page of a paginated Spotify collection
#[derive(Debug, Deserialize)]
pub struct Paging<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    pub next: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ExternalUrls {
    pub spotify: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyPlaylist {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpotifyImage {
    pub url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpotifyAlbum {
    pub name: Option<String>,
    #[serde(default)]
    pub images: Vec<SpotifyImage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpotifyArtist {
    #[serde(default)]
    pub name: String,
}

/// A track as returned by playlists, top tracks, recently played and
/// recommendations. Everything is optional because local files and
/// unavailable tracks come back with holes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpotifyTrack {
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(default)]
    pub artists: Vec<SpotifyArtist>,
    pub album: Option<SpotifyAlbum>,
    pub popularity: Option<u32>,
    #[serde(default)]
    pub external_urls: ExternalUrls,
    pub available_markets: Option<Vec<String>>,
    pub is_playable: Option<bool>,
    #[serde(default)]
    pub is_local: bool,
    /// "track" or "episode"
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

impl SpotifyTrack {
    pub fn is_music_track(&self) -> bool {
        !self.is_local && self.kind.as_deref().map_or(true, |k| k == "track")
    }

    pub fn first_artist(&self) -> Option<&str> {
        self.artists
            .first()
            .map(|a| a.name.as_str())
            .filter(|n| !n.is_empty())
    }

    pub fn cover_url(&self) -> Option<&str> {
        self.album
            .as_ref()
            .and_then(|a| a.images.first())
            .map(|i| i.url.as_str())
            .filter(|u| !u.is_empty())
    }

    pub fn link(&self, id: &str) -> String {
        self.external_urls
            .spotify
            .clone()
            .unwrap_or_else(|| format!("https://open.spotify.com/track/{}", id))
    }

    /// Available in `market`: listed in `available_markets`, or, when the
    /// provider omitted the list, not flagged unplayable
    pub fn is_available_in(&self, market: &str) -> bool {
        match &self.available_markets {
            Some(markets) => markets.iter().any(|m| m.eq_ignore_ascii_case(market)),
            None => self.is_playable != Some(false),
        }
    }
}

/// Entry of a playlist's item list; `track` is null for removed tracks
#[derive(Debug, Deserialize)]
pub struct PlaylistItem {
    pub track: Option<SpotifyTrack>,
}

#[derive(Debug, Deserialize)]
pub struct PlayHistory {
    pub track: SpotifyTrack,
    pub played_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RecommendationsResponse {
    #[serde(default)]
    pub tracks: Vec<SpotifyTrack>,
}

/// Display shape of a blended track
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlendedTrack {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub link: String,
    pub cover: String,
}

impl BlendedTrack {
    /// `None` when the track lacks an id, name, artist or cover image
    pub fn from_track(track: &SpotifyTrack) -> Option<Self> {
        let id = track.id.as_deref().filter(|s| !s.is_empty())?;
        let title = track.name.as_deref().filter(|s| !s.is_empty())?;
        let artist = track.first_artist()?;
        let cover = track.cover_url()?;

        Some(Self {
            id: id.to_string(),
            title: title.to_string(),
            artist: artist.to_string(),
            link: track.link(id),
            cover: cover.to_string(),
        })
    }
}

/// Track shape used by top tracks, recently played and recommendations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrackSummary {
    pub id: String,
    pub name: String,
    pub artists: Vec<String>,
    pub album: Option<String>,
    pub popularity: u32,
    pub link: String,
    pub cover: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub played_at: Option<String>,
}

impl TrackSummary {
    pub fn from_track(track: &SpotifyTrack) -> Option<Self> {
        let id = track.id.as_deref().filter(|s| !s.is_empty())?;
        let name = track.name.as_deref().filter(|s| !s.is_empty())?;

        Some(Self {
            id: id.to_string(),
            name: name.to_string(),
            artists: track
                .artists
                .iter()
                .filter(|a| !a.name.is_empty())
                .map(|a| a.name.clone())
                .collect(),
            album: track.album.as_ref().and_then(|a| a.name.clone()),
            popularity: track.popularity.unwrap_or(0),
            link: track.link(id),
            cover: track.cover_url().map(str::to_string),
            played_at: None,
        })
    }
}

/// Playlist created on the caller's account
#[derive(Debug, Clone, Serialize)]
pub struct CreatedPlaylist {
    pub id: String,
    pub name: String,
    pub link: Option<String>,
    pub tracks_added: usize,
}

#[derive(Debug, Deserialize, Default)]
pub struct CreatePlaylistRequest {
    pub track_ids: Option<Vec<String>>,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct BlendQuery {
    pub friend_id: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct RecommendQuery {
    pub seed_tracks: Option<String>,
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
pub struct TopTracksQuery {
    pub limit: Option<u32>,
    pub time_range: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct RecentlyPlayedQuery {
    pub limit: Option<u32>,
}
