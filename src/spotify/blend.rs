// src/spotify/blend.rs
//! Playlist blending: the tracks two friends both have in their playlists

use std::collections::HashSet;
use tracing::{debug, info};

use super::error::{BlendError, SpotifyError};
use super::models::{BlendedTrack, SpotifyTrack};
use super::tokens::SpotifyTokens;
use crate::users::{User, UserStore};

/// Every track of every playlist on the account, playlists and tracks in
/// the order Spotify returns them. A token refreshed on one call is reused
/// for the rest.
pub async fn collect_account_tracks(
    tokens: &SpotifyTokens,
    user: &mut User,
) -> Result<Vec<SpotifyTrack>, SpotifyError> {
    let playlists = tokens
        .with_access_token(user, |api, token| async move {
            api.current_user_playlists(&token).await
        })
        .await?;

    let mut tracks = Vec::new();
    for playlist in &playlists {
        let playlist_id = playlist.id.as_str();
        let items = tokens
            .with_access_token(user, move |api, token| async move {
                api.playlist_tracks(&token, playlist_id).await
            })
            .await?;
        tracks.extend(items);
    }

    debug!(
        user_id = %user.id,
        playlists = playlists.len(),
        tracks = tracks.len(),
        "Collected account tracks"
    );
    Ok(tracks)
}

/// Tracks from `mine` whose id also appears in `theirs`, in `mine` order.
/// Each id is kept once; tracks without an id, name, artist or cover are
/// skipped.
pub fn intersect_tracks(mine: &[SpotifyTrack], theirs: &[SpotifyTrack]) -> Vec<BlendedTrack> {
    let their_ids: HashSet<&str> = theirs.iter().filter_map(|t| t.id.as_deref()).collect();
    let mut seen = HashSet::new();

    mine.iter()
        .filter(|t| t.id.as_deref().map_or(false, |id| their_ids.contains(id)))
        .filter_map(BlendedTrack::from_track)
        .filter(|t| seen.insert(t.id.clone()))
        .collect()
}

/// Blends `user` with the friend named by `friend_ref` (username or id)
pub async fn blend(
    tokens: &SpotifyTokens,
    users: &UserStore,
    user: &User,
    friend_ref: &str,
) -> Result<Vec<BlendedTrack>, BlendError> {
    let mut friend = users
        .find_by_username_or_id(friend_ref)
        .await?
        .ok_or(BlendError::FriendNotFound)?;

    if !user.has_friend(&friend.id) {
        return Err(BlendError::NotFriends);
    }
    if !friend.is_spotify_linked() {
        return Err(BlendError::FriendNotLinked);
    }
    if !user.is_spotify_linked() {
        return Err(SpotifyError::NotLinked.into());
    }

    let mut me = user.clone();
    let mine = collect_account_tracks(tokens, &mut me).await?;
    let theirs = collect_account_tracks(tokens, &mut friend).await?;
    let blended = intersect_tracks(&mine, &theirs);

    info!(
        user_id = %user.id,
        friend_id = %friend.id,
        tracks = blended.len(),
        "Blend computed"
    );
    Ok(blended)
}
