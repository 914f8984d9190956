//! Playlist generation
//!
//! Asks the music API for recommendations matching the wizard criteria, stores
//! a playlist row and links every returned track to it. Songs are inserted
//! only the first time their track id is seen; link rows are always inserted.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    models::{NewPlaylist, NewSong, Playlist, PlaylistCriteria, Track},
    ports::{MusicClient, PlaylistStore, SongStore},
    state::AppState,
};

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("music API request failed: {0}")]
    Music(#[source] anyhow::Error),

    #[error("storage failure: {0}")]
    Storage(#[source] anyhow::Error),

    #[error("no tracks matched the criteria")]
    NoTracks,
}

/// A stored playlist together with the tracks it was generated from
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedPlaylist {
    pub playlist: Playlist,
    pub tracks: Vec<Track>,
    /// How many tracks were new to the song table
    pub new_songs: usize,
}

#[derive(Clone)]
pub struct PlaylistGenerator {
    playlists: Arc<dyn PlaylistStore>,
    songs: Arc<dyn SongStore>,
    music: Arc<dyn MusicClient>,
}

impl PlaylistGenerator {
    pub fn new(
        playlists: Arc<dyn PlaylistStore>,
        songs: Arc<dyn SongStore>,
        music: Arc<dyn MusicClient>,
    ) -> Self {
        Self {
            playlists,
            songs,
            music,
        }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(
            state.playlists.clone(),
            state.songs.clone(),
            state.music.clone(),
        )
    }

    /// Generate and persist a playlist for `user_id`
    pub async fn generate(
        &self,
        user_id: i32,
        criteria: &PlaylistCriteria,
    ) -> Result<GeneratedPlaylist, GenerateError> {
        let token = self
            .music
            .access_token()
            .await
            .map_err(GenerateError::Music)?;
        let tracks = self
            .music
            .recommendations(&token, criteria)
            .await
            .map_err(GenerateError::Music)?;

        let Some(first) = tracks.first() else {
            return Err(GenerateError::NoTracks);
        };

        let image_url = first.cover_image().unwrap_or_default().to_string();
        let playlist = self
            .playlists
            .create(&NewPlaylist::from_criteria(user_id, criteria, image_url))
            .await
            .map_err(GenerateError::Storage)?;

        // Sequential on purpose: a track repeated within one response must see
        // the song inserted for its first occurrence.
        let mut new_songs = 0;
        for track in &tracks {
            let known = self
                .songs
                .find(&track.id)
                .await
                .map_err(GenerateError::Storage)?;

            if known.is_none() {
                self.songs
                    .create(&NewSong::from(track))
                    .await
                    .map_err(GenerateError::Storage)?;
                new_songs += 1;
            } else {
                debug!("Song {} already stored", track.id);
            }

            self.playlists
                .add_song(playlist.id, &track.id)
                .await
                .map_err(GenerateError::Storage)?;
        }

        info!(
            "Generated playlist {} with {} tracks ({} new songs) for user {}",
            playlist.id,
            tracks.len(),
            new_songs,
            user_id
        );

        Ok(GeneratedPlaylist {
            playlist,
            tracks,
            new_songs,
        })
    }
}
