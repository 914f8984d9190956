//! Song model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::music::Track;

/// Song entity, keyed by the music API's track id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Song {
    pub track_id: String,
    pub title: String,
    pub artist: String,
}

/// New song creation payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSong {
    pub track_id: String,
    pub title: String,
    pub artist: String,
}

impl From<&Track> for NewSong {
    fn from(track: &Track) -> Self {
        Self {
            track_id: track.id.clone(),
            title: track.name.clone(),
            artist: track.artist_credit(),
        }
    }
}
