//! Playlist model and related functionality

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Playlist entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Playlist {
    pub id: i32,
    pub user_id: i32,
    pub image_url: String,
    pub genre: String,
    pub min_danceability: f64,
    pub max_danceability: f64,
    pub created_at: DateTime<Utc>,
}

/// New playlist creation payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPlaylist {
    pub user_id: i32,
    pub image_url: String,
    pub genre: String,
    pub min_danceability: f64,
    pub max_danceability: f64,
}

/// Filter values chosen in the playlist wizard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistCriteria {
    pub genre: String,
    pub min_danceability: f64,
    pub max_danceability: f64,
}

impl NewPlaylist {
    /// Playlist row for `user_id` generated from `criteria`
    pub fn from_criteria(user_id: i32, criteria: &PlaylistCriteria, image_url: String) -> Self {
        Self {
            user_id,
            image_url,
            genre: criteria.genre.clone(),
            min_danceability: criteria.min_danceability,
            max_danceability: criteria.max_danceability,
        }
    }
}

/// Playlist wizard form
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePlaylistForm {
    pub genre: String,
    #[serde(rename = "minDanceability")]
    pub min_danceability: String,
    #[serde(rename = "maxDanceability")]
    pub max_danceability: String,
}

/// Playlist selection form on the playlists page
#[derive(Debug, Clone, Deserialize)]
pub struct ChoosePlaylistForm {
    #[serde(rename = "playlistId")]
    pub playlist_id: String,
}
