//! Values returned by the external music API, decoupled from its wire format

use serde::{Deserialize, Serialize};

/// Bearer token issued by the music API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: String,
    /// Lifetime in seconds
    pub expires_in: u64,
}

/// A track as shown to the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    pub artists: Vec<String>,
    pub album: String,
    /// Album artwork URLs, largest first
    pub images: Vec<String>,
    pub preview_url: Option<String>,
    pub external_url: Option<String>,
}

impl Track {
    /// All credited artist names, comma separated
    pub fn artist_credit(&self) -> String {
        self.artists.join(", ")
    }

    /// Playlist cover candidate: the medium-sized album image when present,
    /// otherwise whatever image the album has.
    pub fn cover_image(&self) -> Option<&str> {
        self.images
            .get(1)
            .or_else(|| self.images.first())
            .map(String::as_str)
    }
}
