//! Port traits for everything the request handlers talk to.
//!
//! Production implementations live in `repositories`, `spotify` and
//! `session`; tests swap in the fakes from `test_utils` or `mockall` mocks.

use anyhow::Result;
use uuid::Uuid;

use crate::{
    models::{
        AccessToken, NewPlaylist, NewSong, NewUser, Playlist, PlaylistCriteria, Song, Track, User,
    },
    session::SessionData,
};

/// User persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait UserStore: Send + Sync {
    /// First user registered with `email`, if any
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn create(&self, new_user: &NewUser) -> Result<User>;
}

/// Playlist and playlist-song link persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait PlaylistStore: Send + Sync {
    async fn create(&self, new_playlist: &NewPlaylist) -> Result<Playlist>;

    /// The playlist with `playlist_id`, only if it belongs to `user_id`
    async fn find_for_user(&self, playlist_id: i32, user_id: i32) -> Result<Option<Playlist>>;

    /// Every playlist owned by `user_id`, ordered by id
    async fn list_by_user(&self, user_id: i32) -> Result<Vec<Playlist>>;

    /// Insert a link row between a playlist and a song
    async fn add_song(&self, playlist_id: i32, track_id: &str) -> Result<()>;

    /// Track ids of a playlist in insertion order
    async fn track_ids(&self, playlist_id: i32) -> Result<Vec<String>>;
}

/// Song persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait SongStore: Send + Sync {
    async fn find(&self, track_id: &str) -> Result<Option<Song>>;

    async fn create(&self, new_song: &NewSong) -> Result<Song>;
}

/// External music recommendation API
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MusicClient: Send + Sync {
    async fn access_token(&self) -> Result<AccessToken>;

    /// Tracks matching the genre and danceability range of `criteria`
    async fn recommendations(
        &self,
        token: &AccessToken,
        criteria: &PlaylistCriteria,
    ) -> Result<Vec<Track>>;

    /// Details for a comma separated list of track ids
    async fn tracks(&self, token: &AccessToken, track_ids: &str) -> Result<Vec<Track>>;
}

/// Server-side session storage
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self, id: Uuid) -> Result<Option<SessionData>>;

    async fn save(&self, id: Uuid, data: &SessionData, ttl_seconds: u64) -> Result<()>;

    async fn delete(&self, id: Uuid) -> Result<()>;
}
