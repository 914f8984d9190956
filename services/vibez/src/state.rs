//! Application state shared across handlers

use std::sync::Arc;

use crate::{
    config::SessionSettings,
    ports::{MusicClient, PlaylistStore, SessionStore, SongStore, UserStore},
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub playlists: Arc<dyn PlaylistStore>,
    pub songs: Arc<dyn SongStore>,
    pub music: Arc<dyn MusicClient>,
    pub sessions: Arc<dyn SessionStore>,
    pub session_settings: SessionSettings,
}
