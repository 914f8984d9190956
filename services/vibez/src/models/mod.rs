//! Vibez models: persisted entities, form payloads and music API values

pub mod music;
pub mod playlist;
pub mod song;
pub mod user;

// Re-export for convenience
pub use music::{AccessToken, Track};
pub use playlist::{ChoosePlaylistForm, CreatePlaylistForm, NewPlaylist, Playlist, PlaylistCriteria};
pub use song::{NewSong, Song};
pub use user::{LoginForm, NewUser, RegisterForm, User};
