//! PostgreSQL repositories backing the store ports

pub mod playlist;
pub mod song;
pub mod user;

pub use playlist::PlaylistRepository;
pub use song::SongRepository;
pub use user::UserRepository;
