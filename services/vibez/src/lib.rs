//! Vibez web service
//!
//! Users register, log in and generate playlists from the Spotify
//! recommendation API by choosing a genre and a danceability range. Generated
//! playlists and their songs are stored in PostgreSQL; sessions live in Redis
//! or in process memory.

pub mod config;
pub mod error;
pub mod generator;
pub mod middleware;
pub mod models;
pub mod ports;
pub mod repositories;
pub mod routes;
pub mod session;
pub mod spotify;
pub mod state;
pub mod validation;

#[cfg(test)]
pub mod test_utils;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use state::AppState;
