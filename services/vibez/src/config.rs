//! Application settings
//!
//! Built-in defaults are overlaid by `VIBEZ_*` environment variables. Nested
//! keys use a double underscore, e.g. `VIBEZ_SPOTIFY__CLIENT_ID` or
//! `VIBEZ_SESSION__BACKEND=memory`. Database and Redis connections keep their
//! own `DATABASE_*` / `REDIS_*` variables, see the `common` crate.

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

/// Where server-side sessions are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionBackend {
    Redis,
    /// Process memory; sessions are lost on restart
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionSettings {
    pub backend: SessionBackend,
    /// Idle lifetime of a session in seconds
    pub ttl_seconds: u64,
    pub cookie_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifySettings {
    pub client_id: String,
    pub client_secret: String,
    pub accounts_url: String,
    pub api_url: String,
    /// Number of tracks requested per generated playlist
    pub recommendation_limit: u32,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub bind_address: String,
    pub session: SessionSettings,
    pub spotify: SpotifySettings,
}

impl AppConfig {
    /// Load the configuration from defaults and the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("bind_address", "0.0.0.0:5000")?
            .set_default("session.backend", "redis")?
            .set_default("session.ttl_seconds", 86_400_i64)?
            .set_default("session.cookie_name", "vibez_session")?
            .set_default("spotify.client_id", "")?
            .set_default("spotify.client_secret", "")?
            .set_default("spotify.accounts_url", "https://accounts.spotify.com")?
            .set_default("spotify.api_url", "https://api.spotify.com/v1")?
            .set_default("spotify.recommendation_limit", 20_i64)?
            .set_default("spotify.timeout_seconds", 10_i64)?
            .add_source(
                Environment::with_prefix("VIBEZ")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }
}
