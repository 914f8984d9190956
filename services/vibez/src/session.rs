//! Server-side sessions
//!
//! The browser only holds an opaque session id cookie. The state behind it
//! (logged-in user, wizard choices, selected playlist, flash messages) lives
//! in a [`SessionStore`]: Redis in production, process memory otherwise.

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::Result;
use async_trait::async_trait;
use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use common::cache::RedisPool;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, error};
use uuid::Uuid;

use crate::{error::AppError, models::PlaylistCriteria, ports::SessionStore, state::AppState};

/// Everything remembered between requests
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    /// Set at login; the only authorization gate of protected routes
    #[serde(default)]
    pub user_id: Option<i32>,
    #[serde(default)]
    pub criteria: Option<PlaylistCriteria>,
    /// Comma separated track ids of the playlist picked on the playlists page
    #[serde(default)]
    pub track_ids: Option<String>,
    #[serde(default)]
    pub flashes: Vec<String>,
}

struct SessionInner {
    data: SessionData,
    dirty: bool,
}

/// Handle to the current request's session, placed in request extensions by
/// [`session_middleware`]
#[derive(Clone)]
pub struct Session {
    inner: Arc<Mutex<SessionInner>>,
}

impl Session {
    pub fn new(data: SessionData) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SessionInner { data, dirty: false })),
        }
    }

    async fn update<F: FnOnce(&mut SessionData)>(&self, f: F) {
        let mut inner = self.inner.lock().await;
        f(&mut inner.data);
        inner.dirty = true;
    }

    pub async fn user_id(&self) -> Option<i32> {
        self.inner.lock().await.data.user_id
    }

    pub async fn log_in(&self, user_id: i32) {
        self.update(|data| data.user_id = Some(user_id)).await;
    }

    /// Forget the user and everything chosen while logged in. Pending flashes
    /// survive so the next page can still show them.
    pub async fn clear(&self) {
        self.update(|data| {
            let flashes = std::mem::take(&mut data.flashes);
            *data = SessionData {
                flashes,
                ..SessionData::default()
            };
        })
        .await;
    }

    pub async fn criteria(&self) -> Option<PlaylistCriteria> {
        self.inner.lock().await.data.criteria.clone()
    }

    pub async fn set_criteria(&self, criteria: PlaylistCriteria) {
        self.update(|data| data.criteria = Some(criteria)).await;
    }

    pub async fn track_ids(&self) -> Option<String> {
        self.inner.lock().await.data.track_ids.clone()
    }

    pub async fn set_track_ids(&self, track_ids: String) {
        self.update(|data| data.track_ids = Some(track_ids)).await;
    }

    /// Queue a message for the next rendered page
    pub async fn flash(&self, message: impl Into<String>) {
        let message = message.into();
        self.update(|data| data.flashes.push(message)).await;
    }

    /// Drain the pending flash messages
    pub async fn take_flashes(&self) -> Vec<String> {
        let mut inner = self.inner.lock().await;
        if inner.data.flashes.is_empty() {
            return Vec::new();
        }
        inner.dirty = true;
        std::mem::take(&mut inner.data.flashes)
    }

    /// The session state if anything changed during the request
    async fn changes(&self) -> Option<SessionData> {
        let inner = self.inner.lock().await;
        inner.dirty.then(|| inner.data.clone())
    }

    async fn data(&self) -> SessionData {
        self.inner.lock().await.data.clone()
    }
}

async fn save_session(state: &AppState, id: Uuid, data: &SessionData) -> Result<(), AppError> {
    state
        .sessions
        .save(id, data, state.session_settings.ttl_seconds)
        .await
        .map_err(|e| {
            error!("Failed to save session: {}", e);
            AppError::SessionStore
        })?;
    debug!("Saved session {}", id);
    Ok(())
}

/// Load the session named by the request cookie, expose it to handlers and
/// persist it afterwards. Stored sessions are written back on every request
/// so their TTL counts from the last visit.
pub async fn session_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let settings = &state.session_settings;

    let existing = jar
        .get(&settings.cookie_name)
        .and_then(|cookie| Uuid::parse_str(cookie.value()).ok());

    let loaded = match existing {
        Some(id) => state
            .sessions
            .load(id)
            .await
            .map_err(|e| {
                error!("Failed to load session: {}", e);
                AppError::SessionStore
            })?
            .map(|data| (id, data)),
        None => None,
    };

    let stored = loaded.is_some();
    let (id, data) = loaded.unwrap_or_else(|| (Uuid::new_v4(), SessionData::default()));
    let session = Session::new(data);
    req.extensions_mut().insert(session.clone());

    let response = next.run(req).await;

    let Some(data) = session.changes().await else {
        if stored {
            save_session(&state, id, &session.data().await).await?;
        }
        return Ok(response);
    };

    // Nothing left worth remembering
    if data == SessionData::default() {
        state.sessions.delete(id).await.map_err(|e| {
            error!("Failed to delete session: {}", e);
            AppError::SessionStore
        })?;

        let cookie = Cookie::build((settings.cookie_name.clone(), ""))
            .path("/")
            .build();
        return Ok((jar.remove(cookie), response).into_response());
    }

    save_session(&state, id, &data).await?;

    let cookie = Cookie::build((settings.cookie_name.clone(), id.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);

    Ok((jar.add(cookie), response).into_response())
}

/// Sessions kept in Redis under `session:{id}`
#[derive(Clone)]
pub struct RedisSessionStore {
    pool: RedisPool,
}

impl RedisSessionStore {
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }

    fn key(id: Uuid) -> String {
        format!("session:{}", id)
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn load(&self, id: Uuid) -> Result<Option<SessionData>> {
        Ok(self.pool.get_json(&Self::key(id)).await?)
    }

    async fn save(&self, id: Uuid, data: &SessionData, ttl_seconds: u64) -> Result<()> {
        self.pool
            .set_json(&Self::key(id), data, Some(ttl_seconds))
            .await?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        self.pool.delete(&Self::key(id)).await?;
        Ok(())
    }
}

struct MemoryEntry {
    data: SessionData,
    expires_at: Instant,
}

/// Sessions kept in process memory
#[derive(Clone, Default)]
pub struct MemorySessionStore {
    entries: Arc<Mutex<HashMap<Uuid, MemoryEntry>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, id: Uuid) -> Result<Option<SessionData>> {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();

        // Drop expired entries lazily
        entries.retain(|_, entry| entry.expires_at > now);

        Ok(entries.get(&id).map(|entry| entry.data.clone()))
    }

    async fn save(&self, id: Uuid, data: &SessionData, ttl_seconds: u64) -> Result<()> {
        let mut entries = self.entries.lock().await;
        entries.insert(
            id,
            MemoryEntry {
                data: data.clone(),
                expires_at: Instant::now() + Duration::from_secs(ttl_seconds),
            },
        );
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        self.entries.lock().await.remove(&id);
        Ok(())
    }
}
