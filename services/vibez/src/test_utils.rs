use std::{collections::HashMap, sync::Arc};

use anyhow::{Result, bail};
use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, Response, header},
};
use chrono::Utc;
use serde_json::Value;
use tokio::sync::Mutex;
use tower::util::ServiceExt;

use crate::{
    config::{SessionBackend, SessionSettings},
    models::{
        AccessToken, NewPlaylist, NewSong, NewUser, Playlist, PlaylistCriteria, Song, Track, User,
    },
    ports::{MusicClient, PlaylistStore, SessionStore, SongStore, UserStore},
    routes::create_router,
    session::MemorySessionStore,
    state::AppState,
};

pub fn sample_token() -> AccessToken {
    AccessToken {
        access_token: "test-token".to_string(),
        token_type: "Bearer".to_string(),
        expires_in: 3600,
    }
}

pub fn sample_track(id: &str, name: &str) -> Track {
    Track {
        id: id.to_string(),
        name: name.to_string(),
        artists: vec!["Daft Punk".to_string()],
        album: "Discovery".to_string(),
        images: vec![
            format!("https://i.scdn.co/image/{}-640", id),
            format!("https://i.scdn.co/image/{}-300", id),
        ],
        preview_url: None,
        external_url: None,
    }
}

#[derive(Default)]
struct StoreInner {
    users: Vec<User>,
    playlists: Vec<Playlist>,
    songs: HashMap<String, Song>,
    links: Vec<(i32, String)>,
}

/// In-memory stand-in for the PostgreSQL repositories
#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<Mutex<StoreInner>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn seed_user(&self, first_name: &str, email: &str, password: &str) -> User {
        UserStore::create(
            self,
            &NewUser {
                first_name: first_name.to_string(),
                last_name: "Kim".to_string(),
                email: email.to_string(),
                password: password.to_string(),
            },
        )
        .await
        .unwrap()
    }

    pub async fn seed_song(&self, track_id: &str, title: &str) -> Song {
        SongStore::create(
            self,
            &NewSong {
                track_id: track_id.to_string(),
                title: title.to_string(),
                artist: "Daft Punk".to_string(),
            },
        )
        .await
        .unwrap()
    }

    /// A playlist owned by `user_id` linked to `track_ids`
    pub async fn seed_playlist(&self, user_id: i32, genre: &str, track_ids: &[&str]) -> Playlist {
        let criteria = PlaylistCriteria {
            genre: genre.to_string(),
            min_danceability: 0.2,
            max_danceability: 0.8,
        };
        let playlist = PlaylistStore::create(
            self,
            &NewPlaylist::from_criteria(user_id, &criteria, String::new()),
        )
        .await
        .unwrap();

        for track_id in track_ids {
            if SongStore::find(self, track_id).await.unwrap().is_none() {
                self.seed_song(track_id, track_id).await;
            }
            self.add_song(playlist.id, track_id).await.unwrap();
        }

        playlist
    }

    pub async fn users_with_email(&self, email: &str) -> usize {
        let inner = self.inner.lock().await;
        inner.users.iter().filter(|u| u.email == email).count()
    }

    pub async fn song_count(&self) -> usize {
        self.inner.lock().await.songs.len()
    }

    pub async fn link_track_ids(&self, playlist_id: i32) -> Vec<String> {
        self.track_ids(playlist_id).await.unwrap()
    }

    pub async fn playlists_of(&self, user_id: i32) -> Vec<Playlist> {
        self.list_by_user(user_id).await.unwrap()
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let inner = self.inner.lock().await;
        Ok(inner.users.iter().find(|u| u.email == email).cloned())
    }

    async fn create(&self, new_user: &NewUser) -> Result<User> {
        let mut inner = self.inner.lock().await;
        let user = User {
            id: inner.users.len() as i32 + 1,
            first_name: new_user.first_name.clone(),
            last_name: new_user.last_name.clone(),
            email: new_user.email.clone(),
            password: new_user.password.clone(),
            created_at: Utc::now(),
        };
        inner.users.push(user.clone());
        Ok(user)
    }
}

#[async_trait]
impl PlaylistStore for InMemoryStore {
    async fn create(&self, new_playlist: &NewPlaylist) -> Result<Playlist> {
        let mut inner = self.inner.lock().await;
        if !inner.users.iter().any(|u| u.id == new_playlist.user_id) {
            bail!("playlists.user_id violates foreign key constraint");
        }

        let playlist = Playlist {
            id: inner.playlists.len() as i32 + 1,
            user_id: new_playlist.user_id,
            image_url: new_playlist.image_url.clone(),
            genre: new_playlist.genre.clone(),
            min_danceability: new_playlist.min_danceability,
            max_danceability: new_playlist.max_danceability,
            created_at: Utc::now(),
        };
        inner.playlists.push(playlist.clone());
        Ok(playlist)
    }

    async fn find_for_user(&self, playlist_id: i32, user_id: i32) -> Result<Option<Playlist>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .playlists
            .iter()
            .find(|p| p.id == playlist_id && p.user_id == user_id)
            .cloned())
    }

    async fn list_by_user(&self, user_id: i32) -> Result<Vec<Playlist>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .playlists
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn add_song(&self, playlist_id: i32, track_id: &str) -> Result<()> {
        let mut inner = self.inner.lock().await;
        if !inner.songs.contains_key(track_id) {
            bail!("playlist_songs.track_id violates foreign key constraint");
        }
        inner.links.push((playlist_id, track_id.to_string()));
        Ok(())
    }

    async fn track_ids(&self, playlist_id: i32) -> Result<Vec<String>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .links
            .iter()
            .filter(|(id, _)| *id == playlist_id)
            .map(|(_, track_id)| track_id.clone())
            .collect())
    }
}

#[async_trait]
impl SongStore for InMemoryStore {
    async fn find(&self, track_id: &str) -> Result<Option<Song>> {
        Ok(self.inner.lock().await.songs.get(track_id).cloned())
    }

    async fn create(&self, new_song: &NewSong) -> Result<Song> {
        let mut inner = self.inner.lock().await;
        if inner.songs.contains_key(&new_song.track_id) {
            bail!("duplicate key value violates unique constraint \"songs_pkey\"");
        }

        let song = Song {
            track_id: new_song.track_id.clone(),
            title: new_song.title.clone(),
            artist: new_song.artist.clone(),
        };
        inner.songs.insert(song.track_id.clone(), song.clone());
        Ok(song)
    }
}

/// Music API double serving a fixed catalogue
#[derive(Clone, Default)]
pub struct FakeMusicClient {
    catalogue: Vec<Track>,
    unavailable: bool,
    lookups: Arc<Mutex<Vec<String>>>,
}

impl FakeMusicClient {
    pub fn with_tracks(catalogue: Vec<Track>) -> Self {
        Self {
            catalogue,
            ..Self::default()
        }
    }

    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    /// Id lists passed to `tracks`, in call order
    pub async fn lookups(&self) -> Vec<String> {
        self.lookups.lock().await.clone()
    }
}

#[async_trait]
impl MusicClient for FakeMusicClient {
    async fn access_token(&self) -> Result<AccessToken> {
        if self.unavailable {
            bail!("Spotify token request failed with 503 Service Unavailable");
        }
        Ok(sample_token())
    }

    async fn recommendations(
        &self,
        _token: &AccessToken,
        _criteria: &PlaylistCriteria,
    ) -> Result<Vec<Track>> {
        Ok(self.catalogue.clone())
    }

    async fn tracks(&self, _token: &AccessToken, track_ids: &str) -> Result<Vec<Track>> {
        self.lookups.lock().await.push(track_ids.to_string());
        Ok(track_ids
            .split(',')
            .filter_map(|id| self.catalogue.iter().find(|t| t.id == id).cloned())
            .collect())
    }
}

/// Application state over in-memory stores with a one hour session TTL
pub fn app_state(
    store: &InMemoryStore,
    music: &FakeMusicClient,
    sessions: Arc<dyn SessionStore>,
) -> AppState {
    AppState {
        users: Arc::new(store.clone()),
        playlists: Arc::new(store.clone()),
        songs: Arc::new(store.clone()),
        music: Arc::new(music.clone()),
        sessions,
        session_settings: SessionSettings {
            backend: SessionBackend::Memory,
            ttl_seconds: 3600,
            cookie_name: "vibez_session".to_string(),
        },
    }
}

/// Router over in-memory state plus a cookie-carrying client
pub struct TestApp {
    router: Router,
    cookie: Option<String>,
    pub store: InMemoryStore,
    pub music: FakeMusicClient,
}

impl TestApp {
    pub fn new(music: FakeMusicClient) -> Self {
        let store = InMemoryStore::new();
        let state = app_state(&store, &music, Arc::new(MemorySessionStore::new()));

        Self {
            router: create_router(state),
            cookie: None,
            store,
            music,
        }
    }

    pub async fn get(&mut self, uri: &str) -> Response<Body> {
        let request = Request::builder().method("GET").uri(uri);
        self.send(request, Body::empty()).await
    }

    pub async fn post_form(&mut self, uri: &str, form: &str) -> Response<Body> {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        self.send(request, Body::from(form.to_string())).await
    }

    pub async fn login(&mut self, email: &str, password: &str) {
        let form = format!("email={}&password={}", email.replace('@', "%40"), password);
        let response = self.post_form("/login", &form).await;
        assert_eq!(location(&response), "/homepageloggedin");
        // Drain the login flash
        self.get("/homepageloggedin").await;
    }

    async fn send(
        &mut self,
        mut request: axum::http::request::Builder,
        body: Body,
    ) -> Response<Body> {
        if let Some(cookie) = &self.cookie {
            request = request.header(header::COOKIE, cookie);
        }

        let response = self
            .router
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();

        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let pair = set_cookie.to_str().unwrap().split(';').next().unwrap();
            let value = pair.split_once('=').map(|(_, v)| v).unwrap_or_default();
            self.cookie = (!value.is_empty()).then(|| pair.to_string());
        }

        response
    }
}

pub fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .map(|value| value.to_str().unwrap())
        .unwrap_or_default()
}

pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
