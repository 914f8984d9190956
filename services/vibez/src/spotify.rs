//! Spotify Web API client
//!
//! Uses the client-credentials grant, so it only reaches catalogue endpoints
//! (recommendations and track lookup) and never acts on behalf of a user.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use tracing::{debug, info};

use crate::{
    config::SpotifySettings,
    models::{AccessToken, PlaylistCriteria, Track},
    ports::MusicClient,
};

/// Largest id list the `/tracks` endpoint accepts in one call
const MAX_IDS_PER_LOOKUP: usize = 50;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    token_type: String,
    expires_in: u64,
}

/// Body of both `/recommendations` and `/tracks`
#[derive(Debug, Deserialize)]
struct TracksResponse {
    #[serde(default)]
    tracks: Vec<Option<ApiTrack>>,
}

#[derive(Debug, Deserialize)]
struct ApiTrack {
    id: Option<String>,
    name: String,
    #[serde(default)]
    artists: Vec<ApiArtist>,
    album: ApiAlbum,
    preview_url: Option<String>,
    #[serde(default)]
    external_urls: ExternalUrls,
}

#[derive(Debug, Deserialize)]
struct ApiArtist {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ApiAlbum {
    name: String,
    #[serde(default)]
    images: Vec<ApiImage>,
}

#[derive(Debug, Deserialize)]
struct ApiImage {
    url: String,
}

#[derive(Debug, Default, Deserialize)]
struct ExternalUrls {
    spotify: Option<String>,
}

impl ApiTrack {
    /// Local files and unavailable tracks come back without an id
    fn into_track(self) -> Option<Track> {
        let id = self.id?;
        Some(Track {
            id,
            name: self.name,
            artists: self.artists.into_iter().map(|a| a.name).collect(),
            album: self.album.name,
            images: self.album.images.into_iter().map(|i| i.url).collect(),
            preview_url: self.preview_url,
            external_url: self.external_urls.spotify,
        })
    }
}

impl TracksResponse {
    fn into_tracks(self) -> Vec<Track> {
        self.tracks
            .into_iter()
            .flatten()
            .filter_map(ApiTrack::into_track)
            .collect()
    }
}

/// Turn a non-2xx response into an error carrying the API's message
async fn check_status(response: Response, what: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    bail!("Spotify {} request failed with {}: {}", what, status, body)
}

/// Spotify implementation of [`MusicClient`]
#[derive(Clone)]
pub struct SpotifyClient {
    http: Client,
    settings: SpotifySettings,
}

impl SpotifyClient {
    pub fn new(settings: SpotifySettings) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { http, settings })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/{}", self.settings.api_url.trim_end_matches('/'), path)
    }

    async fn fetch_tracks(
        &self,
        token: &AccessToken,
        url: String,
        query: &[(&str, String)],
        what: &str,
    ) -> Result<Vec<Track>> {
        let response = self
            .http
            .get(url)
            .bearer_auth(&token.access_token)
            .query(query)
            .send()
            .await
            .with_context(|| format!("Spotify {} request failed", what))?;

        let body: TracksResponse = check_status(response, what).await?.json().await?;
        Ok(body.into_tracks())
    }
}

#[async_trait]
impl MusicClient for SpotifyClient {
    async fn access_token(&self) -> Result<AccessToken> {
        if self.settings.client_id.is_empty() || self.settings.client_secret.is_empty() {
            bail!("Spotify client credentials are not configured");
        }

        let url = format!(
            "{}/api/token",
            self.settings.accounts_url.trim_end_matches('/')
        );

        let response = self
            .http
            .post(url)
            .basic_auth(&self.settings.client_id, Some(&self.settings.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .context("Spotify token request failed")?;

        let token: TokenResponse = check_status(response, "token").await?.json().await?;
        debug!("Obtained Spotify token valid for {}s", token.expires_in);

        Ok(AccessToken {
            access_token: token.access_token,
            token_type: token.token_type,
            expires_in: token.expires_in,
        })
    }

    async fn recommendations(
        &self,
        token: &AccessToken,
        criteria: &PlaylistCriteria,
    ) -> Result<Vec<Track>> {
        info!(
            "Requesting {} recommendations with danceability {}..{}",
            criteria.genre, criteria.min_danceability, criteria.max_danceability
        );

        let query = [
            ("seed_genres", criteria.genre.clone()),
            ("min_danceability", criteria.min_danceability.to_string()),
            ("max_danceability", criteria.max_danceability.to_string()),
            ("limit", self.settings.recommendation_limit.to_string()),
        ];

        self.fetch_tracks(token, self.api_url("recommendations"), &query, "recommendations")
            .await
    }

    async fn tracks(&self, token: &AccessToken, track_ids: &str) -> Result<Vec<Track>> {
        let ids: Vec<&str> = track_ids
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .collect();

        let mut tracks = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(MAX_IDS_PER_LOOKUP) {
            let query = [("ids", chunk.join(","))];
            let mut page = self
                .fetch_tracks(token, self.api_url("tracks"), &query, "track lookup")
                .await?;
            tracks.append(&mut page);
        }

        Ok(tracks)
    }
}
