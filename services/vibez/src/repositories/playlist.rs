//! Playlist repository for database operations
//!
//! Covers the `playlists` table and the `playlist_songs` link table.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::info;

use crate::{
    models::{NewPlaylist, Playlist},
    ports::PlaylistStore,
};

/// Playlist repository
#[derive(Clone)]
pub struct PlaylistRepository {
    pool: PgPool,
}

impl PlaylistRepository {
    /// Create a new playlist repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PlaylistStore for PlaylistRepository {
    async fn create(&self, new_playlist: &NewPlaylist) -> Result<Playlist> {
        info!(
            "Creating {} playlist for user {}",
            new_playlist.genre, new_playlist.user_id
        );

        let playlist = sqlx::query_as::<_, Playlist>(
            r#"
            INSERT INTO playlists (user_id, image_url, genre, min_danceability, max_danceability)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, image_url, genre, min_danceability, max_danceability, created_at
            "#,
        )
        .bind(new_playlist.user_id)
        .bind(&new_playlist.image_url)
        .bind(&new_playlist.genre)
        .bind(new_playlist.min_danceability)
        .bind(new_playlist.max_danceability)
        .fetch_one(&self.pool)
        .await?;

        Ok(playlist)
    }

    async fn find_for_user(&self, playlist_id: i32, user_id: i32) -> Result<Option<Playlist>> {
        let playlist = sqlx::query_as::<_, Playlist>(
            r#"
            SELECT id, user_id, image_url, genre, min_danceability, max_danceability, created_at
            FROM playlists
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(playlist_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(playlist)
    }

    async fn list_by_user(&self, user_id: i32) -> Result<Vec<Playlist>> {
        let playlists = sqlx::query_as::<_, Playlist>(
            r#"
            SELECT id, user_id, image_url, genre, min_danceability, max_danceability, created_at
            FROM playlists
            WHERE user_id = $1
            ORDER BY id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(playlists)
    }

    async fn add_song(&self, playlist_id: i32, track_id: &str) -> Result<()> {
        sqlx::query("INSERT INTO playlist_songs (track_id, playlist_id) VALUES ($1, $2)")
            .bind(track_id)
            .bind(playlist_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn track_ids(&self, playlist_id: i32) -> Result<Vec<String>> {
        let rows = sqlx::query(
            r#"
            SELECT track_id
            FROM playlist_songs
            WHERE playlist_id = $1
            ORDER BY id
            "#,
        )
        .bind(playlist_id)
        .fetch_all(&self.pool)
        .await?;

        let track_ids = rows.into_iter().map(|row| row.get("track_id")).collect();

        Ok(track_ids)
    }
}
