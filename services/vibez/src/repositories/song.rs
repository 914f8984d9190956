//! Song repository

use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use crate::{
    models::{NewSong, Song},
    ports::SongStore,
};

/// Song repository
#[derive(Clone)]
pub struct SongRepository {
    pool: PgPool,
}

impl SongRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SongStore for SongRepository {
    async fn find(&self, track_id: &str) -> Result<Option<Song>> {
        let song = sqlx::query_as::<_, Song>(
            "SELECT track_id, title, artist FROM songs WHERE track_id = $1",
        )
        .bind(track_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(song)
    }

    async fn create(&self, new_song: &NewSong) -> Result<Song> {
        debug!("Storing song {} ({})", new_song.track_id, new_song.title);

        let song = sqlx::query_as::<_, Song>(
            r#"
            INSERT INTO songs (track_id, title, artist)
            VALUES ($1, $2, $3)
            RETURNING track_id, title, artist
            "#,
        )
        .bind(&new_song.track_id)
        .bind(&new_song.title)
        .bind(&new_song.artist)
        .fetch_one(&self.pool)
        .await?;

        Ok(song)
    }
}
