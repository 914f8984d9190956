use std::sync::Arc;

use anyhow::Result;
use common::{
    cache::{RedisConfig, RedisPool},
    database::{self, DatabaseConfig},
};
use sqlx::migrate::Migrator;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use vibez::{
    AppConfig, AppState,
    config::SessionBackend,
    ports::SessionStore,
    repositories::{PlaylistRepository, SongRepository, UserRepository},
    routes,
    session::{MemorySessionStore, RedisSessionStore},
    spotify::SpotifyClient,
};

static MIGRATOR: Migrator = sqlx::migrate!();

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting Vibez service");

    let config = AppConfig::from_env()?;

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = database::init_pool(&db_config).await?;

    // Check database connectivity
    if database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    database::run_migrations(&pool, &MIGRATOR).await?;

    let sessions: Arc<dyn SessionStore> = match config.session.backend {
        SessionBackend::Redis => {
            let redis_pool = RedisPool::new(&RedisConfig::from_env())?;
            if !redis_pool.health_check().await? {
                anyhow::bail!("Failed to connect to Redis");
            }
            Arc::new(RedisSessionStore::new(redis_pool))
        }
        SessionBackend::Memory => {
            info!("Keeping sessions in process memory");
            Arc::new(MemorySessionStore::new())
        }
    };

    let app_state = AppState {
        users: Arc::new(UserRepository::new(pool.clone())),
        playlists: Arc::new(PlaylistRepository::new(pool.clone())),
        songs: Arc::new(SongRepository::new(pool)),
        music: Arc::new(SpotifyClient::new(config.spotify.clone())?),
        sessions,
        session_settings: config.session.clone(),
    };

    // Start the web server
    let app = routes::create_router(app_state);

    let listener = TcpListener::bind(&config.bind_address).await?;
    info!("Vibez service listening on {}", config.bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
