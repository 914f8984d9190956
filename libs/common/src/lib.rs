//! Common library for the Vibez application
//!
//! This crate provides shared functionality used by the Vibez services,
//! including database connectivity and migrations, the Redis-backed cache and
//! the storage error types.
//!
//! ```rust,no_run
//! use common::cache::{RedisConfig, RedisPool};
//! use common::database::{DatabaseConfig, health_check, init_pool};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = init_pool(&DatabaseConfig::from_env()?).await?;
//!     println!("Database health check: {}", health_check(&pool).await?);
//!
//!     let cache = RedisPool::new(&RedisConfig::from_env())?;
//!     cache.set_json("greeting", &"hello", Some(60)).await?;
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod database;
pub mod error;
