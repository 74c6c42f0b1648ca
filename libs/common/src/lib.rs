//! Shared infrastructure for the event recommendation services
//!
//! This crate holds what both the `auth` and `api` services need: the
//! PostgreSQL pool and schema migrations, the Redis client used for
//! sessions, JWT issuing/validation and the common error types.
//!
//! ```rust,no_run
//! use common::database::{DatabaseConfig, health_check, init_pool, run_migrations};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DatabaseConfig::from_env()?;
//!     let pool = init_pool(&config).await?;
//!     run_migrations(&pool).await?;
//!     println!("Database health check: {}", health_check(&pool).await?);
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod database;
pub mod error;
pub mod token;
