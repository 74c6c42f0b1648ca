use anyhow::Result;
use std::{net::SocketAddr, sync::Arc};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod models;
mod rate_limiter;
mod repositories;
mod routes;
mod session;
mod validation;

use common::{
    cache::{RedisConfig, RedisPool},
    database::{self, DatabaseConfig},
    token::{JwtConfig, JwtService},
};
use recommender::postgres::PgCredentialStore;

use crate::{
    config::ServerConfig,
    rate_limiter::{RateLimiter, RateLimiterConfig},
    repositories::UserRepository,
    session::SessionManager,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub user_repository: UserRepository,
    pub jwt_service: JwtService,
    pub sessions: SessionManager,
    pub rate_limiter: RateLimiter,
    pub admin_signup_key: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting authentication service");

    let server_config = ServerConfig::from_env()?;

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = database::init_pool(&db_config).await?;

    if database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }
    database::run_migrations(&pool).await?;

    let jwt_service = JwtService::new(JwtConfig::from_env()?);

    let redis_pool = RedisPool::new(&RedisConfig::from_env()?).await?;
    if !redis_pool.health_check().await? {
        anyhow::bail!("Failed to connect to Redis");
    }

    if server_config.admin_signup_key.is_none() {
        info!("ADMIN_SIGNUP_KEY not set, admin signup is disabled");
    }

    let app_state = AppState {
        user_repository: UserRepository::new(Arc::new(PgCredentialStore::new(pool))),
        sessions: SessionManager::new(redis_pool, jwt_service.clone()),
        jwt_service,
        rate_limiter: RateLimiter::new(RateLimiterConfig::default()),
        admin_signup_key: server_config.admin_signup_key,
    };

    let app = routes::create_router(app_state);

    let listener = tokio::net::TcpListener::bind(server_config.bind_addr).await?;
    info!("Authentication service listening on {}", server_config.bind_addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
