use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod settings;
mod error;
mod middleware;
mod models;
mod routes;
mod state;

use common::{
    database::{self, DatabaseConfig},
    token::{JwtConfig, JwtService},
};
use recommender::postgres::{PgCredentialStore, PgEventStore};

use crate::{
    settings::{ServerConfig, recommendation_config_from_env},
    state::AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting API service");

    let server_config = ServerConfig::from_env()?;
    let recommendation_config = recommendation_config_from_env()?;
    info!(
        "Recommendation threshold {} with {:?} ordering",
        recommendation_config.similarity_threshold, recommendation_config.prior_participation
    );

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

    let app_state = AppState::new(
        Arc::new(PgCredentialStore::new(pool.clone())),
        Arc::new(PgEventStore::new(pool)),
        recommendation_config,
        jwt_service,
    );

    let app = routes::create_router(app_state);

    let listener = tokio::net::TcpListener::bind(server_config.bind_addr).await?;
    info!("API service listening on {}", server_config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
