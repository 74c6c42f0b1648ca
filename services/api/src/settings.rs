//! Service configuration read once at start up
//!
//! Recommendation settings come from `RECOMMENDATION_*` variables through
//! the `config` crate and are handed to the engine at construction; nothing
//! here changes after the server starts.

use anyhow::Result;
use config::{Config, Environment};
use recommender::{RecommendationConfig, engine::DEFAULT_SIMILARITY_THRESHOLD};
use std::net::SocketAddr;

/// HTTP listener settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
}

impl ServerConfig {
    /// Create a new ServerConfig from environment variables
    ///
    /// # Environment Variables
    /// - `API_BIND_ADDR`: Listen address (default: "0.0.0.0:3001")
    pub fn from_env() -> Result<Self> {
        let bind_addr = std::env::var("API_BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3001".to_string())
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid API_BIND_ADDR: {}", e))?;

        Ok(ServerConfig { bind_addr })
    }
}

/// Load the recommendation engine settings
///
/// # Environment Variables
/// - `RECOMMENDATION_SIMILARITY_THRESHOLD`: Inclusion cutoff in [0, 1] (default: 0.2)
/// - `RECOMMENDATION_PRIOR_PARTICIPATION`: `prepend` (default) or `move_to_front`
pub fn recommendation_config_from_env() -> Result<RecommendationConfig> {
    let settings = Config::builder()
        .set_default("similarity_threshold", DEFAULT_SIMILARITY_THRESHOLD)?
        .set_default("prior_participation", "prepend")?
        .add_source(Environment::with_prefix("RECOMMENDATION").try_parsing(true))
        .build()?;

    let config: RecommendationConfig = settings.try_deserialize()?;
    config.validate()?;

    Ok(config)
}
