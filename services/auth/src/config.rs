//! Service configuration read once at start up

use anyhow::Result;
use std::net::SocketAddr;

/// HTTP listener and signup settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Shared key required by the admin signup endpoint; the endpoint is
    /// disabled when unset
    pub admin_signup_key: Option<String>,
}

impl ServerConfig {
    /// Create a new ServerConfig from environment variables
    ///
    /// # Environment Variables
    /// - `AUTH_BIND_ADDR`: Listen address (default: "0.0.0.0:3000")
    /// - `ADMIN_SIGNUP_KEY`: Key expected in the `x-admin-signup-key` header
    pub fn from_env() -> Result<Self> {
        let bind_addr = std::env::var("AUTH_BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid AUTH_BIND_ADDR: {}", e))?;

        let admin_signup_key = std::env::var("ADMIN_SIGNUP_KEY")
            .ok()
            .filter(|key| !key.is_empty());

        Ok(ServerConfig {
            bind_addr,
            admin_signup_key,
        })
    }
}
