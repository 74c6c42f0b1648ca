//! Refresh-token sessions kept in Redis
//!
//! One session per user: the id (`jti`) of the user's current refresh token
//! is stored under `session:<user_id>`. Rotated or logged-out refresh tokens
//! are marked revoked for the rest of their lifetime.

use anyhow::Result;
use common::{
    cache::{RedisPool, revoked_token_key, session_key},
    token::{Claims, IssuedToken, JwtService},
};
use tracing::{info, warn};

/// Session manager for handling user sessions in Redis
#[derive(Clone)]
pub struct SessionManager {
    redis_pool: RedisPool,
    jwt_service: JwtService,
}

impl SessionManager {
    /// Create a new session manager
    pub fn new(redis_pool: RedisPool, jwt_service: JwtService) -> Self {
        Self {
            redis_pool,
            jwt_service,
        }
    }

    /// Record `refresh` as the current refresh token of its user
    pub async fn create_session(&self, refresh: &Claims) -> Result<()> {
        info!("Creating session for user: {}", refresh.sub);

        self.redis_pool
            .set(
                &session_key(refresh.sub),
                &refresh.jti,
                Some(self.jwt_service.refresh_token_expiry()),
            )
            .await
    }

    /// Whether `refresh` is the user's current, unrevoked refresh token
    pub async fn is_session_valid(&self, refresh: &Claims) -> Result<bool> {
        if self.redis_pool.exists(&revoked_token_key(&refresh.jti)).await? {
            return Ok(false);
        }

        let current = self.redis_pool.get(&session_key(refresh.sub)).await?;
        Ok(current.as_deref() == Some(refresh.jti.as_str()))
    }

    /// Revoke `refresh` and issue its replacement
    ///
    /// The revocation marker is set with `SET NX`, so of several concurrent
    /// rotations of the same token only one gets a replacement; the others
    /// get `None`.
    pub async fn rotate(&self, refresh: &Claims) -> Result<Option<IssuedToken>> {
        let remaining = refresh.remaining_lifetime()?;
        let claimed = self
            .redis_pool
            .set_if_absent(&revoked_token_key(&refresh.jti), "1", remaining)
            .await?;

        if !claimed {
            warn!("Refresh token {} was already used", refresh.jti);
            return Ok(None);
        }

        let replacement = self.jwt_service.generate_refresh_token(refresh.sub)?;
        self.create_session(&replacement.claims).await?;

        Ok(Some(replacement))
    }

    /// Revoke `refresh` and drop the user's session
    pub async fn end_session(&self, refresh: &Claims) -> Result<()> {
        info!("Ending session for user: {}", refresh.sub);

        self.revoke(refresh).await?;
        self.redis_pool.delete(&session_key(refresh.sub)).await
    }

    async fn revoke(&self, refresh: &Claims) -> Result<()> {
        let remaining = refresh.remaining_lifetime()?;
        self.redis_pool
            .set(&revoked_token_key(&refresh.jti), "1", Some(remaining))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{cache::RedisConfig, token::JwtConfig};

    #[tokio::test]
    #[ignore = "requires a running Redis instance"]
    async fn test_rotation_invalidates_previous_token() -> Result<()> {
        let jwt = JwtService::new(JwtConfig {
            secret: "0123456789abcdef0123456789abcdef".to_string(),
            access_token_expiry: 60,
            refresh_token_expiry: 120,
        });
        let redis = RedisPool::new(&RedisConfig::from_env()?).await?;
        let sessions = SessionManager::new(redis, jwt.clone());

        let first = jwt.generate_refresh_token(9_001)?;
        sessions.create_session(&first.claims).await?;
        assert!(sessions.is_session_valid(&first.claims).await?);

        let second = sessions
            .rotate(&first.claims)
            .await?
            .expect("first rotation succeeds");
        assert!(!sessions.is_session_valid(&first.claims).await?);
        assert!(sessions.is_session_valid(&second.claims).await?);

        sessions.end_session(&second.claims).await?;
        assert!(!sessions.is_session_valid(&second.claims).await?);
        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a running Redis instance"]
    async fn test_concurrent_rotations_issue_one_replacement() -> Result<()> {
        let jwt = JwtService::new(JwtConfig {
            secret: "0123456789abcdef0123456789abcdef".to_string(),
            access_token_expiry: 60,
            refresh_token_expiry: 120,
        });
        let redis = RedisPool::new(&RedisConfig::from_env()?).await?;
        let sessions = SessionManager::new(redis, jwt.clone());

        let refresh = jwt.generate_refresh_token(9_002)?;
        sessions.create_session(&refresh.claims).await?;

        let (a, b) = tokio::join!(
            sessions.rotate(&refresh.claims),
            sessions.rotate(&refresh.claims)
        );
        let issued = [a?, b?].into_iter().flatten().count();
        assert_eq!(issued, 1);

        assert!(sessions.rotate(&refresh.claims).await?.is_none());
        Ok(())
    }
}
