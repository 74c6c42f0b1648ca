//! JWT issuing and validation shared by the auth and api services
//!
//! Tokens are signed with HS256 using a single process-wide secret loaded
//! once at start up. Tokens only identify the user; authorization decisions
//! (admin role) are taken against the credential store, never the token.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use uuid::Uuid;

/// Errors raised while issuing or validating tokens
#[derive(Error, Debug)]
pub enum TokenError {
    /// Signature, expiry or format check failed
    #[error("Invalid token: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),

    /// A refresh token was used where an access token is expected or vice versa
    #[error("Expected a {expected:?} token, got {found:?}")]
    WrongType {
        expected: TokenType,
        found: TokenType,
    },

    /// System clock is before the unix epoch
    #[error("Failed to get current time: {0}")]
    Clock(String),

    /// Missing or unusable configuration
    #[error("JWT configuration error: {0}")]
    Configuration(String),
}

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Shared signing secret
    pub secret: String,
    /// Access token expiration time in seconds (default: 15 minutes)
    pub access_token_expiry: u64,
    /// Refresh token expiration time in seconds (default: 7 days)
    pub refresh_token_expiry: u64,
}

impl JwtConfig {
    /// Create a new JwtConfig from environment variables
    ///
    /// # Environment Variables
    /// - `JWT_SECRET`: Signing secret, at least 32 bytes
    /// - `JWT_ACCESS_TOKEN_EXPIRY`: Access token expiry in seconds (default: 900)
    /// - `JWT_REFRESH_TOKEN_EXPIRY`: Refresh token expiry in seconds (default: 604800)
    pub fn from_env() -> Result<Self, TokenError> {
        let secret = std::env::var("JWT_SECRET").map_err(|_| {
            TokenError::Configuration("JWT_SECRET environment variable not set".to_string())
        })?;

        if secret.len() < 32 {
            return Err(TokenError::Configuration(
                "JWT_SECRET must be at least 32 bytes long".to_string(),
            ));
        }

        let access_token_expiry = parse_expiry("JWT_ACCESS_TOKEN_EXPIRY", 900)?; // 15 minutes
        let refresh_token_expiry = parse_expiry("JWT_REFRESH_TOKEN_EXPIRY", 604800)?; // 7 days

        Ok(JwtConfig {
            secret,
            access_token_expiry,
            refresh_token_expiry,
        })
    }
}

fn parse_expiry(name: &str, default: u64) -> Result<u64, TokenError> {
    match std::env::var(name) {
        Ok(raw) => match raw.parse::<u64>() {
            Ok(0) | Err(_) => Err(TokenError::Configuration(format!(
                "{} must be a positive number of seconds, got {:?}",
                name, raw
            ))),
            Ok(seconds) => Ok(seconds),
        },
        Err(_) => Ok(default),
    }
}

/// Token type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: i64,
    /// Unique token id, used for revocation
    pub jti: String,
    /// Issued at time
    pub iat: u64,
    /// Expiration time
    pub exp: u64,
    pub token_type: TokenType,
}

impl Claims {
    /// Seconds left before the token expires, zero once expired
    pub fn remaining_lifetime(&self) -> Result<u64, TokenError> {
        Ok(self.exp.saturating_sub(now()?))
    }
}

/// A freshly signed token together with its claims
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: Claims,
}

/// JWT service
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    config: JwtConfig,
}

impl JwtService {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        JwtService {
            encoding_key,
            decoding_key,
            validation,
            config,
        }
    }

    /// Generate an access token for a user
    pub fn generate_access_token(&self, user_id: i64) -> Result<IssuedToken, TokenError> {
        self.issue(user_id, TokenType::Access, self.config.access_token_expiry)
    }

    /// Generate a refresh token for a user
    pub fn generate_refresh_token(&self, user_id: i64) -> Result<IssuedToken, TokenError> {
        self.issue(user_id, TokenType::Refresh, self.config.refresh_token_expiry)
    }

    fn issue(&self, user_id: i64, token_type: TokenType, ttl: u64) -> Result<IssuedToken, TokenError> {
        let iat = now()?;
        let claims = Claims {
            sub: user_id,
            jti: Uuid::new_v4().to_string(),
            iat,
            exp: iat + ttl,
            token_type,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        Ok(IssuedToken { token, claims })
    }

    /// Validate a token and return the claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, TokenError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(token_data.claims)
    }

    /// Validate a token and check it has the expected type
    pub fn validate_typed(&self, token: &str, expected: TokenType) -> Result<Claims, TokenError> {
        let claims = self.validate_token(token)?;
        if claims.token_type != expected {
            return Err(TokenError::WrongType {
                expected,
                found: claims.token_type,
            });
        }
        Ok(claims)
    }

    /// Get the access token expiry time
    pub fn access_token_expiry(&self) -> u64 {
        self.config.access_token_expiry
    }

    /// Get the refresh token expiry time
    pub fn refresh_token_expiry(&self) -> u64 {
        self.config.refresh_token_expiry
    }
}

fn now() -> Result<u64, TokenError> {
    Ok(SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| TokenError::Clock(e.to_string()))?
        .as_secs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn service(secret: &str) -> JwtService {
        JwtService::new(JwtConfig {
            secret: secret.to_string(),
            access_token_expiry: 900,
            refresh_token_expiry: 3600,
        })
    }

    #[test]
    fn test_access_token_round_trip() {
        let jwt = service(SECRET);
        let issued = jwt.generate_access_token(7).unwrap();

        let claims = jwt.validate_typed(&issued.token, TokenType::Access).unwrap();
        assert_eq!(claims.sub, 7);
        assert_eq!(claims.jti, issued.claims.jti);
        assert_eq!(claims.exp - claims.iat, 900);
    }

    #[test]
    fn test_refresh_token_is_not_an_access_token() {
        let jwt = service(SECRET);
        let issued = jwt.generate_refresh_token(7).unwrap();

        let result = jwt.validate_typed(&issued.token, TokenType::Access);
        assert!(matches!(
            result,
            Err(TokenError::WrongType {
                expected: TokenType::Access,
                found: TokenType::Refresh
            })
        ));
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let issued = service("ffffffffffffffffffffffffffffffff")
            .generate_access_token(1)
            .unwrap();

        assert!(matches!(
            service(SECRET).validate_token(&issued.token),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let jwt = service(SECRET);
        let claims = Claims {
            sub: 1,
            jti: "old".to_string(),
            iat: 1_000,
            exp: 2_000,
            token_type: TokenType::Access,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert!(jwt.validate_token(&token).is_err());
        assert_eq!(claims.remaining_lifetime().unwrap(), 0);
    }

    #[test]
    fn test_each_token_gets_a_fresh_id() {
        let jwt = service(SECRET);
        let a = jwt.generate_refresh_token(1).unwrap();
        let b = jwt.generate_refresh_token(1).unwrap();
        assert_ne!(a.claims.jti, b.claims.jti);
    }

    #[test]
    #[serial]
    fn test_jwt_config_requires_long_secret() {
        unsafe {
            std::env::set_var("JWT_SECRET", "short");
        }
        assert!(matches!(
            JwtConfig::from_env(),
            Err(TokenError::Configuration(_))
        ));

        unsafe {
            std::env::set_var("JWT_SECRET", SECRET);
        }
        let config = JwtConfig::from_env().unwrap();
        assert_eq!(config.access_token_expiry, 900);
        assert_eq!(config.refresh_token_expiry, 604800);

        unsafe {
            std::env::remove_var("JWT_SECRET");
        }
    }

    #[test]
    #[serial]
    fn test_jwt_config_rejects_bad_expiry() {
        unsafe {
            std::env::set_var("JWT_SECRET", SECRET);
            std::env::set_var("JWT_ACCESS_TOKEN_EXPIRY", "15m");
        }
        assert!(matches!(
            JwtConfig::from_env(),
            Err(TokenError::Configuration(_))
        ));

        unsafe {
            std::env::set_var("JWT_ACCESS_TOKEN_EXPIRY", "0");
        }
        assert!(matches!(
            JwtConfig::from_env(),
            Err(TokenError::Configuration(_))
        ));

        unsafe {
            std::env::set_var("JWT_ACCESS_TOKEN_EXPIRY", "60");
            std::env::set_var("JWT_REFRESH_TOKEN_EXPIRY", "120");
        }
        let config = JwtConfig::from_env().unwrap();
        assert_eq!(config.access_token_expiry, 60);
        assert_eq!(config.refresh_token_expiry, 120);

        unsafe {
            std::env::remove_var("JWT_SECRET");
            std::env::remove_var("JWT_ACCESS_TOKEN_EXPIRY");
            std::env::remove_var("JWT_REFRESH_TOKEN_EXPIRY");
        }
    }
}
