//! Signup, login and token payloads

use serde::{Deserialize, Serialize};

/// Member signup
#[derive(Debug, Clone, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub password: String,
    pub interests: String,
}

/// Admin signup; admins have no interests
#[derive(Debug, Clone, Deserialize)]
pub struct AdminSignupRequest {
    pub username: String,
    pub password: String,
}

/// User login credentials
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Body of refresh and logout requests
#[derive(Debug, Clone, Deserialize)]
pub struct TokenRequest {
    pub refresh_token: String,
}

/// Tokens handed out on login and refresh
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub user_id: i64,
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: u64,
}
