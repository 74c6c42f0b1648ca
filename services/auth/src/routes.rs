//! Authentication service routes

use axum::{
    Json, Router,
    extract::{ConnectInfo, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use common::token::TokenType;
use recommender::{CatalogError, Role};
use std::net::SocketAddr;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::{
    AppState,
    models::{AdminSignupRequest, LoginRequest, SignupRequest, TokenRequest, TokenResponse},
    rate_limiter::login_key,
    validation::{validate_interests, validate_password, validate_username},
};

/// Header carrying the admin signup key
pub const ADMIN_SIGNUP_KEY_HEADER: &str = "x-admin-signup-key";

/// Create the router for the authentication service
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/auth/signup", post(signup))
        .route("/auth/signup/admin", post(admin_signup))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh_token))
        .route("/auth/logout", post(logout))
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "auth-service"
    }))
}

/// Member signup endpoint
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<impl IntoResponse, AuthError> {
    info!("Signup request for user: {}", payload.username);

    validate_username(&payload.username).map_err(AuthError::BadRequest)?;
    validate_password(&payload.password).map_err(AuthError::BadRequest)?;
    validate_interests(&payload.interests).map_err(AuthError::BadRequest)?;

    let user = state
        .user_repository
        .register(
            &payload.username,
            &payload.password,
            Role::Member,
            payload.interests.trim(),
        )
        .await
        .map_err(registration_error)?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "Signup successful! You can now log in.",
            "user": user,
        })),
    ))
}

/// Admin signup endpoint, guarded by the admin signup key
pub async fn admin_signup(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<AdminSignupRequest>,
) -> Result<impl IntoResponse, AuthError> {
    info!("Admin signup request for user: {}", payload.username);

    let expected = state
        .admin_signup_key
        .as_deref()
        .ok_or(AuthError::Forbidden)?;
    let provided = headers
        .get(ADMIN_SIGNUP_KEY_HEADER)
        .and_then(|value| value.to_str().ok());

    if provided != Some(expected) {
        warn!("Rejected admin signup for {}: bad signup key", payload.username);
        return Err(AuthError::Forbidden);
    }

    validate_username(&payload.username).map_err(AuthError::BadRequest)?;
    validate_password(&payload.password).map_err(AuthError::BadRequest)?;

    let user = state
        .user_repository
        .register(&payload.username, &payload.password, Role::Admin, "")
        .await
        .map_err(registration_error)?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "Admin signup successful! You can now log in.",
            "user": user,
        })),
    ))
}

fn registration_error(e: anyhow::Error) -> AuthError {
    match e.downcast_ref::<CatalogError>() {
        Some(CatalogError::UsernameTaken(_)) => {
            AuthError::Conflict("Username already exists".to_string())
        }
        _ => {
            error!("Failed to register user: {}", e);
            AuthError::InternalServerError
        }
    }
}

/// User login endpoint
pub async fn login(
    State(state): State<AppState>,
    ConnectInfo(client): ConnectInfo<SocketAddr>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AuthError> {
    // No stored account can match a name that fails signup validation.
    if validate_username(&payload.username).is_err() {
        return Err(AuthError::InvalidCredentials);
    }

    info!("Login attempt for user {} from {}", payload.username, client.ip());

    let limiter_key = login_key(client.ip(), &payload.username);
    if !state.rate_limiter.is_allowed(&limiter_key).await {
        return Err(AuthError::TooManyRequests);
    }

    let user = state
        .user_repository
        .authenticate(&payload.username, &payload.password)
        .await
        .map_err(|e| {
            error!("Failed to look up user: {}", e);
            AuthError::InternalServerError
        })?
        .ok_or(AuthError::InvalidCredentials)?;

    state.rate_limiter.reset(&limiter_key).await;

    let access = state
        .jwt_service
        .generate_access_token(user.id)
        .map_err(|e| {
            error!("Failed to generate access token: {}", e);
            AuthError::InternalServerError
        })?;

    let refresh = state
        .jwt_service
        .generate_refresh_token(user.id)
        .map_err(|e| {
            error!("Failed to generate refresh token: {}", e);
            AuthError::InternalServerError
        })?;

    state
        .sessions
        .create_session(&refresh.claims)
        .await
        .map_err(|e| {
            error!("Failed to store session in Redis: {}", e);
            AuthError::InternalServerError
        })?;

    let response = TokenResponse {
        user_id: user.id,
        access_token: access.token,
        refresh_token: refresh.token,
        token_type: "Bearer".to_string(),
        expires_in: state.jwt_service.access_token_expiry(),
    };

    Ok((StatusCode::OK, Json(response)))
}

/// Refresh token endpoint; the presented refresh token is rotated
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(payload): Json<TokenRequest>,
) -> Result<impl IntoResponse, AuthError> {
    info!("Token refresh request");

    let claims = state
        .jwt_service
        .validate_typed(&payload.refresh_token, TokenType::Refresh)
        .map_err(|_| AuthError::Unauthorized)?;

    let valid = state.sessions.is_session_valid(&claims).await.map_err(|e| {
        error!("Failed to check session: {}", e);
        AuthError::InternalServerError
    })?;

    if !valid {
        return Err(AuthError::Unauthorized);
    }

    let user = state
        .user_repository
        .find_by_id(claims.sub)
        .await
        .map_err(|e| {
            error!("Failed to look up user: {}", e);
            AuthError::InternalServerError
        })?
        .ok_or(AuthError::Unauthorized)?;

    let refresh = state
        .sessions
        .rotate(&claims)
        .await
        .map_err(|e| {
            error!("Failed to rotate refresh token: {}", e);
            AuthError::InternalServerError
        })?
        .ok_or(AuthError::Unauthorized)?;

    let access = state
        .jwt_service
        .generate_access_token(user.id)
        .map_err(|e| {
            error!("Failed to generate access token: {}", e);
            AuthError::InternalServerError
        })?;

    let response = TokenResponse {
        user_id: user.id,
        access_token: access.token,
        refresh_token: refresh.token,
        token_type: "Bearer".to_string(),
        expires_in: state.jwt_service.access_token_expiry(),
    };

    Ok((StatusCode::OK, Json(response)))
}

/// Logout endpoint
pub async fn logout(
    State(state): State<AppState>,
    Json(payload): Json<TokenRequest>,
) -> Result<impl IntoResponse, AuthError> {
    info!("Logout request");

    let claims = state
        .jwt_service
        .validate_typed(&payload.refresh_token, TokenType::Refresh)
        .map_err(|_| AuthError::Unauthorized)?;

    state.sessions.end_session(&claims).await.map_err(|e| {
        error!("Failed to end session: {}", e);
        AuthError::InternalServerError
    })?;

    Ok((
        StatusCode::OK,
        Json(serde_json::json!({"message": "Logged out successfully"})),
    ))
}

/// Custom error type for authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Invalid login credentials")]
    InvalidCredentials,
    #[error("Forbidden")]
    Forbidden,
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Conflict(String),
    #[error("Too many login attempts")]
    TooManyRequests,
    #[error("Internal server error")]
    InternalServerError,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = match &self {
            AuthError::Unauthorized | AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden => StatusCode::FORBIDDEN,
            AuthError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AuthError::Conflict(_) => StatusCode::CONFLICT,
            AuthError::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            AuthError::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(serde_json::json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}
