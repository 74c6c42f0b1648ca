//! Custom error types for the API service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use recommender::CatalogError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Custom error type for the API service
#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing, invalid or expired access token
    #[error("Unauthorized")]
    Unauthorized,

    /// Authenticated but not allowed
    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    /// Bad request with message
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Catalog(CatalogError::UserNotFound(_)) => {
                (StatusCode::NOT_FOUND, "User not found.".to_string())
            }
            ApiError::Catalog(CatalogError::EventNotFound(_)) => {
                (StatusCode::NOT_FOUND, "Event not found.".to_string())
            }
            ApiError::Catalog(CatalogError::DuplicateParticipation { .. }) => (
                StatusCode::CONFLICT,
                "You have already registered for this event.".to_string(),
            ),
            ApiError::Catalog(CatalogError::UsernameTaken(_)) => {
                (StatusCode::CONFLICT, "Username already exists".to_string())
            }
            ApiError::Catalog(CatalogError::StoreUnavailable(e)) => {
                error!("Store unavailable: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
