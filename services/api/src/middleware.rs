//! Bearer token authentication for the protected routes

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use common::token::{JwtService, TokenType};
use recommender::UserId;
use tracing::warn;

use crate::{error::ApiError, state::AppState};

/// Authenticated caller, as proven by the access token
///
/// Carries only the user id. Roles are looked up in the credential store
/// by the handlers that need them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub id: UserId,
}

/// Validate an access token
pub fn authenticate(jwt_service: &JwtService, token: &str) -> Result<AuthUser, ApiError> {
    let claims = jwt_service
        .validate_typed(token, TokenType::Access)
        .map_err(|e| {
            warn!("Rejected access token: {}", e);
            ApiError::Unauthorized
        })?;

    Ok(AuthUser { id: claims.sub })
}

/// Authentication middleware
pub async fn auth_middleware(
    State(state): State<AppState>,
    authorization: Option<TypedHeader<Authorization<Bearer>>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let TypedHeader(Authorization(bearer)) = authorization.ok_or(ApiError::Unauthorized)?;

    let user = authenticate(&state.jwt_service, bearer.token())?;
    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}
