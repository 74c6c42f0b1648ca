//! API service routes

use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use recommender::{AdminCapability, EventId};
use serde_json::json;
use tracing::{info, warn};

use crate::{
    error::{ApiError, ApiResult},
    middleware::{AuthUser, auth_middleware},
    models::{DashboardResponse, SubmitEventRequest},
    state::AppState,
};

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/events", get(list_events).post(submit_event))
        .route("/events/:id", get(get_event))
        .route("/events/:id/participate", post(participate))
        .route("/dashboard", get(dashboard))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .merge(protected_routes)
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "api-service"
    }))
}

/// All events
pub async fn list_events(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let events = state.events.list_events().await?;
    Ok(Json(events))
}

/// A single event
pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<EventId>,
) -> ApiResult<impl IntoResponse> {
    let event = state
        .events
        .find_event(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Event not found.".to_string()))?;

    Ok(Json(event))
}

/// Create an event; admins only
///
/// The role is read from the credential store on every call, never from
/// the token.
pub async fn submit_event(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<SubmitEventRequest>,
) -> ApiResult<impl IntoResponse> {
    let forbidden = || ApiError::Forbidden("You do not have access to add events".to_string());

    let stored = state.credentials.find_user(user.id).await?;
    let Some(capability) = stored.as_ref().and_then(AdminCapability::grant) else {
        warn!("User {} tried to add an event without the admin role", user.id);
        return Err(forbidden());
    };

    let new_event = payload.into_new_event().map_err(ApiError::BadRequest)?;
    let event = state.events.create_event(&capability, new_event).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Event successfully added",
            "event": event,
        })),
    ))
}

/// Register the caller for an event
pub async fn participate(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(event_id): Path<EventId>,
) -> ApiResult<impl IntoResponse> {
    let participation = state
        .events
        .register_participation(user.id, event_id)
        .await?;

    info!("User {} registered for event {}", user.id, event_id);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Successfully registered for the event!",
            "participation": participation,
        })),
    ))
}

/// Recommended events for the caller
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    let recommendations = state.engine.recommend(user.id).await?;
    Ok(Json(DashboardResponse::from(recommendations)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::token::{JwtConfig, JwtService};
    use recommender::{
        CredentialStore, NewUser, RecommendationConfig, Role, memory::MemoryStore,
    };
    use serde_json::Value;
    use std::sync::Arc;

    struct Harness {
        state: AppState,
        admin: AuthUser,
        member: AuthUser,
    }

    async fn harness(interests: &str) -> Harness {
        let store = MemoryStore::new();
        let admin = store
            .create_user(NewUser {
                username: "organiser".to_string(),
                password_hash: "hash".to_string(),
                role: Role::Admin,
                interests: String::new(),
            })
            .await
            .unwrap();
        let member = store
            .create_user(NewUser {
                username: "visitor".to_string(),
                password_hash: "hash".to_string(),
                role: Role::Member,
                interests: interests.to_string(),
            })
            .await
            .unwrap();

        let jwt_service = JwtService::new(JwtConfig {
            secret: "0123456789abcdef0123456789abcdef".to_string(),
            access_token_expiry: 900,
            refresh_token_expiry: 3600,
        });
        let state = AppState::new(
            Arc::new(store.clone()),
            Arc::new(store),
            RecommendationConfig::default(),
            jwt_service,
        );

        Harness {
            state,
            admin: AuthUser { id: admin.id },
            member: AuthUser { id: member.id },
        }
    }

    fn event(title: &str) -> SubmitEventRequest {
        SubmitEventRequest {
            title: title.to_string(),
            description: "Everyone welcome".to_string(),
            organizer: "Student Union".to_string(),
            date: "2025-11-05".to_string(),
        }
    }

    async fn into_parts(response: impl IntoResponse) -> (StatusCode, Value) {
        let response = response.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn add_events(h: &Harness, titles: &[&str]) {
        for title in titles {
            let (status, _) = into_parts(
                submit_event(State(h.state.clone()), Extension(h.admin), Json(event(title))).await,
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }
    }

    fn titles(body: &Value) -> Vec<String> {
        body["recommended_events"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["title"].as_str().unwrap().to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_member_cannot_submit_event() {
        let h = harness("music").await;

        let (status, body) = into_parts(
            submit_event(State(h.state.clone()), Extension(h.member), Json(event("Music Night")))
                .await,
        )
        .await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "You do not have access to add events");
        assert!(h.state.events.list_events().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_caller_cannot_submit_event() {
        let h = harness("music").await;

        let (status, _) = into_parts(
            submit_event(State(h.state), Extension(AuthUser { id: 404 }), Json(event("X")))
                .await,
        )
        .await;

        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_admin_submits_and_everyone_lists() {
        let h = harness("music").await;
        add_events(&h, &["Music Night", "Tech Talk"]).await;

        let (status, body) = into_parts(list_events(State(h.state.clone())).await).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 2);

        let (status, body) = into_parts(get_event(State(h.state.clone()), Path(2)).await).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["title"], "Tech Talk");

        let (status, body) = into_parts(get_event(State(h.state), Path(3)).await).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Event not found.");
    }

    #[tokio::test]
    async fn test_blank_event_fields_are_rejected() {
        let h = harness("music").await;
        let mut blank = event("Music Night");
        blank.date = String::new();

        let (status, body) =
            into_parts(submit_event(State(h.state), Extension(h.admin), Json(blank)).await).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Date is required");
    }

    #[tokio::test]
    async fn test_participation_is_registered_once() {
        let h = harness("music").await;
        add_events(&h, &["Music Night"]).await;

        let (status, body) =
            into_parts(participate(State(h.state.clone()), Extension(h.member), Path(1)).await)
                .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "Successfully registered for the event!");

        let (status, body) =
            into_parts(participate(State(h.state.clone()), Extension(h.member), Path(1)).await)
                .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "You have already registered for this event.");

        let (status, _) =
            into_parts(participate(State(h.state), Extension(h.member), Path(9)).await).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_dashboard_recommends_matching_titles() {
        let h = harness("music festival").await;
        add_events(&h, &["Music Night", "Tech Talk"]).await;

        let (status, body) =
            into_parts(dashboard(State(h.state), Extension(h.member)).await).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(titles(&body), vec!["Music Night"]);
        assert!(body["notice"].is_null());
    }

    #[tokio::test]
    async fn test_dashboard_puts_attended_events_first() {
        let h = harness("music festival").await;
        add_events(&h, &["Music Night", "Tech Talk"]).await;
        into_parts(participate(State(h.state.clone()), Extension(h.member), Path(1)).await).await;
        into_parts(participate(State(h.state.clone()), Extension(h.member), Path(2)).await).await;

        let (_, body) = into_parts(dashboard(State(h.state), Extension(h.member)).await).await;

        assert_eq!(titles(&body), vec!["Tech Talk", "Music Night", "Music Night"]);
    }

    #[tokio::test]
    async fn test_dashboard_for_unknown_user_has_notice() {
        let h = harness("music").await;

        let (status, body) =
            into_parts(dashboard(State(h.state), Extension(AuthUser { id: 404 })).await).await;

        assert_eq!(status, StatusCode::OK);
        assert!(titles(&body).is_empty());
        assert_eq!(body["notice"], "No interests found for the user.");
    }
}
