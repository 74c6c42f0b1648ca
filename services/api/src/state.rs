//! Application state shared across handlers

use common::token::JwtService;
use recommender::{CredentialStore, EventStore, RecommendationConfig, RecommendationEngine};
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub credentials: Arc<dyn CredentialStore>,
    pub events: Arc<dyn EventStore>,
    pub engine: RecommendationEngine,
    pub jwt_service: JwtService,
}

impl AppState {
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        events: Arc<dyn EventStore>,
        config: RecommendationConfig,
        jwt_service: JwtService,
    ) -> Self {
        let engine = RecommendationEngine::new(credentials.clone(), events.clone(), config);
        Self {
            credentials,
            events,
            engine,
            jwt_service,
        }
    }
}
