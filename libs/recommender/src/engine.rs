//! Interest-based event recommendations
//!
//! For a user, every event title is scored against the user's interest
//! string. Events scoring at least the configured threshold are appended in
//! store order, and events the user already registered for are pushed to the
//! front of the list.
//!
//! With [`PriorParticipation::Prepend`] (the default) the two rules are
//! applied independently, so an attended event whose title also matches is
//! listed twice: once at the front and once at its matching position.
//! [`PriorParticipation::MoveToFront`] lists such events only once, at the
//! front.

use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    error::CatalogResult,
    model::{Event, UserId},
    similarity,
    store::{CredentialStore, EventStore},
};

pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.2;

/// How previously attended events are placed in the result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorParticipation {
    /// Insert at the front regardless of the similarity pass; may duplicate
    #[default]
    Prepend,
    /// Insert at the front and skip the similarity pass for that event
    MoveToFront,
}

#[derive(Error, Debug, PartialEq)]
#[error("similarity threshold must be within [0, 1], got {0}")]
pub struct InvalidThreshold(pub f64);

/// Engine settings, fixed for the lifetime of the process
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct RecommendationConfig {
    pub similarity_threshold: f64,
    #[serde(default)]
    pub prior_participation: PriorParticipation,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            prior_participation: PriorParticipation::default(),
        }
    }
}

impl RecommendationConfig {
    pub fn validate(&self) -> Result<(), InvalidThreshold> {
        if (0.0..=1.0).contains(&self.similarity_threshold) {
            Ok(())
        } else {
            Err(InvalidThreshold(self.similarity_threshold))
        }
    }
}

/// Non-fatal condition to surface to the user alongside the result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecommendationNotice {
    NoInterests,
}

impl RecommendationNotice {
    pub fn message(self) -> &'static str {
        match self {
            RecommendationNotice::NoInterests => "No interests found for the user.",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Recommendations {
    pub events: Vec<Event>,
    pub notice: Option<RecommendationNotice>,
}

#[derive(Clone)]
pub struct RecommendationEngine {
    credentials: Arc<dyn CredentialStore>,
    events: Arc<dyn EventStore>,
    config: RecommendationConfig,
}

impl RecommendationEngine {
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        events: Arc<dyn EventStore>,
        config: RecommendationConfig,
    ) -> Self {
        Self {
            credentials,
            events,
            config,
        }
    }

    pub fn config(&self) -> &RecommendationConfig {
        &self.config
    }

    /// Ordered recommendations for a user
    ///
    /// An unknown user yields an empty list with
    /// [`RecommendationNotice::NoInterests`]. Store failures are returned
    /// as errors.
    pub async fn recommend(&self, user_id: UserId) -> CatalogResult<Recommendations> {
        let Some(interests) = self.credentials.get_user_interests(user_id).await? else {
            warn!("No interests found for user {}", user_id);
            return Ok(Recommendations {
                events: Vec::new(),
                notice: Some(RecommendationNotice::NoInterests),
            });
        };

        let all_events = self.events.list_events().await?;
        let attended = self.events.list_participated_event_ids(user_id).await?;

        let threshold = self.config.similarity_threshold;
        let mut recommended = Vec::new();

        for event in all_events {
            let matches = similarity::score(&interests, &event.title) >= threshold;
            let was_attended = attended.contains(&event.id);

            match self.config.prior_participation {
                PriorParticipation::Prepend => {
                    if matches {
                        recommended.push(event.clone());
                    }
                    if was_attended {
                        recommended.insert(0, event);
                    }
                }
                PriorParticipation::MoveToFront => {
                    if was_attended {
                        recommended.insert(0, event);
                    } else if matches {
                        recommended.push(event);
                    }
                }
            }
        }

        info!(
            "Recommended {} events for user {} ({} previously attended)",
            recommended.len(),
            user_id,
            attended.len()
        );

        Ok(Recommendations {
            events: recommended,
            notice: None,
        })
    }
}
