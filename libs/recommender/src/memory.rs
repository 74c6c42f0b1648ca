//! In-process implementation of both stores
//!
//! All state sits behind one mutex, so every check-and-insert runs in a
//! single critical section and uniqueness holds under concurrent callers.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

use crate::{
    capability::AdminCapability,
    error::{CatalogError, CatalogResult},
    model::{Event, EventId, NewEvent, NewUser, Participation, User, UserId},
    store::{CredentialStore, EventStore},
};

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    events: Vec<Event>,
    participation: Vec<Participation>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn next_id(len: usize) -> i64 {
    len as i64 + 1
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn create_user(&self, new_user: NewUser) -> CatalogResult<User> {
        let mut tables = self.tables.lock().await;

        if tables.users.iter().any(|u| u.username == new_user.username) {
            return Err(CatalogError::UsernameTaken(new_user.username));
        }

        let user = User {
            id: next_id(tables.users.len()),
            username: new_user.username,
            password_hash: new_user.password_hash,
            role: new_user.role,
            interests: new_user.interests,
            created_at: Utc::now(),
        };
        tables.users.push(user.clone());

        info!("Created user {} ({})", user.id, user.username);
        Ok(user)
    }

    async fn find_user(&self, user_id: UserId) -> CatalogResult<Option<User>> {
        let tables = self.tables.lock().await;
        Ok(tables.users.iter().find(|u| u.id == user_id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> CatalogResult<Option<User>> {
        let tables = self.tables.lock().await;
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }

    async fn get_user_interests(&self, user_id: UserId) -> CatalogResult<Option<String>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .users
            .iter()
            .find(|u| u.id == user_id)
            .map(|u| u.interests.clone()))
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn create_event(
        &self,
        capability: &AdminCapability,
        new_event: NewEvent,
    ) -> CatalogResult<Event> {
        let mut tables = self.tables.lock().await;

        let event = Event {
            id: next_id(tables.events.len()),
            title: new_event.title,
            description: new_event.description,
            organizer: new_event.organizer,
            date: new_event.date,
            created_at: Utc::now(),
        };
        tables.events.push(event.clone());

        info!(
            "Admin {} created event {} ({})",
            capability.granted_to(),
            event.id,
            event.title
        );
        Ok(event)
    }

    async fn find_event(&self, event_id: EventId) -> CatalogResult<Option<Event>> {
        let tables = self.tables.lock().await;
        Ok(tables.events.iter().find(|e| e.id == event_id).cloned())
    }

    async fn list_events(&self) -> CatalogResult<Vec<Event>> {
        let tables = self.tables.lock().await;
        Ok(tables.events.clone())
    }

    async fn register_participation(
        &self,
        user_id: UserId,
        event_id: EventId,
    ) -> CatalogResult<Participation> {
        let mut tables = self.tables.lock().await;

        if !tables.users.iter().any(|u| u.id == user_id) {
            return Err(CatalogError::UserNotFound(user_id));
        }
        if !tables.events.iter().any(|e| e.id == event_id) {
            return Err(CatalogError::EventNotFound(event_id));
        }
        if tables
            .participation
            .iter()
            .any(|p| p.user_id == user_id && p.event_id == event_id)
        {
            return Err(CatalogError::DuplicateParticipation { user_id, event_id });
        }

        let participation = Participation {
            id: next_id(tables.participation.len()),
            user_id,
            event_id,
            created_at: Utc::now(),
        };
        tables.participation.push(participation.clone());

        info!("User {} registered for event {}", user_id, event_id);
        Ok(participation)
    }

    async fn list_participated_event_ids(&self, user_id: UserId) -> CatalogResult<HashSet<EventId>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .participation
            .iter()
            .filter(|p| p.user_id == user_id)
            .map(|p| p.event_id)
            .collect())
    }
}
