//! Store boundary consumed by the recommendation engine and the services
//!
//! Uniqueness (usernames, one participation per user and event) is enforced
//! by the implementations themselves, atomically, so callers never need a
//! read-before-write.

use async_trait::async_trait;
use std::collections::HashSet;

use crate::{
    capability::AdminCapability,
    error::CatalogResult,
    model::{Event, EventId, NewEvent, NewUser, Participation, User, UserId},
};

#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Fails with `UsernameTaken` if the username exists
    async fn create_user(&self, new_user: NewUser) -> CatalogResult<User>;

    async fn find_user(&self, user_id: UserId) -> CatalogResult<Option<User>>;

    async fn find_by_username(&self, username: &str) -> CatalogResult<Option<User>>;

    /// `None` when no such user exists
    async fn get_user_interests(&self, user_id: UserId) -> CatalogResult<Option<String>>;
}

#[async_trait]
pub trait EventStore: Send + Sync {
    async fn create_event(
        &self,
        capability: &AdminCapability,
        new_event: NewEvent,
    ) -> CatalogResult<Event>;

    async fn find_event(&self, event_id: EventId) -> CatalogResult<Option<Event>>;

    /// All events in ascending id order
    async fn list_events(&self) -> CatalogResult<Vec<Event>>;

    /// Fails with `DuplicateParticipation` if the pair is already registered
    /// and with `EventNotFound` if the event does not exist
    async fn register_participation(
        &self,
        user_id: UserId,
        event_id: EventId,
    ) -> CatalogResult<Participation>;

    async fn list_participated_event_ids(&self, user_id: UserId) -> CatalogResult<HashSet<EventId>>;
}
