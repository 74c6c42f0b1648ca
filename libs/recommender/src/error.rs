//! Catalogue error taxonomy

use common::error::DatabaseError;
use thiserror::Error;

use crate::model::{EventId, UserId};

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("User {0} not found")]
    UserNotFound(UserId),

    #[error("Event {0} not found")]
    EventNotFound(EventId),

    #[error("Username {0:?} is already taken")]
    UsernameTaken(String),

    /// The user is already registered for the event
    #[error("User {user_id} already registered for event {event_id}")]
    DuplicateParticipation { user_id: UserId, event_id: EventId },

    /// Fatal to the request; never retried
    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[from] DatabaseError),
}

pub type CatalogResult<T> = Result<T, CatalogError>;
