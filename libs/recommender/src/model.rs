//! Users, events and participation records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub type UserId = i64;
pub type EventId = i64;

/// Role stored alongside the credential
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Member,
    Admin,
}

impl Role {
    pub fn from_admin_flag(is_admin: bool) -> Self {
        if is_admin { Role::Admin } else { Role::Member }
    }

    pub fn is_admin(self) -> bool {
        self == Role::Admin
    }
}

/// User entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub interests: String,
    pub created_at: DateTime<Utc>,
}

/// New user creation payload; `password_hash` must already be hashed
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub interests: String,
}

/// Event entity; immutable once created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: EventId,
    pub title: String,
    pub description: String,
    pub organizer: String,
    pub date: String,
    pub created_at: DateTime<Utc>,
}

/// New event creation payload
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub organizer: String,
    pub date: String,
}

/// A user's registration for an event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Participation {
    pub id: i64,
    pub user_id: UserId,
    pub event_id: EventId,
    pub created_at: DateTime<Utc>,
}
