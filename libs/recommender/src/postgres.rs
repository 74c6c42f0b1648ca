//! PostgreSQL-backed credential and event stores
//!
//! Uniqueness of usernames and of (user_id, event_id) participation pairs is
//! carried by table constraints; violations come back as domain errors.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::error::DatabaseError;
use sqlx::{FromRow, PgPool};
use std::collections::HashSet;
use tracing::info;

use crate::{
    capability::AdminCapability,
    error::{CatalogError, CatalogResult},
    model::{Event, EventId, NewEvent, NewUser, Participation, Role, User, UserId},
    store::{CredentialStore, EventStore},
};

fn unavailable(err: sqlx::Error) -> CatalogError {
    CatalogError::StoreUnavailable(DatabaseError::from_query(err))
}

#[derive(FromRow)]
struct UserRow {
    id: i64,
    username: String,
    password_hash: String,
    is_admin: bool,
    interests: String,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            username: row.username,
            password_hash: row.password_hash,
            role: Role::from_admin_flag(row.is_admin),
            interests: row.interests,
            created_at: row.created_at,
        }
    }
}

/// Users table
#[derive(Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn create_user(&self, new_user: NewUser) -> CatalogResult<User> {
        info!("Creating new user: {}", new_user.username);

        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (username, password_hash, is_admin, interests)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, password_hash, is_admin, interests, created_at
            "#,
        )
        .bind(&new_user.username)
        .bind(&new_user.password_hash)
        .bind(new_user.role.is_admin())
        .bind(&new_user.interests)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match DatabaseError::from_query(e) {
            DatabaseError::UniqueViolation { .. } => {
                CatalogError::UsernameTaken(new_user.username.clone())
            }
            other => CatalogError::StoreUnavailable(other),
        })?;

        Ok(row.into())
    }

    async fn find_user(&self, user_id: UserId) -> CatalogResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, password_hash, is_admin, interests, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unavailable)?;

        Ok(row.map(User::from))
    }

    async fn find_by_username(&self, username: &str) -> CatalogResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, password_hash, is_admin, interests, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(unavailable)?;

        Ok(row.map(User::from))
    }

    async fn get_user_interests(&self, user_id: UserId) -> CatalogResult<Option<String>> {
        sqlx::query_scalar::<_, String>("SELECT interests FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(unavailable)
    }
}

/// Events and participation tables
#[derive(Clone)]
pub struct PgEventStore {
    pool: PgPool,
}

impl PgEventStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventStore for PgEventStore {
    async fn create_event(
        &self,
        capability: &AdminCapability,
        new_event: NewEvent,
    ) -> CatalogResult<Event> {
        let event = sqlx::query_as::<_, Event>(
            r#"
            INSERT INTO events (title, description, organizer, date)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, description, organizer, date, created_at
            "#,
        )
        .bind(&new_event.title)
        .bind(&new_event.description)
        .bind(&new_event.organizer)
        .bind(&new_event.date)
        .fetch_one(&self.pool)
        .await
        .map_err(unavailable)?;

        info!(
            "Admin {} created event {} ({})",
            capability.granted_to(),
            event.id,
            event.title
        );
        Ok(event)
    }

    async fn find_event(&self, event_id: EventId) -> CatalogResult<Option<Event>> {
        sqlx::query_as::<_, Event>(
            r#"
            SELECT id, title, description, organizer, date, created_at
            FROM events
            WHERE id = $1
            "#,
        )
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unavailable)
    }

    async fn list_events(&self) -> CatalogResult<Vec<Event>> {
        sqlx::query_as::<_, Event>(
            r#"
            SELECT id, title, description, organizer, date, created_at
            FROM events
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(unavailable)
    }

    async fn register_participation(
        &self,
        user_id: UserId,
        event_id: EventId,
    ) -> CatalogResult<Participation> {
        let inserted = sqlx::query_as::<_, Participation>(
            r#"
            INSERT INTO participation (user_id, event_id)
            VALUES ($1, $2)
            ON CONFLICT ON CONSTRAINT participation_user_event_unique DO NOTHING
            RETURNING id, user_id, event_id, created_at
            "#,
        )
        .bind(user_id)
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| match DatabaseError::from_query(e) {
            DatabaseError::ForeignKeyViolation { constraint } if constraint.contains("user_id") => {
                CatalogError::UserNotFound(user_id)
            }
            DatabaseError::ForeignKeyViolation { .. } => CatalogError::EventNotFound(event_id),
            other => CatalogError::StoreUnavailable(other),
        })?;

        match inserted {
            Some(participation) => {
                info!("User {} registered for event {}", user_id, event_id);
                Ok(participation)
            }
            None => Err(CatalogError::DuplicateParticipation { user_id, event_id }),
        }
    }

    async fn list_participated_event_ids(&self, user_id: UserId) -> CatalogResult<HashSet<EventId>> {
        let ids = sqlx::query_scalar::<_, i64>("SELECT event_id FROM participation WHERE user_id = $1")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(unavailable)?;

        Ok(ids.into_iter().collect())
    }
}
