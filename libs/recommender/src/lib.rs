//! Event catalogue and interest-based recommendations
//!
//! The crate is split along the store boundary:
//!
//! - [`model`] holds users, events and participation records.
//! - [`store`] defines the [`CredentialStore`] and [`EventStore`] traits, with
//!   a PostgreSQL implementation in [`postgres`] and an in-process one in
//!   [`memory`].
//! - [`similarity`] scores an interest string against an event title.
//! - [`engine`] combines the stores and the scorer into an ordered list of
//!   recommended events.

pub mod capability;
pub mod engine;
pub mod error;
pub mod memory;
pub mod model;
pub mod postgres;
pub mod similarity;
pub mod store;

pub use capability::AdminCapability;
pub use engine::{
    PriorParticipation, RecommendationConfig, RecommendationEngine, RecommendationNotice,
    Recommendations,
};
pub use error::{CatalogError, CatalogResult};
pub use model::{Event, EventId, NewEvent, NewUser, Participation, Role, User, UserId};
pub use store::{CredentialStore, EventStore};
