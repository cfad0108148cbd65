//! User profile aggregate.
//!
//! Credentials live with the external identity provider; this aggregate only
//! holds the profile the tracker needs for membership and attribution.

use super::event::{DomainEvent, EventBuffer};
use super::{now_epoch_ms, Aggregate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable user identifier, issued by the identity provider.
pub type UserId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub(crate) id: UserId,
    /// Lowercased, trimmed.
    pub(crate) email: String,
    pub(crate) display_name: String,
    pub(crate) created_at: i64,
    pub(crate) version: i64,
    #[serde(skip)]
    pub(crate) events: EventBuffer,
}

impl User {
    /// Registers the profile for an identity issued by the identity provider.
    pub fn register(id: UserId, email: &str, display_name: impl Into<String>) -> Self {
        let mut user = Self {
            id,
            email: normalize_email(email),
            display_name: display_name.into(),
            created_at: now_epoch_ms(),
            version: 0,
            events: EventBuffer::default(),
        };
        user.events.record(DomainEvent::UserRegistered { user_id: id });
        user
    }

    pub fn update_profile(&mut self, display_name: impl Into<String>) {
        let new_display_name = display_name.into();
        let old_display_name = std::mem::replace(&mut self.display_name, new_display_name.clone());
        self.events.record(DomainEvent::UserProfileUpdated {
            user_id: self.id,
            old_display_name,
            new_display_name,
        });
    }

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn created_at(&self) -> i64 {
        self.created_at
    }

    pub fn version(&self) -> i64 {
        self.version
    }

    pub fn pending_events(&self) -> &[DomainEvent] {
        self.events.as_slice()
    }
}

impl Aggregate for User {
    fn aggregate_id(&self) -> Uuid {
        self.id
    }

    fn events_mut(&mut self) -> &mut EventBuffer {
        &mut self.events
    }
}

/// Canonical email form used for storage and uniqueness checks.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}
