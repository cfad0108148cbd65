//! Comment aggregate.
//!
//! # Invariants
//! - Authorship never changes; the comment service restricts every mutation
//!   to the author.
//! - Update and delete require a live comment; restore requires a deleted one.

use super::event::{DomainEvent, EventBuffer};
use super::task::TaskId;
use super::user::UserId;
use super::{now_epoch_ms, Aggregate, DomainError, DomainResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type CommentId = Uuid;

const ENTITY: &str = "comment";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub(crate) id: CommentId,
    pub(crate) task_id: TaskId,
    pub(crate) author_id: UserId,
    pub(crate) content: String,
    pub(crate) is_deleted: bool,
    pub(crate) is_edited: bool,
    /// Unix epoch milliseconds of the last content change.
    pub(crate) edited_at: Option<i64>,
    pub(crate) created_at: i64,
    pub(crate) version: i64,
    #[serde(skip)]
    pub(crate) events: EventBuffer,
}

impl Comment {
    pub fn create(task_id: TaskId, author_id: UserId, content: impl Into<String>) -> Self {
        let mut comment = Self {
            id: Uuid::new_v4(),
            task_id,
            author_id,
            content: content.into(),
            is_deleted: false,
            is_edited: false,
            edited_at: None,
            created_at: now_epoch_ms(),
            version: 0,
            events: EventBuffer::default(),
        };
        comment.events.record(DomainEvent::CommentAdded {
            comment_id: comment.id,
            task_id,
            author_id,
        });
        comment
    }

    pub fn update_content(
        &mut self,
        content: impl Into<String>,
        actor_id: UserId,
    ) -> DomainResult<()> {
        if self.is_deleted {
            return Err(DomainError::Deleted {
                entity: ENTITY,
                id: self.id,
            });
        }
        self.content = content.into();
        self.is_edited = true;
        self.edited_at = Some(now_epoch_ms());
        self.events.record(DomainEvent::CommentUpdated {
            comment_id: self.id,
            task_id: self.task_id,
            actor_id,
        });
        Ok(())
    }

    pub fn delete(&mut self, actor_id: UserId) -> DomainResult<()> {
        if self.is_deleted {
            return Err(DomainError::AlreadyDeleted {
                entity: ENTITY,
                id: self.id,
            });
        }
        self.is_deleted = true;
        self.events.record(DomainEvent::CommentDeleted {
            comment_id: self.id,
            task_id: self.task_id,
            actor_id,
        });
        Ok(())
    }

    pub fn restore(&mut self, actor_id: UserId) -> DomainResult<()> {
        if !self.is_deleted {
            return Err(DomainError::NotDeleted {
                entity: ENTITY,
                id: self.id,
            });
        }
        self.is_deleted = false;
        self.events.record(DomainEvent::CommentRestored {
            comment_id: self.id,
            task_id: self.task_id,
            actor_id,
        });
        Ok(())
    }

    pub fn is_authored_by(&self, user_id: UserId) -> bool {
        self.author_id == user_id
    }

    pub fn id(&self) -> CommentId {
        self.id
    }

    pub fn task_id(&self) -> TaskId {
        self.task_id
    }

    pub fn author_id(&self) -> UserId {
        self.author_id
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn is_deleted(&self) -> bool {
        self.is_deleted
    }

    pub fn is_edited(&self) -> bool {
        self.is_edited
    }

    pub fn edited_at(&self) -> Option<i64> {
        self.edited_at
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

impl Aggregate for Comment {
    fn aggregate_id(&self) -> Uuid {
        self.id
    }

    fn events_mut(&mut self) -> &mut EventBuffer {
        &mut self.events
    }
}
