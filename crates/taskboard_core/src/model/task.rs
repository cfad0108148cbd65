//! Board task aggregate.
//!
//! # Invariants
//! - A task belongs to exactly one column at a time.
//! - Archived tasks reject edits, moves and assignment changes.
//! - Same-board moves are enforced by the task service, which can see both
//!   columns; the task only records the transition.

use super::column::ColumnId;
use super::event::{DomainEvent, EventBuffer};
use super::user::UserId;
use super::{now_epoch_ms, Aggregate, DomainError, DomainResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type TaskId = Uuid;

const ENTITY: &str = "task";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
    Critical,
}

/// Editable task fields, shared by creation and `update_details`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDetails {
    pub title: String,
    pub description: Option<String>,
    pub priority: TaskPriority,
    /// Unix epoch milliseconds.
    pub due_date: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardTask {
    pub(crate) id: TaskId,
    pub(crate) column_id: ColumnId,
    pub(crate) title: String,
    pub(crate) description: Option<String>,
    pub(crate) priority: TaskPriority,
    pub(crate) due_date: Option<i64>,
    pub(crate) position: i32,
    pub(crate) assignee_id: Option<UserId>,
    pub(crate) is_archived: bool,
    pub(crate) created_by: UserId,
    pub(crate) created_at: i64,
    pub(crate) version: i64,
    #[serde(skip)]
    pub(crate) events: EventBuffer,
}

impl BoardTask {
    pub fn create(
        column_id: ColumnId,
        details: TaskDetails,
        position: i32,
        creator_id: UserId,
    ) -> Self {
        let mut task = Self {
            id: Uuid::new_v4(),
            column_id,
            title: details.title,
            description: details.description,
            priority: details.priority,
            due_date: details.due_date,
            position,
            assignee_id: None,
            is_archived: false,
            created_by: creator_id,
            created_at: now_epoch_ms(),
            version: 0,
            events: EventBuffer::default(),
        };
        task.events.record(DomainEvent::TaskCreated {
            task_id: task.id,
            column_id,
            actor_id: creator_id,
        });
        task
    }

    pub fn update_details(&mut self, details: TaskDetails, actor_id: UserId) -> DomainResult<()> {
        self.ensure_not_archived()?;
        self.title = details.title;
        self.description = details.description;
        self.priority = details.priority;
        self.due_date = details.due_date;
        self.events.record(DomainEvent::TaskUpdated {
            task_id: self.id,
            actor_id,
        });
        Ok(())
    }

    /// Moves the task to `new_column_id` at `position`.
    pub fn move_to_column(
        &mut self,
        new_column_id: ColumnId,
        position: i32,
        actor_id: UserId,
    ) -> DomainResult<()> {
        self.ensure_not_archived()?;
        let from_column_id = std::mem::replace(&mut self.column_id, new_column_id);
        let old_position = std::mem::replace(&mut self.position, position);
        self.events.record(DomainEvent::TaskMoved {
            task_id: self.id,
            from_column_id,
            to_column_id: new_column_id,
            old_position,
            new_position: position,
            actor_id,
        });
        Ok(())
    }

    /// Assigns the task; `None` clears the assignee.
    pub fn assign_to_user(
        &mut self,
        assignee_id: Option<UserId>,
        actor_id: UserId,
    ) -> DomainResult<()> {
        self.ensure_not_archived()?;
        let old_assignee_id = std::mem::replace(&mut self.assignee_id, assignee_id);
        self.events.record(DomainEvent::TaskAssigned {
            task_id: self.id,
            old_assignee_id,
            new_assignee_id: assignee_id,
            actor_id,
        });
        Ok(())
    }

    pub fn archive(&mut self, actor_id: UserId) -> DomainResult<()> {
        if self.is_archived {
            return Err(DomainError::AlreadyArchived {
                entity: ENTITY,
                id: self.id,
            });
        }
        self.is_archived = true;
        self.events.record(DomainEvent::TaskArchived {
            task_id: self.id,
            actor_id,
        });
        Ok(())
    }

    pub fn restore(&mut self, actor_id: UserId) -> DomainResult<()> {
        if !self.is_archived {
            return Err(DomainError::NotArchived {
                entity: ENTITY,
                id: self.id,
            });
        }
        self.is_archived = false;
        self.events.record(DomainEvent::TaskRestored {
            task_id: self.id,
            actor_id,
        });
        Ok(())
    }

    pub fn ensure_not_archived(&self) -> DomainResult<()> {
        if self.is_archived {
            return Err(DomainError::Archived {
                entity: ENTITY,
                id: self.id,
            });
        }
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        !self.is_archived
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn column_id(&self) -> ColumnId {
        self.column_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn priority(&self) -> TaskPriority {
        self.priority
    }

    pub fn due_date(&self) -> Option<i64> {
        self.due_date
    }

    pub fn position(&self) -> i32 {
        self.position
    }

    pub fn assignee_id(&self) -> Option<UserId> {
        self.assignee_id
    }

    pub fn is_archived(&self) -> bool {
        self.is_archived
    }

    pub fn created_by(&self) -> UserId {
        self.created_by
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

impl Aggregate for BoardTask {
    fn aggregate_id(&self) -> Uuid {
        self.id
    }

    fn events_mut(&mut self) -> &mut EventBuffer {
        &mut self.events
    }
}

impl TaskPriority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BoardTask, TaskDetails, TaskPriority};
    use crate::model::event::DomainEvent;
    use crate::model::DomainError;
    use uuid::Uuid;

    fn task() -> (BoardTask, Uuid) {
        let actor = Uuid::new_v4();
        let details = TaskDetails {
            title: "Write release notes".to_string(),
            description: None,
            priority: TaskPriority::Medium,
            due_date: None,
        };
        (BoardTask::create(Uuid::new_v4(), details, 0, actor), actor)
    }

    #[test]
    fn move_records_from_and_to_columns() {
        let (mut task, actor) = task();
        let from = task.column_id();
        let to = Uuid::new_v4();
        task.move_to_column(to, 2, actor).unwrap();

        assert_eq!(task.column_id(), to);
        assert_eq!(
            task.pending_events().last(),
            Some(&DomainEvent::TaskMoved {
                task_id: task.id(),
                from_column_id: from,
                to_column_id: to,
                old_position: 0,
                new_position: 2,
                actor_id: actor,
            })
        );
    }

    #[test]
    fn archived_task_cannot_move_or_be_assigned() {
        let (mut task, actor) = task();
        let column = task.column_id();
        task.archive(actor).unwrap();

        assert!(matches!(
            task.move_to_column(Uuid::new_v4(), 0, actor),
            Err(DomainError::Archived { .. })
        ));
        assert!(matches!(
            task.assign_to_user(Some(actor), actor),
            Err(DomainError::Archived { .. })
        ));
        assert_eq!(task.column_id(), column);
        assert_eq!(task.pending_events().len(), 2);
    }

    #[test]
    fn restore_requires_archived_state() {
        let (mut task, actor) = task();
        assert!(matches!(
            task.restore(actor),
            Err(DomainError::NotArchived { .. })
        ));
        task.archive(actor).unwrap();
        task.restore(actor).unwrap();
        assert!(task.is_active());
    }

    #[test]
    fn unassign_records_previous_assignee() {
        let (mut task, actor) = task();
        let assignee = Uuid::new_v4();
        task.assign_to_user(Some(assignee), actor).unwrap();
        task.assign_to_user(None, actor).unwrap();

        assert_eq!(task.assignee_id(), None);
        assert_eq!(
            task.pending_events().last(),
            Some(&DomainEvent::TaskAssigned {
                task_id: task.id(),
                old_assignee_id: Some(assignee),
                new_assignee_id: None,
                actor_id: actor,
            })
        );
    }
}
