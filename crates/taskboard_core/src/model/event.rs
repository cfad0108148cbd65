//! Domain events and the per-aggregate event buffer.
//!
//! # Responsibility
//! - Describe every state transition an aggregate mutator can perform.
//! - Hold recorded events on the aggregate until the unit of work drains them.
//!
//! # Invariants
//! - Events are immutable once recorded.
//! - Buffer order equals recording order.
//! - Only the persistence boundary drains a buffer (`pub(crate)`).

use super::board::BoardId;
use super::column::ColumnId;
use super::comment::CommentId;
use super::membership::{BoardRole, ProjectRole};
use super::project::{ProjectId, ProjectStatus};
use super::task::TaskId;
use super::user::UserId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Immutable record of one aggregate state transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    UserRegistered {
        user_id: UserId,
    },
    UserProfileUpdated {
        user_id: UserId,
        old_display_name: String,
        new_display_name: String,
    },
    ProjectCreated {
        project_id: ProjectId,
        owner_id: UserId,
    },
    ProjectUpdated {
        project_id: ProjectId,
        actor_id: UserId,
        old_name: String,
        new_name: String,
    },
    ProjectStatusChanged {
        project_id: ProjectId,
        actor_id: UserId,
        old_status: ProjectStatus,
        new_status: ProjectStatus,
    },
    ProjectArchived {
        project_id: ProjectId,
        actor_id: UserId,
    },
    ProjectRestored {
        project_id: ProjectId,
        actor_id: UserId,
    },
    ProjectMemberAdded {
        project_id: ProjectId,
        user_id: UserId,
        role: ProjectRole,
        actor_id: UserId,
    },
    ProjectMemberRemoved {
        project_id: ProjectId,
        user_id: UserId,
        actor_id: UserId,
    },
    ProjectMemberRoleUpdated {
        project_id: ProjectId,
        user_id: UserId,
        old_role: ProjectRole,
        new_role: ProjectRole,
        actor_id: UserId,
    },
    BoardCreated {
        board_id: BoardId,
        project_id: ProjectId,
        actor_id: UserId,
    },
    BoardUpdated {
        board_id: BoardId,
        actor_id: UserId,
        old_name: String,
        new_name: String,
    },
    BoardArchived {
        board_id: BoardId,
        actor_id: UserId,
    },
    BoardRestored {
        board_id: BoardId,
        actor_id: UserId,
    },
    BoardMemberAdded {
        board_id: BoardId,
        user_id: UserId,
        role: BoardRole,
        actor_id: UserId,
    },
    BoardMemberRemoved {
        board_id: BoardId,
        user_id: UserId,
        actor_id: UserId,
    },
    BoardMemberRoleUpdated {
        board_id: BoardId,
        user_id: UserId,
        old_role: BoardRole,
        new_role: BoardRole,
        actor_id: UserId,
    },
    ColumnAdded {
        column_id: ColumnId,
        board_id: BoardId,
        order: i32,
        actor_id: UserId,
    },
    ColumnUpdated {
        column_id: ColumnId,
        board_id: BoardId,
        actor_id: UserId,
        old_name: String,
        new_name: String,
        old_order: i32,
        new_order: i32,
        old_wip_limit: Option<u32>,
        new_wip_limit: Option<u32>,
    },
    ColumnDeleted {
        column_id: ColumnId,
        board_id: BoardId,
        actor_id: UserId,
    },
    TaskCreated {
        task_id: TaskId,
        column_id: ColumnId,
        actor_id: UserId,
    },
    TaskUpdated {
        task_id: TaskId,
        actor_id: UserId,
    },
    TaskMoved {
        task_id: TaskId,
        from_column_id: ColumnId,
        to_column_id: ColumnId,
        old_position: i32,
        new_position: i32,
        actor_id: UserId,
    },
    TaskAssigned {
        task_id: TaskId,
        old_assignee_id: Option<UserId>,
        new_assignee_id: Option<UserId>,
        actor_id: UserId,
    },
    TaskArchived {
        task_id: TaskId,
        actor_id: UserId,
    },
    TaskRestored {
        task_id: TaskId,
        actor_id: UserId,
    },
    CommentAdded {
        comment_id: CommentId,
        task_id: TaskId,
        author_id: UserId,
    },
    CommentUpdated {
        comment_id: CommentId,
        task_id: TaskId,
        actor_id: UserId,
    },
    CommentDeleted {
        comment_id: CommentId,
        task_id: TaskId,
        actor_id: UserId,
    },
    CommentRestored {
        comment_id: CommentId,
        task_id: TaskId,
        actor_id: UserId,
    },
}

/// Discriminant of [`DomainEvent`], used as the handler registration key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventKind {
    UserRegistered,
    UserProfileUpdated,
    ProjectCreated,
    ProjectUpdated,
    ProjectStatusChanged,
    ProjectArchived,
    ProjectRestored,
    ProjectMemberAdded,
    ProjectMemberRemoved,
    ProjectMemberRoleUpdated,
    BoardCreated,
    BoardUpdated,
    BoardArchived,
    BoardRestored,
    BoardMemberAdded,
    BoardMemberRemoved,
    BoardMemberRoleUpdated,
    ColumnAdded,
    ColumnUpdated,
    ColumnDeleted,
    TaskCreated,
    TaskUpdated,
    TaskMoved,
    TaskAssigned,
    TaskArchived,
    TaskRestored,
    CommentAdded,
    CommentUpdated,
    CommentDeleted,
    CommentRestored,
}

impl DomainEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::UserRegistered { .. } => EventKind::UserRegistered,
            Self::UserProfileUpdated { .. } => EventKind::UserProfileUpdated,
            Self::ProjectCreated { .. } => EventKind::ProjectCreated,
            Self::ProjectUpdated { .. } => EventKind::ProjectUpdated,
            Self::ProjectStatusChanged { .. } => EventKind::ProjectStatusChanged,
            Self::ProjectArchived { .. } => EventKind::ProjectArchived,
            Self::ProjectRestored { .. } => EventKind::ProjectRestored,
            Self::ProjectMemberAdded { .. } => EventKind::ProjectMemberAdded,
            Self::ProjectMemberRemoved { .. } => EventKind::ProjectMemberRemoved,
            Self::ProjectMemberRoleUpdated { .. } => EventKind::ProjectMemberRoleUpdated,
            Self::BoardCreated { .. } => EventKind::BoardCreated,
            Self::BoardUpdated { .. } => EventKind::BoardUpdated,
            Self::BoardArchived { .. } => EventKind::BoardArchived,
            Self::BoardRestored { .. } => EventKind::BoardRestored,
            Self::BoardMemberAdded { .. } => EventKind::BoardMemberAdded,
            Self::BoardMemberRemoved { .. } => EventKind::BoardMemberRemoved,
            Self::BoardMemberRoleUpdated { .. } => EventKind::BoardMemberRoleUpdated,
            Self::ColumnAdded { .. } => EventKind::ColumnAdded,
            Self::ColumnUpdated { .. } => EventKind::ColumnUpdated,
            Self::ColumnDeleted { .. } => EventKind::ColumnDeleted,
            Self::TaskCreated { .. } => EventKind::TaskCreated,
            Self::TaskUpdated { .. } => EventKind::TaskUpdated,
            Self::TaskMoved { .. } => EventKind::TaskMoved,
            Self::TaskAssigned { .. } => EventKind::TaskAssigned,
            Self::TaskArchived { .. } => EventKind::TaskArchived,
            Self::TaskRestored { .. } => EventKind::TaskRestored,
            Self::CommentAdded { .. } => EventKind::CommentAdded,
            Self::CommentUpdated { .. } => EventKind::CommentUpdated,
            Self::CommentDeleted { .. } => EventKind::CommentDeleted,
            Self::CommentRestored { .. } => EventKind::CommentRestored,
        }
    }

    /// Id of the aggregate that recorded this event.
    pub fn aggregate_id(&self) -> Uuid {
        match self {
            Self::UserRegistered { user_id }
            | Self::UserProfileUpdated { user_id, .. } => *user_id,
            Self::ProjectCreated { project_id, .. }
            | Self::ProjectUpdated { project_id, .. }
            | Self::ProjectStatusChanged { project_id, .. }
            | Self::ProjectArchived { project_id, .. }
            | Self::ProjectRestored { project_id, .. }
            | Self::ProjectMemberAdded { project_id, .. }
            | Self::ProjectMemberRemoved { project_id, .. }
            | Self::ProjectMemberRoleUpdated { project_id, .. } => *project_id,
            Self::BoardCreated { board_id, .. }
            | Self::BoardUpdated { board_id, .. }
            | Self::BoardArchived { board_id, .. }
            | Self::BoardRestored { board_id, .. }
            | Self::BoardMemberAdded { board_id, .. }
            | Self::BoardMemberRemoved { board_id, .. }
            | Self::BoardMemberRoleUpdated { board_id, .. } => *board_id,
            Self::ColumnAdded { column_id, .. }
            | Self::ColumnUpdated { column_id, .. }
            | Self::ColumnDeleted { column_id, .. } => *column_id,
            Self::TaskCreated { task_id, .. }
            | Self::TaskUpdated { task_id, .. }
            | Self::TaskMoved { task_id, .. }
            | Self::TaskAssigned { task_id, .. }
            | Self::TaskArchived { task_id, .. }
            | Self::TaskRestored { task_id, .. } => *task_id,
            Self::CommentAdded { comment_id, .. }
            | Self::CommentUpdated { comment_id, .. }
            | Self::CommentDeleted { comment_id, .. }
            | Self::CommentRestored { comment_id, .. } => *comment_id,
        }
    }
}

impl EventKind {
    /// Stable snake_case name used in log lines.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UserRegistered => "user_registered",
            Self::UserProfileUpdated => "user_profile_updated",
            Self::ProjectCreated => "project_created",
            Self::ProjectUpdated => "project_updated",
            Self::ProjectStatusChanged => "project_status_changed",
            Self::ProjectArchived => "project_archived",
            Self::ProjectRestored => "project_restored",
            Self::ProjectMemberAdded => "project_member_added",
            Self::ProjectMemberRemoved => "project_member_removed",
            Self::ProjectMemberRoleUpdated => "project_member_role_updated",
            Self::BoardCreated => "board_created",
            Self::BoardUpdated => "board_updated",
            Self::BoardArchived => "board_archived",
            Self::BoardRestored => "board_restored",
            Self::BoardMemberAdded => "board_member_added",
            Self::BoardMemberRemoved => "board_member_removed",
            Self::BoardMemberRoleUpdated => "board_member_role_updated",
            Self::ColumnAdded => "column_added",
            Self::ColumnUpdated => "column_updated",
            Self::ColumnDeleted => "column_deleted",
            Self::TaskCreated => "task_created",
            Self::TaskUpdated => "task_updated",
            Self::TaskMoved => "task_moved",
            Self::TaskAssigned => "task_assigned",
            Self::TaskArchived => "task_archived",
            Self::TaskRestored => "task_restored",
            Self::CommentAdded => "comment_added",
            Self::CommentUpdated => "comment_updated",
            Self::CommentDeleted => "comment_deleted",
            Self::CommentRestored => "comment_restored",
        }
    }
}

/// Ordered buffer of events recorded by one aggregate instance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventBuffer {
    events: Vec<DomainEvent>,
}

impl EventBuffer {
    pub(crate) fn record(&mut self, event: DomainEvent) {
        self.events.push(event);
    }

    /// Takes every buffered event, leaving the buffer empty.
    pub(crate) fn drain(&mut self) -> Vec<DomainEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn as_slice(&self) -> &[DomainEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{DomainEvent, EventBuffer, EventKind};
    use uuid::Uuid;

    #[test]
    fn drain_returns_events_in_recorded_order_and_empties_buffer() {
        let task_id = Uuid::new_v4();
        let actor_id = Uuid::new_v4();
        let mut buffer = EventBuffer::default();
        buffer.record(DomainEvent::TaskArchived { task_id, actor_id });
        buffer.record(DomainEvent::TaskRestored { task_id, actor_id });

        let drained = buffer.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].kind(), EventKind::TaskArchived);
        assert_eq!(drained[1].kind(), EventKind::TaskRestored);
        assert!(buffer.is_empty());
    }

    #[test]
    fn aggregate_id_points_at_recording_aggregate() {
        let comment_id = Uuid::new_v4();
        let event = DomainEvent::CommentAdded {
            comment_id,
            task_id: Uuid::new_v4(),
            author_id: Uuid::new_v4(),
        };
        assert_eq!(event.aggregate_id(), comment_id);
        assert_eq!(event.kind().as_str(), "comment_added");
    }
}
