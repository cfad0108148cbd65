//! Notification sink contract and the handler that feeds it.
//!
//! # Responsibility
//! - Declare one sink method per externally observable change.
//! - Map committed domain events onto those methods.
//!
//! # Invariants
//! - Domain services never call a sink directly; only
//!   `NotificationHandler` does, from post-commit dispatch.
//! - User profile events are internal and never reach the sink.

use super::dispatcher::{EventHandler, EventHandlerError};
use crate::model::board::BoardId;
use crate::model::column::ColumnId;
use crate::model::comment::CommentId;
use crate::model::event::DomainEvent;
use crate::model::project::{ProjectId, ProjectStatus};
use crate::model::task::TaskId;
use crate::model::user::UserId;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Container a membership change applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipScope {
    Project(ProjectId),
    Board(BoardId),
}

impl MembershipScope {
    fn label(self) -> &'static str {
        match self {
            Self::Project(_) => "project",
            Self::Board(_) => "board",
        }
    }

    fn id(self) -> uuid::Uuid {
        match self {
            Self::Project(id) | Self::Board(id) => id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationError {
    message: String,
}

impl NotificationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Display for NotificationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "notification delivery failed: {}", self.message)
    }
}

impl Error for NotificationError {}

impl From<NotificationError> for EventHandlerError {
    fn from(value: NotificationError) -> Self {
        EventHandlerError::new(value.to_string())
    }
}

pub type NotificationResult = Result<(), NotificationError>;

/// Live notification transport.
///
/// Every method defaults to a no-op so transports implement only the
/// notifications they deliver.
pub trait NotificationSink: Send + Sync {
    fn project_created(&self, _project_id: ProjectId, _owner_id: UserId) -> NotificationResult {
        Ok(())
    }

    fn project_updated(&self, _project_id: ProjectId, _actor_id: UserId) -> NotificationResult {
        Ok(())
    }

    fn project_status_changed(
        &self,
        _project_id: ProjectId,
        _status: ProjectStatus,
        _actor_id: UserId,
    ) -> NotificationResult {
        Ok(())
    }

    fn project_archived(&self, _project_id: ProjectId, _actor_id: UserId) -> NotificationResult {
        Ok(())
    }

    fn project_restored(&self, _project_id: ProjectId, _actor_id: UserId) -> NotificationResult {
        Ok(())
    }

    fn board_created(
        &self,
        _board_id: BoardId,
        _project_id: ProjectId,
        _actor_id: UserId,
    ) -> NotificationResult {
        Ok(())
    }

    fn board_updated(&self, _board_id: BoardId, _actor_id: UserId) -> NotificationResult {
        Ok(())
    }

    fn board_archived(&self, _board_id: BoardId, _actor_id: UserId) -> NotificationResult {
        Ok(())
    }

    fn board_restored(&self, _board_id: BoardId, _actor_id: UserId) -> NotificationResult {
        Ok(())
    }

    fn column_created(
        &self,
        _board_id: BoardId,
        _column_id: ColumnId,
        _actor_id: UserId,
    ) -> NotificationResult {
        Ok(())
    }

    fn column_updated(
        &self,
        _board_id: BoardId,
        _column_id: ColumnId,
        _actor_id: UserId,
    ) -> NotificationResult {
        Ok(())
    }

    fn column_deleted(
        &self,
        _board_id: BoardId,
        _column_id: ColumnId,
        _actor_id: UserId,
    ) -> NotificationResult {
        Ok(())
    }

    fn task_created(
        &self,
        _column_id: ColumnId,
        _task_id: TaskId,
        _actor_id: UserId,
    ) -> NotificationResult {
        Ok(())
    }

    fn task_updated(&self, _task_id: TaskId, _actor_id: UserId) -> NotificationResult {
        Ok(())
    }

    fn task_moved(
        &self,
        _task_id: TaskId,
        _from_column_id: ColumnId,
        _to_column_id: ColumnId,
        _actor_id: UserId,
    ) -> NotificationResult {
        Ok(())
    }

    fn task_assigned(
        &self,
        _task_id: TaskId,
        _assignee_id: Option<UserId>,
        _actor_id: UserId,
    ) -> NotificationResult {
        Ok(())
    }

    fn task_archived(&self, _task_id: TaskId, _actor_id: UserId) -> NotificationResult {
        Ok(())
    }

    fn task_restored(&self, _task_id: TaskId, _actor_id: UserId) -> NotificationResult {
        Ok(())
    }

    fn task_commented(
        &self,
        _task_id: TaskId,
        _comment_id: CommentId,
        _author_id: UserId,
    ) -> NotificationResult {
        Ok(())
    }

    fn comment_updated(
        &self,
        _task_id: TaskId,
        _comment_id: CommentId,
        _actor_id: UserId,
    ) -> NotificationResult {
        Ok(())
    }

    fn comment_deleted(
        &self,
        _task_id: TaskId,
        _comment_id: CommentId,
        _actor_id: UserId,
    ) -> NotificationResult {
        Ok(())
    }

    fn comment_restored(
        &self,
        _task_id: TaskId,
        _comment_id: CommentId,
        _actor_id: UserId,
    ) -> NotificationResult {
        Ok(())
    }

    fn member_added(
        &self,
        _scope: MembershipScope,
        _user_id: UserId,
        _actor_id: UserId,
    ) -> NotificationResult {
        Ok(())
    }

    fn member_removed(
        &self,
        _scope: MembershipScope,
        _user_id: UserId,
        _actor_id: UserId,
    ) -> NotificationResult {
        Ok(())
    }

    fn member_role_updated(
        &self,
        _scope: MembershipScope,
        _user_id: UserId,
        _actor_id: UserId,
    ) -> NotificationResult {
        Ok(())
    }
}

/// Event handler forwarding committed events to a [`NotificationSink`].
pub struct NotificationHandler {
    sink: Arc<dyn NotificationSink>,
}

impl NotificationHandler {
    pub const NAME: &'static str = "notification";

    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        Self { sink }
    }
}

impl EventHandler for NotificationHandler {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn handle(&self, event: &DomainEvent) -> Result<(), EventHandlerError> {
        let sink = self.sink.as_ref();
        let result = match *event {
            DomainEvent::UserRegistered { .. } | DomainEvent::UserProfileUpdated { .. } => Ok(()),
            DomainEvent::ProjectCreated {
                project_id,
                owner_id,
            } => sink.project_created(project_id, owner_id),
            DomainEvent::ProjectUpdated {
                project_id,
                actor_id,
                ..
            } => sink.project_updated(project_id, actor_id),
            DomainEvent::ProjectStatusChanged {
                project_id,
                actor_id,
                new_status,
                ..
            } => sink.project_status_changed(project_id, new_status, actor_id),
            DomainEvent::ProjectArchived {
                project_id,
                actor_id,
            } => sink.project_archived(project_id, actor_id),
            DomainEvent::ProjectRestored {
                project_id,
                actor_id,
            } => sink.project_restored(project_id, actor_id),
            DomainEvent::ProjectMemberAdded {
                project_id,
                user_id,
                actor_id,
                ..
            } => sink.member_added(MembershipScope::Project(project_id), user_id, actor_id),
            DomainEvent::ProjectMemberRemoved {
                project_id,
                user_id,
                actor_id,
            } => sink.member_removed(MembershipScope::Project(project_id), user_id, actor_id),
            DomainEvent::ProjectMemberRoleUpdated {
                project_id,
                user_id,
                actor_id,
                ..
            } => sink.member_role_updated(MembershipScope::Project(project_id), user_id, actor_id),
            DomainEvent::BoardCreated {
                board_id,
                project_id,
                actor_id,
            } => sink.board_created(board_id, project_id, actor_id),
            DomainEvent::BoardUpdated {
                board_id,
                actor_id,
                ..
            } => sink.board_updated(board_id, actor_id),
            DomainEvent::BoardArchived { board_id, actor_id } => {
                sink.board_archived(board_id, actor_id)
            }
            DomainEvent::BoardRestored { board_id, actor_id } => {
                sink.board_restored(board_id, actor_id)
            }
            DomainEvent::BoardMemberAdded {
                board_id,
                user_id,
                actor_id,
                ..
            } => sink.member_added(MembershipScope::Board(board_id), user_id, actor_id),
            DomainEvent::BoardMemberRemoved {
                board_id,
                user_id,
                actor_id,
            } => sink.member_removed(MembershipScope::Board(board_id), user_id, actor_id),
            DomainEvent::BoardMemberRoleUpdated {
                board_id,
                user_id,
                actor_id,
                ..
            } => sink.member_role_updated(MembershipScope::Board(board_id), user_id, actor_id),
            DomainEvent::ColumnAdded {
                column_id,
                board_id,
                actor_id,
                ..
            } => sink.column_created(board_id, column_id, actor_id),
            DomainEvent::ColumnUpdated {
                column_id,
                board_id,
                actor_id,
                ..
            } => sink.column_updated(board_id, column_id, actor_id),
            DomainEvent::ColumnDeleted {
                column_id,
                board_id,
                actor_id,
            } => sink.column_deleted(board_id, column_id, actor_id),
            DomainEvent::TaskCreated {
                task_id,
                column_id,
                actor_id,
            } => sink.task_created(column_id, task_id, actor_id),
            DomainEvent::TaskUpdated { task_id, actor_id } => sink.task_updated(task_id, actor_id),
            DomainEvent::TaskMoved {
                task_id,
                from_column_id,
                to_column_id,
                actor_id,
                ..
            } => sink.task_moved(task_id, from_column_id, to_column_id, actor_id),
            DomainEvent::TaskAssigned {
                task_id,
                new_assignee_id,
                actor_id,
                ..
            } => sink.task_assigned(task_id, new_assignee_id, actor_id),
            DomainEvent::TaskArchived { task_id, actor_id } => {
                sink.task_archived(task_id, actor_id)
            }
            DomainEvent::TaskRestored { task_id, actor_id } => {
                sink.task_restored(task_id, actor_id)
            }
            DomainEvent::CommentAdded {
                comment_id,
                task_id,
                author_id,
            } => sink.task_commented(task_id, comment_id, author_id),
            DomainEvent::CommentUpdated {
                comment_id,
                task_id,
                actor_id,
            } => sink.comment_updated(task_id, comment_id, actor_id),
            DomainEvent::CommentDeleted {
                comment_id,
                task_id,
                actor_id,
            } => sink.comment_deleted(task_id, comment_id, actor_id),
            DomainEvent::CommentRestored {
                comment_id,
                task_id,
                actor_id,
            } => sink.comment_restored(task_id, comment_id, actor_id),
        };
        result.map_err(EventHandlerError::from)
    }
}

/// Sink that writes one metadata-only log line per notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotificationSink;

impl LogNotificationSink {
    fn emit(&self, kind: &str, target_id: uuid::Uuid, actor_id: UserId) -> NotificationResult {
        info!(
            "event=notification module=events status=ok kind={} target_id={} actor_id={}",
            kind, target_id, actor_id
        );
        Ok(())
    }
}

impl NotificationSink for LogNotificationSink {
    fn project_created(&self, project_id: ProjectId, owner_id: UserId) -> NotificationResult {
        self.emit("project_created", project_id, owner_id)
    }

    fn project_updated(&self, project_id: ProjectId, actor_id: UserId) -> NotificationResult {
        self.emit("project_updated", project_id, actor_id)
    }

    fn project_status_changed(
        &self,
        project_id: ProjectId,
        _status: ProjectStatus,
        actor_id: UserId,
    ) -> NotificationResult {
        self.emit("project_status_changed", project_id, actor_id)
    }

    fn project_archived(&self, project_id: ProjectId, actor_id: UserId) -> NotificationResult {
        self.emit("project_archived", project_id, actor_id)
    }

    fn project_restored(&self, project_id: ProjectId, actor_id: UserId) -> NotificationResult {
        self.emit("project_restored", project_id, actor_id)
    }

    fn board_created(
        &self,
        board_id: BoardId,
        _project_id: ProjectId,
        actor_id: UserId,
    ) -> NotificationResult {
        self.emit("board_created", board_id, actor_id)
    }

    fn board_updated(&self, board_id: BoardId, actor_id: UserId) -> NotificationResult {
        self.emit("board_updated", board_id, actor_id)
    }

    fn board_archived(&self, board_id: BoardId, actor_id: UserId) -> NotificationResult {
        self.emit("board_archived", board_id, actor_id)
    }

    fn board_restored(&self, board_id: BoardId, actor_id: UserId) -> NotificationResult {
        self.emit("board_restored", board_id, actor_id)
    }

    fn column_created(
        &self,
        _board_id: BoardId,
        column_id: ColumnId,
        actor_id: UserId,
    ) -> NotificationResult {
        self.emit("column_created", column_id, actor_id)
    }

    fn column_updated(
        &self,
        _board_id: BoardId,
        column_id: ColumnId,
        actor_id: UserId,
    ) -> NotificationResult {
        self.emit("column_updated", column_id, actor_id)
    }

    fn column_deleted(
        &self,
        _board_id: BoardId,
        column_id: ColumnId,
        actor_id: UserId,
    ) -> NotificationResult {
        self.emit("column_deleted", column_id, actor_id)
    }

    fn task_created(
        &self,
        _column_id: ColumnId,
        task_id: TaskId,
        actor_id: UserId,
    ) -> NotificationResult {
        self.emit("task_created", task_id, actor_id)
    }

    fn task_updated(&self, task_id: TaskId, actor_id: UserId) -> NotificationResult {
        self.emit("task_updated", task_id, actor_id)
    }

    fn task_moved(
        &self,
        task_id: TaskId,
        _from_column_id: ColumnId,
        _to_column_id: ColumnId,
        actor_id: UserId,
    ) -> NotificationResult {
        self.emit("task_moved", task_id, actor_id)
    }

    fn task_assigned(
        &self,
        task_id: TaskId,
        _assignee_id: Option<UserId>,
        actor_id: UserId,
    ) -> NotificationResult {
        self.emit("task_assigned", task_id, actor_id)
    }

    fn task_archived(&self, task_id: TaskId, actor_id: UserId) -> NotificationResult {
        self.emit("task_archived", task_id, actor_id)
    }

    fn task_restored(&self, task_id: TaskId, actor_id: UserId) -> NotificationResult {
        self.emit("task_restored", task_id, actor_id)
    }

    fn task_commented(
        &self,
        task_id: TaskId,
        _comment_id: CommentId,
        author_id: UserId,
    ) -> NotificationResult {
        self.emit("task_commented", task_id, author_id)
    }

    fn comment_updated(
        &self,
        _task_id: TaskId,
        comment_id: CommentId,
        actor_id: UserId,
    ) -> NotificationResult {
        self.emit("comment_updated", comment_id, actor_id)
    }

    fn comment_deleted(
        &self,
        _task_id: TaskId,
        comment_id: CommentId,
        actor_id: UserId,
    ) -> NotificationResult {
        self.emit("comment_deleted", comment_id, actor_id)
    }

    fn comment_restored(
        &self,
        _task_id: TaskId,
        comment_id: CommentId,
        actor_id: UserId,
    ) -> NotificationResult {
        self.emit("comment_restored", comment_id, actor_id)
    }

    fn member_added(
        &self,
        scope: MembershipScope,
        _user_id: UserId,
        actor_id: UserId,
    ) -> NotificationResult {
        self.emit(&format!("{}_member_added", scope.label()), scope.id(), actor_id)
    }

    fn member_removed(
        &self,
        scope: MembershipScope,
        _user_id: UserId,
        actor_id: UserId,
    ) -> NotificationResult {
        self.emit(&format!("{}_member_removed", scope.label()), scope.id(), actor_id)
    }

    fn member_role_updated(
        &self,
        scope: MembershipScope,
        _user_id: UserId,
        actor_id: UserId,
    ) -> NotificationResult {
        self.emit(
            &format!("{}_member_role_updated", scope.label()),
            scope.id(),
            actor_id,
        )
    }
}
