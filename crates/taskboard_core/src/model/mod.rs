//! Aggregate domain model for projects, boards, columns, tasks and comments.
//!
//! # Responsibility
//! - Define aggregates and their intention-revealing mutators.
//! - Record one domain event per successful state transition.
//!
//! # Invariants
//! - Mutators never perform I/O or authorization checks.
//! - A mutator that fails leaves the aggregate and its event buffer untouched.
//! - Deletion is soft (`is_deleted`) or archive based, never a hard delete.

pub mod board;
pub mod column;
pub mod comment;
pub mod event;
pub mod membership;
pub mod project;
pub mod task;
pub mod user;

use event::{DomainEvent, EventBuffer};
use project::ProjectStatus;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Aggregate-level invariant violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Archive requested on an already archived aggregate.
    AlreadyArchived { entity: &'static str, id: Uuid },
    /// Restore requested on an aggregate that is not archived.
    NotArchived { entity: &'static str, id: Uuid },
    /// Delete requested on an already deleted aggregate.
    AlreadyDeleted { entity: &'static str, id: Uuid },
    /// Restore requested on an aggregate that is not deleted.
    NotDeleted { entity: &'static str, id: Uuid },
    /// Mutation requested on an archived aggregate.
    Archived { entity: &'static str, id: Uuid },
    /// Mutation requested on a soft-deleted aggregate.
    Deleted { entity: &'static str, id: Uuid },
    /// User already holds a membership row.
    AlreadyMember(Uuid),
    /// User holds no membership row.
    NotMember(Uuid),
    /// Board membership requires project membership first.
    NotProjectMember(Uuid),
    /// Project membership cannot end while the user still sits on a board.
    StillBoardMember { user_id: Uuid, board_id: Uuid },
    /// The project owner cannot be granted, removed or re-roled.
    OwnerRoleImmutable,
    /// Removing or demoting the last board admin.
    LastBoardAdmin,
    /// Source and destination columns belong to different boards.
    CrossBoardMove { from_board: Uuid, to_board: Uuid },
    /// Column is at its WIP limit.
    WipLimitReached { column_id: Uuid, limit: u32 },
    /// New WIP limit is below the current active task count.
    WipLimitBelowTaskCount {
        column_id: Uuid,
        limit: u32,
        active: usize,
    },
    /// Column still holds active tasks.
    ColumnNotEmpty { column_id: Uuid, active: usize },
    /// Project status change that is not allowed through `change_status`.
    InvalidStatusTransition {
        from: ProjectStatus,
        to: ProjectStatus,
    },
    /// A profile already exists for this identity.
    UserAlreadyProvisioned(Uuid),
    /// Email address is bound to another user.
    EmailInUse,
}

impl Display for DomainError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyArchived { entity, id } => write!(f, "{entity} already archived: {id}"),
            Self::NotArchived { entity, id } => write!(f, "{entity} is not archived: {id}"),
            Self::AlreadyDeleted { entity, id } => write!(f, "{entity} already deleted: {id}"),
            Self::NotDeleted { entity, id } => write!(f, "{entity} is not deleted: {id}"),
            Self::Archived { entity, id } => write!(f, "{entity} is archived: {id}"),
            Self::Deleted { entity, id } => write!(f, "{entity} is deleted: {id}"),
            Self::AlreadyMember(user_id) => write!(f, "user is already a member: {user_id}"),
            Self::NotMember(user_id) => write!(f, "user is not a member: {user_id}"),
            Self::NotProjectMember(user_id) => {
                write!(f, "user is not a member of the owning project: {user_id}")
            }
            Self::StillBoardMember { user_id, board_id } => write!(
                f,
                "user {user_id} must leave board {board_id} before leaving the project"
            ),
            Self::OwnerRoleImmutable => write!(f, "project owner role cannot be changed"),
            Self::LastBoardAdmin => write!(f, "board must keep at least one admin"),
            Self::CrossBoardMove {
                from_board,
                to_board,
            } => write!(
                f,
                "task cannot move across boards: {from_board} -> {to_board}"
            ),
            Self::WipLimitReached { column_id, limit } => {
                write!(f, "column {column_id} reached its WIP limit of {limit}")
            }
            Self::WipLimitBelowTaskCount {
                column_id,
                limit,
                active,
            } => write!(
                f,
                "WIP limit {limit} is below {active} active tasks in column {column_id}"
            ),
            Self::ColumnNotEmpty { column_id, active } => {
                write!(f, "column {column_id} still holds {active} active tasks")
            }
            Self::InvalidStatusTransition { from, to } => {
                write!(f, "project status cannot change from {from:?} to {to:?}")
            }
            Self::UserAlreadyProvisioned(user_id) => {
                write!(f, "user profile already exists: {user_id}")
            }
            Self::EmailInUse => write!(f, "email address is already in use"),
        }
    }
}

impl Error for DomainError {}

pub type DomainResult<T> = Result<T, DomainError>;

/// Crate-internal view the unit of work uses to track and drain aggregates.
pub(crate) trait Aggregate {
    fn aggregate_id(&self) -> Uuid;
    fn events_mut(&mut self) -> &mut EventBuffer;

    /// Hands buffered events to the persistence boundary.
    fn drain_events(&mut self) -> Vec<DomainEvent> {
        self.events_mut().drain()
    }
}

/// Current wall clock as Unix epoch milliseconds.
pub(crate) fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}
