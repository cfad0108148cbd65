//! Domain services, one per aggregate family.
//!
//! # Responsibility
//! - Orchestrate load, authorization, business checks and mutation.
//! - Hand mutated aggregates back to the unit of work.
//!
//! # Invariants
//! - Every operation authenticates the caller before loading anything.
//! - Authorization goes through `membership::has_role` only.
//! - Services never commit and never call notification sinks.

pub mod board_service;
pub mod column_service;
pub mod comment_service;
pub mod project_service;
pub mod task_service;
pub mod user_service;

use crate::error::{CoreError, CoreResult};
use crate::model::board::Board;
use crate::model::membership::{has_role, BoardRole, ProjectRole};
use crate::model::project::Project;
use crate::model::user::UserId;
use uuid::Uuid;

pub use board_service::BoardService;
pub use column_service::ColumnService;
pub use comment_service::CommentService;
pub use project_service::ProjectService;
pub use task_service::TaskService;
pub use user_service::UserService;

/// Maps a missing aggregate to `NotFound`.
pub(crate) fn found<T>(value: Option<T>, entity: &'static str, id: Uuid) -> CoreResult<T> {
    value.ok_or(CoreError::NotFound { entity, id })
}

pub(crate) fn require_board_role(
    board: &Board,
    user_id: UserId,
    allowed: &[BoardRole],
) -> CoreResult<()> {
    if has_role(board.members(), user_id, allowed) {
        return Ok(());
    }
    Err(CoreError::AccessDenied {
        entity: "board",
        id: board.id(),
    })
}

pub(crate) fn require_project_role(
    project: &Project,
    user_id: UserId,
    allowed: &[ProjectRole],
) -> CoreResult<()> {
    if has_role(project.members(), user_id, allowed) {
        return Ok(());
    }
    Err(CoreError::AccessDenied {
        entity: "project",
        id: project.id(),
    })
}
