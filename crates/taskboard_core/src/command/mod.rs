//! Command and query request types.
//!
//! # Responsibility
//! - Declare one request type per core operation.
//! - Attach shape validation and the mutating marker to each request.
//!
//! # Invariants
//! - Commands (`MUTATES = true`) are committed by the pipeline on success.
//! - Queries (`MUTATES = false`) only read through the unit of work.

pub mod board;
pub mod column;
pub mod comment;
pub mod project;
pub mod task;
pub mod user;

pub use board::{
    AddBoardMember, ArchiveBoard, CreateBoard, GetBoard, ListBoardColumns, RemoveBoardMember,
    RestoreBoard, UpdateBoard, UpdateBoardMemberRole,
};
pub use column::{CreateColumn, DeleteColumn, UpdateColumn};
pub use comment::{AddComment, DeleteComment, ListTaskComments, RestoreComment, UpdateComment};
pub use project::{
    AddProjectMember, ArchiveProject, ChangeProjectStatus, CreateProject, GetProject,
    RemoveProjectMember, RestoreProject, UpdateProject, UpdateProjectMemberRole,
};
pub use task::{
    ArchiveTask, AssignTask, CreateTask, GetTask, ListColumnTasks, MoveTask, RestoreTask,
    UpdateTask,
};
pub use user::{GetUser, ProvisionUser, UpdateProfile};

pub(crate) const NAME_MAX_LEN: usize = 100;
pub(crate) const TITLE_MAX_LEN: usize = 200;
pub(crate) const DESCRIPTION_MAX_LEN: usize = 2_000;
pub(crate) const COMMENT_MAX_LEN: usize = 4_000;
pub(crate) const EMAIL_MAX_LEN: usize = 254;
pub(crate) const COLUMN_ORDER_MAX: i32 = 10_000;
pub(crate) const WIP_LIMIT_MAX: u32 = 1_000;
pub(crate) const TASK_POSITION_MAX: i32 = 1_000_000;
