//! Repository contracts, SQLite row mapping and the unit of work.
//!
//! # Responsibility
//! - Define one repository contract per aggregate family.
//! - Track added/updated aggregates for the current unit of work.
//! - Persist tracked changes atomically and hand events to dispatch.
//!
//! # Invariants
//! - Reads through a repository see changes tracked in the same unit of work.
//! - Nothing is written to SQLite before `UnitOfWork::complete`.
//! - Updates are guarded by the aggregate `version` column.

pub mod board_repo;
pub mod column_repo;
pub mod comment_repo;
pub mod project_repo;
mod rows;
pub mod task_repo;
mod tracking;
pub mod unit_of_work;
pub mod user_repo;

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub use board_repo::{BoardRepository, SqliteBoardRepository};
pub use column_repo::{ColumnRepository, SqliteColumnRepository};
pub use comment_repo::{CommentRepository, SqliteCommentRepository};
pub use project_repo::{ProjectRepository, SqliteProjectRepository};
pub use task_repo::{SqliteTaskRepository, TaskRepository};
pub use unit_of_work::UnitOfWork;
pub use user_repo::{SqliteUserRepository, UserRepository};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository and commit failures.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Row addressed by an update does not exist.
    NotFound { entity: &'static str, id: Uuid },
    /// Stored version differs from the version this unit of work loaded.
    Conflict {
        entity: &'static str,
        id: Uuid,
        expected_version: i64,
    },
    /// The same aggregate was added twice to one unit of work.
    AlreadyTracked { entity: &'static str, id: Uuid },
    /// Persisted data cannot be converted back into an aggregate.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::Conflict {
                entity,
                id,
                expected_version,
            } => write!(
                f,
                "{entity} {id} no longer at version {expected_version}"
            ),
            Self::AlreadyTracked { entity, id } => {
                write!(f, "{entity} {id} is already tracked by this unit of work")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}
