//! Membership roles and the shared capability check.
//!
//! # Responsibility
//! - Define project and board role vocabularies.
//! - Provide the one authorization predicate every domain service uses.
//!
//! # Invariants
//! - Membership rows are the only source of authorization truth.
//! - A user without a row holds no capability on that aggregate.

use super::user::UserId;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Role of one user inside a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectRole {
    Owner,
    Admin,
    Member,
    Viewer,
}

/// Role of one user inside a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardRole {
    Admin,
    Editor,
    Viewer,
}

/// Roles allowed to manage a project (boards, membership, details).
pub const PROJECT_MANAGERS: &[ProjectRole] = &[ProjectRole::Owner, ProjectRole::Admin];
/// Roles allowed to archive or restore a project.
pub const PROJECT_OWNERS: &[ProjectRole] = &[ProjectRole::Owner];
/// Every project role; used for read access.
pub const PROJECT_READERS: &[ProjectRole] = &[
    ProjectRole::Owner,
    ProjectRole::Admin,
    ProjectRole::Member,
    ProjectRole::Viewer,
];

/// Roles allowed to manage board membership and lifecycle.
pub const BOARD_ADMINS: &[BoardRole] = &[BoardRole::Admin];
/// Roles allowed to edit board content (tasks, comments, details).
pub const BOARD_EDITORS: &[BoardRole] = &[BoardRole::Admin, BoardRole::Editor];
/// Every board role; used for read access.
pub const BOARD_READERS: &[BoardRole] = &[BoardRole::Admin, BoardRole::Editor, BoardRole::Viewer];

/// Common shape of membership join rows.
pub trait Membership {
    type Role: Copy + PartialEq;

    fn user_id(&self) -> UserId;
    fn role(&self) -> Self::Role;
}

/// Membership row of one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectMember {
    pub user_id: UserId,
    pub role: ProjectRole,
    /// Unix epoch milliseconds.
    pub joined_at: i64,
}

/// Membership row of one board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardMember {
    pub user_id: UserId,
    pub role: BoardRole,
    /// Unix epoch milliseconds.
    pub joined_at: i64,
}

impl Membership for ProjectMember {
    type Role = ProjectRole;

    fn user_id(&self) -> UserId {
        self.user_id
    }

    fn role(&self) -> ProjectRole {
        self.role
    }
}

impl Membership for BoardMember {
    type Role = BoardRole;

    fn user_id(&self) -> UserId {
        self.user_id
    }

    fn role(&self) -> BoardRole {
        self.role
    }
}

/// Returns whether `user_id` holds one of `allowed` in `members`.
pub fn has_role<M: Membership>(members: &[M], user_id: UserId, allowed: &[M::Role]) -> bool {
    members
        .iter()
        .any(|member| member.user_id() == user_id && allowed.contains(&member.role()))
}

/// Returns the role `user_id` holds in `members`, if any.
pub fn role_of<M: Membership>(members: &[M], user_id: UserId) -> Option<M::Role> {
    members
        .iter()
        .find(|member| member.user_id() == user_id)
        .map(Membership::role)
}

impl ProjectRole {
    /// Stable storage/config string.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Admin => "admin",
            Self::Member => "member",
            Self::Viewer => "viewer",
        }
    }

    pub fn parse(value: &str) -> Result<Self, RoleParseError> {
        match value {
            "owner" => Ok(Self::Owner),
            "admin" => Ok(Self::Admin),
            "member" => Ok(Self::Member),
            "viewer" => Ok(Self::Viewer),
            other => Err(RoleParseError(other.to_string())),
        }
    }
}

impl BoardRole {
    /// Stable storage/config string.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Editor => "editor",
            Self::Viewer => "viewer",
        }
    }

    pub fn parse(value: &str) -> Result<Self, RoleParseError> {
        match value {
            "admin" => Ok(Self::Admin),
            "editor" => Ok(Self::Editor),
            "viewer" => Ok(Self::Viewer),
            other => Err(RoleParseError(other.to_string())),
        }
    }
}

/// Unknown role string in storage or configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleParseError(pub String);

impl Display for RoleParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown role: {}", self.0)
    }
}

impl Error for RoleParseError {}
