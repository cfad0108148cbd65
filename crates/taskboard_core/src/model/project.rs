//! Project aggregate.
//!
//! # Responsibility
//! - Own project details, lifecycle status and project membership.
//!
//! # Invariants
//! - Exactly one `Owner` member, established at creation.
//! - The owner row can never be added, removed or re-roled afterwards.
//! - `is_archived` is true exactly when `status == Archived`.

use super::event::{DomainEvent, EventBuffer};
use super::membership::{role_of, ProjectMember, ProjectRole};
use super::user::UserId;
use super::{now_epoch_ms, Aggregate, DomainError, DomainResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type ProjectId = Uuid;

const ENTITY: &str = "project";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Active,
    OnHold,
    Completed,
    Archived,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectVisibility {
    Private,
    Internal,
    Public,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub(crate) id: ProjectId,
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) status: ProjectStatus,
    pub(crate) visibility: ProjectVisibility,
    pub(crate) is_archived: bool,
    pub(crate) owner_id: UserId,
    pub(crate) members: Vec<ProjectMember>,
    pub(crate) created_at: i64,
    pub(crate) version: i64,
    #[serde(skip)]
    pub(crate) events: EventBuffer,
}

impl Project {
    /// Creates an active project owned by `owner_id`.
    pub fn create(
        name: impl Into<String>,
        description: Option<String>,
        visibility: ProjectVisibility,
        owner_id: UserId,
    ) -> Self {
        let now = now_epoch_ms();
        let mut project = Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description,
            status: ProjectStatus::Active,
            visibility,
            is_archived: false,
            owner_id,
            members: vec![ProjectMember {
                user_id: owner_id,
                role: ProjectRole::Owner,
                joined_at: now,
            }],
            created_at: now,
            version: 0,
            events: EventBuffer::default(),
        };
        project.events.record(DomainEvent::ProjectCreated {
            project_id: project.id,
            owner_id,
        });
        project
    }

    pub fn update_details(
        &mut self,
        name: impl Into<String>,
        description: Option<String>,
        visibility: ProjectVisibility,
        actor_id: UserId,
    ) -> DomainResult<()> {
        self.ensure_not_archived()?;
        let new_name = name.into();
        let old_name = std::mem::replace(&mut self.name, new_name.clone());
        self.description = description;
        self.visibility = visibility;
        self.events.record(DomainEvent::ProjectUpdated {
            project_id: self.id,
            actor_id,
            old_name,
            new_name,
        });
        Ok(())
    }

    /// Moves between non-archived statuses; archiving has its own mutator.
    pub fn change_status(&mut self, status: ProjectStatus, actor_id: UserId) -> DomainResult<()> {
        if self.is_archived || status == ProjectStatus::Archived {
            return Err(DomainError::InvalidStatusTransition {
                from: self.status,
                to: status,
            });
        }
        let old_status = std::mem::replace(&mut self.status, status);
        self.events.record(DomainEvent::ProjectStatusChanged {
            project_id: self.id,
            actor_id,
            old_status,
            new_status: status,
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
        self.status = ProjectStatus::Archived;
        self.events.record(DomainEvent::ProjectArchived {
            project_id: self.id,
            actor_id,
        });
        Ok(())
    }

    /// Restores an archived project back to `Active`.
    pub fn restore(&mut self, actor_id: UserId) -> DomainResult<()> {
        if !self.is_archived {
            return Err(DomainError::NotArchived {
                entity: ENTITY,
                id: self.id,
            });
        }
        self.is_archived = false;
        self.status = ProjectStatus::Active;
        self.events.record(DomainEvent::ProjectRestored {
            project_id: self.id,
            actor_id,
        });
        Ok(())
    }

    pub fn add_member(
        &mut self,
        user_id: UserId,
        role: ProjectRole,
        inviter_id: UserId,
    ) -> DomainResult<()> {
        if role == ProjectRole::Owner {
            return Err(DomainError::OwnerRoleImmutable);
        }
        if self.is_member(user_id) {
            return Err(DomainError::AlreadyMember(user_id));
        }
        self.members.push(ProjectMember {
            user_id,
            role,
            joined_at: now_epoch_ms(),
        });
        self.events.record(DomainEvent::ProjectMemberAdded {
            project_id: self.id,
            user_id,
            role,
            actor_id: inviter_id,
        });
        Ok(())
    }

    pub fn remove_member(&mut self, user_id: UserId, remover_id: UserId) -> DomainResult<()> {
        match role_of(&self.members, user_id) {
            None => return Err(DomainError::NotMember(user_id)),
            Some(ProjectRole::Owner) => return Err(DomainError::OwnerRoleImmutable),
            Some(_) => {}
        }
        self.members.retain(|member| member.user_id != user_id);
        self.events.record(DomainEvent::ProjectMemberRemoved {
            project_id: self.id,
            user_id,
            actor_id: remover_id,
        });
        Ok(())
    }

    pub fn update_member_role(
        &mut self,
        user_id: UserId,
        role: ProjectRole,
        actor_id: UserId,
    ) -> DomainResult<()> {
        if role == ProjectRole::Owner {
            return Err(DomainError::OwnerRoleImmutable);
        }
        let member = self
            .members
            .iter_mut()
            .find(|member| member.user_id == user_id)
            .ok_or(DomainError::NotMember(user_id))?;
        if member.role == ProjectRole::Owner {
            return Err(DomainError::OwnerRoleImmutable);
        }
        let old_role = std::mem::replace(&mut member.role, role);
        self.events.record(DomainEvent::ProjectMemberRoleUpdated {
            project_id: self.id,
            user_id,
            old_role,
            new_role: role,
            actor_id,
        });
        Ok(())
    }

    pub fn is_member(&self, user_id: UserId) -> bool {
        self.members.iter().any(|member| member.user_id == user_id)
    }

    pub fn id(&self) -> ProjectId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn status(&self) -> ProjectStatus {
        self.status
    }

    pub fn visibility(&self) -> ProjectVisibility {
        self.visibility
    }

    pub fn is_archived(&self) -> bool {
        self.is_archived
    }

    pub fn owner_id(&self) -> UserId {
        self.owner_id
    }

    pub fn members(&self) -> &[ProjectMember] {
        &self.members
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

    /// Rejects operations that would add content to an archived project.
    pub fn ensure_not_archived(&self) -> DomainResult<()> {
        if self.is_archived {
            return Err(DomainError::Archived {
                entity: ENTITY,
                id: self.id,
            });
        }
        Ok(())
    }
}

impl Aggregate for Project {
    fn aggregate_id(&self) -> Uuid {
        self.id
    }

    fn events_mut(&mut self) -> &mut EventBuffer {
        &mut self.events
    }
}

impl ProjectStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::OnHold => "on_hold",
            Self::Completed => "completed",
            Self::Archived => "archived",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(Self::Active),
            "on_hold" => Some(Self::OnHold),
            "completed" => Some(Self::Completed),
            "archived" => Some(Self::Archived),
            _ => None,
        }
    }
}

impl ProjectVisibility {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::Internal => "internal",
            Self::Public => "public",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "private" => Some(Self::Private),
            "internal" => Some(Self::Internal),
            "public" => Some(Self::Public),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Project, ProjectStatus, ProjectVisibility};
    use crate::model::event::EventKind;
    use crate::model::membership::ProjectRole;
    use crate::model::DomainError;
    use uuid::Uuid;

    fn project() -> (Project, Uuid) {
        let owner = Uuid::new_v4();
        (
            Project::create("Apollo", None, ProjectVisibility::Private, owner),
            owner,
        )
    }

    #[test]
    fn create_establishes_single_owner() {
        let (project, owner) = project();
        assert_eq!(project.members().len(), 1);
        assert_eq!(project.members()[0].user_id, owner);
        assert_eq!(project.members()[0].role, ProjectRole::Owner);
        assert_eq!(project.pending_events()[0].kind(), EventKind::ProjectCreated);
    }

    #[test]
    fn owner_role_cannot_be_granted_or_removed() {
        let (mut project, owner) = project();
        let other = Uuid::new_v4();

        assert_eq!(
            project.add_member(other, ProjectRole::Owner, owner),
            Err(DomainError::OwnerRoleImmutable)
        );
        assert_eq!(
            project.remove_member(owner, owner),
            Err(DomainError::OwnerRoleImmutable)
        );
        assert_eq!(
            project.update_member_role(owner, ProjectRole::Admin, owner),
            Err(DomainError::OwnerRoleImmutable)
        );
        assert_eq!(project.pending_events().len(), 1);
    }

    #[test]
    fn archive_and_restore_toggle_status() {
        let (mut project, owner) = project();
        project.archive(owner).unwrap();
        assert_eq!(project.status(), ProjectStatus::Archived);
        assert!(matches!(
            project.archive(owner),
            Err(DomainError::AlreadyArchived { .. })
        ));

        project.restore(owner).unwrap();
        assert_eq!(project.status(), ProjectStatus::Active);
        assert!(!project.is_archived());
    }

    #[test]
    fn change_status_rejects_archived_target() {
        let (mut project, owner) = project();
        project.change_status(ProjectStatus::OnHold, owner).unwrap();
        let err = project
            .change_status(ProjectStatus::Archived, owner)
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidStatusTransition { .. }));
        assert_eq!(project.status(), ProjectStatus::OnHold);
    }
}
