//! Board aggregate.
//!
//! # Invariants
//! - A board belongs to exactly one project for its whole lifetime.
//! - At least one `Admin` member exists at all times.
//! - Archived boards reject detail and membership changes.

use super::event::{DomainEvent, EventBuffer};
use super::membership::{BoardMember, BoardRole};
use super::project::ProjectId;
use super::user::UserId;
use super::{now_epoch_ms, Aggregate, DomainError, DomainResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type BoardId = Uuid;

const ENTITY: &str = "board";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub(crate) id: BoardId,
    pub(crate) project_id: ProjectId,
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) is_archived: bool,
    pub(crate) members: Vec<BoardMember>,
    pub(crate) created_by: UserId,
    pub(crate) created_at: i64,
    pub(crate) version: i64,
    #[serde(skip)]
    pub(crate) events: EventBuffer,
}

impl Board {
    /// Creates a board inside `project_id`; the creator becomes its admin.
    pub fn create(
        project_id: ProjectId,
        name: impl Into<String>,
        description: Option<String>,
        creator_id: UserId,
    ) -> Self {
        let now = now_epoch_ms();
        let mut board = Self {
            id: Uuid::new_v4(),
            project_id,
            name: name.into(),
            description,
            is_archived: false,
            members: vec![BoardMember {
                user_id: creator_id,
                role: BoardRole::Admin,
                joined_at: now,
            }],
            created_by: creator_id,
            created_at: now,
            version: 0,
            events: EventBuffer::default(),
        };
        board.events.record(DomainEvent::BoardCreated {
            board_id: board.id,
            project_id,
            actor_id: creator_id,
        });
        board
    }

    pub fn update_details(
        &mut self,
        name: impl Into<String>,
        description: Option<String>,
        actor_id: UserId,
    ) -> DomainResult<()> {
        self.ensure_not_archived()?;
        let new_name = name.into();
        let old_name = std::mem::replace(&mut self.name, new_name.clone());
        self.description = description;
        self.events.record(DomainEvent::BoardUpdated {
            board_id: self.id,
            actor_id,
            old_name,
            new_name,
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
        self.events.record(DomainEvent::BoardArchived {
            board_id: self.id,
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
        self.events.record(DomainEvent::BoardRestored {
            board_id: self.id,
            actor_id,
        });
        Ok(())
    }

    pub fn add_member(
        &mut self,
        user_id: UserId,
        role: BoardRole,
        inviter_id: UserId,
    ) -> DomainResult<()> {
        self.ensure_not_archived()?;
        if self.is_member(user_id) {
            return Err(DomainError::AlreadyMember(user_id));
        }
        self.members.push(BoardMember {
            user_id,
            role,
            joined_at: now_epoch_ms(),
        });
        self.events.record(DomainEvent::BoardMemberAdded {
            board_id: self.id,
            user_id,
            role,
            actor_id: inviter_id,
        });
        Ok(())
    }

    pub fn remove_member(&mut self, user_id: UserId, remover_id: UserId) -> DomainResult<()> {
        self.ensure_not_archived()?;
        let member = self
            .members
            .iter()
            .find(|member| member.user_id == user_id)
            .ok_or(DomainError::NotMember(user_id))?;
        if member.role == BoardRole::Admin && self.admin_count() == 1 {
            return Err(DomainError::LastBoardAdmin);
        }
        self.members.retain(|member| member.user_id != user_id);
        self.events.record(DomainEvent::BoardMemberRemoved {
            board_id: self.id,
            user_id,
            actor_id: remover_id,
        });
        Ok(())
    }

    pub fn update_member_role(
        &mut self,
        user_id: UserId,
        role: BoardRole,
        actor_id: UserId,
    ) -> DomainResult<()> {
        self.ensure_not_archived()?;
        let admins = self.admin_count();
        let member = self
            .members
            .iter_mut()
            .find(|member| member.user_id == user_id)
            .ok_or(DomainError::NotMember(user_id))?;
        if member.role == BoardRole::Admin && role != BoardRole::Admin && admins == 1 {
            return Err(DomainError::LastBoardAdmin);
        }
        let old_role = std::mem::replace(&mut member.role, role);
        self.events.record(DomainEvent::BoardMemberRoleUpdated {
            board_id: self.id,
            user_id,
            old_role,
            new_role: role,
            actor_id,
        });
        Ok(())
    }

    /// Rejects operations that would change board content.
    pub fn ensure_not_archived(&self) -> DomainResult<()> {
        if self.is_archived {
            return Err(DomainError::Archived {
                entity: ENTITY,
                id: self.id,
            });
        }
        Ok(())
    }

    pub fn is_member(&self, user_id: UserId) -> bool {
        self.members.iter().any(|member| member.user_id == user_id)
    }

    pub fn id(&self) -> BoardId {
        self.id
    }

    pub fn project_id(&self) -> ProjectId {
        self.project_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn is_archived(&self) -> bool {
        self.is_archived
    }

    pub fn members(&self) -> &[BoardMember] {
        &self.members
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

    fn admin_count(&self) -> usize {
        self.members
            .iter()
            .filter(|member| member.role == BoardRole::Admin)
            .count()
    }
}

impl Aggregate for Board {
    fn aggregate_id(&self) -> Uuid {
        self.id
    }

    fn events_mut(&mut self) -> &mut EventBuffer {
        &mut self.events
    }
}

#[cfg(test)]
mod tests {
    use super::Board;
    use crate::model::event::{DomainEvent, EventKind};
    use crate::model::membership::BoardRole;
    use crate::model::DomainError;
    use uuid::Uuid;

    fn board() -> (Board, Uuid) {
        let creator = Uuid::new_v4();
        (Board::create(Uuid::new_v4(), "Sprint", None, creator), creator)
    }

    #[test]
    fn creator_becomes_admin() {
        let (board, creator) = board();
        assert_eq!(board.members().len(), 1);
        assert_eq!(board.members()[0].user_id, creator);
        assert_eq!(board.members()[0].role, BoardRole::Admin);
    }

    #[test]
    fn update_details_records_old_and_new_name() {
        let (mut board, creator) = board();
        board
            .update_details("Sprint 2", Some("next".to_string()), creator)
            .unwrap();

        let last = board.pending_events().last().unwrap();
        assert_eq!(
            last,
            &DomainEvent::BoardUpdated {
                board_id: board.id(),
                actor_id: creator,
                old_name: "Sprint".to_string(),
                new_name: "Sprint 2".to_string(),
            }
        );
    }

    #[test]
    fn last_admin_cannot_leave_or_be_demoted() {
        let (mut board, creator) = board();
        assert_eq!(
            board.remove_member(creator, creator),
            Err(DomainError::LastBoardAdmin)
        );
        assert_eq!(
            board.update_member_role(creator, BoardRole::Viewer, creator),
            Err(DomainError::LastBoardAdmin)
        );

        let second = Uuid::new_v4();
        board.add_member(second, BoardRole::Admin, creator).unwrap();
        board
            .update_member_role(creator, BoardRole::Editor, second)
            .unwrap();
        assert_eq!(
            board.pending_events().last().map(DomainEvent::kind),
            Some(EventKind::BoardMemberRoleUpdated)
        );
    }

    #[test]
    fn duplicate_member_is_rejected() {
        let (mut board, creator) = board();
        let user = Uuid::new_v4();
        board.add_member(user, BoardRole::Viewer, creator).unwrap();
        assert_eq!(
            board.add_member(user, BoardRole::Editor, creator),
            Err(DomainError::AlreadyMember(user))
        );
    }

    #[test]
    fn archived_board_rejects_detail_changes() {
        let (mut board, creator) = board();
        board.archive(creator).unwrap();
        assert!(matches!(
            board.update_details("x", None, creator),
            Err(DomainError::Archived { .. })
        ));
        board.restore(creator).unwrap();
        assert!(!board.is_archived());
    }
}
