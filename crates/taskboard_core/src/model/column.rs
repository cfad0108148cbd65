//! Column aggregate.
//!
//! # Invariants
//! - `is_deleted` is a soft-delete tombstone; deleted columns accept no tasks.
//! - With enforcement on, active task count never exceeds `wip_limit`.
//!
//! Task counts are supplied by the caller; the column does not load tasks.

use super::board::BoardId;
use super::event::{DomainEvent, EventBuffer};
use super::user::UserId;
use super::{now_epoch_ms, Aggregate, DomainError, DomainResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type ColumnId = Uuid;

const ENTITY: &str = "column";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub(crate) id: ColumnId,
    pub(crate) board_id: BoardId,
    pub(crate) name: String,
    pub(crate) order: i32,
    pub(crate) wip_limit: Option<u32>,
    pub(crate) is_deleted: bool,
    pub(crate) created_at: i64,
    pub(crate) version: i64,
    #[serde(skip)]
    pub(crate) events: EventBuffer,
}

impl Column {
    pub fn new(
        name: impl Into<String>,
        board_id: BoardId,
        order: i32,
        wip_limit: Option<u32>,
        actor_id: UserId,
    ) -> Self {
        let mut column = Self {
            id: Uuid::new_v4(),
            board_id,
            name: name.into(),
            order,
            wip_limit,
            is_deleted: false,
            created_at: now_epoch_ms(),
            version: 0,
            events: EventBuffer::default(),
        };
        column.events.record(DomainEvent::ColumnAdded {
            column_id: column.id,
            board_id,
            order,
            actor_id,
        });
        column
    }

    /// Replaces name, order and WIP limit.
    ///
    /// `active_tasks` is the current number of active tasks in this column.
    pub fn update(
        &mut self,
        name: impl Into<String>,
        order: i32,
        wip_limit: Option<u32>,
        active_tasks: usize,
        actor_id: UserId,
    ) -> DomainResult<()> {
        self.ensure_not_deleted()?;
        if let Some(limit) = wip_limit {
            if active_tasks > limit as usize {
                return Err(DomainError::WipLimitBelowTaskCount {
                    column_id: self.id,
                    limit,
                    active: active_tasks,
                });
            }
        }
        let new_name = name.into();
        let old_name = std::mem::replace(&mut self.name, new_name.clone());
        let old_order = std::mem::replace(&mut self.order, order);
        let old_wip_limit = std::mem::replace(&mut self.wip_limit, wip_limit);
        self.events.record(DomainEvent::ColumnUpdated {
            column_id: self.id,
            board_id: self.board_id,
            actor_id,
            old_name,
            new_name,
            old_order,
            new_order: order,
            old_wip_limit,
            new_wip_limit: wip_limit,
        });
        Ok(())
    }

    /// Soft-deletes an empty column.
    pub fn delete(&mut self, active_tasks: usize, actor_id: UserId) -> DomainResult<()> {
        if self.is_deleted {
            return Err(DomainError::AlreadyDeleted {
                entity: ENTITY,
                id: self.id,
            });
        }
        if active_tasks > 0 {
            return Err(DomainError::ColumnNotEmpty {
                column_id: self.id,
                active: active_tasks,
            });
        }
        self.is_deleted = true;
        self.events.record(DomainEvent::ColumnDeleted {
            column_id: self.id,
            board_id: self.board_id,
            actor_id,
        });
        Ok(())
    }

    /// Checks that one more active task fits into this column.
    pub fn ensure_accepts_task(&self, active_tasks: usize, enforce_wip: bool) -> DomainResult<()> {
        self.ensure_not_deleted()?;
        if !enforce_wip {
            return Ok(());
        }
        match self.wip_limit {
            Some(limit) if active_tasks >= limit as usize => Err(DomainError::WipLimitReached {
                column_id: self.id,
                limit,
            }),
            _ => Ok(()),
        }
    }

    pub fn ensure_not_deleted(&self) -> DomainResult<()> {
        if self.is_deleted {
            return Err(DomainError::Deleted {
                entity: ENTITY,
                id: self.id,
            });
        }
        Ok(())
    }

    pub fn id(&self) -> ColumnId {
        self.id
    }

    pub fn board_id(&self) -> BoardId {
        self.board_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn order(&self) -> i32 {
        self.order
    }

    pub fn wip_limit(&self) -> Option<u32> {
        self.wip_limit
    }

    pub fn is_deleted(&self) -> bool {
        self.is_deleted
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

impl Aggregate for Column {
    fn aggregate_id(&self) -> Uuid {
        self.id
    }

    fn events_mut(&mut self) -> &mut EventBuffer {
        &mut self.events
    }
}

#[cfg(test)]
mod tests {
    use super::Column;
    use crate::model::event::DomainEvent;
    use crate::model::DomainError;
    use uuid::Uuid;

    #[test]
    fn wip_limit_blocks_additional_tasks_only_when_enforced() {
        let column = Column::new("Doing", Uuid::new_v4(), 1, Some(2), Uuid::new_v4());
        column.ensure_accepts_task(1, true).unwrap();
        assert!(matches!(
            column.ensure_accepts_task(2, true),
            Err(DomainError::WipLimitReached { limit: 2, .. })
        ));
        column.ensure_accepts_task(2, false).unwrap();
    }

    #[test]
    fn update_rejects_limit_below_active_tasks() {
        let actor = Uuid::new_v4();
        let mut column = Column::new("Doing", Uuid::new_v4(), 1, None, actor);
        let err = column.update("Doing", 1, Some(1), 3, actor).unwrap_err();
        assert!(matches!(err, DomainError::WipLimitBelowTaskCount { active: 3, .. }));
        assert_eq!(column.wip_limit(), None);
        assert_eq!(column.pending_events().len(), 1);
    }

    #[test]
    fn update_records_old_and_new_settings() {
        let actor = Uuid::new_v4();
        let mut column = Column::new("Doing", Uuid::new_v4(), 1, None, actor);
        column.update("In progress", 2, Some(4), 1, actor).unwrap();

        assert_eq!(column.name(), "In progress");
        assert_eq!(
            column.pending_events().last().unwrap(),
            &DomainEvent::ColumnUpdated {
                column_id: column.id(),
                board_id: column.board_id(),
                actor_id: actor,
                old_name: "Doing".to_string(),
                new_name: "In progress".to_string(),
                old_order: 1,
                new_order: 2,
                old_wip_limit: None,
                new_wip_limit: Some(4),
            }
        );
    }

    #[test]
    fn delete_requires_empty_column_and_is_not_repeatable() {
        let actor = Uuid::new_v4();
        let mut column = Column::new("Done", Uuid::new_v4(), 3, None, actor);
        assert!(matches!(
            column.delete(1, actor),
            Err(DomainError::ColumnNotEmpty { active: 1, .. })
        ));
        column.delete(0, actor).unwrap();
        assert!(column.is_deleted());
        assert!(matches!(
            column.delete(0, actor),
            Err(DomainError::AlreadyDeleted { .. })
        ));
        assert!(matches!(
            column.ensure_accepts_task(0, true),
            Err(DomainError::Deleted { .. })
        ));
    }
}
