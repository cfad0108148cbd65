//! Column use cases.
//!
//! # Invariants
//! - Column creation is limited to the roles in
//!   `AccessPolicy::column_create_roles` (Admin only by default); updates
//!   need Editor level and deletion needs Admin.
//! - Columns of an archived board are read-only.

use super::{found, require_board_role};
use crate::command::{CreateColumn, DeleteColumn, UpdateColumn};
use crate::error::CoreResult;
use crate::model::column::Column;
use crate::model::membership::{BOARD_ADMINS, BOARD_EDITORS};
use crate::pipeline::OperationContext;
use crate::repo::{BoardRepository, ColumnRepository, TaskRepository};

pub struct ColumnService<'a, 'conn> {
    ctx: &'a mut OperationContext<'conn>,
}

impl<'a, 'conn> ColumnService<'a, 'conn> {
    pub fn new(ctx: &'a mut OperationContext<'conn>) -> Self {
        Self { ctx }
    }

    pub fn create_column(&mut self, request: CreateColumn) -> CoreResult<Column> {
        let caller_id = self.ctx.caller.require_user()?;
        let board = found(
            self.ctx.uow.boards().get_by_id(request.board_id)?,
            "board",
            request.board_id,
        )?;
        require_board_role(&board, caller_id, &self.ctx.policy.column_create_roles)?;
        board.ensure_not_archived()?;

        let column = Column::new(
            request.name,
            board.id(),
            request.order,
            request.wip_limit,
            caller_id,
        );
        self.ctx.uow.columns().add(column.clone())?;
        Ok(column)
    }

    pub fn update_column(&mut self, request: UpdateColumn) -> CoreResult<Column> {
        let caller_id = self.ctx.caller.require_user()?;
        let (mut column, board) = self.ctx.uow.column_with_board(request.column_id)?;
        require_board_role(&board, caller_id, BOARD_EDITORS)?;
        board.ensure_not_archived()?;

        let active = self
            .ctx
            .uow
            .tasks()
            .active_task_ids_in_column(column.id())?
            .len();
        column.update(
            request.name,
            request.order,
            request.wip_limit,
            active,
            caller_id,
        )?;
        self.ctx.uow.columns().update(column.clone())?;
        Ok(column)
    }

    /// Soft-deletes a column that holds no active tasks.
    pub fn delete_column(&mut self, request: DeleteColumn) -> CoreResult<Column> {
        let caller_id = self.ctx.caller.require_user()?;
        let (mut column, board) = self.ctx.uow.column_with_board(request.column_id)?;
        require_board_role(&board, caller_id, BOARD_ADMINS)?;
        board.ensure_not_archived()?;

        let active = self
            .ctx
            .uow
            .tasks()
            .active_task_ids_in_column(column.id())?
            .len();
        column.delete(active, caller_id)?;
        self.ctx.uow.columns().update(column.clone())?;
        Ok(column)
    }
}
