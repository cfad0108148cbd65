//! Task use cases.
//!
//! # Invariants
//! - A task moves only between columns of the board that owns it.
//! - Mutations require Editor level on the owning board; reads any role.
//! - WIP limits are checked whenever a task enters a column as active.

use super::require_board_role;
use crate::command::{
    ArchiveTask, AssignTask, CreateTask, GetTask, ListColumnTasks, MoveTask, RestoreTask,
    UpdateTask,
};
use crate::error::CoreResult;
use crate::model::column::{Column, ColumnId};
use crate::model::membership::{BOARD_EDITORS, BOARD_READERS};
use crate::model::task::BoardTask;
use crate::model::DomainError;
use crate::pipeline::OperationContext;
use crate::repo::TaskRepository;

pub struct TaskService<'a, 'conn> {
    ctx: &'a mut OperationContext<'conn>,
}

impl<'a, 'conn> TaskService<'a, 'conn> {
    pub fn new(ctx: &'a mut OperationContext<'conn>) -> Self {
        Self { ctx }
    }

    /// Appends a new task to the end of a column.
    pub fn create_task(&mut self, request: CreateTask) -> CoreResult<BoardTask> {
        let caller_id = self.ctx.caller.require_user()?;
        let (column, board) = self.ctx.uow.column_with_board(request.column_id)?;
        require_board_role(&board, caller_id, BOARD_EDITORS)?;
        board.ensure_not_archived()?;
        self.ensure_accepts_task(&column)?;

        let position = self.next_position(column.id())?;
        let task = BoardTask::create(column.id(), request.details(), position, caller_id);
        self.ctx.uow.tasks().add(task.clone())?;
        Ok(task)
    }

    pub fn update_task(&mut self, request: UpdateTask) -> CoreResult<BoardTask> {
        let caller_id = self.ctx.caller.require_user()?;
        let (mut task, _, board) = self.ctx.uow.task_with_board(request.task_id)?;
        require_board_role(&board, caller_id, BOARD_EDITORS)?;
        board.ensure_not_archived()?;

        task.update_details(request.details(), caller_id)?;
        self.save(task)
    }

    /// Moves a task within its board.
    ///
    /// The board equality check runs before authorization, which is then
    /// evaluated against the shared board.
    pub fn move_task(&mut self, request: MoveTask) -> CoreResult<BoardTask> {
        let caller_id = self.ctx.caller.require_user()?;
        let (mut task, from_column, from_board) = self.ctx.uow.task_with_board(request.task_id)?;
        let (to_column, to_board) = self.ctx.uow.column_with_board(request.to_column_id)?;
        if from_board.id() != to_board.id() {
            return Err(DomainError::CrossBoardMove {
                from_board: from_board.id(),
                to_board: to_board.id(),
            }
            .into());
        }
        require_board_role(&to_board, caller_id, BOARD_EDITORS)?;
        to_board.ensure_not_archived()?;
        task.ensure_not_archived()?;
        to_column.ensure_not_deleted()?;
        if to_column.id() != from_column.id() {
            self.ensure_accepts_task(&to_column)?;
        }

        let position = match request.position {
            Some(position) => position,
            None => self.next_position(to_column.id())?,
        };
        task.move_to_column(to_column.id(), position, caller_id)?;
        self.save(task)
    }

    /// Assigns the task to a board member, or clears the assignee.
    pub fn assign_task(&mut self, request: AssignTask) -> CoreResult<BoardTask> {
        let caller_id = self.ctx.caller.require_user()?;
        let (mut task, _, board) = self.ctx.uow.task_with_board(request.task_id)?;
        require_board_role(&board, caller_id, BOARD_EDITORS)?;
        board.ensure_not_archived()?;
        if let Some(assignee_id) = request.assignee_id {
            if !board.is_member(assignee_id) {
                return Err(DomainError::NotMember(assignee_id).into());
            }
        }

        task.assign_to_user(request.assignee_id, caller_id)?;
        self.save(task)
    }

    pub fn archive_task(&mut self, request: ArchiveTask) -> CoreResult<BoardTask> {
        let caller_id = self.ctx.caller.require_user()?;
        let (mut task, _, board) = self.ctx.uow.task_with_board(request.task_id)?;
        require_board_role(&board, caller_id, BOARD_EDITORS)?;
        board.ensure_not_archived()?;

        task.archive(caller_id)?;
        self.save(task)
    }

    /// Restores an archived task into its column, subject to the WIP limit.
    pub fn restore_task(&mut self, request: RestoreTask) -> CoreResult<BoardTask> {
        let caller_id = self.ctx.caller.require_user()?;
        let (mut task, column, board) = self.ctx.uow.task_with_board(request.task_id)?;
        require_board_role(&board, caller_id, BOARD_EDITORS)?;
        board.ensure_not_archived()?;
        if task.is_archived() {
            self.ensure_accepts_task(&column)?;
        }

        task.restore(caller_id)?;
        self.save(task)
    }

    pub fn get_task(&mut self, request: GetTask) -> CoreResult<BoardTask> {
        let caller_id = self.ctx.caller.require_user()?;
        let (task, _, board) = self.ctx.uow.task_with_board(request.task_id)?;
        require_board_role(&board, caller_id, BOARD_READERS)?;
        Ok(task)
    }

    pub fn list_column_tasks(&mut self, request: ListColumnTasks) -> CoreResult<Vec<BoardTask>> {
        let caller_id = self.ctx.caller.require_user()?;
        let (column, board) = self.ctx.uow.column_with_board(request.column_id)?;
        require_board_role(&board, caller_id, BOARD_READERS)?;
        Ok(self
            .ctx
            .uow
            .tasks()
            .list_by_column(column.id(), request.include_archived)?)
    }

    fn ensure_accepts_task(&mut self, column: &Column) -> CoreResult<()> {
        let active = self
            .ctx
            .uow
            .tasks()
            .active_task_ids_in_column(column.id())?
            .len();
        column.ensure_accepts_task(active, self.ctx.policy.enforce_wip_limits)?;
        Ok(())
    }

    /// Position after the last task of the column, archived tasks included.
    fn next_position(&mut self, column_id: ColumnId) -> CoreResult<i32> {
        let tasks = self.ctx.uow.tasks().list_by_column(column_id, true)?;
        Ok(tasks
            .iter()
            .map(|task| task.position())
            .max()
            .map_or(0, |last| last.saturating_add(1)))
    }

    fn save(&mut self, task: BoardTask) -> CoreResult<BoardTask> {
        self.ctx.uow.tasks().update(task.clone())?;
        Ok(task)
    }
}
