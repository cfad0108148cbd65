//! Board use cases.
//!
//! # Invariants
//! - Boards are created by project Owners or Admins inside a live project.
//! - Board members must already belong to the owning project.

use super::{found, require_board_role, require_project_role};
use crate::command::{
    AddBoardMember, ArchiveBoard, CreateBoard, GetBoard, ListBoardColumns, RemoveBoardMember,
    RestoreBoard, UpdateBoard, UpdateBoardMemberRole,
};
use crate::error::CoreResult;
use crate::model::board::{Board, BoardId};
use crate::model::column::Column;
use crate::model::membership::{BOARD_ADMINS, BOARD_EDITORS, BOARD_READERS, PROJECT_MANAGERS};
use crate::model::DomainError;
use crate::pipeline::OperationContext;
use crate::repo::{BoardRepository, ColumnRepository, ProjectRepository};

pub struct BoardService<'a, 'conn> {
    ctx: &'a mut OperationContext<'conn>,
}

impl<'a, 'conn> BoardService<'a, 'conn> {
    pub fn new(ctx: &'a mut OperationContext<'conn>) -> Self {
        Self { ctx }
    }

    pub fn create_board(&mut self, request: CreateBoard) -> CoreResult<Board> {
        let caller_id = self.ctx.caller.require_user()?;
        let project = found(
            self.ctx.uow.projects().get_by_id(request.project_id)?,
            "project",
            request.project_id,
        )?;
        require_project_role(&project, caller_id, PROJECT_MANAGERS)?;
        project.ensure_not_archived()?;

        let board = Board::create(project.id(), request.name, request.description, caller_id);
        self.ctx.uow.boards().add(board.clone())?;
        Ok(board)
    }

    pub fn update_board(&mut self, request: UpdateBoard) -> CoreResult<Board> {
        let caller_id = self.ctx.caller.require_user()?;
        let mut board = self.load(request.board_id)?;
        require_board_role(&board, caller_id, BOARD_EDITORS)?;

        board.update_details(request.name, request.description, caller_id)?;
        self.save(board)
    }

    pub fn archive_board(&mut self, request: ArchiveBoard) -> CoreResult<Board> {
        let caller_id = self.ctx.caller.require_user()?;
        let mut board = self.load(request.board_id)?;
        require_board_role(&board, caller_id, BOARD_ADMINS)?;

        board.archive(caller_id)?;
        self.save(board)
    }

    pub fn restore_board(&mut self, request: RestoreBoard) -> CoreResult<Board> {
        let caller_id = self.ctx.caller.require_user()?;
        let mut board = self.load(request.board_id)?;
        require_board_role(&board, caller_id, BOARD_ADMINS)?;

        board.restore(caller_id)?;
        self.save(board)
    }

    pub fn add_member(&mut self, request: AddBoardMember) -> CoreResult<Board> {
        let caller_id = self.ctx.caller.require_user()?;
        let mut board = self.load(request.board_id)?;
        require_board_role(&board, caller_id, BOARD_ADMINS)?;

        let project_id = board.project_id();
        let project = found(
            self.ctx.uow.projects().get_by_id(project_id)?,
            "project",
            project_id,
        )?;
        if !project.is_member(request.user_id) {
            return Err(DomainError::NotProjectMember(request.user_id).into());
        }

        board.add_member(request.user_id, request.role, caller_id)?;
        self.save(board)
    }

    pub fn remove_member(&mut self, request: RemoveBoardMember) -> CoreResult<Board> {
        let caller_id = self.ctx.caller.require_user()?;
        let mut board = self.load(request.board_id)?;
        require_board_role(&board, caller_id, BOARD_ADMINS)?;

        board.remove_member(request.user_id, caller_id)?;
        self.save(board)
    }

    pub fn update_member_role(&mut self, request: UpdateBoardMemberRole) -> CoreResult<Board> {
        let caller_id = self.ctx.caller.require_user()?;
        let mut board = self.load(request.board_id)?;
        require_board_role(&board, caller_id, BOARD_ADMINS)?;

        board.update_member_role(request.user_id, request.role, caller_id)?;
        self.save(board)
    }

    pub fn get_board(&mut self, request: GetBoard) -> CoreResult<Board> {
        let caller_id = self.ctx.caller.require_user()?;
        let board = self.load(request.board_id)?;
        require_board_role(&board, caller_id, BOARD_READERS)?;
        Ok(board)
    }

    pub fn list_columns(&mut self, request: ListBoardColumns) -> CoreResult<Vec<Column>> {
        let caller_id = self.ctx.caller.require_user()?;
        let board = self.load(request.board_id)?;
        require_board_role(&board, caller_id, BOARD_READERS)?;
        Ok(self.ctx.uow.columns().list_for_board(board.id())?)
    }

    fn load(&mut self, board_id: BoardId) -> CoreResult<Board> {
        found(self.ctx.uow.boards().get_by_id(board_id)?, "board", board_id)
    }

    fn save(&mut self, board: Board) -> CoreResult<Board> {
        self.ctx.uow.boards().update(board.clone())?;
        Ok(board)
    }
}
