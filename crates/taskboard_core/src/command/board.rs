//! Board requests.

use super::{DESCRIPTION_MAX_LEN, NAME_MAX_LEN};
use crate::error::CoreResult;
use crate::model::board::{Board, BoardId};
use crate::model::column::Column;
use crate::model::membership::BoardRole;
use crate::model::project::ProjectId;
use crate::model::user::UserId;
use crate::pipeline::{Operation, OperationContext, Rules, Validate, ValidationErrors};
use crate::service::BoardService;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateBoard {
    pub project_id: ProjectId,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpdateBoard {
    pub board_id: BoardId,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ArchiveBoard {
    pub board_id: BoardId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RestoreBoard {
    pub board_id: BoardId,
}

/// Grants a board role to an existing project member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct AddBoardMember {
    pub board_id: BoardId,
    pub user_id: UserId,
    pub role: BoardRole,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RemoveBoardMember {
    pub board_id: BoardId,
    pub user_id: UserId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct UpdateBoardMemberRole {
    pub board_id: BoardId,
    pub user_id: UserId,
    pub role: BoardRole,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct GetBoard {
    pub board_id: BoardId,
}

/// Non-deleted columns of a board, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ListBoardColumns {
    pub board_id: BoardId,
}

fn board_details_rules(name: &str, description: Option<&str>) -> Rules {
    Rules::new()
        .not_blank("name", name)
        .max_len("name", name, NAME_MAX_LEN)
        .optional_max_len("description", description, DESCRIPTION_MAX_LEN)
}

impl Validate for CreateBoard {
    fn validate(&self) -> Result<(), ValidationErrors> {
        board_details_rules(&self.name, self.description.as_deref()).finish()
    }
}

impl Operation for CreateBoard {
    const NAME: &'static str = "create_board";
    const MUTATES: bool = true;
    type Output = Board;

    fn execute(self, ctx: &mut OperationContext<'_>) -> CoreResult<Board> {
        BoardService::new(ctx).create_board(self)
    }
}

impl Validate for UpdateBoard {
    fn validate(&self) -> Result<(), ValidationErrors> {
        board_details_rules(&self.name, self.description.as_deref()).finish()
    }
}

impl Operation for UpdateBoard {
    const NAME: &'static str = "update_board";
    const MUTATES: bool = true;
    type Output = Board;

    fn execute(self, ctx: &mut OperationContext<'_>) -> CoreResult<Board> {
        BoardService::new(ctx).update_board(self)
    }
}

impl Validate for ArchiveBoard {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Ok(())
    }
}

impl Operation for ArchiveBoard {
    const NAME: &'static str = "archive_board";
    const MUTATES: bool = true;
    type Output = Board;

    fn execute(self, ctx: &mut OperationContext<'_>) -> CoreResult<Board> {
        BoardService::new(ctx).archive_board(self)
    }
}

impl Validate for RestoreBoard {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Ok(())
    }
}

impl Operation for RestoreBoard {
    const NAME: &'static str = "restore_board";
    const MUTATES: bool = true;
    type Output = Board;

    fn execute(self, ctx: &mut OperationContext<'_>) -> CoreResult<Board> {
        BoardService::new(ctx).restore_board(self)
    }
}

impl Validate for AddBoardMember {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Ok(())
    }
}

impl Operation for AddBoardMember {
    const NAME: &'static str = "add_board_member";
    const MUTATES: bool = true;
    type Output = Board;

    fn execute(self, ctx: &mut OperationContext<'_>) -> CoreResult<Board> {
        BoardService::new(ctx).add_member(self)
    }
}

impl Validate for RemoveBoardMember {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Ok(())
    }
}

impl Operation for RemoveBoardMember {
    const NAME: &'static str = "remove_board_member";
    const MUTATES: bool = true;
    type Output = Board;

    fn execute(self, ctx: &mut OperationContext<'_>) -> CoreResult<Board> {
        BoardService::new(ctx).remove_member(self)
    }
}

impl Validate for UpdateBoardMemberRole {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Ok(())
    }
}

impl Operation for UpdateBoardMemberRole {
    const NAME: &'static str = "update_board_member_role";
    const MUTATES: bool = true;
    type Output = Board;

    fn execute(self, ctx: &mut OperationContext<'_>) -> CoreResult<Board> {
        BoardService::new(ctx).update_member_role(self)
    }
}

impl Validate for GetBoard {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Ok(())
    }
}

impl Operation for GetBoard {
    const NAME: &'static str = "get_board";
    const MUTATES: bool = false;
    type Output = Board;

    fn execute(self, ctx: &mut OperationContext<'_>) -> CoreResult<Board> {
        BoardService::new(ctx).get_board(self)
    }
}

impl Validate for ListBoardColumns {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Ok(())
    }
}

impl Operation for ListBoardColumns {
    const NAME: &'static str = "list_board_columns";
    const MUTATES: bool = false;
    type Output = Vec<Column>;

    fn execute(self, ctx: &mut OperationContext<'_>) -> CoreResult<Vec<Column>> {
        BoardService::new(ctx).list_columns(self)
    }
}
