//! Comment use cases.
//!
//! # Invariants
//! - Adding a comment resolves task -> column -> board for authorization.
//! - Only the author may edit, delete or restore a comment.

use super::{found, require_board_role};
use crate::command::{AddComment, DeleteComment, ListTaskComments, RestoreComment, UpdateComment};
use crate::error::{CoreError, CoreResult};
use crate::model::comment::{Comment, CommentId};
use crate::model::membership::{BOARD_EDITORS, BOARD_READERS};
use crate::model::user::UserId;
use crate::pipeline::OperationContext;
use crate::repo::CommentRepository;

pub struct CommentService<'a, 'conn> {
    ctx: &'a mut OperationContext<'conn>,
}

impl<'a, 'conn> CommentService<'a, 'conn> {
    pub fn new(ctx: &'a mut OperationContext<'conn>) -> Self {
        Self { ctx }
    }

    pub fn add_comment(&mut self, request: AddComment) -> CoreResult<Comment> {
        let caller_id = self.ctx.caller.require_user()?;
        let (task, _, board) = self.ctx.uow.task_with_board(request.task_id)?;
        require_board_role(&board, caller_id, BOARD_EDITORS)?;
        board.ensure_not_archived()?;
        task.ensure_not_archived()?;

        let comment = Comment::create(task.id(), caller_id, request.content);
        self.ctx.uow.comments().add(comment.clone())?;
        Ok(comment)
    }

    pub fn update_comment(&mut self, request: UpdateComment) -> CoreResult<Comment> {
        let caller_id = self.ctx.caller.require_user()?;
        let mut comment = self.load_authored(request.comment_id, caller_id)?;

        comment.update_content(request.content, caller_id)?;
        self.save(comment)
    }

    pub fn delete_comment(&mut self, request: DeleteComment) -> CoreResult<Comment> {
        let caller_id = self.ctx.caller.require_user()?;
        let mut comment = self.load_authored(request.comment_id, caller_id)?;

        comment.delete(caller_id)?;
        self.save(comment)
    }

    pub fn restore_comment(&mut self, request: RestoreComment) -> CoreResult<Comment> {
        let caller_id = self.ctx.caller.require_user()?;
        let mut comment = self.load_authored(request.comment_id, caller_id)?;

        comment.restore(caller_id)?;
        self.save(comment)
    }

    pub fn list_task_comments(&mut self, request: ListTaskComments) -> CoreResult<Vec<Comment>> {
        let caller_id = self.ctx.caller.require_user()?;
        let (task, _, board) = self.ctx.uow.task_with_board(request.task_id)?;
        require_board_role(&board, caller_id, BOARD_READERS)?;
        Ok(self
            .ctx
            .uow
            .comments()
            .list_by_task(task.id(), request.include_deleted)?)
    }

    fn load_authored(&mut self, comment_id: CommentId, caller_id: UserId) -> CoreResult<Comment> {
        let comment = found(
            self.ctx.uow.comments().get_by_id(comment_id)?,
            "comment",
            comment_id,
        )?;
        if !comment.is_authored_by(caller_id) {
            return Err(CoreError::AccessDenied {
                entity: "comment",
                id: comment_id,
            });
        }
        Ok(comment)
    }

    fn save(&mut self, comment: Comment) -> CoreResult<Comment> {
        self.ctx.uow.comments().update(comment.clone())?;
        Ok(comment)
    }
}
