//! Comment requests.

use super::COMMENT_MAX_LEN;
use crate::error::CoreResult;
use crate::model::comment::{Comment, CommentId};
use crate::model::task::TaskId;
use crate::pipeline::{Operation, OperationContext, Rules, Validate, ValidationErrors};
use crate::service::CommentService;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AddComment {
    pub task_id: TaskId,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpdateComment {
    pub comment_id: CommentId,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct DeleteComment {
    pub comment_id: CommentId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RestoreComment {
    pub comment_id: CommentId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ListTaskComments {
    pub task_id: TaskId,
    #[serde(default)]
    pub include_deleted: bool,
}

fn content_rules(content: &str) -> Rules {
    Rules::new()
        .not_blank("content", content)
        .max_len("content", content, COMMENT_MAX_LEN)
}

impl Validate for AddComment {
    fn validate(&self) -> Result<(), ValidationErrors> {
        content_rules(&self.content).finish()
    }
}

impl Operation for AddComment {
    const NAME: &'static str = "add_comment";
    const MUTATES: bool = true;
    type Output = Comment;

    fn execute(self, ctx: &mut OperationContext<'_>) -> CoreResult<Comment> {
        CommentService::new(ctx).add_comment(self)
    }
}

impl Validate for UpdateComment {
    fn validate(&self) -> Result<(), ValidationErrors> {
        content_rules(&self.content).finish()
    }
}

impl Operation for UpdateComment {
    const NAME: &'static str = "update_comment";
    const MUTATES: bool = true;
    type Output = Comment;

    fn execute(self, ctx: &mut OperationContext<'_>) -> CoreResult<Comment> {
        CommentService::new(ctx).update_comment(self)
    }
}

impl Validate for DeleteComment {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Ok(())
    }
}

impl Operation for DeleteComment {
    const NAME: &'static str = "delete_comment";
    const MUTATES: bool = true;
    type Output = Comment;

    fn execute(self, ctx: &mut OperationContext<'_>) -> CoreResult<Comment> {
        CommentService::new(ctx).delete_comment(self)
    }
}

impl Validate for RestoreComment {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Ok(())
    }
}

impl Operation for RestoreComment {
    const NAME: &'static str = "restore_comment";
    const MUTATES: bool = true;
    type Output = Comment;

    fn execute(self, ctx: &mut OperationContext<'_>) -> CoreResult<Comment> {
        CommentService::new(ctx).restore_comment(self)
    }
}

impl Validate for ListTaskComments {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Ok(())
    }
}

impl Operation for ListTaskComments {
    const NAME: &'static str = "list_task_comments";
    const MUTATES: bool = false;
    type Output = Vec<Comment>;

    fn execute(self, ctx: &mut OperationContext<'_>) -> CoreResult<Vec<Comment>> {
        CommentService::new(ctx).list_task_comments(self)
    }
}
