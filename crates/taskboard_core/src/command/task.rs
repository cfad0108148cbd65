//! Task requests.

use super::{DESCRIPTION_MAX_LEN, TASK_POSITION_MAX, TITLE_MAX_LEN};
use crate::error::CoreResult;
use crate::model::column::ColumnId;
use crate::model::task::{BoardTask, TaskDetails, TaskId, TaskPriority};
use crate::model::user::UserId;
use crate::pipeline::{Operation, OperationContext, Rules, Validate, ValidationErrors};
use crate::service::TaskService;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateTask {
    pub column_id: ColumnId,
    pub title: String,
    pub description: Option<String>,
    pub priority: TaskPriority,
    /// Unix epoch milliseconds.
    pub due_date: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpdateTask {
    pub task_id: TaskId,
    pub title: String,
    pub description: Option<String>,
    pub priority: TaskPriority,
    pub due_date: Option<i64>,
}

/// Moves a task to another column of the same board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct MoveTask {
    pub task_id: TaskId,
    pub to_column_id: ColumnId,
    /// `None` appends after the destination's last task.
    pub position: Option<i32>,
}

/// Sets or clears (`None`) the assignee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct AssignTask {
    pub task_id: TaskId,
    pub assignee_id: Option<UserId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ArchiveTask {
    pub task_id: TaskId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RestoreTask {
    pub task_id: TaskId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct GetTask {
    pub task_id: TaskId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ListColumnTasks {
    pub column_id: ColumnId,
    #[serde(default)]
    pub include_archived: bool,
}

fn task_details_rules(title: &str, description: Option<&str>) -> Rules {
    Rules::new()
        .not_blank("title", title)
        .max_len("title", title, TITLE_MAX_LEN)
        .optional_max_len("description", description, DESCRIPTION_MAX_LEN)
}

impl CreateTask {
    pub(crate) fn details(&self) -> TaskDetails {
        TaskDetails {
            title: self.title.clone(),
            description: self.description.clone(),
            priority: self.priority,
            due_date: self.due_date,
        }
    }
}

impl UpdateTask {
    pub(crate) fn details(&self) -> TaskDetails {
        TaskDetails {
            title: self.title.clone(),
            description: self.description.clone(),
            priority: self.priority,
            due_date: self.due_date,
        }
    }
}

impl Validate for CreateTask {
    fn validate(&self) -> Result<(), ValidationErrors> {
        task_details_rules(&self.title, self.description.as_deref()).finish()
    }
}

impl Operation for CreateTask {
    const NAME: &'static str = "create_task";
    const MUTATES: bool = true;
    type Output = BoardTask;

    fn execute(self, ctx: &mut OperationContext<'_>) -> CoreResult<BoardTask> {
        TaskService::new(ctx).create_task(self)
    }
}

impl Validate for UpdateTask {
    fn validate(&self) -> Result<(), ValidationErrors> {
        task_details_rules(&self.title, self.description.as_deref()).finish()
    }
}

impl Operation for UpdateTask {
    const NAME: &'static str = "update_task";
    const MUTATES: bool = true;
    type Output = BoardTask;

    fn execute(self, ctx: &mut OperationContext<'_>) -> CoreResult<BoardTask> {
        TaskService::new(ctx).update_task(self)
    }
}

impl Validate for MoveTask {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let rules = match self.position {
            Some(position) => Rules::new().range("position", position, 0, TASK_POSITION_MAX),
            None => Rules::new(),
        };
        rules.finish()
    }
}

impl Operation for MoveTask {
    const NAME: &'static str = "move_task";
    const MUTATES: bool = true;
    type Output = BoardTask;

    fn execute(self, ctx: &mut OperationContext<'_>) -> CoreResult<BoardTask> {
        TaskService::new(ctx).move_task(self)
    }
}

impl Validate for AssignTask {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Ok(())
    }
}

impl Operation for AssignTask {
    const NAME: &'static str = "assign_task";
    const MUTATES: bool = true;
    type Output = BoardTask;

    fn execute(self, ctx: &mut OperationContext<'_>) -> CoreResult<BoardTask> {
        TaskService::new(ctx).assign_task(self)
    }
}

impl Validate for ArchiveTask {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Ok(())
    }
}

impl Operation for ArchiveTask {
    const NAME: &'static str = "archive_task";
    const MUTATES: bool = true;
    type Output = BoardTask;

    fn execute(self, ctx: &mut OperationContext<'_>) -> CoreResult<BoardTask> {
        TaskService::new(ctx).archive_task(self)
    }
}

impl Validate for RestoreTask {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Ok(())
    }
}

impl Operation for RestoreTask {
    const NAME: &'static str = "restore_task";
    const MUTATES: bool = true;
    type Output = BoardTask;

    fn execute(self, ctx: &mut OperationContext<'_>) -> CoreResult<BoardTask> {
        TaskService::new(ctx).restore_task(self)
    }
}

impl Validate for GetTask {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Ok(())
    }
}

impl Operation for GetTask {
    const NAME: &'static str = "get_task";
    const MUTATES: bool = false;
    type Output = BoardTask;

    fn execute(self, ctx: &mut OperationContext<'_>) -> CoreResult<BoardTask> {
        TaskService::new(ctx).get_task(self)
    }
}

impl Validate for ListColumnTasks {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Ok(())
    }
}

impl Operation for ListColumnTasks {
    const NAME: &'static str = "list_column_tasks";
    const MUTATES: bool = false;
    type Output = Vec<BoardTask>;

    fn execute(self, ctx: &mut OperationContext<'_>) -> CoreResult<Vec<BoardTask>> {
        TaskService::new(ctx).list_column_tasks(self)
    }
}
