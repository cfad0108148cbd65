//! Task repository.
//!
//! # Invariants
//! - Column listings and WIP counts include tasks tracked by the current
//!   unit of work, so a move inside one operation is counted once.

use super::rows::{
    bool_column, bool_to_int, enum_column, optional_uuid_column, stale_write, uuid_column,
};
use super::tracking::Tracker;
use super::RepoResult;
use crate::model::column::ColumnId;
use crate::model::task::{BoardTask, TaskId, TaskPriority};
use rusqlite::{params, Connection, OptionalExtension, Row};

const TASK_SELECT_SQL: &str = "SELECT
    id,
    column_id,
    title,
    description,
    priority,
    due_date,
    position,
    assignee_id,
    is_archived,
    created_by,
    created_at,
    version
FROM tasks";

pub trait TaskRepository {
    fn get_by_id(&self, id: TaskId) -> RepoResult<Option<BoardTask>>;
    /// Tasks of one column ordered by position, then creation time.
    fn list_by_column(
        &self,
        column_id: ColumnId,
        include_archived: bool,
    ) -> RepoResult<Vec<BoardTask>>;
    /// Ids of the non-archived tasks currently in the column.
    fn active_task_ids_in_column(&self, column_id: ColumnId) -> RepoResult<Vec<TaskId>>;
    fn add(&mut self, task: BoardTask) -> RepoResult<()>;
    fn update(&mut self, task: BoardTask) -> RepoResult<()>;
}

pub struct SqliteTaskRepository<'uow> {
    conn: &'uow Connection,
    tracker: &'uow mut Tracker<BoardTask>,
}

impl<'uow> SqliteTaskRepository<'uow> {
    pub(crate) fn new(conn: &'uow Connection, tracker: &'uow mut Tracker<BoardTask>) -> Self {
        Self { conn, tracker }
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn get_by_id(&self, id: TaskId) -> RepoResult<Option<BoardTask>> {
        if let Some(task) = self.tracker.get(id) {
            return Ok(Some(task.clone()));
        }
        self.conn
            .query_row(
                &format!("{TASK_SELECT_SQL} WHERE id = ?1;"),
                [id.to_string()],
                |row| Ok(parse_task_row(row)),
            )
            .optional()?
            .transpose()
    }

    fn list_by_column(
        &self,
        column_id: ColumnId,
        include_archived: bool,
    ) -> RepoResult<Vec<BoardTask>> {
        let mut stmt = self
            .conn
            .prepare_cached(&format!("{TASK_SELECT_SQL} WHERE column_id = ?1;"))?;
        let mut rows = stmt.query([column_id.to_string()])?;
        let mut persisted = Vec::new();
        while let Some(row) = rows.next()? {
            persisted.push(parse_task_row(row)?);
        }

        let mut tasks = self.tracker.overlay(persisted, |task| {
            task.column_id == column_id && (include_archived || !task.is_archived)
        });
        tasks.sort_by(|left, right| {
            left.position
                .cmp(&right.position)
                .then(left.created_at.cmp(&right.created_at))
        });
        Ok(tasks)
    }

    fn active_task_ids_in_column(&self, column_id: ColumnId) -> RepoResult<Vec<TaskId>> {
        Ok(self
            .list_by_column(column_id, false)?
            .into_iter()
            .map(|task| task.id)
            .collect())
    }

    fn add(&mut self, task: BoardTask) -> RepoResult<()> {
        self.tracker.add(task)
    }

    fn update(&mut self, task: BoardTask) -> RepoResult<()> {
        self.tracker.update(task);
        Ok(())
    }
}

pub(crate) fn insert_task(conn: &Connection, task: &BoardTask) -> RepoResult<()> {
    conn.execute(
        "INSERT INTO tasks (
            id,
            column_id,
            title,
            description,
            priority,
            due_date,
            position,
            assignee_id,
            is_archived,
            created_by,
            created_at,
            version
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12);",
        params![
            task.id.to_string(),
            task.column_id.to_string(),
            task.title.as_str(),
            task.description.as_deref(),
            task.priority.as_str(),
            task.due_date,
            task.position,
            task.assignee_id.map(|id| id.to_string()),
            bool_to_int(task.is_archived),
            task.created_by.to_string(),
            task.created_at,
            task.version,
        ],
    )?;
    Ok(())
}

pub(crate) fn update_task(conn: &Connection, task: &BoardTask) -> RepoResult<()> {
    let changed = conn.execute(
        "UPDATE tasks
         SET
            column_id = ?1,
            title = ?2,
            description = ?3,
            priority = ?4,
            due_date = ?5,
            position = ?6,
            assignee_id = ?7,
            is_archived = ?8,
            version = version + 1
         WHERE id = ?9 AND version = ?10;",
        params![
            task.column_id.to_string(),
            task.title.as_str(),
            task.description.as_deref(),
            task.priority.as_str(),
            task.due_date,
            task.position,
            task.assignee_id.map(|id| id.to_string()),
            bool_to_int(task.is_archived),
            task.id.to_string(),
            task.version,
        ],
    )?;
    if changed == 0 {
        return Err(stale_write(conn, "tasks", "task", task.id, task.version));
    }
    Ok(())
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<BoardTask> {
    Ok(BoardTask {
        id: uuid_column(row, "tasks", "id")?,
        column_id: uuid_column(row, "tasks", "column_id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        priority: enum_column(row, "tasks", "priority", TaskPriority::parse)?,
        due_date: row.get("due_date")?,
        position: row.get("position")?,
        assignee_id: optional_uuid_column(row, "tasks", "assignee_id")?,
        is_archived: bool_column(row, "tasks", "is_archived")?,
        created_by: uuid_column(row, "tasks", "created_by")?,
        created_at: row.get("created_at")?,
        version: row.get("version")?,
        events: Default::default(),
    })
}
