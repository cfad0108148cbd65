//! Task comment repository.

use super::rows::{bool_column, bool_to_int, stale_write, uuid_column};
use super::tracking::Tracker;
use super::RepoResult;
use crate::model::comment::{Comment, CommentId};
use crate::model::task::TaskId;
use rusqlite::{params, Connection, OptionalExtension, Row};

const COMMENT_SELECT_SQL: &str = "SELECT
    id,
    task_id,
    author_id,
    content,
    is_deleted,
    is_edited,
    edited_at,
    created_at,
    version
FROM comments";

pub trait CommentRepository {
    fn get_by_id(&self, id: CommentId) -> RepoResult<Option<Comment>>;
    /// Comments of one task, oldest first.
    fn list_by_task(&self, task_id: TaskId, include_deleted: bool) -> RepoResult<Vec<Comment>>;
    fn add(&mut self, comment: Comment) -> RepoResult<()>;
    fn update(&mut self, comment: Comment) -> RepoResult<()>;
}

pub struct SqliteCommentRepository<'uow> {
    conn: &'uow Connection,
    tracker: &'uow mut Tracker<Comment>,
}

impl<'uow> SqliteCommentRepository<'uow> {
    pub(crate) fn new(conn: &'uow Connection, tracker: &'uow mut Tracker<Comment>) -> Self {
        Self { conn, tracker }
    }
}

impl CommentRepository for SqliteCommentRepository<'_> {
    fn get_by_id(&self, id: CommentId) -> RepoResult<Option<Comment>> {
        if let Some(comment) = self.tracker.get(id) {
            return Ok(Some(comment.clone()));
        }
        self.conn
            .query_row(
                &format!("{COMMENT_SELECT_SQL} WHERE id = ?1;"),
                [id.to_string()],
                |row| Ok(parse_comment_row(row)),
            )
            .optional()?
            .transpose()
    }

    fn list_by_task(&self, task_id: TaskId, include_deleted: bool) -> RepoResult<Vec<Comment>> {
        let mut stmt = self
            .conn
            .prepare_cached(&format!("{COMMENT_SELECT_SQL} WHERE task_id = ?1;"))?;
        let mut rows = stmt.query([task_id.to_string()])?;
        let mut persisted = Vec::new();
        while let Some(row) = rows.next()? {
            persisted.push(parse_comment_row(row)?);
        }

        let mut comments = self.tracker.overlay(persisted, |comment| {
            comment.task_id == task_id && (include_deleted || !comment.is_deleted)
        });
        comments.sort_by(|left, right| {
            left.created_at
                .cmp(&right.created_at)
                .then(left.id.cmp(&right.id))
        });
        Ok(comments)
    }

    fn add(&mut self, comment: Comment) -> RepoResult<()> {
        self.tracker.add(comment)
    }

    fn update(&mut self, comment: Comment) -> RepoResult<()> {
        self.tracker.update(comment);
        Ok(())
    }
}

pub(crate) fn insert_comment(conn: &Connection, comment: &Comment) -> RepoResult<()> {
    conn.execute(
        "INSERT INTO comments (
            id,
            task_id,
            author_id,
            content,
            is_deleted,
            is_edited,
            edited_at,
            created_at,
            version
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
        params![
            comment.id.to_string(),
            comment.task_id.to_string(),
            comment.author_id.to_string(),
            comment.content.as_str(),
            bool_to_int(comment.is_deleted),
            bool_to_int(comment.is_edited),
            comment.edited_at,
            comment.created_at,
            comment.version,
        ],
    )?;
    Ok(())
}

pub(crate) fn update_comment(conn: &Connection, comment: &Comment) -> RepoResult<()> {
    let changed = conn.execute(
        "UPDATE comments
         SET
            content = ?1,
            is_deleted = ?2,
            is_edited = ?3,
            edited_at = ?4,
            version = version + 1
         WHERE id = ?5 AND version = ?6;",
        params![
            comment.content.as_str(),
            bool_to_int(comment.is_deleted),
            bool_to_int(comment.is_edited),
            comment.edited_at,
            comment.id.to_string(),
            comment.version,
        ],
    )?;
    if changed == 0 {
        return Err(stale_write(
            conn,
            "comments",
            "comment",
            comment.id,
            comment.version,
        ));
    }
    Ok(())
}

fn parse_comment_row(row: &Row<'_>) -> RepoResult<Comment> {
    Ok(Comment {
        id: uuid_column(row, "comments", "id")?,
        task_id: uuid_column(row, "comments", "task_id")?,
        author_id: uuid_column(row, "comments", "author_id")?,
        content: row.get("content")?,
        is_deleted: bool_column(row, "comments", "is_deleted")?,
        is_edited: bool_column(row, "comments", "is_edited")?,
        edited_at: row.get("edited_at")?,
        created_at: row.get("created_at")?,
        version: row.get("version")?,
        events: Default::default(),
    })
}
