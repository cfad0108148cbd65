//! Unit of work: change tracking, atomic commit and post-commit dispatch.
//!
//! # Responsibility
//! - Hand out repository handles that share one set of trackers.
//! - Persist every tracked change in one SQLite transaction.
//! - Drain aggregate event buffers and dispatch them after commit.
//!
//! # Invariants
//! - Rows are written in foreign-key order: users, projects, boards,
//!   columns, tasks, comments.
//! - A failed commit rolls back every write, leaves buffers untouched and
//!   dispatches nothing.
//! - Events of one aggregate are dispatched in recording order.

use super::board_repo::{insert_board, update_board};
use super::column_repo::{insert_column, update_column};
use super::comment_repo::{insert_comment, update_comment};
use super::project_repo::{insert_project, update_project};
use super::task_repo::{insert_task, update_task};
use super::tracking::{EntryState, Tracker};
use super::user_repo::{insert_user, update_user};
use super::{
    BoardRepository, ColumnRepository, RepoError, RepoResult, SqliteBoardRepository,
    SqliteColumnRepository, SqliteCommentRepository, SqliteProjectRepository,
    SqliteTaskRepository, SqliteUserRepository, TaskRepository,
};
use crate::events::EventDispatcher;
use crate::model::board::Board;
use crate::model::column::{Column, ColumnId};
use crate::model::comment::Comment;
use crate::model::event::DomainEvent;
use crate::model::project::Project;
use crate::model::task::{BoardTask, TaskId};
use crate::model::user::User;
use crate::model::Aggregate;
use log::{error, info};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::sync::Arc;
use std::time::Instant;

type WriteFn<T> = fn(&Connection, &T) -> RepoResult<()>;

/// Scope of one core operation over one connection.
pub struct UnitOfWork<'conn> {
    conn: &'conn Connection,
    dispatcher: Arc<EventDispatcher>,
    users: Tracker<User>,
    projects: Tracker<Project>,
    boards: Tracker<Board>,
    columns: Tracker<Column>,
    tasks: Tracker<BoardTask>,
    comments: Tracker<Comment>,
}

impl<'conn> UnitOfWork<'conn> {
    pub fn new(conn: &'conn Connection, dispatcher: Arc<EventDispatcher>) -> Self {
        Self {
            conn,
            dispatcher,
            users: Tracker::new("user"),
            projects: Tracker::new("project"),
            boards: Tracker::new("board"),
            columns: Tracker::new("column"),
            tasks: Tracker::new("task"),
            comments: Tracker::new("comment"),
        }
    }

    pub fn users(&mut self) -> SqliteUserRepository<'_> {
        SqliteUserRepository::new(self.conn, &mut self.users)
    }

    pub fn projects(&mut self) -> SqliteProjectRepository<'_> {
        SqliteProjectRepository::new(self.conn, &mut self.projects)
    }

    pub fn boards(&mut self) -> SqliteBoardRepository<'_> {
        SqliteBoardRepository::new(self.conn, &mut self.boards)
    }

    pub fn columns(&mut self) -> SqliteColumnRepository<'_> {
        SqliteColumnRepository::new(self.conn, &mut self.columns)
    }

    pub fn tasks(&mut self) -> SqliteTaskRepository<'_> {
        SqliteTaskRepository::new(self.conn, &mut self.tasks)
    }

    pub fn comments(&mut self) -> SqliteCommentRepository<'_> {
        SqliteCommentRepository::new(self.conn, &mut self.comments)
    }

    /// Loads a column and the board it belongs to.
    pub fn column_with_board(&mut self, column_id: ColumnId) -> RepoResult<(Column, Board)> {
        let column = self
            .columns()
            .get_by_id(column_id)?
            .ok_or(RepoError::NotFound {
                entity: "column",
                id: column_id,
            })?;
        let board_id = column.board_id();
        let board = self
            .boards()
            .get_by_id(board_id)?
            .ok_or(RepoError::NotFound {
                entity: "board",
                id: board_id,
            })?;
        Ok((column, board))
    }

    /// Loads a task, its current column and the owning board.
    pub fn task_with_board(&mut self, task_id: TaskId) -> RepoResult<(BoardTask, Column, Board)> {
        let task = self
            .tasks()
            .get_by_id(task_id)?
            .ok_or(RepoError::NotFound {
                entity: "task",
                id: task_id,
            })?;
        let (column, board) = self.column_with_board(task.column_id())?;
        Ok((task, column, board))
    }

    /// Number of aggregates tracked for the next `complete`.
    pub fn pending_changes(&self) -> usize {
        self.users.len()
            + self.projects.len()
            + self.boards.len()
            + self.columns.len()
            + self.tasks.len()
            + self.comments.len()
    }

    /// Commits tracked changes, then dispatches their events.
    ///
    /// Returns the number of persisted aggregates.
    pub fn complete(&mut self) -> RepoResult<usize> {
        let started_at = Instant::now();
        let changes = self.pending_changes();

        if let Err(err) = self.persist() {
            error!(
                "event=uow_complete module=repo status=error changes={} duration_ms={} error={}",
                changes,
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err);
        }

        let events = self.drain_committed_events();
        self.clear();
        let report = self.dispatcher.dispatch(&events);
        info!(
            "event=uow_complete module=repo status=ok changes={} events={} deliveries={} failures={} duration_ms={}",
            changes,
            report.events,
            report.deliveries,
            report.failures,
            started_at.elapsed().as_millis()
        );
        Ok(changes)
    }

    fn persist(&self) -> RepoResult<()> {
        if self.pending_changes() == 0 {
            return Ok(());
        }
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        write_tracked(&tx, &self.users, insert_user, update_user)?;
        write_tracked(&tx, &self.projects, insert_project, update_project)?;
        write_tracked(&tx, &self.boards, insert_board, update_board)?;
        write_tracked(&tx, &self.columns, insert_column, update_column)?;
        write_tracked(&tx, &self.tasks, insert_task, update_task)?;
        write_tracked(&tx, &self.comments, insert_comment, update_comment)?;
        tx.commit()?;
        Ok(())
    }

    fn drain_committed_events(&mut self) -> Vec<DomainEvent> {
        let drained = [
            self.users.drain_events(),
            self.projects.drain_events(),
            self.boards.drain_events(),
            self.columns.drain_events(),
            self.tasks.drain_events(),
            self.comments.drain_events(),
        ];
        drained
            .into_iter()
            .flatten()
            .collect()
    }

    fn clear(&mut self) {
        self.users.clear();
        self.projects.clear();
        self.boards.clear();
        self.columns.clear();
        self.tasks.clear();
        self.comments.clear();
    }
}

fn write_tracked<T: Aggregate + Clone>(
    conn: &Connection,
    tracker: &Tracker<T>,
    insert: WriteFn<T>,
    update: WriteFn<T>,
) -> RepoResult<()> {
    for entry in tracker.entries() {
        match entry.state {
            EntryState::Added => insert(conn, &entry.entity)?,
            EntryState::Modified => update(conn, &entry.entity)?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::UnitOfWork;
    use crate::db::open_db_in_memory;
    use crate::events::EventDispatcher;
    use crate::model::user::User;
    use crate::repo::UserRepository;
    use std::sync::Arc;
    use uuid::Uuid;

    #[test]
    fn tracked_user_is_visible_before_commit_but_not_persisted() {
        let conn = open_db_in_memory().unwrap();
        let mut uow = UnitOfWork::new(&conn, Arc::new(EventDispatcher::new()));
        let id = Uuid::new_v4();
        uow.users()
            .add(User::register(id, "Ada@Example.com", "Ada"))
            .unwrap();

        assert!(uow.users().get_by_id(id).unwrap().is_some());
        assert!(uow.users().find_by_email("ada@example.com").unwrap().is_some());
        let persisted: i64 = conn
            .query_row("SELECT COUNT(*) FROM users;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(persisted, 0);

        assert_eq!(uow.complete().unwrap(), 1);
        assert_eq!(uow.pending_changes(), 0);
        let persisted: i64 = conn
            .query_row("SELECT COUNT(*) FROM users;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(persisted, 1);
    }

    #[test]
    fn adding_same_aggregate_twice_is_rejected() {
        let conn = open_db_in_memory().unwrap();
        let mut uow = UnitOfWork::new(&conn, Arc::new(EventDispatcher::new()));
        let user = User::register(Uuid::new_v4(), "a@example.com", "A");
        uow.users().add(user.clone()).unwrap();
        assert!(uow.users().add(user).is_err());
    }
}
