//! Board repository, including board membership rows.

use super::rows::{bool_column, bool_to_int, enum_column, stale_write, uuid_column};
use super::tracking::Tracker;
use super::RepoResult;
use crate::model::board::{Board, BoardId};
use crate::model::membership::{BoardMember, BoardRole};
use crate::model::project::ProjectId;
use rusqlite::{params, Connection, OptionalExtension, Row};

const BOARD_SELECT_SQL: &str = "SELECT
    id,
    project_id,
    name,
    description,
    is_archived,
    created_by,
    created_at,
    version
FROM boards";

pub trait BoardRepository {
    /// Loads a board together with its members.
    fn get_by_id(&self, id: BoardId) -> RepoResult<Option<Board>>;
    /// Boards of one project, archived ones included, oldest first.
    fn list_for_project(&self, project_id: ProjectId) -> RepoResult<Vec<Board>>;
    fn add(&mut self, board: Board) -> RepoResult<()>;
    fn update(&mut self, board: Board) -> RepoResult<()>;
}

pub struct SqliteBoardRepository<'uow> {
    conn: &'uow Connection,
    tracker: &'uow mut Tracker<Board>,
}

impl<'uow> SqliteBoardRepository<'uow> {
    pub(crate) fn new(conn: &'uow Connection, tracker: &'uow mut Tracker<Board>) -> Self {
        Self { conn, tracker }
    }
}

impl BoardRepository for SqliteBoardRepository<'_> {
    fn get_by_id(&self, id: BoardId) -> RepoResult<Option<Board>> {
        if let Some(board) = self.tracker.get(id) {
            return Ok(Some(board.clone()));
        }
        load_board(self.conn, id)
    }

    fn list_for_project(&self, project_id: ProjectId) -> RepoResult<Vec<Board>> {
        let mut stmt = self
            .conn
            .prepare_cached(&format!("{BOARD_SELECT_SQL} WHERE project_id = ?1;"))?;
        let mut rows = stmt.query([project_id.to_string()])?;
        let mut persisted = Vec::new();
        while let Some(row) = rows.next()? {
            let mut board = parse_board_row(row)?;
            board.members = load_members(self.conn, board.id)?;
            persisted.push(board);
        }

        let mut boards = self
            .tracker
            .overlay(persisted, |board| board.project_id == project_id);
        boards.sort_by(|left, right| {
            left.created_at
                .cmp(&right.created_at)
                .then(left.id.cmp(&right.id))
        });
        Ok(boards)
    }

    fn add(&mut self, board: Board) -> RepoResult<()> {
        self.tracker.add(board)
    }

    fn update(&mut self, board: Board) -> RepoResult<()> {
        self.tracker.update(board);
        Ok(())
    }
}

fn load_board(conn: &Connection, id: BoardId) -> RepoResult<Option<Board>> {
    let board = conn
        .query_row(
            &format!("{BOARD_SELECT_SQL} WHERE id = ?1;"),
            [id.to_string()],
            |row| Ok(parse_board_row(row)),
        )
        .optional()?
        .transpose()?;

    match board {
        Some(mut board) => {
            board.members = load_members(conn, id)?;
            Ok(Some(board))
        }
        None => Ok(None),
    }
}

pub(crate) fn insert_board(conn: &Connection, board: &Board) -> RepoResult<()> {
    conn.execute(
        "INSERT INTO boards (
            id,
            project_id,
            name,
            description,
            is_archived,
            created_by,
            created_at,
            version
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
        params![
            board.id.to_string(),
            board.project_id.to_string(),
            board.name.as_str(),
            board.description.as_deref(),
            bool_to_int(board.is_archived),
            board.created_by.to_string(),
            board.created_at,
            board.version,
        ],
    )?;
    write_members(conn, board)
}

pub(crate) fn update_board(conn: &Connection, board: &Board) -> RepoResult<()> {
    let changed = conn.execute(
        "UPDATE boards
         SET name = ?1, description = ?2, is_archived = ?3, version = version + 1
         WHERE id = ?4 AND version = ?5;",
        params![
            board.name.as_str(),
            board.description.as_deref(),
            bool_to_int(board.is_archived),
            board.id.to_string(),
            board.version,
        ],
    )?;
    if changed == 0 {
        return Err(stale_write(conn, "boards", "board", board.id, board.version));
    }
    write_members(conn, board)
}

fn write_members(conn: &Connection, board: &Board) -> RepoResult<()> {
    conn.execute(
        "DELETE FROM board_members WHERE board_id = ?1;",
        [board.id.to_string()],
    )?;
    let mut stmt = conn.prepare_cached(
        "INSERT INTO board_members (board_id, user_id, role, joined_at)
         VALUES (?1, ?2, ?3, ?4);",
    )?;
    for member in &board.members {
        stmt.execute(params![
            board.id.to_string(),
            member.user_id.to_string(),
            member.role.as_str(),
            member.joined_at,
        ])?;
    }
    Ok(())
}

fn load_members(conn: &Connection, board_id: BoardId) -> RepoResult<Vec<BoardMember>> {
    let mut stmt = conn.prepare_cached(
        "SELECT user_id, role, joined_at
         FROM board_members
         WHERE board_id = ?1
         ORDER BY joined_at ASC, user_id ASC;",
    )?;
    let mut rows = stmt.query([board_id.to_string()])?;
    let mut members = Vec::new();
    while let Some(row) = rows.next()? {
        members.push(BoardMember {
            user_id: uuid_column(row, "board_members", "user_id")?,
            role: enum_column(row, "board_members", "role", |value| {
                BoardRole::parse(value).ok()
            })?,
            joined_at: row.get("joined_at")?,
        });
    }
    Ok(members)
}

fn parse_board_row(row: &Row<'_>) -> RepoResult<Board> {
    Ok(Board {
        id: uuid_column(row, "boards", "id")?,
        project_id: uuid_column(row, "boards", "project_id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        is_archived: bool_column(row, "boards", "is_archived")?,
        members: Vec::new(),
        created_by: uuid_column(row, "boards", "created_by")?,
        created_at: row.get("created_at")?,
        version: row.get("version")?,
        events: Default::default(),
    })
}
