//! Column repository.

use super::rows::{bool_column, bool_to_int, stale_write, uuid_column};
use super::tracking::Tracker;
use super::{RepoError, RepoResult};
use crate::model::board::BoardId;
use crate::model::column::{Column, ColumnId};
use rusqlite::{params, Connection, OptionalExtension, Row};

const COLUMN_SELECT_SQL: &str = "SELECT
    id,
    board_id,
    name,
    sort_order,
    wip_limit,
    is_deleted,
    created_at,
    version
FROM columns";

pub trait ColumnRepository {
    fn get_by_id(&self, id: ColumnId) -> RepoResult<Option<Column>>;
    /// Non-deleted columns of one board, ordered by `order`.
    fn list_for_board(&self, board_id: BoardId) -> RepoResult<Vec<Column>>;
    fn add(&mut self, column: Column) -> RepoResult<()>;
    fn update(&mut self, column: Column) -> RepoResult<()>;
}

pub struct SqliteColumnRepository<'uow> {
    conn: &'uow Connection,
    tracker: &'uow mut Tracker<Column>,
}

impl<'uow> SqliteColumnRepository<'uow> {
    pub(crate) fn new(conn: &'uow Connection, tracker: &'uow mut Tracker<Column>) -> Self {
        Self { conn, tracker }
    }
}

impl ColumnRepository for SqliteColumnRepository<'_> {
    fn get_by_id(&self, id: ColumnId) -> RepoResult<Option<Column>> {
        if let Some(column) = self.tracker.get(id) {
            return Ok(Some(column.clone()));
        }
        self.conn
            .query_row(
                &format!("{COLUMN_SELECT_SQL} WHERE id = ?1;"),
                [id.to_string()],
                |row| Ok(parse_column_row(row)),
            )
            .optional()?
            .transpose()
    }

    fn list_for_board(&self, board_id: BoardId) -> RepoResult<Vec<Column>> {
        let mut stmt = self
            .conn
            .prepare_cached(&format!("{COLUMN_SELECT_SQL} WHERE board_id = ?1;"))?;
        let mut rows = stmt.query([board_id.to_string()])?;
        let mut persisted = Vec::new();
        while let Some(row) = rows.next()? {
            persisted.push(parse_column_row(row)?);
        }

        let mut columns = self.tracker.overlay(persisted, |column| {
            column.board_id == board_id && !column.is_deleted
        });
        columns.sort_by(|left, right| {
            left.order
                .cmp(&right.order)
                .then(left.created_at.cmp(&right.created_at))
        });
        Ok(columns)
    }

    fn add(&mut self, column: Column) -> RepoResult<()> {
        self.tracker.add(column)
    }

    fn update(&mut self, column: Column) -> RepoResult<()> {
        self.tracker.update(column);
        Ok(())
    }
}

pub(crate) fn insert_column(conn: &Connection, column: &Column) -> RepoResult<()> {
    conn.execute(
        "INSERT INTO columns (
            id,
            board_id,
            name,
            sort_order,
            wip_limit,
            is_deleted,
            created_at,
            version
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
        params![
            column.id.to_string(),
            column.board_id.to_string(),
            column.name.as_str(),
            column.order,
            column.wip_limit,
            bool_to_int(column.is_deleted),
            column.created_at,
            column.version,
        ],
    )?;
    Ok(())
}

pub(crate) fn update_column(conn: &Connection, column: &Column) -> RepoResult<()> {
    let changed = conn.execute(
        "UPDATE columns
         SET
            name = ?1,
            sort_order = ?2,
            wip_limit = ?3,
            is_deleted = ?4,
            version = version + 1
         WHERE id = ?5 AND version = ?6;",
        params![
            column.name.as_str(),
            column.order,
            column.wip_limit,
            bool_to_int(column.is_deleted),
            column.id.to_string(),
            column.version,
        ],
    )?;
    if changed == 0 {
        return Err(stale_write(
            conn,
            "columns",
            "column",
            column.id,
            column.version,
        ));
    }
    Ok(())
}

fn parse_column_row(row: &Row<'_>) -> RepoResult<Column> {
    let wip_limit = match row.get::<_, Option<i64>>("wip_limit")? {
        Some(value) => Some(u32::try_from(value).map_err(|_| {
            RepoError::InvalidData(format!("invalid wip_limit `{value}` in columns.wip_limit"))
        })?),
        None => None,
    };

    Ok(Column {
        id: uuid_column(row, "columns", "id")?,
        board_id: uuid_column(row, "columns", "board_id")?,
        name: row.get("name")?,
        order: row.get("sort_order")?,
        wip_limit,
        is_deleted: bool_column(row, "columns", "is_deleted")?,
        created_at: row.get("created_at")?,
        version: row.get("version")?,
        events: Default::default(),
    })
}
