//! Shared SQLite value conversions for repository row mapping.

use super::{RepoError, RepoResult};
use rusqlite::{Connection, Row};
use uuid::Uuid;

pub(crate) fn uuid_column(row: &Row<'_>, table: &str, column: &str) -> RepoResult<Uuid> {
    let text: String = row.get(column)?;
    parse_uuid(&text, table, column)
}

pub(crate) fn optional_uuid_column(
    row: &Row<'_>,
    table: &str,
    column: &str,
) -> RepoResult<Option<Uuid>> {
    match row.get::<_, Option<String>>(column)? {
        Some(text) => parse_uuid(&text, table, column).map(Some),
        None => Ok(None),
    }
}

pub(crate) fn bool_column(row: &Row<'_>, table: &str, column: &str) -> RepoResult<bool> {
    match row.get::<_, i64>(column)? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean `{other}` in {table}.{column}"
        ))),
    }
}

/// Parses an enum column through `parse`, reporting the offending value.
pub(crate) fn enum_column<T>(
    row: &Row<'_>,
    table: &str,
    column: &str,
    parse: impl FnOnce(&str) -> Option<T>,
) -> RepoResult<T> {
    let text: String = row.get(column)?;
    parse(&text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid value `{text}` in {table}.{column}"))
    })
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

fn parse_uuid(text: &str, table: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(text)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid `{text}` in {table}.{column}")))
}

/// Classifies an update that matched no row: missing row or stale version.
pub(crate) fn stale_write(
    conn: &Connection,
    table: &str,
    entity: &'static str,
    id: Uuid,
    expected_version: i64,
) -> RepoError {
    let exists = conn.query_row(
        &format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE id = ?1);"),
        [id.to_string()],
        |row| row.get::<_, i64>(0),
    );
    match exists {
        Ok(1) => RepoError::Conflict {
            entity,
            id,
            expected_version,
        },
        Ok(_) => RepoError::NotFound { entity, id },
        Err(err) => err.into(),
    }
}
