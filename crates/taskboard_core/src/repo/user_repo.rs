//! User profile repository.

use super::rows::{stale_write, uuid_column};
use super::tracking::Tracker;
use super::RepoResult;
use crate::model::user::{normalize_email, User, UserId};
use rusqlite::{params, Connection, OptionalExtension, Row};

const USER_SELECT_SQL: &str = "SELECT id, email, display_name, created_at, version FROM users";

pub trait UserRepository {
    fn get_by_id(&self, id: UserId) -> RepoResult<Option<User>>;
    fn find_by_email(&self, email: &str) -> RepoResult<Option<User>>;
    fn add(&mut self, user: User) -> RepoResult<()>;
    fn update(&mut self, user: User) -> RepoResult<()>;
}

pub struct SqliteUserRepository<'uow> {
    conn: &'uow Connection,
    tracker: &'uow mut Tracker<User>,
}

impl<'uow> SqliteUserRepository<'uow> {
    pub(crate) fn new(conn: &'uow Connection, tracker: &'uow mut Tracker<User>) -> Self {
        Self { conn, tracker }
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn get_by_id(&self, id: UserId) -> RepoResult<Option<User>> {
        if let Some(user) = self.tracker.get(id) {
            return Ok(Some(user.clone()));
        }
        self.conn
            .query_row(
                &format!("{USER_SELECT_SQL} WHERE id = ?1;"),
                [id.to_string()],
                |row| Ok(parse_user_row(row)),
            )
            .optional()?
            .transpose()
    }

    fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let email = normalize_email(email);
        if let Some(user) = self.tracker.iter().find(|user| user.email == email) {
            return Ok(Some(user.clone()));
        }
        let persisted = self
            .conn
            .query_row(
                &format!("{USER_SELECT_SQL} WHERE email = ?1;"),
                [email.as_str()],
                |row| Ok(parse_user_row(row)),
            )
            .optional()?
            .transpose()?;
        // A tracked copy may have changed the email of the persisted row.
        Ok(persisted.filter(|user| !self.tracker.contains(user.id)))
    }

    fn add(&mut self, user: User) -> RepoResult<()> {
        self.tracker.add(user)
    }

    fn update(&mut self, user: User) -> RepoResult<()> {
        self.tracker.update(user);
        Ok(())
    }
}

pub(crate) fn insert_user(conn: &Connection, user: &User) -> RepoResult<()> {
    conn.execute(
        "INSERT INTO users (id, email, display_name, created_at, version)
         VALUES (?1, ?2, ?3, ?4, ?5);",
        params![
            user.id.to_string(),
            user.email.as_str(),
            user.display_name.as_str(),
            user.created_at,
            user.version,
        ],
    )?;
    Ok(())
}

pub(crate) fn update_user(conn: &Connection, user: &User) -> RepoResult<()> {
    let changed = conn.execute(
        "UPDATE users
         SET email = ?1, display_name = ?2, version = version + 1
         WHERE id = ?3 AND version = ?4;",
        params![
            user.email.as_str(),
            user.display_name.as_str(),
            user.id.to_string(),
            user.version,
        ],
    )?;
    if changed == 0 {
        return Err(stale_write(conn, "users", "user", user.id, user.version));
    }
    Ok(())
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    Ok(User {
        id: uuid_column(row, "users", "id")?,
        email: row.get("email")?,
        display_name: row.get("display_name")?,
        created_at: row.get("created_at")?,
        version: row.get("version")?,
        events: Default::default(),
    })
}
