//! Project repository, including project membership rows.
//!
//! # Invariants
//! - Membership rows are rewritten together with their project row.

use super::rows::{bool_column, bool_to_int, enum_column, stale_write, uuid_column};
use super::tracking::Tracker;
use super::RepoResult;
use crate::model::membership::{ProjectMember, ProjectRole};
use crate::model::project::{Project, ProjectId, ProjectStatus, ProjectVisibility};
use rusqlite::{params, Connection, OptionalExtension, Row};

const PROJECT_SELECT_SQL: &str = "SELECT
    id,
    name,
    description,
    status,
    visibility,
    is_archived,
    owner_id,
    created_at,
    version
FROM projects";

pub trait ProjectRepository {
    fn get_by_id(&self, id: ProjectId) -> RepoResult<Option<Project>>;
    fn add(&mut self, project: Project) -> RepoResult<()>;
    fn update(&mut self, project: Project) -> RepoResult<()>;
}

pub struct SqliteProjectRepository<'uow> {
    conn: &'uow Connection,
    tracker: &'uow mut Tracker<Project>,
}

impl<'uow> SqliteProjectRepository<'uow> {
    pub(crate) fn new(conn: &'uow Connection, tracker: &'uow mut Tracker<Project>) -> Self {
        Self { conn, tracker }
    }
}

impl ProjectRepository for SqliteProjectRepository<'_> {
    fn get_by_id(&self, id: ProjectId) -> RepoResult<Option<Project>> {
        if let Some(project) = self.tracker.get(id) {
            return Ok(Some(project.clone()));
        }
        load_project(self.conn, id)
    }

    fn add(&mut self, project: Project) -> RepoResult<()> {
        self.tracker.add(project)
    }

    fn update(&mut self, project: Project) -> RepoResult<()> {
        self.tracker.update(project);
        Ok(())
    }
}

fn load_project(conn: &Connection, id: ProjectId) -> RepoResult<Option<Project>> {
    let project = conn
        .query_row(
            &format!("{PROJECT_SELECT_SQL} WHERE id = ?1;"),
            [id.to_string()],
            |row| Ok(parse_project_row(row)),
        )
        .optional()?
        .transpose()?;

    match project {
        Some(mut project) => {
            project.members = load_members(conn, id)?;
            Ok(Some(project))
        }
        None => Ok(None),
    }
}

pub(crate) fn insert_project(conn: &Connection, project: &Project) -> RepoResult<()> {
    conn.execute(
        "INSERT INTO projects (
            id,
            name,
            description,
            status,
            visibility,
            is_archived,
            owner_id,
            created_at,
            version
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
        params![
            project.id.to_string(),
            project.name.as_str(),
            project.description.as_deref(),
            project.status.as_str(),
            project.visibility.as_str(),
            bool_to_int(project.is_archived),
            project.owner_id.to_string(),
            project.created_at,
            project.version,
        ],
    )?;
    write_members(conn, project)
}

pub(crate) fn update_project(conn: &Connection, project: &Project) -> RepoResult<()> {
    let changed = conn.execute(
        "UPDATE projects
         SET
            name = ?1,
            description = ?2,
            status = ?3,
            visibility = ?4,
            is_archived = ?5,
            version = version + 1
         WHERE id = ?6 AND version = ?7;",
        params![
            project.name.as_str(),
            project.description.as_deref(),
            project.status.as_str(),
            project.visibility.as_str(),
            bool_to_int(project.is_archived),
            project.id.to_string(),
            project.version,
        ],
    )?;
    if changed == 0 {
        return Err(stale_write(
            conn,
            "projects",
            "project",
            project.id,
            project.version,
        ));
    }
    write_members(conn, project)
}

fn write_members(conn: &Connection, project: &Project) -> RepoResult<()> {
    conn.execute(
        "DELETE FROM project_members WHERE project_id = ?1;",
        [project.id.to_string()],
    )?;
    let mut stmt = conn.prepare_cached(
        "INSERT INTO project_members (project_id, user_id, role, joined_at)
         VALUES (?1, ?2, ?3, ?4);",
    )?;
    for member in &project.members {
        stmt.execute(params![
            project.id.to_string(),
            member.user_id.to_string(),
            member.role.as_str(),
            member.joined_at,
        ])?;
    }
    Ok(())
}

fn load_members(conn: &Connection, project_id: ProjectId) -> RepoResult<Vec<ProjectMember>> {
    let mut stmt = conn.prepare_cached(
        "SELECT user_id, role, joined_at
         FROM project_members
         WHERE project_id = ?1
         ORDER BY joined_at ASC, user_id ASC;",
    )?;
    let mut rows = stmt.query([project_id.to_string()])?;
    let mut members = Vec::new();
    while let Some(row) = rows.next()? {
        members.push(ProjectMember {
            user_id: uuid_column(row, "project_members", "user_id")?,
            role: enum_column(row, "project_members", "role", |value| {
                ProjectRole::parse(value).ok()
            })?,
            joined_at: row.get("joined_at")?,
        });
    }
    Ok(members)
}

fn parse_project_row(row: &Row<'_>) -> RepoResult<Project> {
    Ok(Project {
        id: uuid_column(row, "projects", "id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        status: enum_column(row, "projects", "status", ProjectStatus::parse)?,
        visibility: enum_column(row, "projects", "visibility", ProjectVisibility::parse)?,
        is_archived: bool_column(row, "projects", "is_archived")?,
        owner_id: uuid_column(row, "projects", "owner_id")?,
        members: Vec::new(),
        created_at: row.get("created_at")?,
        version: row.get("version")?,
        events: Default::default(),
    })
}
