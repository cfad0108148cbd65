//! Project use cases.
//!
//! # Invariants
//! - Archive and restore require the Owner; other management requires
//!   Owner or Admin; reads require any membership.
//! - Only provisioned users can own or join a project.
//! - A user leaves every board of the project before leaving the project.

use super::{found, require_project_role};
use crate::command::{
    AddProjectMember, ArchiveProject, ChangeProjectStatus, CreateProject, GetProject,
    RemoveProjectMember, RestoreProject, UpdateProject, UpdateProjectMemberRole,
};
use crate::error::CoreResult;
use crate::model::DomainError;
use crate::model::membership::{PROJECT_MANAGERS, PROJECT_OWNERS, PROJECT_READERS};
use crate::model::project::{Project, ProjectId};
use crate::model::user::UserId;
use crate::pipeline::OperationContext;
use crate::repo::{BoardRepository, ProjectRepository, UserRepository};

pub struct ProjectService<'a, 'conn> {
    ctx: &'a mut OperationContext<'conn>,
}

impl<'a, 'conn> ProjectService<'a, 'conn> {
    pub fn new(ctx: &'a mut OperationContext<'conn>) -> Self {
        Self { ctx }
    }

    /// Creates a project owned by the caller.
    pub fn create_project(&mut self, request: CreateProject) -> CoreResult<Project> {
        let caller_id = self.ctx.caller.require_user()?;
        self.require_profile(caller_id)?;

        let project = Project::create(
            request.name,
            request.description,
            request.visibility,
            caller_id,
        );
        self.ctx.uow.projects().add(project.clone())?;
        Ok(project)
    }

    pub fn update_project(&mut self, request: UpdateProject) -> CoreResult<Project> {
        let caller_id = self.ctx.caller.require_user()?;
        let mut project = self.load(request.project_id)?;
        require_project_role(&project, caller_id, PROJECT_MANAGERS)?;

        project.update_details(
            request.name,
            request.description,
            request.visibility,
            caller_id,
        )?;
        self.save(project)
    }

    pub fn change_project_status(&mut self, request: ChangeProjectStatus) -> CoreResult<Project> {
        let caller_id = self.ctx.caller.require_user()?;
        let mut project = self.load(request.project_id)?;
        require_project_role(&project, caller_id, PROJECT_MANAGERS)?;

        project.change_status(request.status, caller_id)?;
        self.save(project)
    }

    pub fn archive_project(&mut self, request: ArchiveProject) -> CoreResult<Project> {
        let caller_id = self.ctx.caller.require_user()?;
        let mut project = self.load(request.project_id)?;
        require_project_role(&project, caller_id, PROJECT_OWNERS)?;

        project.archive(caller_id)?;
        self.save(project)
    }

    pub fn restore_project(&mut self, request: RestoreProject) -> CoreResult<Project> {
        let caller_id = self.ctx.caller.require_user()?;
        let mut project = self.load(request.project_id)?;
        require_project_role(&project, caller_id, PROJECT_OWNERS)?;

        project.restore(caller_id)?;
        self.save(project)
    }

    pub fn add_member(&mut self, request: AddProjectMember) -> CoreResult<Project> {
        let caller_id = self.ctx.caller.require_user()?;
        let mut project = self.load(request.project_id)?;
        require_project_role(&project, caller_id, PROJECT_MANAGERS)?;
        self.require_profile(request.user_id)?;

        project.add_member(request.user_id, request.role, caller_id)?;
        self.save(project)
    }

    pub fn remove_member(&mut self, request: RemoveProjectMember) -> CoreResult<Project> {
        let caller_id = self.ctx.caller.require_user()?;
        let mut project = self.load(request.project_id)?;
        require_project_role(&project, caller_id, PROJECT_MANAGERS)?;

        if let Some(board) = self
            .ctx
            .uow
            .boards()
            .list_for_project(project.id())?
            .into_iter()
            .find(|board| board.is_member(request.user_id))
        {
            return Err(DomainError::StillBoardMember {
                user_id: request.user_id,
                board_id: board.id(),
            }
            .into());
        }

        project.remove_member(request.user_id, caller_id)?;
        self.save(project)
    }

    pub fn update_member_role(&mut self, request: UpdateProjectMemberRole) -> CoreResult<Project> {
        let caller_id = self.ctx.caller.require_user()?;
        let mut project = self.load(request.project_id)?;
        require_project_role(&project, caller_id, PROJECT_MANAGERS)?;

        project.update_member_role(request.user_id, request.role, caller_id)?;
        self.save(project)
    }

    pub fn get_project(&mut self, request: GetProject) -> CoreResult<Project> {
        let caller_id = self.ctx.caller.require_user()?;
        let project = self.load(request.project_id)?;
        require_project_role(&project, caller_id, PROJECT_READERS)?;
        Ok(project)
    }

    fn load(&mut self, project_id: ProjectId) -> CoreResult<Project> {
        found(
            self.ctx.uow.projects().get_by_id(project_id)?,
            "project",
            project_id,
        )
    }

    fn save(&mut self, project: Project) -> CoreResult<Project> {
        self.ctx.uow.projects().update(project.clone())?;
        Ok(project)
    }

    fn require_profile(&mut self, user_id: UserId) -> CoreResult<()> {
        found(self.ctx.uow.users().get_by_id(user_id)?, "user", user_id).map(|_| ())
    }
}
