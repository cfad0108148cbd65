//! Project requests.

use super::{DESCRIPTION_MAX_LEN, NAME_MAX_LEN};
use crate::error::CoreResult;
use crate::model::membership::ProjectRole;
use crate::model::project::{Project, ProjectId, ProjectStatus, ProjectVisibility};
use crate::model::user::UserId;
use crate::pipeline::{Operation, OperationContext, Rules, Validate, ValidationErrors};
use crate::service::ProjectService;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateProject {
    pub name: String,
    pub description: Option<String>,
    pub visibility: ProjectVisibility,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpdateProject {
    pub project_id: ProjectId,
    pub name: String,
    pub description: Option<String>,
    pub visibility: ProjectVisibility,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ChangeProjectStatus {
    pub project_id: ProjectId,
    pub status: ProjectStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ArchiveProject {
    pub project_id: ProjectId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RestoreProject {
    pub project_id: ProjectId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct AddProjectMember {
    pub project_id: ProjectId,
    pub user_id: UserId,
    pub role: ProjectRole,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RemoveProjectMember {
    pub project_id: ProjectId,
    pub user_id: UserId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct UpdateProjectMemberRole {
    pub project_id: ProjectId,
    pub user_id: UserId,
    pub role: ProjectRole,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct GetProject {
    pub project_id: ProjectId,
}

fn project_details_rules(name: &str, description: Option<&str>) -> Rules {
    Rules::new()
        .not_blank("name", name)
        .max_len("name", name, NAME_MAX_LEN)
        .optional_max_len("description", description, DESCRIPTION_MAX_LEN)
}

impl Validate for CreateProject {
    fn validate(&self) -> Result<(), ValidationErrors> {
        project_details_rules(&self.name, self.description.as_deref()).finish()
    }
}

impl Operation for CreateProject {
    const NAME: &'static str = "create_project";
    const MUTATES: bool = true;
    type Output = Project;

    fn execute(self, ctx: &mut OperationContext<'_>) -> CoreResult<Project> {
        ProjectService::new(ctx).create_project(self)
    }
}

impl Validate for UpdateProject {
    fn validate(&self) -> Result<(), ValidationErrors> {
        project_details_rules(&self.name, self.description.as_deref()).finish()
    }
}

impl Operation for UpdateProject {
    const NAME: &'static str = "update_project";
    const MUTATES: bool = true;
    type Output = Project;

    fn execute(self, ctx: &mut OperationContext<'_>) -> CoreResult<Project> {
        ProjectService::new(ctx).update_project(self)
    }
}

impl Validate for ChangeProjectStatus {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Rules::new()
            .check(
                "status",
                self.status != ProjectStatus::Archived,
                "use archive_project to archive",
            )
            .finish()
    }
}

impl Operation for ChangeProjectStatus {
    const NAME: &'static str = "change_project_status";
    const MUTATES: bool = true;
    type Output = Project;

    fn execute(self, ctx: &mut OperationContext<'_>) -> CoreResult<Project> {
        ProjectService::new(ctx).change_project_status(self)
    }
}

impl Validate for ArchiveProject {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Ok(())
    }
}

impl Operation for ArchiveProject {
    const NAME: &'static str = "archive_project";
    const MUTATES: bool = true;
    type Output = Project;

    fn execute(self, ctx: &mut OperationContext<'_>) -> CoreResult<Project> {
        ProjectService::new(ctx).archive_project(self)
    }
}

impl Validate for RestoreProject {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Ok(())
    }
}

impl Operation for RestoreProject {
    const NAME: &'static str = "restore_project";
    const MUTATES: bool = true;
    type Output = Project;

    fn execute(self, ctx: &mut OperationContext<'_>) -> CoreResult<Project> {
        ProjectService::new(ctx).restore_project(self)
    }
}

impl Validate for AddProjectMember {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Rules::new()
            .check(
                "role",
                self.role != ProjectRole::Owner,
                "owner role cannot be granted",
            )
            .finish()
    }
}

impl Operation for AddProjectMember {
    const NAME: &'static str = "add_project_member";
    const MUTATES: bool = true;
    type Output = Project;

    fn execute(self, ctx: &mut OperationContext<'_>) -> CoreResult<Project> {
        ProjectService::new(ctx).add_member(self)
    }
}

impl Validate for RemoveProjectMember {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Ok(())
    }
}

impl Operation for RemoveProjectMember {
    const NAME: &'static str = "remove_project_member";
    const MUTATES: bool = true;
    type Output = Project;

    fn execute(self, ctx: &mut OperationContext<'_>) -> CoreResult<Project> {
        ProjectService::new(ctx).remove_member(self)
    }
}

impl Validate for UpdateProjectMemberRole {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Rules::new()
            .check(
                "role",
                self.role != ProjectRole::Owner,
                "owner role cannot be granted",
            )
            .finish()
    }
}

impl Operation for UpdateProjectMemberRole {
    const NAME: &'static str = "update_project_member_role";
    const MUTATES: bool = true;
    type Output = Project;

    fn execute(self, ctx: &mut OperationContext<'_>) -> CoreResult<Project> {
        ProjectService::new(ctx).update_member_role(self)
    }
}

impl Validate for GetProject {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Ok(())
    }
}

impl Operation for GetProject {
    const NAME: &'static str = "get_project";
    const MUTATES: bool = false;
    type Output = Project;

    fn execute(self, ctx: &mut OperationContext<'_>) -> CoreResult<Project> {
        ProjectService::new(ctx).get_project(self)
    }
}
