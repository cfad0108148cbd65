//! User profile requests.

use super::{EMAIL_MAX_LEN, NAME_MAX_LEN};
use crate::error::CoreResult;
use crate::model::user::{User, UserId};
use crate::pipeline::{Operation, OperationContext, Rules, Validate, ValidationErrors};
use crate::service::UserService;
use serde::Deserialize;

/// Creates the profile of the calling identity.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProvisionUser {
    pub email: String,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpdateProfile {
    pub display_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct GetUser {
    pub user_id: UserId,
}

impl Validate for ProvisionUser {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Rules::new()
            .not_blank("email", &self.email)
            .max_len("email", &self.email, EMAIL_MAX_LEN)
            .email("email", &self.email)
            .not_blank("display_name", &self.display_name)
            .max_len("display_name", &self.display_name, NAME_MAX_LEN)
            .finish()
    }
}

impl Operation for ProvisionUser {
    const NAME: &'static str = "provision_user";
    const MUTATES: bool = true;
    type Output = User;

    fn execute(self, ctx: &mut OperationContext<'_>) -> CoreResult<User> {
        UserService::new(ctx).provision_user(self)
    }
}

impl Validate for UpdateProfile {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Rules::new()
            .not_blank("display_name", &self.display_name)
            .max_len("display_name", &self.display_name, NAME_MAX_LEN)
            .finish()
    }
}

impl Operation for UpdateProfile {
    const NAME: &'static str = "update_profile";
    const MUTATES: bool = true;
    type Output = User;

    fn execute(self, ctx: &mut OperationContext<'_>) -> CoreResult<User> {
        UserService::new(ctx).update_profile(self)
    }
}

impl Validate for GetUser {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Ok(())
    }
}

impl Operation for GetUser {
    const NAME: &'static str = "get_user";
    const MUTATES: bool = false;
    type Output = User;

    fn execute(self, ctx: &mut OperationContext<'_>) -> CoreResult<User> {
        UserService::new(ctx).get_user(self)
    }
}
