//! User profile use cases.
//!
//! # Invariants
//! - A profile id always equals the identity-provider user id.
//! - Emails are unique after normalization.

use super::found;
use crate::command::{GetUser, ProvisionUser, UpdateProfile};
use crate::error::CoreResult;
use crate::model::user::User;
use crate::model::DomainError;
use crate::pipeline::OperationContext;
use crate::repo::UserRepository;

pub struct UserService<'a, 'conn> {
    ctx: &'a mut OperationContext<'conn>,
}

impl<'a, 'conn> UserService<'a, 'conn> {
    pub fn new(ctx: &'a mut OperationContext<'conn>) -> Self {
        Self { ctx }
    }

    /// Registers the caller's profile.
    pub fn provision_user(&mut self, request: ProvisionUser) -> CoreResult<User> {
        let caller_id = self.ctx.caller.require_user()?;
        let mut users = self.ctx.uow.users();
        if users.get_by_id(caller_id)?.is_some() {
            return Err(DomainError::UserAlreadyProvisioned(caller_id).into());
        }
        if users.find_by_email(&request.email)?.is_some() {
            return Err(DomainError::EmailInUse.into());
        }

        let user = User::register(caller_id, &request.email, request.display_name);
        users.add(user.clone())?;
        Ok(user)
    }

    /// Updates the caller's own display name.
    pub fn update_profile(&mut self, request: UpdateProfile) -> CoreResult<User> {
        let caller_id = self.ctx.caller.require_user()?;
        let mut users = self.ctx.uow.users();
        let mut user = found(users.get_by_id(caller_id)?, "user", caller_id)?;

        user.update_profile(request.display_name);
        users.update(user.clone())?;
        Ok(user)
    }

    pub fn get_user(&mut self, request: GetUser) -> CoreResult<User> {
        self.ctx.caller.require_user()?;
        found(
            self.ctx.uow.users().get_by_id(request.user_id)?,
            "user",
            request.user_id,
        )
    }
}
