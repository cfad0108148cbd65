//! Caller identity supplied by the external authentication provider.
//!
//! # Invariants
//! - An identity without a user id, or not authenticated, never reaches an
//!   aggregate: `require_user` fails first.

use crate::error::{CoreError, CoreResult};
use crate::model::user::UserId;

/// Identity claims of the current caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallerIdentity {
    pub user_id: Option<UserId>,
    pub is_authenticated: bool,
}

impl CallerIdentity {
    /// Authenticated caller with a user id.
    pub fn authenticated(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
            is_authenticated: true,
        }
    }

    /// Caller without any valid identity.
    pub fn anonymous() -> Self {
        Self {
            user_id: None,
            is_authenticated: false,
        }
    }

    /// Returns the caller's user id or fails with `Unauthenticated`.
    pub fn require_user(&self) -> CoreResult<UserId> {
        match (self.is_authenticated, self.user_id) {
            (true, Some(user_id)) => Ok(user_id),
            _ => Err(CoreError::Unauthenticated),
        }
    }
}

/// Source of caller identity, implemented by the host's auth layer.
pub trait IdentityProvider {
    fn current_identity(&self) -> CallerIdentity;
}

impl IdentityProvider for CallerIdentity {
    fn current_identity(&self) -> CallerIdentity {
        *self
    }
}

#[cfg(test)]
mod tests {
    use super::CallerIdentity;
    use crate::error::CoreError;
    use uuid::Uuid;

    #[test]
    fn require_user_rejects_missing_or_unauthenticated_identity() {
        assert!(matches!(
            CallerIdentity::anonymous().require_user(),
            Err(CoreError::Unauthenticated)
        ));

        let unauthenticated = CallerIdentity {
            user_id: Some(Uuid::new_v4()),
            is_authenticated: false,
        };
        assert!(matches!(
            unauthenticated.require_user(),
            Err(CoreError::Unauthenticated)
        ));

        let authenticated_without_id = CallerIdentity {
            user_id: None,
            is_authenticated: true,
        };
        assert!(matches!(
            authenticated_without_id.require_user(),
            Err(CoreError::Unauthenticated)
        ));

        let user_id = Uuid::new_v4();
        assert_eq!(
            CallerIdentity::authenticated(user_id).require_user().unwrap(),
            user_id
        );
    }
}
