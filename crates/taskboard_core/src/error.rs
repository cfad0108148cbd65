//! Error kinds surfaced by the core to its callers.
//!
//! # Invariants
//! - Domain services and aggregates never swallow a failure; every error
//!   reaches the command pipeline unchanged.
//! - `Unexpected` never renders internal details; they are logged with the
//!   correlation id instead.

use crate::model::DomainError;
use crate::pipeline::validation::ValidationErrors;
use crate::repo::RepoError;
use log::error;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Debug)]
pub enum CoreError {
    /// No valid caller identity.
    Unauthenticated,
    /// Authenticated caller lacks the membership or role required.
    AccessDenied {
        entity: &'static str,
        id: Uuid,
    },
    /// Referenced aggregate does not exist.
    NotFound {
        entity: &'static str,
        id: Uuid,
    },
    /// Inbound request shape violates declared rules.
    Validation(ValidationErrors),
    /// Aggregate invariant rejected the transition.
    BusinessRuleViolation(DomainError),
    /// Aggregate changed since it was loaded by this unit of work.
    Conflict {
        entity: &'static str,
        id: Uuid,
    },
    /// Anything else; details are only in the log line for `correlation_id`.
    Unexpected {
        correlation_id: Uuid,
        source: Box<dyn Error + Send + Sync>,
    },
}

impl CoreError {
    /// Wraps an internal failure, logging it under a fresh correlation id.
    pub fn unexpected(source: impl Into<Box<dyn Error + Send + Sync>>) -> Self {
        let source = source.into();
        let correlation_id = Uuid::new_v4();
        error!(
            "event=unexpected_error module=core status=error correlation_id={} error={}",
            correlation_id, source
        );
        Self::Unexpected {
            correlation_id,
            source,
        }
    }

    /// Stable error code used in log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::AccessDenied { .. } => "access_denied",
            Self::NotFound { .. } => "not_found",
            Self::Validation(_) => "validation",
            Self::BusinessRuleViolation(_) => "business_rule_violation",
            Self::Conflict { .. } => "conflict",
            Self::Unexpected { .. } => "unexpected",
        }
    }
}

impl Display for CoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthenticated => write!(f, "caller is not authenticated"),
            Self::AccessDenied { entity, id } => write!(f, "access denied to {entity} {id}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::Validation(errors) => write!(f, "{errors}"),
            Self::BusinessRuleViolation(err) => write!(f, "{err}"),
            Self::Conflict { entity, id } => {
                write!(f, "{entity} {id} was modified concurrently; reload and retry")
            }
            Self::Unexpected { correlation_id, .. } => {
                write!(f, "unexpected failure (correlation_id={correlation_id})")
            }
        }
    }
}

impl Error for CoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(errors) => Some(errors),
            Self::BusinessRuleViolation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DomainError> for CoreError {
    fn from(value: DomainError) -> Self {
        Self::BusinessRuleViolation(value)
    }
}

impl From<ValidationErrors> for CoreError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for CoreError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { entity, id } => Self::NotFound { entity, id },
            RepoError::Conflict { entity, id, .. } => Self::Conflict { entity, id },
            other => Self::unexpected(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::CoreError;
    use crate::db::DbError;
    use crate::repo::RepoError;
    use uuid::Uuid;

    #[test]
    fn unexpected_display_hides_internal_details() {
        let err = CoreError::from(RepoError::InvalidData(
            "tasks.priority holds `urgent`".to_string(),
        ));
        let rendered = err.to_string();
        assert!(rendered.contains("correlation_id="));
        assert!(!rendered.contains("urgent"));
        assert_eq!(err.code(), "unexpected");
    }

    #[test]
    fn repository_not_found_and_conflict_keep_their_kind() {
        let id = Uuid::new_v4();
        let err = CoreError::from(RepoError::NotFound { entity: "task", id });
        assert!(matches!(err, CoreError::NotFound { entity: "task", id: found } if found == id));

        let err = CoreError::from(RepoError::Conflict {
            entity: "task",
            id,
            expected_version: 3,
        });
        assert!(matches!(err, CoreError::Conflict { .. }));

        let err = CoreError::from(RepoError::Db(DbError::Sqlite(
            rusqlite::Error::InvalidQuery,
        )));
        assert!(matches!(err, CoreError::Unexpected { .. }));
    }
}
