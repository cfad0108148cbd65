//! Core entry point owning the connection, policy and dispatcher.
//!
//! # Invariants
//! - Each `execute` call runs in a fresh unit of work.
//! - Aggregate instances never outlive the call that loaded them.

use crate::config::{AccessPolicy, ConfigError, CoreConfig};
use crate::db::{open_db_with, DbError};
use crate::error::CoreResult;
use crate::events::EventDispatcher;
use crate::identity::IdentityProvider;
use crate::logging::{init_logging_from, LoggingError};
use crate::pipeline::{CommandPipeline, Operation, OperationContext};
use crate::repo::UnitOfWork;
use log::info;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Failure while bringing the core up.
#[derive(Debug)]
pub enum OpenError {
    Config(ConfigError),
    Logging(LoggingError),
    Db(DbError),
}

impl Display for OpenError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Logging(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for OpenError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Logging(err) => Some(err),
            Self::Db(err) => Some(err),
        }
    }
}

impl From<ConfigError> for OpenError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<LoggingError> for OpenError {
    fn from(value: LoggingError) -> Self {
        Self::Logging(value)
    }
}

impl From<DbError> for OpenError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

/// Opened taskboard core.
pub struct TaskboardCore {
    conn: Connection,
    policy: AccessPolicy,
    dispatcher: Arc<EventDispatcher>,
    pipeline: CommandPipeline,
}

impl TaskboardCore {
    /// Initializes logging (when configured), opens storage and applies
    /// migrations.
    pub fn open(config: CoreConfig, dispatcher: EventDispatcher) -> Result<Self, OpenError> {
        config.validate()?;
        init_logging_from(&config.logging)?;
        let conn = open_db_with(&config.database)?;
        info!(
            "event=core_open module=core status=ok handlers={} enforce_wip_limits={} column_create_roles={}",
            dispatcher.len(),
            config.access.enforce_wip_limits,
            config
                .access
                .column_create_roles
                .iter()
                .map(|role| role.as_str())
                .collect::<Vec<_>>()
                .join(",")
        );
        Ok(Self {
            conn,
            policy: config.access,
            dispatcher: Arc::new(dispatcher),
            pipeline: CommandPipeline,
        })
    }

    /// Runs one operation on behalf of `caller`.
    pub fn execute<O: Operation>(
        &self,
        caller: &impl IdentityProvider,
        operation: O,
    ) -> CoreResult<O::Output> {
        let uow = UnitOfWork::new(&self.conn, Arc::clone(&self.dispatcher));
        let mut ctx = OperationContext::new(uow, caller.current_identity(), &self.policy);
        self.pipeline.execute(&mut ctx, operation)
    }

    pub fn policy(&self) -> &AccessPolicy {
        &self.policy
    }

    /// Underlying connection, for host-side diagnostics.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}
