//! Core domain logic for the taskboard.
//! This crate is the single source of truth for business invariants.

pub mod command;
pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod identity;
pub mod logging;
pub mod model;
pub mod pipeline;
pub mod repo;
pub mod service;
mod taskboard;

pub use config::{AccessPolicy, ConfigError, CoreConfig, DatabaseConfig, LoggingConfig};
pub use error::{CoreError, CoreResult};
pub use events::{
    DispatchReport, DispatcherError, EventDispatcher, EventHandler, EventHandlerError,
    LogNotificationSink, MembershipScope, NotificationError, NotificationHandler,
    NotificationResult, NotificationSink,
};
pub use identity::{CallerIdentity, IdentityProvider};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::event::{DomainEvent, EventKind};
pub use model::DomainError;
pub use pipeline::{CommandPipeline, Operation, OperationContext, Validate, ValidationErrors};
pub use repo::{RepoError, RepoResult, UnitOfWork};
pub use taskboard::{OpenError, TaskboardCore};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
