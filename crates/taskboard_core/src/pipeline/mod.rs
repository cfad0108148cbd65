//! Command pipeline: validation, execution and the single commit.
//!
//! # Responsibility
//! - Reject malformed requests before any service runs.
//! - Complete the unit of work exactly once for mutating operations.
//!
//! # Invariants
//! - A failed validation never reaches `Operation::execute`.
//! - Operations with `MUTATES = false` never commit.
//! - Errors propagate unchanged; nothing is retried.

pub mod validation;

use crate::config::AccessPolicy;
use crate::error::{CoreError, CoreResult};
use crate::identity::CallerIdentity;
use crate::repo::UnitOfWork;
use log::{info, warn};
use std::time::Instant;

pub use validation::{Rules, ValidationErrors};

/// Request shape check run before execution.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationErrors>;
}

/// One command or query the core can execute.
pub trait Operation: Validate {
    /// Stable operation name used in log lines.
    const NAME: &'static str;
    /// Whether a successful execution commits the unit of work.
    const MUTATES: bool;

    type Output;

    fn execute(self, ctx: &mut OperationContext<'_>) -> CoreResult<Self::Output>;
}

/// Per-operation state handed to services.
pub struct OperationContext<'conn> {
    pub uow: UnitOfWork<'conn>,
    pub caller: CallerIdentity,
    pub policy: &'conn AccessPolicy,
}

impl<'conn> OperationContext<'conn> {
    pub fn new(uow: UnitOfWork<'conn>, caller: CallerIdentity, policy: &'conn AccessPolicy) -> Self {
        Self {
            uow,
            caller,
            policy,
        }
    }
}

/// Runs operations through validate -> execute -> commit.
#[derive(Debug, Default, Clone, Copy)]
pub struct CommandPipeline;

impl CommandPipeline {
    pub fn execute<O: Operation>(
        &self,
        ctx: &mut OperationContext<'_>,
        operation: O,
    ) -> CoreResult<O::Output> {
        let started_at = Instant::now();
        let result = Self::run(ctx, operation);
        let duration_ms = started_at.elapsed().as_millis();
        match &result {
            Ok(_) => info!(
                "event=command_execute module=pipeline status=ok operation={} mutates={} duration_ms={}",
                O::NAME,
                O::MUTATES,
                duration_ms
            ),
            Err(err) => warn!(
                "event=command_execute module=pipeline status=error operation={} mutates={} duration_ms={} error_code={}",
                O::NAME,
                O::MUTATES,
                duration_ms,
                err.code()
            ),
        }
        result
    }

    fn run<O: Operation>(ctx: &mut OperationContext<'_>, operation: O) -> CoreResult<O::Output> {
        operation.validate().map_err(CoreError::Validation)?;
        let output = operation.execute(ctx)?;
        if O::MUTATES {
            ctx.uow.complete()?;
        }
        Ok(output)
    }
}
