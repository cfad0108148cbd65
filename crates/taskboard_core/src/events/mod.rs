//! Post-commit event delivery.
//!
//! # Responsibility
//! - Route committed domain events to registered handlers.
//! - Translate events into notification sink calls.
//!
//! # Invariants
//! - Only the unit of work calls `EventDispatcher::dispatch`, and only after
//!   its transaction committed.
//! - A failing handler never prevents delivery to the remaining handlers.

pub mod dispatcher;
pub mod notification;

pub use dispatcher::{
    DispatchReport, DispatcherError, EventDispatcher, EventHandler, EventHandlerError,
};
pub use notification::{
    LogNotificationSink, MembershipScope, NotificationError, NotificationHandler,
    NotificationResult, NotificationSink,
};
