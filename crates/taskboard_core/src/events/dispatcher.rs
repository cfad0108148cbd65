//! Handler registry and dispatch loop.

use crate::model::event::{DomainEvent, EventKind};
use log::{debug, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Consumer of committed domain events.
pub trait EventHandler: Send + Sync {
    /// Stable handler name used for registration and log lines.
    fn name(&self) -> &str;
    fn handle(&self, event: &DomainEvent) -> Result<(), EventHandlerError>;
}

/// Failure reported by one handler for one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventHandlerError {
    message: String,
}

impl EventHandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for EventHandlerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for EventHandlerError {}

/// Registration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatcherError {
    EmptyHandlerName,
    DuplicateHandler {
        name: String,
        kind: Option<EventKind>,
    },
}

impl Display for DispatcherError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyHandlerName => write!(f, "event handler name must not be empty"),
            Self::DuplicateHandler { name, kind } => match kind {
                Some(kind) => write!(
                    f,
                    "handler `{name}` already subscribed to {}",
                    kind.as_str()
                ),
                None => write!(f, "handler `{name}` already subscribed to all events"),
            },
        }
    }
}

impl Error for DispatcherError {}

/// Outcome counters of one `dispatch` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub events: usize,
    pub deliveries: usize,
    pub failures: usize,
}

struct Subscription {
    /// `None` receives every event kind.
    kind: Option<EventKind>,
    handler: Arc<dyn EventHandler>,
}

/// In-process registry of event handlers.
///
/// Handlers run synchronously in registration order for each event.
#[derive(Default)]
pub struct EventDispatcher {
    subscriptions: Vec<Subscription>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes `handler` to one event kind.
    pub fn subscribe(
        &mut self,
        kind: EventKind,
        handler: Arc<dyn EventHandler>,
    ) -> Result<(), DispatcherError> {
        self.register(Some(kind), handler)
    }

    /// Subscribes `handler` to every event kind.
    pub fn subscribe_all(&mut self, handler: Arc<dyn EventHandler>) -> Result<(), DispatcherError> {
        self.register(None, handler)
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Delivers `events` in order to every matching handler.
    pub fn dispatch(&self, events: &[DomainEvent]) -> DispatchReport {
        let mut report = DispatchReport {
            events: events.len(),
            ..DispatchReport::default()
        };

        for event in events {
            let kind = event.kind();
            for subscription in self
                .subscriptions
                .iter()
                .filter(|subscription| subscription.kind.map_or(true, |wanted| wanted == kind))
            {
                report.deliveries += 1;
                match subscription.handler.handle(event) {
                    Ok(()) => debug!(
                        "event=event_dispatch module=events status=ok handler={} kind={} aggregate_id={}",
                        subscription.handler.name(),
                        kind.as_str(),
                        event.aggregate_id()
                    ),
                    Err(err) => {
                        report.failures += 1;
                        warn!(
                            "event=event_dispatch module=events status=error handler={} kind={} aggregate_id={} error={}",
                            subscription.handler.name(),
                            kind.as_str(),
                            event.aggregate_id(),
                            err
                        );
                    }
                }
            }
        }

        report
    }

    fn register(
        &mut self,
        kind: Option<EventKind>,
        handler: Arc<dyn EventHandler>,
    ) -> Result<(), DispatcherError> {
        let name = handler.name().trim();
        if name.is_empty() {
            return Err(DispatcherError::EmptyHandlerName);
        }
        if self
            .subscriptions
            .iter()
            .any(|existing| existing.kind == kind && existing.handler.name() == name)
        {
            return Err(DispatcherError::DuplicateHandler {
                name: name.to_string(),
                kind,
            });
        }
        self.subscriptions.push(Subscription { kind, handler });
        Ok(())
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(
                self.subscriptions
                    .iter()
                    .map(|subscription| (subscription.handler.name(), subscription.kind)),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{DispatcherError, EventDispatcher, EventHandler, EventHandlerError};
    use crate::model::event::{DomainEvent, EventKind};
    use std::sync::{Arc, Mutex};
    use uuid::Uuid;

    struct Recorder {
        name: &'static str,
        seen: Mutex<Vec<EventKind>>,
        fail: bool,
    }

    impl Recorder {
        fn new(name: &'static str, fail: bool) -> Arc<Self> {
            Arc::new(Self {
                name,
                seen: Mutex::new(Vec::new()),
                fail,
            })
        }
    }

    impl EventHandler for Recorder {
        fn name(&self) -> &str {
            self.name
        }

        fn handle(&self, event: &DomainEvent) -> Result<(), EventHandlerError> {
            self.seen.lock().unwrap().push(event.kind());
            if self.fail {
                return Err(EventHandlerError::new("recorder configured to fail"));
            }
            Ok(())
        }
    }

    fn archived_and_restored() -> Vec<DomainEvent> {
        let task_id = Uuid::new_v4();
        let actor_id = Uuid::new_v4();
        vec![
            DomainEvent::TaskArchived { task_id, actor_id },
            DomainEvent::TaskRestored { task_id, actor_id },
        ]
    }

    #[test]
    fn kind_subscription_only_sees_its_kind() {
        let recorder = Recorder::new("archive-watch", false);
        let mut dispatcher = EventDispatcher::new();
        dispatcher
            .subscribe(EventKind::TaskArchived, recorder.clone())
            .unwrap();

        let report = dispatcher.dispatch(&archived_and_restored());
        assert_eq!(report.events, 2);
        assert_eq!(report.deliveries, 1);
        assert_eq!(*recorder.seen.lock().unwrap(), vec![EventKind::TaskArchived]);
    }

    #[test]
    fn failing_handler_does_not_stop_later_handlers() {
        let failing = Recorder::new("failing", true);
        let healthy = Recorder::new("healthy", false);
        let mut dispatcher = EventDispatcher::new();
        dispatcher.subscribe_all(failing.clone()).unwrap();
        dispatcher.subscribe_all(healthy.clone()).unwrap();

        let report = dispatcher.dispatch(&archived_and_restored());
        assert_eq!(report.deliveries, 4);
        assert_eq!(report.failures, 2);
        assert_eq!(
            *healthy.seen.lock().unwrap(),
            vec![EventKind::TaskArchived, EventKind::TaskRestored]
        );
    }

    #[test]
    fn rejects_duplicate_and_unnamed_handlers() {
        let mut dispatcher = EventDispatcher::new();
        dispatcher
            .subscribe(EventKind::TaskMoved, Recorder::new("audit", false))
            .unwrap();
        let err = dispatcher
            .subscribe(EventKind::TaskMoved, Recorder::new("audit", false))
            .unwrap_err();
        assert!(matches!(err, DispatcherError::DuplicateHandler { .. }));

        dispatcher
            .subscribe(EventKind::TaskCreated, Recorder::new("audit", false))
            .expect("same name on another kind is allowed");

        let err = dispatcher
            .subscribe_all(Recorder::new("  ", false))
            .unwrap_err();
        assert_eq!(err, DispatcherError::EmptyHandlerName);
        assert_eq!(dispatcher.len(), 2);
    }
}
