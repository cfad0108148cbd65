mod common;

use common::{Fixture, RecordingHandler};
use std::sync::Arc;
use taskboard_core::command::{MoveTask, UpdateTask};
use taskboard_core::model::comment::Comment;
use taskboard_core::model::task::{BoardTask, TaskDetails, TaskPriority};
use taskboard_core::repo::{CommentRepository, TaskRepository};
use taskboard_core::{
    CoreConfig, CoreError, DomainEvent, EventDispatcher, EventHandler, EventHandlerError,
    EventKind, UnitOfWork,
};

struct FailingHandler;

impl EventHandler for FailingHandler {
    fn name(&self) -> &str {
        "failing"
    }

    fn handle(&self, _event: &DomainEvent) -> Result<(), EventHandlerError> {
        Err(EventHandlerError::new("downstream unavailable"))
    }
}

fn details(title: &str) -> TaskDetails {
    TaskDetails {
        title: title.to_string(),
        description: None,
        priority: TaskPriority::Low,
        due_date: None,
    }
}

#[test]
fn failed_commit_dispatches_nothing() {
    let fixture = Fixture::new();
    let task = fixture.task(fixture.todo.id(), "Doomed move");
    fixture.handler.clear();
    fixture.sink.clear();
    fixture.sql(
        "CREATE TRIGGER fail_task_update BEFORE UPDATE ON tasks
         BEGIN
             SELECT RAISE(ABORT, 'simulated write failure');
         END;",
    );

    let err = fixture
        .core
        .execute(
            &fixture.owner,
            MoveTask {
                task_id: task.id(),
                to_column_id: fixture.doing.id(),
                position: None,
            },
        )
        .unwrap_err();

    assert!(matches!(err, CoreError::Unexpected { .. }));
    assert!(!err.to_string().contains("simulated"));
    assert!(fixture.handler.events().is_empty());
    assert!(fixture.sink.calls().is_empty());
    assert_eq!(fixture.stored_task_column(&task), fixture.todo.id().to_string());
}

#[test]
fn failed_commit_rolls_back_earlier_writes() {
    let fixture = Fixture::new();
    let task = fixture.task(fixture.todo.id(), "Half written");
    fixture.sql(
        "CREATE TRIGGER fail_comment_insert BEFORE INSERT ON comments
         BEGIN
             SELECT RAISE(ABORT, 'simulated write failure');
         END;",
    );
    fixture.handler.clear();

    let owner_id = fixture.owner.user_id.unwrap();
    let dispatcher = Arc::new(EventDispatcher::new());
    let mut uow = UnitOfWork::new(fixture.core.connection(), dispatcher);
    let mut loaded = uow.tasks().get_by_id(task.id()).unwrap().unwrap();
    loaded.update_details(details("Renamed"), owner_id).unwrap();
    uow.tasks().update(loaded).unwrap();
    uow.comments()
        .add(Comment::create(task.id(), owner_id, "never stored"))
        .unwrap();

    assert!(uow.complete().is_err());
    let title: String = fixture
        .core
        .connection()
        .query_row(
            "SELECT title FROM tasks WHERE id = ?1;",
            [task.id().to_string()],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(title, "Half written");
}

#[test]
fn events_are_dispatched_per_aggregate_in_recording_order() {
    let fixture = Fixture::new();
    let owner_id = fixture.owner.user_id.unwrap();
    let recorder = Arc::new(RecordingHandler::default());
    let mut dispatcher = EventDispatcher::new();
    dispatcher.subscribe_all(recorder.clone()).unwrap();

    let mut uow = UnitOfWork::new(fixture.core.connection(), Arc::new(dispatcher));
    let mut task = BoardTask::create(fixture.todo.id(), details("Draft"), 0, owner_id);
    task.update_details(details("Final"), owner_id).unwrap();
    task.move_to_column(fixture.doing.id(), 0, owner_id).unwrap();
    let comment = Comment::create(task.id(), owner_id, "looks good");
    uow.comments().add(comment.clone()).unwrap();
    uow.tasks().add(task.clone()).unwrap();

    assert_eq!(uow.pending_changes(), 2);
    assert_eq!(uow.complete().unwrap(), 2);
    assert_eq!(uow.pending_changes(), 0);

    let kinds: Vec<EventKind> = recorder.events().iter().map(DomainEvent::kind).collect();
    assert_eq!(
        kinds,
        vec![
            EventKind::TaskCreated,
            EventKind::TaskUpdated,
            EventKind::TaskMoved,
            EventKind::CommentAdded,
        ]
    );
    assert_eq!(task.pending_events().len(), 3);
    assert!(fixture.handler.events().is_empty());

    // A second completion has nothing left to persist or dispatch.
    assert_eq!(uow.complete().unwrap(), 0);
    assert_eq!(recorder.events().len(), 4);
}

#[test]
fn failing_handler_does_not_block_other_handlers_or_the_commit() {
    let mut dispatcher = EventDispatcher::new();
    dispatcher.subscribe_all(Arc::new(FailingHandler)).unwrap();
    let fixture = Fixture::with_dispatcher(CoreConfig::default(), dispatcher);
    let task = fixture.task(fixture.todo.id(), "Resilient");
    fixture.handler.clear();

    let updated = fixture
        .core
        .execute(
            &fixture.owner,
            UpdateTask {
                task_id: task.id(),
                title: "Still resilient".to_string(),
                description: Some("handlers may fail".to_string()),
                priority: TaskPriority::Critical,
                due_date: None,
            },
        )
        .unwrap();

    assert_eq!(updated.title(), "Still resilient");
    let kinds: Vec<EventKind> = fixture
        .handler
        .events()
        .iter()
        .map(DomainEvent::kind)
        .collect();
    assert_eq!(kinds, vec![EventKind::TaskUpdated]);
}

#[test]
fn rejected_operation_dispatches_nothing() {
    let fixture = Fixture::new();
    let task = fixture.task(fixture.todo.id(), "Untouched");
    fixture.handler.clear();

    let err = fixture
        .core
        .execute(
            &fixture.owner,
            UpdateTask {
                task_id: task.id(),
                title: "   ".to_string(),
                description: None,
                priority: TaskPriority::Low,
                due_date: None,
            },
        )
        .unwrap_err();

    assert!(matches!(err, CoreError::Validation(_)));
    assert!(fixture.handler.events().is_empty());
}
