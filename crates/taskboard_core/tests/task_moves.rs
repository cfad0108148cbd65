mod common;

use common::{create_column, Fixture};
use taskboard_core::command::{
    ArchiveTask, AssignTask, CreateBoard, GetTask, ListColumnTasks, MoveTask, RestoreTask,
};
use taskboard_core::model::membership::BoardRole;
use taskboard_core::{AccessPolicy, CoreConfig, CoreError, DomainError, DomainEvent};

#[test]
fn move_task_appends_to_destination_and_notifies_once() {
    let fixture = Fixture::new();
    let existing = fixture.task(fixture.doing.id(), "Already doing");
    let task = fixture.task(fixture.todo.id(), "Pick me up");
    fixture.handler.clear();
    fixture.sink.clear();

    let moved = fixture
        .core
        .execute(
            &fixture.owner,
            MoveTask {
                task_id: task.id(),
                to_column_id: fixture.doing.id(),
                position: None,
            },
        )
        .unwrap();

    assert_eq!(moved.column_id(), fixture.doing.id());
    assert_eq!(moved.position(), existing.position() + 1);
    assert_eq!(fixture.stored_task_column(&task), fixture.doing.id().to_string());
    assert_eq!(fixture.sink.calls(), vec![format!("task_moved:{}", task.id())]);
    match fixture.handler.events().as_slice() {
        [DomainEvent::TaskMoved {
            from_column_id,
            to_column_id,
            ..
        }] => {
            assert_eq!(*from_column_id, fixture.todo.id());
            assert_eq!(*to_column_id, fixture.doing.id());
        }
        other => panic!("unexpected events: {other:?}"),
    }
}

#[test]
fn explicit_position_is_kept() {
    let fixture = Fixture::new();
    let task = fixture.task(fixture.todo.id(), "Reorder me");

    let moved = fixture
        .core
        .execute(
            &fixture.owner,
            MoveTask {
                task_id: task.id(),
                to_column_id: fixture.todo.id(),
                position: Some(7),
            },
        )
        .unwrap();
    assert_eq!(moved.column_id(), fixture.todo.id());
    assert_eq!(moved.position(), 7);
}

#[test]
fn cross_board_move_is_rejected_and_task_stays_put() {
    let fixture = Fixture::new();
    let other_board = fixture
        .core
        .execute(
            &fixture.owner,
            CreateBoard {
                project_id: fixture.project.id(),
                name: "Ops".to_string(),
                description: None,
            },
        )
        .unwrap();
    let foreign = create_column(
        &fixture.core,
        &fixture.owner,
        other_board.id(),
        "Inbox",
        0,
        None,
    );
    let task = fixture.task(fixture.todo.id(), "Stay here");
    fixture.handler.clear();

    let err = fixture
        .core
        .execute(
            &fixture.owner,
            MoveTask {
                task_id: task.id(),
                to_column_id: foreign.id(),
                position: None,
            },
        )
        .unwrap_err();

    match err {
        CoreError::BusinessRuleViolation(DomainError::CrossBoardMove {
            from_board,
            to_board,
        }) => {
            assert_eq!(from_board, fixture.board.id());
            assert_eq!(to_board, other_board.id());
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(fixture.stored_task_column(&task), fixture.todo.id().to_string());
    assert!(fixture.handler.events().is_empty());
}

#[test]
fn cross_board_check_runs_before_authorization() {
    let fixture = Fixture::new();
    let other_board = fixture
        .core
        .execute(
            &fixture.owner,
            CreateBoard {
                project_id: fixture.project.id(),
                name: "Ops".to_string(),
                description: None,
            },
        )
        .unwrap();
    let foreign = create_column(
        &fixture.core,
        &fixture.owner,
        other_board.id(),
        "Inbox",
        0,
        None,
    );
    let viewer = fixture.member("viewer@example.com", BoardRole::Viewer);
    let task = fixture.task(fixture.todo.id(), "Guarded");

    let err = fixture
        .core
        .execute(
            &viewer,
            MoveTask {
                task_id: task.id(),
                to_column_id: foreign.id(),
                position: None,
            },
        )
        .unwrap_err();
    assert!(matches!(
        err,
        CoreError::BusinessRuleViolation(DomainError::CrossBoardMove { .. })
    ));
}

#[test]
fn wip_limit_blocks_create_and_move_into_full_column() {
    let fixture = Fixture::new();
    let review = fixture.column("Review", 2, Some(1));
    fixture.task(review.id(), "Occupies the slot");
    let waiting = fixture.task(fixture.todo.id(), "Waiting");

    let err = fixture
        .core
        .execute(
            &fixture.owner,
            MoveTask {
                task_id: waiting.id(),
                to_column_id: review.id(),
                position: None,
            },
        )
        .unwrap_err();
    assert!(matches!(
        err,
        CoreError::BusinessRuleViolation(DomainError::WipLimitReached { limit: 1, .. })
    ));
    assert_eq!(fixture.stored_task_column(&waiting), fixture.todo.id().to_string());

    let err = fixture
        .core
        .execute(
            &fixture.owner,
            taskboard_core::command::CreateTask {
                column_id: review.id(),
                title: "One too many".to_string(),
                description: None,
                priority: taskboard_core::model::task::TaskPriority::Low,
                due_date: None,
            },
        )
        .unwrap_err();
    assert!(matches!(
        err,
        CoreError::BusinessRuleViolation(DomainError::WipLimitReached { .. })
    ));
}

#[test]
fn reordering_inside_full_column_is_allowed() {
    let fixture = Fixture::new();
    let review = fixture.column("Review", 2, Some(1));
    let task = fixture.task(review.id(), "Only one");

    let moved = fixture
        .core
        .execute(
            &fixture.owner,
            MoveTask {
                task_id: task.id(),
                to_column_id: review.id(),
                position: Some(3),
            },
        )
        .unwrap();
    assert_eq!(moved.position(), 3);
}

#[test]
fn archived_tasks_do_not_count_and_restore_respects_limit() {
    let fixture = Fixture::new();
    let review = fixture.column("Review", 2, Some(1));
    let first = fixture.task(review.id(), "First");
    fixture
        .core
        .execute(&fixture.owner, ArchiveTask { task_id: first.id() })
        .unwrap();

    let second = fixture.task(review.id(), "Second");
    assert!(second.position() > first.position());

    let err = fixture
        .core
        .execute(&fixture.owner, RestoreTask { task_id: first.id() })
        .unwrap_err();
    assert!(matches!(
        err,
        CoreError::BusinessRuleViolation(DomainError::WipLimitReached { .. })
    ));

    let active = fixture
        .core
        .execute(
            &fixture.owner,
            ListColumnTasks {
                column_id: review.id(),
                include_archived: false,
            },
        )
        .unwrap();
    assert_eq!(active.len(), 1);
    let all = fixture
        .core
        .execute(
            &fixture.owner,
            ListColumnTasks {
                column_id: review.id(),
                include_archived: true,
            },
        )
        .unwrap();
    assert_eq!(all.len(), 2);
}

#[test]
fn wip_limits_can_be_disabled_by_policy() {
    let config = CoreConfig {
        access: AccessPolicy {
            enforce_wip_limits: false,
            ..AccessPolicy::default()
        },
        ..CoreConfig::default()
    };
    let fixture = Fixture::with_config(config);
    let review = fixture.column("Review", 2, Some(1));
    fixture.task(review.id(), "First");
    let second = fixture.task(review.id(), "Second");
    assert_eq!(second.column_id(), review.id());
}

#[test]
fn archived_task_cannot_move() {
    let fixture = Fixture::new();
    let task = fixture.task(fixture.todo.id(), "Shelved");
    fixture
        .core
        .execute(&fixture.owner, ArchiveTask { task_id: task.id() })
        .unwrap();

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
    assert!(matches!(
        err,
        CoreError::BusinessRuleViolation(DomainError::Archived { entity: "task", .. })
    ));
}

#[test]
fn assignee_must_be_board_member() {
    let fixture = Fixture::new();
    let editor = fixture.member("editor@example.com", BoardRole::Editor);
    let outsider = common::provision(&fixture.core, "outsider@example.com");
    let task = fixture.task(fixture.todo.id(), "Assign me");

    let err = fixture
        .core
        .execute(
            &fixture.owner,
            AssignTask {
                task_id: task.id(),
                assignee_id: outsider.user_id,
            },
        )
        .unwrap_err();
    assert!(matches!(
        err,
        CoreError::BusinessRuleViolation(DomainError::NotMember(_))
    ));

    fixture
        .core
        .execute(
            &fixture.owner,
            AssignTask {
                task_id: task.id(),
                assignee_id: editor.user_id,
            },
        )
        .unwrap();
    let loaded = fixture
        .core
        .execute(&fixture.owner, GetTask { task_id: task.id() })
        .unwrap();
    assert_eq!(loaded.assignee_id(), editor.user_id);
}
