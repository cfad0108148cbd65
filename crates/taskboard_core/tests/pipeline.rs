mod common;

use common::Fixture;
use taskboard_core::command::{CreateColumn, GetUser, ProvisionUser, UpdateProfile};
use taskboard_core::model::task::{BoardTask, TaskDetails, TaskPriority};
use taskboard_core::repo::TaskRepository;
use taskboard_core::{
    CallerIdentity, CoreError, CoreResult, DomainError, Operation, OperationContext, Validate,
    ValidationErrors,
};
use uuid::Uuid;

/// Adds a task through the unit of work; commits only when `MUTATES`.
struct DraftTask<const COMMIT: bool> {
    column_id: Uuid,
}

impl<const COMMIT: bool> Validate for DraftTask<COMMIT> {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Ok(())
    }
}

impl<const COMMIT: bool> Operation for DraftTask<COMMIT> {
    const NAME: &'static str = "draft_task";
    const MUTATES: bool = COMMIT;
    type Output = BoardTask;

    fn execute(self, ctx: &mut OperationContext<'_>) -> CoreResult<BoardTask> {
        let caller_id = ctx.caller.require_user()?;
        let task = BoardTask::create(
            self.column_id,
            TaskDetails {
                title: "Draft".to_string(),
                description: None,
                priority: TaskPriority::Low,
                due_date: None,
            },
            0,
            caller_id,
        );
        ctx.uow.tasks().add(task.clone())?;
        Ok(task)
    }
}

fn task_count(fixture: &Fixture) -> i64 {
    fixture
        .core
        .connection()
        .query_row("SELECT COUNT(*) FROM tasks;", [], |row| row.get(0))
        .unwrap()
}

#[test]
fn validation_reports_every_failing_field() {
    let fixture = Fixture::new();

    let err = fixture
        .core
        .execute(
            &fixture.owner,
            CreateColumn {
                board_id: fixture.board.id(),
                name: " ".to_string(),
                order: -1,
                wip_limit: Some(0),
            },
        )
        .unwrap_err();

    let CoreError::Validation(errors) = err else {
        panic!("expected validation error, got {err}");
    };
    assert_eq!(errors.len(), 3);
    assert!(errors.field("name").is_some());
    assert!(errors.field("order").is_some());
    assert!(errors.field("wip_limit").is_some());
}

#[test]
fn validation_runs_before_authentication() {
    let fixture = Fixture::new();

    let err = fixture
        .core
        .execute(
            &CallerIdentity::anonymous(),
            ProvisionUser {
                email: "not-an-email".to_string(),
                display_name: "Nobody".to_string(),
            },
        )
        .unwrap_err();
    assert!(matches!(err, CoreError::Validation(_)));
}

#[test]
fn only_mutating_operations_commit() {
    let fixture = Fixture::new();

    fixture
        .core
        .execute(
            &fixture.owner,
            DraftTask::<false> {
                column_id: fixture.todo.id(),
            },
        )
        .unwrap();
    assert_eq!(task_count(&fixture), 0);
    assert!(fixture.handler.events().is_empty());

    fixture
        .core
        .execute(
            &fixture.owner,
            DraftTask::<true> {
                column_id: fixture.todo.id(),
            },
        )
        .unwrap();
    assert_eq!(task_count(&fixture), 1);
    assert_eq!(fixture.handler.events().len(), 1);
}

#[test]
fn provisioning_rejects_second_profile_and_taken_email() {
    let fixture = Fixture::new();

    let err = fixture
        .core
        .execute(
            &fixture.owner,
            ProvisionUser {
                email: "again@example.com".to_string(),
                display_name: "Again".to_string(),
            },
        )
        .unwrap_err();
    assert!(matches!(
        err,
        CoreError::BusinessRuleViolation(DomainError::UserAlreadyProvisioned(_))
    ));

    let newcomer = CallerIdentity::authenticated(Uuid::new_v4());
    let err = fixture
        .core
        .execute(
            &newcomer,
            ProvisionUser {
                email: "  Owner@Example.com ".to_string(),
                display_name: "Copycat".to_string(),
            },
        )
        .unwrap_err();
    assert!(matches!(
        err,
        CoreError::BusinessRuleViolation(DomainError::EmailInUse)
    ));
}

#[test]
fn profile_update_is_visible_to_other_users() {
    let fixture = Fixture::new();
    let reader = common::provision(&fixture.core, "reader@example.com");

    fixture
        .core
        .execute(
            &fixture.owner,
            UpdateProfile {
                display_name: "Project Owner".to_string(),
            },
        )
        .unwrap();

    let user = fixture
        .core
        .execute(
            &reader,
            GetUser {
                user_id: fixture.owner.user_id.unwrap(),
            },
        )
        .unwrap();
    assert_eq!(user.display_name(), "Project Owner");
    assert_eq!(user.email(), "owner@example.com");
}
