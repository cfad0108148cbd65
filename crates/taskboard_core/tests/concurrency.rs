mod common;

use common::Fixture;
use rusqlite::Connection;
use std::sync::Arc;
use taskboard_core::command::GetTask;
use taskboard_core::model::task::{TaskDetails, TaskId, TaskPriority};
use taskboard_core::repo::TaskRepository;
use taskboard_core::{
    CoreError, CoreResult, EventDispatcher, Operation, OperationContext, RepoError, UnitOfWork,
    Validate, ValidationErrors,
};

fn details(title: &str) -> TaskDetails {
    TaskDetails {
        title: title.to_string(),
        description: None,
        priority: TaskPriority::Medium,
        due_date: None,
    }
}

#[test]
fn second_writer_with_stale_version_gets_conflict() {
    let fixture = Fixture::new();
    let task = fixture.task(fixture.todo.id(), "Contended");
    let owner_id = fixture.owner.user_id.unwrap();
    let dispatcher = Arc::new(EventDispatcher::new());

    let mut first = UnitOfWork::new(fixture.core.connection(), Arc::clone(&dispatcher));
    let mut second = UnitOfWork::new(fixture.core.connection(), Arc::clone(&dispatcher));
    let mut first_copy = first.tasks().get_by_id(task.id()).unwrap().unwrap();
    let mut second_copy = second.tasks().get_by_id(task.id()).unwrap().unwrap();
    assert_eq!(first_copy.version(), second_copy.version());

    first_copy.update_details(details("First wins"), owner_id).unwrap();
    first.tasks().update(first_copy).unwrap();
    assert_eq!(first.complete().unwrap(), 1);

    second_copy
        .update_details(details("Second loses"), owner_id)
        .unwrap();
    second.tasks().update(second_copy).unwrap();
    let err = second.complete().unwrap_err();
    assert!(matches!(
        err,
        RepoError::Conflict { entity: "task", id, expected_version: 0 } if id == task.id()
    ));

    let stored = fixture
        .core
        .execute(&fixture.owner, GetTask { task_id: task.id() })
        .unwrap();
    assert_eq!(stored.title(), "First wins");
    assert_eq!(stored.version(), 1);
}

/// Renames a task while another writer bumps its row mid-operation.
struct RaceRename<'a> {
    other_writer: &'a Connection,
    task_id: TaskId,
}

impl Validate for RaceRename<'_> {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Ok(())
    }
}

impl Operation for RaceRename<'_> {
    const NAME: &'static str = "race_rename";
    const MUTATES: bool = true;
    type Output = ();

    fn execute(self, ctx: &mut OperationContext<'_>) -> CoreResult<()> {
        let caller_id = ctx.caller.require_user()?;
        let mut task = ctx
            .uow
            .tasks()
            .get_by_id(self.task_id)?
            .ok_or(CoreError::NotFound {
                entity: "task",
                id: self.task_id,
            })?;
        self.other_writer
            .execute(
                "UPDATE tasks SET version = version + 1 WHERE id = ?1;",
                [self.task_id.to_string()],
            )
            .map_err(CoreError::unexpected)?;
        task.update_details(details("Too late"), caller_id)?;
        ctx.uow.tasks().update(task)?;
        Ok(())
    }
}

#[test]
fn conflict_surfaces_through_the_pipeline_without_events() {
    let fixture = Fixture::new();
    let task = fixture.task(fixture.todo.id(), "Raced");
    fixture.handler.clear();

    let err = fixture
        .core
        .execute(
            &fixture.owner,
            RaceRename {
                other_writer: fixture.core.connection(),
                task_id: task.id(),
            },
        )
        .unwrap_err();

    assert!(matches!(err, CoreError::Conflict { entity: "task", id } if id == task.id()));
    assert!(fixture.handler.events().is_empty());
}
