#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use taskboard_core::command::{
    AddBoardMember, AddProjectMember, CreateBoard, CreateColumn, CreateProject, CreateTask,
    ProvisionUser,
};
use taskboard_core::model::board::Board;
use taskboard_core::model::column::{Column, ColumnId};
use taskboard_core::model::membership::{BoardRole, ProjectRole};
use taskboard_core::model::project::{Project, ProjectVisibility};
use taskboard_core::model::task::{BoardTask, TaskPriority};
use taskboard_core::model::user::UserId;
use taskboard_core::{
    CallerIdentity, CoreConfig, DomainEvent, EventDispatcher, EventHandler, EventHandlerError,
    NotificationHandler, NotificationResult, NotificationSink, TaskboardCore,
};
use uuid::Uuid;

/// Handler that remembers every committed event it receives.
#[derive(Default)]
pub struct RecordingHandler {
    events: Mutex<Vec<DomainEvent>>,
}

impl RecordingHandler {
    pub fn events(&self) -> Vec<DomainEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}

impl EventHandler for RecordingHandler {
    fn name(&self) -> &str {
        "recording"
    }

    fn handle(&self, event: &DomainEvent) -> Result<(), EventHandlerError> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

/// Sink that records `kind:target` strings for the notifications it gets.
#[derive(Default)]
pub struct RecordingSink {
    calls: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, kind: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.split(':').next() == Some(kind))
            .count()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn push(&self, kind: &str, target: Uuid) -> NotificationResult {
        self.calls.lock().unwrap().push(format!("{kind}:{target}"));
        Ok(())
    }
}

impl NotificationSink for RecordingSink {
    fn column_created(
        &self,
        _board_id: taskboard_core::model::board::BoardId,
        column_id: ColumnId,
        _actor_id: UserId,
    ) -> NotificationResult {
        self.push("column_created", column_id)
    }

    fn task_created(
        &self,
        _column_id: ColumnId,
        task_id: taskboard_core::model::task::TaskId,
        _actor_id: UserId,
    ) -> NotificationResult {
        self.push("task_created", task_id)
    }

    fn task_moved(
        &self,
        task_id: taskboard_core::model::task::TaskId,
        _from_column_id: ColumnId,
        _to_column_id: ColumnId,
        _actor_id: UserId,
    ) -> NotificationResult {
        self.push("task_moved", task_id)
    }

    fn task_commented(
        &self,
        _task_id: taskboard_core::model::task::TaskId,
        comment_id: taskboard_core::model::comment::CommentId,
        _author_id: UserId,
    ) -> NotificationResult {
        self.push("task_commented", comment_id)
    }
}

/// Opened core with one owner, a project, a board and two columns.
pub struct Fixture {
    pub core: TaskboardCore,
    pub handler: Arc<RecordingHandler>,
    pub sink: Arc<RecordingSink>,
    pub owner: CallerIdentity,
    pub project: Project,
    pub board: Board,
    pub todo: Column,
    pub doing: Column,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_config(CoreConfig::default())
    }

    pub fn with_config(config: CoreConfig) -> Self {
        Self::with_dispatcher(config, EventDispatcher::new())
    }

    /// Builds the fixture on top of an already populated dispatcher.
    pub fn with_dispatcher(config: CoreConfig, mut dispatcher: EventDispatcher) -> Self {
        let handler = Arc::new(RecordingHandler::default());
        let sink = Arc::new(RecordingSink::default());
        dispatcher.subscribe_all(handler.clone()).unwrap();
        dispatcher
            .subscribe_all(Arc::new(NotificationHandler::new(sink.clone())))
            .unwrap();
        let core = TaskboardCore::open(config, dispatcher).unwrap();

        let owner = provision(&core, "owner@example.com");
        let project = core
            .execute(
                &owner,
                CreateProject {
                    name: "Roadmap".to_string(),
                    description: None,
                    visibility: ProjectVisibility::Private,
                },
            )
            .unwrap();
        let board = core
            .execute(
                &owner,
                CreateBoard {
                    project_id: project.id(),
                    name: "Sprint".to_string(),
                    description: Some("current sprint".to_string()),
                },
            )
            .unwrap();
        let todo = create_column(&core, &owner, board.id(), "Todo", 0, None);
        let doing = create_column(&core, &owner, board.id(), "Doing", 1, None);

        handler.clear();
        sink.clear();
        Self {
            core,
            handler,
            sink,
            owner,
            project,
            board,
            todo,
            doing,
        }
    }

    /// Provisions a user and grants project and board roles.
    pub fn member(&self, email: &str, board_role: BoardRole) -> CallerIdentity {
        let caller = provision(&self.core, email);
        let user_id = caller.user_id.unwrap();
        self.core
            .execute(
                &self.owner,
                AddProjectMember {
                    project_id: self.project.id(),
                    user_id,
                    role: ProjectRole::Member,
                },
            )
            .unwrap();
        self.core
            .execute(
                &self.owner,
                AddBoardMember {
                    board_id: self.board.id(),
                    user_id,
                    role: board_role,
                },
            )
            .unwrap();
        caller
    }

    pub fn task(&self, column_id: ColumnId, title: &str) -> BoardTask {
        self.core
            .execute(
                &self.owner,
                CreateTask {
                    column_id,
                    title: title.to_string(),
                    description: None,
                    priority: TaskPriority::Medium,
                    due_date: None,
                },
            )
            .unwrap()
    }

    pub fn column(&self, name: &str, order: i32, wip_limit: Option<u32>) -> Column {
        create_column(
            &self.core,
            &self.owner,
            self.board.id(),
            name,
            order,
            wip_limit,
        )
    }

    /// Runs raw SQL against the core connection.
    pub fn sql(&self, sql: &str) {
        self.core.connection().execute_batch(sql).unwrap();
    }

    pub fn stored_task_column(&self, task: &BoardTask) -> String {
        self.core
            .connection()
            .query_row(
                "SELECT column_id FROM tasks WHERE id = ?1;",
                [task.id().to_string()],
                |row| row.get(0),
            )
            .unwrap()
    }
}

pub fn provision(core: &TaskboardCore, email: &str) -> CallerIdentity {
    let caller = CallerIdentity::authenticated(Uuid::new_v4());
    core.execute(
        &caller,
        ProvisionUser {
            email: email.to_string(),
            display_name: email.split('@').next().unwrap_or(email).to_string(),
        },
    )
    .unwrap();
    caller
}

pub fn create_column(
    core: &TaskboardCore,
    caller: &CallerIdentity,
    board_id: taskboard_core::model::board::BoardId,
    name: &str,
    order: i32,
    wip_limit: Option<u32>,
) -> Column {
    core.execute(
        caller,
        CreateColumn {
            board_id,
            name: name.to_string(),
            order,
            wip_limit,
        },
    )
    .unwrap()
}
