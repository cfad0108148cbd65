//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `taskboard_core` linkage.
//! - Optionally run a scripted scenario against an in-memory core.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use taskboard_core::command::{
    CreateBoard, CreateColumn, CreateProject, CreateTask, ListBoardColumns, MoveTask,
    ProvisionUser,
};
use taskboard_core::model::project::ProjectVisibility;
use taskboard_core::model::task::TaskPriority;
use taskboard_core::{
    CallerIdentity, CoreConfig, EventDispatcher, LogNotificationSink, NotificationHandler,
    TaskboardCore,
};

/// Smoke check for the taskboard core.
#[derive(Parser, Debug)]
#[command(name = "taskboard_cli")]
#[command(about = "Open the taskboard core and optionally run a demo scenario")]
struct Args {
    /// JSON configuration file; defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run a scripted scenario against the opened core
    #[arg(long)]
    demo: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    println!("taskboard_core ping={}", taskboard_core::ping());
    println!("taskboard_core version={}", taskboard_core::core_version());
    println!(
        "taskboard_core schema_version={}",
        taskboard_core::db::migrations::latest_version()
    );

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), String> {
    let config = match args.config.as_deref() {
        Some(path) => CoreConfig::load(path).map_err(|err| err.to_string())?,
        None => CoreConfig::default(),
    };

    let mut dispatcher = EventDispatcher::new();
    dispatcher
        .subscribe_all(Arc::new(NotificationHandler::new(Arc::new(
            LogNotificationSink,
        ))))
        .map_err(|err| err.to_string())?;
    let core = TaskboardCore::open(config, dispatcher).map_err(|err| err.to_string())?;
    println!("taskboard_core open=ok");

    if args.demo {
        run_demo(&core).map_err(|err| err.to_string())?;
    }
    Ok(())
}

fn run_demo(core: &TaskboardCore) -> taskboard_core::CoreResult<()> {
    let caller = CallerIdentity::authenticated(uuid::Uuid::new_v4());
    core.execute(
        &caller,
        ProvisionUser {
            email: "demo@example.com".to_string(),
            display_name: "Demo".to_string(),
        },
    )?;
    let project = core.execute(
        &caller,
        CreateProject {
            name: "Demo project".to_string(),
            description: None,
            visibility: ProjectVisibility::Private,
        },
    )?;
    let board = core.execute(
        &caller,
        CreateBoard {
            project_id: project.id(),
            name: "Delivery".to_string(),
            description: None,
        },
    )?;

    let mut column_ids = Vec::new();
    for (order, name) in ["Todo", "Doing", "Done"].into_iter().enumerate() {
        let column = core.execute(
            &caller,
            CreateColumn {
                board_id: board.id(),
                name: name.to_string(),
                order: order as i32,
                wip_limit: None,
            },
        )?;
        column_ids.push(column.id());
    }

    let task = core.execute(
        &caller,
        CreateTask {
            column_id: column_ids[0],
            title: "Try the demo".to_string(),
            description: None,
            priority: TaskPriority::Medium,
            due_date: None,
        },
    )?;
    core.execute(
        &caller,
        MoveTask {
            task_id: task.id(),
            to_column_id: column_ids[1],
            position: None,
        },
    )?;

    let columns = core.execute(&caller, ListBoardColumns { board_id: board.id() })?;
    log::info!(
        "event=cli_demo module=cli status=ok board_id={} columns={} task_id={}",
        board.id(),
        columns.len(),
        task.id()
    );
    println!(
        "demo board={} columns={} moved_task={}",
        board.id(),
        columns.len(),
        task.id()
    );
    Ok(())
}
