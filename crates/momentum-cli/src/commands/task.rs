use chrono::Utc;
use clap::Subcommand;
use momentum_core::{Priority, TaskType};
use serde_json::json;

use super::{open_app, print_json, report_warnings, CommandResult};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Add a task
    Add {
        /// Task title
        title: String,
        /// Priority: high, medium, low
        #[arg(long, default_value = "medium")]
        priority: Priority,
        /// Type: easy, moderate, difficult, time-taking
        #[arg(long = "type", default_value = "moderate")]
        task_type: TaskType,
    },
    /// List tasks, most recent first
    List,
    /// Mark a task complete, or reopen it
    Toggle {
        /// Task ID
        id: String,
    },
    /// Remove a task
    Remove {
        /// Task ID
        id: String,
    },
}

pub fn run(action: TaskAction) -> CommandResult {
    let mut app = open_app()?;

    match action {
        TaskAction::Add {
            title,
            priority,
            task_type,
        } => {
            let applied = app.add_task(&title, priority, task_type, Utc::now())?;
            print_json(&applied)?;
        }
        TaskAction::List => {
            print_json(&json!({
                "tasks": app.tasks().list(),
                "summary": app.tasks().summary(),
            }))?;
        }
        TaskAction::Toggle { id } => {
            let applied = app.toggle_task(&id)?;
            print_json(&applied)?;
        }
        TaskAction::Remove { id } => {
            let applied = app.remove_task(&id);
            print_json(&json!({ "removed": applied.value, "events": applied.events }))?;
        }
    }

    report_warnings(&mut app);
    Ok(())
}
