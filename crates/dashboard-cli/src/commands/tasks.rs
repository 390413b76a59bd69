use clap::Subcommand;
use dashboard_core::{Priority, RecordId, Task, TaskDraft, TaskPatch, TaskStatus};
use serde_json::json;

use super::{open_store, print_json, CmdResult, Listing};

#[derive(Subcommand)]
pub enum TasksAction {
    /// List tasks, newest first
    List {
        /// Only active or only completed tasks
        #[arg(long)]
        status: Option<TaskStatus>,
    },
    /// Create a task
    Add {
        title: String,
        /// low, medium or high
        #[arg(long, default_value = "medium")]
        priority: Priority,
        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<String>,
    },
    /// Edit a task
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        priority: Option<Priority>,
        #[arg(long, conflicts_with = "clear_due")]
        due: Option<String>,
        /// Remove the due date
        #[arg(long)]
        clear_due: bool,
        #[arg(long)]
        completed: Option<bool>,
    },
    /// Flip a task between active and completed
    Toggle { id: String },
    /// Delete a task
    Delete { id: String },
}

pub async fn run(action: TasksAction) -> CmdResult {
    let mut store = open_store::<Task>().await?;

    match action {
        TasksAction::List { status } => {
            let records: Vec<Task> = store
                .records()
                .iter()
                .filter(|task| status.map_or(true, |s| s.matches(task)))
                .cloned()
                .collect();
            print_json(&Listing {
                mode: store.mode(),
                records: &records,
            })?;
        }
        TasksAction::Add {
            title,
            priority,
            due,
        } => {
            let draft = TaskDraft {
                title,
                priority,
                due_date: due,
            };
            print_json(&store.create(draft).await?)?;
        }
        TasksAction::Update {
            id,
            title,
            priority,
            due,
            clear_due,
            completed,
        } => {
            let due_date = if clear_due { Some(None) } else { due.map(Some) };
            let patch = TaskPatch {
                title,
                completed,
                priority,
                due_date,
            };
            print_json(&store.update(&RecordId::from(id), patch).await?)?;
        }
        TasksAction::Toggle { id } => {
            print_json(&store.toggle(&RecordId::from(id)).await?)?;
        }
        TasksAction::Delete { id } => {
            let id = RecordId::from(id);
            store.delete(&id).await?;
            print_json(&json!({ "deleted": id }))?;
        }
    }
    Ok(())
}
