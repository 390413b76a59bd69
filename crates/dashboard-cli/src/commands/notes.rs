use clap::Subcommand;
use dashboard_core::{Note, NoteDraft, NotePatch, RecordId};
use serde_json::json;

use super::{open_store, print_json, print_listing, CmdResult};

#[derive(Subcommand)]
pub enum NotesAction {
    /// List notes, most recently updated first
    List,
    /// Create a note
    Add {
        title: String,
        /// Note body
        #[arg(long, default_value = "")]
        content: String,
    },
    /// Edit a note
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
    },
    /// Delete a note
    Delete { id: String },
}

pub async fn run(action: NotesAction) -> CmdResult {
    let mut store = open_store::<Note>().await?;

    match action {
        NotesAction::List => print_listing(&store)?,
        NotesAction::Add { title, content } => {
            let note = store.create(NoteDraft { title, content }).await?;
            print_json(&note)?;
        }
        NotesAction::Update { id, title, content } => {
            let note = store
                .update(&RecordId::from(id), NotePatch { title, content })
                .await?;
            print_json(&note)?;
        }
        NotesAction::Delete { id } => {
            let id = RecordId::from(id);
            store.delete(&id).await?;
            print_json(&json!({ "deleted": id }))?;
        }
    }
    Ok(())
}
