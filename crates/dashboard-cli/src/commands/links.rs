use clap::Subcommand;
use dashboard_core::{LinkDraft, LinkPatch, QuickLink, RecordId};
use serde_json::json;

use super::{open_store, print_json, print_listing, CmdResult};

#[derive(Subcommand)]
pub enum LinksAction {
    /// List quick links in display order
    List {
        /// One `icon title url` line per link instead of JSON
        #[arg(long)]
        plain: bool,
    },
    /// Add a quick link; `https://` is assumed when no scheme is given
    Add {
        title: String,
        url: String,
        #[arg(long)]
        icon: Option<String>,
    },
    /// Edit a quick link
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        icon: Option<String>,
    },
    /// Put the given links first, in order, keeping the rest after them
    Reorder {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Delete a quick link
    Delete { id: String },
}

pub async fn run(action: LinksAction) -> CmdResult {
    let mut store = open_store::<QuickLink>().await?;

    match action {
        LinksAction::List { plain: false } => print_listing(&store)?,
        LinksAction::List { plain: true } => {
            for link in store.records() {
                println!("{} {}  {}", link.display_icon(), link.title, link.url);
            }
        }
        LinksAction::Add { title, url, icon } => {
            let link = store.create(LinkDraft { title, url, icon }).await?;
            print_json(&link)?;
        }
        LinksAction::Update {
            id,
            title,
            url,
            icon,
        } => {
            let link = store
                .update(&RecordId::from(id), LinkPatch { title, url, icon })
                .await?;
            print_json(&link)?;
        }
        LinksAction::Reorder { ids } => {
            let ids: Vec<RecordId> = ids.into_iter().map(RecordId::from).collect();
            store.move_to_front(&ids).await?;
            print_listing(&store)?;
        }
        LinksAction::Delete { id } => {
            let id = RecordId::from(id);
            store.delete(&id).await?;
            print_json(&json!({ "deleted": id }))?;
        }
    }
    Ok(())
}
