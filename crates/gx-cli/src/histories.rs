use anyhow::Result;
use clap::Subcommand;
use gx_rest_client::RestClient;
use serde_json::Value;

use crate::to_json;

/// History commands
#[derive(Subcommand)]
pub enum HistoryCommands {
    List,
    Show { id: String },
    Create { name: String },
    Delete {
        id: String,
        /// Also remove the datasets from disk
        #[arg(long)]
        purge: bool,
    },
}

impl HistoryCommands {
    pub async fn run(self, client: &RestClient) -> Result<Value> {
        let histories = client.histories();
        match self {
            HistoryCommands::List => to_json(histories.index().await?),
            HistoryCommands::Show { id } => to_json(histories.show(&id).await?),
            HistoryCommands::Create { name } => to_json(histories.create(&name).await?),
            HistoryCommands::Delete { id, purge } => to_json(histories.delete(&id, purge).await?),
        }
    }
}

/// History contents commands
#[derive(Subcommand)]
pub enum ContentCommands {
    List { history_id: String },
    Show { history_id: String, content_id: String },
}

impl ContentCommands {
    pub async fn run(self, client: &RestClient) -> Result<Value> {
        let contents = client.history_contents();
        match self {
            ContentCommands::List { history_id } => to_json(contents.index(&history_id).await?),
            ContentCommands::Show {
                history_id,
                content_id,
            } => to_json(contents.show(&history_id, &content_id).await?),
        }
    }
}
