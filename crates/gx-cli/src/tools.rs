use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Subcommand;
use gx_rest_api_contract::UploadFile;
use gx_rest_client::RestClient;
use serde_json::Value;

use crate::to_json;

/// Tool commands
#[derive(Subcommand)]
pub enum ToolCommands {
    List {
        /// Group tools by toolbox section
        #[arg(long)]
        in_panel: bool,
    },
    Show { id: String },
    /// Upload local files into a history
    Upload {
        history_id: String,
        #[arg(required = true, value_name = "FILE")]
        files: Vec<PathBuf>,
        #[arg(long, default_value = "upload1")]
        tool: String,
    },
}

impl ToolCommands {
    pub async fn run(self, client: &RestClient) -> Result<Value> {
        let tools = client.tools();
        match self {
            ToolCommands::List { in_panel: true } => Ok(tools.panel().await?),
            ToolCommands::List { in_panel: false } => to_json(tools.index().await?),
            ToolCommands::Show { id } => to_json(tools.show(&id).await?),
            ToolCommands::Upload {
                history_id,
                files,
                tool,
            } => {
                let uploads = files
                    .into_iter()
                    .map(upload_file)
                    .collect::<Result<Vec<_>>>()?;
                to_json(tools.create(&tool, &history_id, &uploads).await?)
            }
        }
    }
}

fn upload_file(path: PathBuf) -> Result<UploadFile> {
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .with_context(|| format!("Not a file path: {}", path.display()))?;
    Ok(UploadFile::new(name, path))
}
