use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Subcommand;
use gx_rest_api_contract::{BuildModuleRequest, CreateWorkflowRequest, InvokeWorkflowRequest};
use gx_rest_client::RestClient;
use serde_json::Value;
use tracing::debug;

use crate::to_json;

/// Workflow commands
#[derive(Subcommand)]
pub enum WorkflowCommands {
    /// List workflows visible to the user
    List {
        /// Include workflows published by other users
        #[arg(long)]
        published: bool,
    },
    /// Show one workflow with its inputs and steps
    Show {
        id: String,
        /// Treat ID as a workflow instance id
        #[arg(long)]
        instance: bool,
    },
    /// Import a workflow from a .ga file
    Create {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        #[arg(long)]
        publish: bool,
    },
    /// Replace a workflow's definition with the contents of a .ga file
    Update {
        id: String,
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Run a workflow on history datasets
    Invoke {
        id: String,
        /// Dataset for the next workflow input, in step order
        #[arg(long = "dataset", value_name = "ID")]
        datasets: Vec<String>,
        /// Existing history to write outputs to
        #[arg(long, value_name = "ID", conflicts_with = "new_history")]
        history: Option<String>,
        /// Name of a new history to write outputs to
        #[arg(long, value_name = "NAME")]
        new_history: Option<String>,
    },
    /// List invocations of a workflow
    Invocations { id: String },
    /// Show one invocation
    Invocation { id: String, invocation_id: String },
    /// Show an invocation step, or resume/cancel it with --action
    Step {
        id: String,
        invocation_id: String,
        step_id: String,
        /// true resumes a paused step, false cancels it
        #[arg(long, value_name = "BOOL")]
        action: Option<bool>,
    },
    /// Cancel an invocation
    Cancel { id: String, invocation_id: String },
    /// Editor representation of a workflow
    Export { id: String },
    /// Workflow document in .ga format
    Download { id: String },
    /// Editor representation of a tool module
    BuildModule {
        #[arg(value_name = "TOOL_ID")]
        tool_id: String,
    },
    /// Delete a workflow
    Delete { id: String },
}

impl WorkflowCommands {
    pub async fn run(self, client: &RestClient) -> Result<Value> {
        let workflows = client.workflows();
        match self {
            WorkflowCommands::List { published } => to_json(workflows.index(published).await?),
            WorkflowCommands::Show { id, instance } => to_json(workflows.show(&id, instance).await?),
            WorkflowCommands::Create { file, publish } => {
                let request = CreateWorkflowRequest::from_json(&read_workflow(&file)?)?.published(publish);
                to_json(workflows.create(&request).await?)
            }
            WorkflowCommands::Update { id, file } => {
                to_json(workflows.update(&id, &read_workflow(&file)?).await?)
            }
            WorkflowCommands::Invoke {
                id,
                datasets,
                history,
                new_history,
            } => {
                let mut request = InvokeWorkflowRequest::with_datasets(datasets.as_slice());
                if let Some(history_id) = history {
                    request = request.in_history(history_id);
                }
                if let Some(name) = new_history {
                    request = request.in_new_history(name);
                }
                debug!(workflow_id = %id, inputs = datasets.len(), "invoking workflow");
                to_json(workflows.invoke(&id, &request).await?)
            }
            WorkflowCommands::Invocations { id } => to_json(workflows.index_invocations(&id).await?),
            WorkflowCommands::Invocation { id, invocation_id } => {
                to_json(workflows.show_invocation(&id, &invocation_id).await?)
            }
            WorkflowCommands::Step {
                id,
                invocation_id,
                step_id,
                action,
            } => match action {
                Some(action) => to_json(
                    workflows
                        .update_invocation_step(&id, &invocation_id, &step_id, action)
                        .await?,
                ),
                None => to_json(workflows.invocation_step(&id, &invocation_id, &step_id).await?),
            },
            WorkflowCommands::Cancel { id, invocation_id } => {
                to_json(workflows.cancel_invocation(&id, &invocation_id).await?)
            }
            WorkflowCommands::Export { id } => Ok(workflows.export(&id).await?),
            WorkflowCommands::Download { id } => Ok(workflows.download(&id).await?),
            WorkflowCommands::BuildModule { tool_id } => {
                Ok(workflows.build_module(&BuildModuleRequest::tool(tool_id)).await?)
            }
            WorkflowCommands::Delete { id } => to_json(workflows.delete(&id).await?),
        }
    }
}

fn read_workflow(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read workflow file {}", path.display()))
}
