//! Galaxy command-line client library

pub mod connection;
pub mod histories;
pub mod tools;
pub mod workflows;

// Re-export CLI types for testing
pub use clap::{Parser, Subcommand};

use anyhow::Result;
use gx_rest_client::RestClient;
use serde::Serialize;
use serde_json::Value;

#[derive(Parser)]
#[command(name = "gx")]
#[command(about = "Galaxy workflow client")]
#[command(version, author, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub connection: connection::ConnectionArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Workflow management and invocation
    Workflows {
        #[command(subcommand)]
        subcommand: workflows::WorkflowCommands,
    },
    /// History management
    Histories {
        #[command(subcommand)]
        subcommand: histories::HistoryCommands,
    },
    /// Datasets held in a history
    Contents {
        #[command(subcommand)]
        subcommand: histories::ContentCommands,
    },
    /// Tool listing and uploads
    Tools {
        #[command(subcommand)]
        subcommand: tools::ToolCommands,
    },
    /// Print the server version
    Version,
}

impl Commands {
    /// Run the command and return the response document to print
    pub async fn run(self, client: &RestClient) -> Result<Value> {
        match self {
            Commands::Workflows { subcommand } => subcommand.run(client).await,
            Commands::Histories { subcommand } => subcommand.run(client).await,
            Commands::Contents { subcommand } => subcommand.run(client).await,
            Commands::Tools { subcommand } => subcommand.run(client).await,
            Commands::Version => to_json(client.version().await?),
        }
    }
}

pub(crate) fn to_json<T: Serialize>(value: T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}
