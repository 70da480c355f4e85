use anyhow::Result;
use gx_cli::{Cli, Parser};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let client = cli.connection.connect().await?;
    let output = cli.command.run(&client).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
