use anyhow::Result;
use clap::{Parser, Subcommand};
use rmcp::ServiceExt;
use std::path::PathBuf;
use tracing::info;

use aicd_engine::ProjectPaths;
use aicd_mcp::AicdMcpCore;

/// Conversational CI/CD automation bridge.
#[derive(Parser)]
#[command(name = "aicd", version, about)]
struct Cli {
    /// Project root containing the scripts/ and config/ directories.
    /// Defaults to AICD_PROJECT_ROOT, then the current directory.
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the MCP server over stdio (the default).
    Serve,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let paths = match cli.root {
        Some(root) => ProjectPaths::new(root),
        None => ProjectPaths::from_env(),
    };

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(paths).await,
    }
}

fn init_tracing() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
    // stdout carries the MCP protocol; logs must go to stderr.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn serve(paths: ProjectPaths) -> Result<()> {
    info!(root = %paths.root().display(), "starting aicd MCP server on stdio");

    let service = AicdMcpCore::new(paths)
        .serve(rmcp::transport::io::stdio())
        .await
        .inspect_err(|error| eprintln!("MCP server error: {error}"))?;
    service.waiting().await?;
    Ok(())
}
