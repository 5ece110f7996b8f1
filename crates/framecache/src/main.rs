//! CLI entry point for framecache.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use framecache_app::{AppConfig, DesignService, FigmaClient};
use rmcp::ServiceExt;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

mod commands;
mod mcp;
mod node_ids;

/// Depth-aware cache in front of the Figma REST API.
#[derive(Parser, Debug)]
#[command(
    name = "framecache",
    version,
    about = "framecache: serve Figma design trees from a depth-aware snapshot cache"
)]
struct Cli {
    /// Configuration file (defaults to <config dir>/framecache/config.toml).
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a whole file as simplified JSON.
    File {
        file_key: String,
        /// Limit the tree to this many levels below the pages.
        #[arg(long)]
        depth: Option<u32>,
    },

    /// Print specific nodes of a file as simplified JSON.
    Nodes {
        file_key: String,
        /// Node ids; `12-34` and comma-joined lists are accepted.
        #[arg(required = true)]
        node_ids: Vec<String>,
        #[arg(long)]
        depth: Option<u32>,
    },

    /// Start MCP server on stdio.
    Mcp,
}

fn main() -> Result<()> {
    let Cli { config, cmd } = Cli::parse();
    install_tracing();

    let config = AppConfig::load(config.as_deref())?;
    let client = FigmaClient::new(&config.api)?;
    let service = DesignService::from_config(client, &config.cache)?;
    execute_command(service, cmd)
}

fn execute_command(service: DesignService<FigmaClient>, command: Command) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    match command {
        Command::Mcp => {
            let server = mcp::FramecacheServer::new(Arc::new(service));
            runtime
                .block_on(async move {
                    let transport = (tokio::io::stdin(), tokio::io::stdout());
                    let server = server
                        .serve(transport)
                        .await
                        .map_err(|e| anyhow::anyhow!("{e:?}"))?;
                    server.waiting().await.map_err(|e| anyhow::anyhow!("{e:?}"))
                })
                .map(|_| ())
        }
        other => runtime.block_on(commands::run(other, &service)),
    }
}

// stdout carries command output or the MCP protocol; logs always go to stderr.
fn install_tracing() {
    let filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_span_events(FmtSpan::NONE)
        .compact()
        .try_init();
}
