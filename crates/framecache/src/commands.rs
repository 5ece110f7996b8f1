//! CLI command handlers.

use anyhow::{Context, Result};
use framecache_app::{DesignService, FigmaClient};
use framecache_core::Snapshot;

use crate::Command;
use crate::node_ids;

/// Execute a non-MCP command and print its snapshot to stdout.
pub async fn run(command: Command, service: &DesignService<FigmaClient>) -> Result<()> {
    let snapshot = match command {
        Command::File { file_key, depth } => service.get_file(&file_key, depth).await?,
        Command::Nodes {
            file_key,
            node_ids,
            depth,
        } => {
            let ids = node_ids::normalize(&node_ids);
            service.get_nodes(&file_key, &ids, depth).await?
        }
        Command::Mcp => unreachable!("MCP is handled by the caller"),
    };
    println!("{}", render(&snapshot)?);
    Ok(())
}

fn render(snapshot: &Snapshot) -> Result<String> {
    serde_json::to_string_pretty(snapshot).context("failed to serialize snapshot")
}
