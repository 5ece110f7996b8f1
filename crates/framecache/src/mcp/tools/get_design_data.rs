//! Get design data tool implementation.

use crate::mcp::params::GetDesignDataParams;
use crate::node_ids;
use framecache_app::{DesignService, DesignSource};
use rmcp::ErrorData as McpError;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content};

/// Fetch a file or a set of nodes, answering from the cache where possible.
pub async fn handle_get_design_data<S: DesignSource>(
    service: &DesignService<S>,
    Parameters(params): Parameters<GetDesignDataParams>,
) -> Result<CallToolResult, McpError> {
    let file_key = params.file_key.trim();
    if file_key.is_empty() {
        return Err(McpError::invalid_params("file_key must not be empty", None));
    }
    let ids = params.node_id.map(|raw| node_ids::normalize([raw])).unwrap_or_default();

    let snapshot = if ids.is_empty() {
        service.get_file(file_key, params.depth).await
    } else {
        service.get_nodes(file_key, &ids, params.depth).await
    }
    .map_err(|e| McpError::internal_error(format!("{e:#}"), None))?;

    let json_str =
        serde_json::to_string_pretty(&*snapshot).map_err(|e| McpError::internal_error(e.to_string(), None))?;
    Ok(CallToolResult::success(vec![Content::text(json_str)]))
}
