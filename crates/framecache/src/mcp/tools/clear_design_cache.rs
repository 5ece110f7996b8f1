//! Clear design cache tool implementation.

use crate::mcp::params::ClearDesignCacheParams;
use framecache_app::DesignService;
use rmcp::ErrorData as McpError;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content};

/// Drop cached snapshots of one file, or of every file.
pub async fn handle_clear_design_cache<S>(
    service: &DesignService<S>,
    Parameters(params): Parameters<ClearDesignCacheParams>,
) -> Result<CallToolResult, McpError> {
    let message = match params.file_key.as_deref().map(str::trim) {
        Some("") => return Err(McpError::invalid_params("file_key must not be empty", None)),
        Some(file_key) => {
            let removed = service.clear_file_cache(file_key);
            format!("Cleared {removed} cached snapshot(s) of {file_key}")
        }
        None => {
            service.clear_all_cache();
            "Cleared all cached snapshots".to_owned()
        }
    };
    Ok(CallToolResult::success(vec![Content::text(message)]))
}
