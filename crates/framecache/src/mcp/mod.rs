//! MCP server implementation for framecache.

mod params;
mod tools;

pub use params::*;

use framecache_app::{DesignService, FigmaClient};
use rmcp::handler::server::ServerHandler;
use rmcp::handler::server::tool::{ToolCallContext, ToolRouter};
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolRequestParam, CallToolResult, Implementation, InitializeResult, ListToolsResult, ProtocolVersion,
    ServerCapabilities,
};
use rmcp::service::{RequestContext, RoleServer};
use rmcp::{ErrorData as McpError, tool, tool_router};
use std::sync::Arc;

/// MCP server exposing cached design data.
#[derive(Clone)]
pub struct FramecacheServer {
    tool_router: ToolRouter<Self>,
    service: Arc<DesignService<FigmaClient>>,
}

#[tool_router]
impl FramecacheServer {
    /// Create a new MCP server instance.
    pub fn new(service: Arc<DesignService<FigmaClient>>) -> Self {
        Self {
            tool_router: Self::tool_router(),
            service,
        }
    }

    /// Fetch a file or specific nodes as simplified JSON.
    #[tool(
        description = "Get the layout tree of a Figma file, or of specific nodes when node_id is given. \
                       Use depth to limit how many levels of children are returned"
    )]
    async fn get_design_data(&self, params: Parameters<GetDesignDataParams>) -> Result<CallToolResult, McpError> {
        tools::get_design_data::handle_get_design_data(self.service.as_ref(), params).await
    }

    /// Drop cached snapshots.
    #[tool(description = "Clear cached design data for one file, or for every file when file_key is omitted")]
    async fn clear_design_cache(
        &self,
        params: Parameters<ClearDesignCacheParams>,
    ) -> Result<CallToolResult, McpError> {
        tools::clear_design_cache::handle_clear_design_cache(self.service.as_ref(), params).await
    }
}

impl ServerHandler for FramecacheServer {
    fn get_info(&self) -> InitializeResult {
        let capabilities = ServerCapabilities::builder()
            .enable_tools()
            .enable_tool_list_changed()
            .build();

        InitializeResult {
            protocol_version: ProtocolVersion::LATEST,
            capabilities,
            server_info: Implementation {
                name: "framecache".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                icons: None,
                title: None,
                website_url: None,
            },
            instructions: Some(
                "Call get_design_data with a file key, and optionally node ids, to inspect a design.".into(),
            ),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<rmcp::model::PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult {
            tools: self.tool_router.list_all(),
            next_cursor: None,
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let tool_context = ToolCallContext::new(self, request, context);
        self.tool_router.call(tool_context).await
    }
}
