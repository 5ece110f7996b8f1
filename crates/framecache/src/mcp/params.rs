//! Parameter definitions for MCP tools.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for fetching design data.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct GetDesignDataParams {
    /// File key from the design URL (`figma.com/file/<key>/...`).
    pub file_key: String,
    /// Node id, or a comma-separated list of ids. The `12-34` form from
    /// `node-id=` URL parameters is accepted. Omit for the whole file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
    /// How many levels of children to include. Omit for the full tree.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<u32>,
}

/// Parameters for clearing cached design data.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ClearDesignCacheParams {
    /// Only clear snapshots of this file. Omit to clear everything.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_key: Option<String>,
}
