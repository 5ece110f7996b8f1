//! Domain types for simplified design trees and their cache keys.

/// Cache key format and parsing.
pub mod key;
/// Simplified tree nodes.
pub mod node;
/// Depth and search helpers over node forests.
pub mod tree;

pub use crate::key::{CacheKey, CacheKeyError, DepthTag, Selector};
pub use crate::node::Node;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Published component referenced by instances in the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentMeta {
    /// Node id of the component.
    pub id: String,
    /// Library key.
    pub key: String,
    /// Display name.
    pub name: String,
    /// Owning component set, for variants.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_set_id: Option<String>,
}

/// Variant container grouping several components.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentSetMeta {
    /// Node id of the set.
    pub id: String,
    /// Library key.
    pub key: String,
    /// Display name.
    pub name: String,
    /// Author-provided description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Shared style table referenced from node properties.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GlobalVars {
    /// Style id to extracted style value.
    #[serde(default)]
    pub styles: BTreeMap<String, Value>,
}

/// Lightweight per-file metadata used for freshness checks.
///
/// Every field is optional; a response missing `last_touched_at` is read as
/// "no marker" rather than as an error.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FileMeta {
    /// File name.
    #[serde(default)]
    pub name: Option<String>,
    /// Marker that changes whenever the file is edited.
    #[serde(default)]
    pub last_touched_at: Option<String>,
    /// Version identifier.
    #[serde(default)]
    pub version: Option<String>,
}

impl FileMeta {
    /// Metadata carrying only a modification marker.
    #[must_use]
    pub fn touched_at(marker: impl Into<String>) -> Self {
        Self {
            last_touched_at: Some(marker.into()),
            ..Self::default()
        }
    }
}

/// Immutable capture of a design document: root nodes plus file metadata.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// File name.
    pub name: String,
    /// Last-modified timestamp reported by the origin.
    pub last_modified: String,
    /// Thumbnail reference.
    pub thumbnail_url: String,
    /// Root nodes, in order.
    pub nodes: Vec<Node>,
    /// Component table.
    #[serde(default)]
    pub components: BTreeMap<String, ComponentMeta>,
    /// Component set table.
    #[serde(default)]
    pub component_sets: BTreeMap<String, ComponentSetMeta>,
    /// Style variables.
    #[serde(default)]
    pub global_vars: GlobalVars,
}

impl Snapshot {
    /// Reuse this snapshot's metadata with a different set of roots.
    #[must_use]
    pub fn with_nodes(&self, nodes: Vec<Node>) -> Self {
        Self {
            name: self.name.clone(),
            last_modified: self.last_modified.clone(),
            thumbnail_url: self.thumbnail_url.clone(),
            nodes,
            components: self.components.clone(),
            component_sets: self.component_sets.clone(),
            global_vars: self.global_vars.clone(),
        }
    }

    /// Fold another snapshot's component and style tables into this one.
    ///
    /// Entries from `other` win on conflicting ids.
    pub fn absorb_tables(&mut self, other: &Self) {
        self.components
            .extend(other.components.iter().map(|(id, meta)| (id.clone(), meta.clone())));
        self.component_sets
            .extend(other.component_sets.iter().map(|(id, meta)| (id.clone(), meta.clone())));
        self.global_vars
            .styles
            .extend(other.global_vars.styles.iter().map(|(id, style)| (id.clone(), style.clone())));
    }

    /// Depth-first lookup of a node by id.
    #[must_use]
    pub fn find_node(&self, id: &str) -> Option<&Node> {
        tree::find_node(&self.nodes, id)
    }

    /// Deepest materialized level across all roots.
    #[must_use]
    pub fn realized_depth(&self) -> u32 {
        tree::forest_depth(&self.nodes)
    }
}
