//! Raw design API payloads and their conversion into simplified snapshots.

use std::collections::BTreeMap;

use framecache_core::{ComponentMeta, ComponentSetMeta, FileMeta, Node, Snapshot};
use serde::Deserialize;
use serde_json::Value;

/// Node as returned by the REST API. Unknown properties are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct RawNode {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default)]
    pub visible: Option<bool>,
    #[serde(default)]
    pub characters: Option<String>,
    #[serde(default)]
    pub children: Option<Vec<Option<Self>>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawComponent {
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub component_set_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawComponentSet {
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Component, component set and style tables shared by both response kinds.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTables {
    #[serde(default)]
    pub components: BTreeMap<String, RawComponent>,
    #[serde(default)]
    pub component_sets: BTreeMap<String, RawComponentSet>,
    #[serde(default)]
    pub styles: BTreeMap<String, Value>,
}

/// Response of `GET /files/{key}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub last_modified: String,
    #[serde(default)]
    pub thumbnail_url: String,
    pub document: RawNode,
    #[serde(flatten)]
    pub tables: RawTables,
}

/// One entry of a `GET /files/{key}/nodes` response.
#[derive(Debug, Clone, Deserialize)]
pub struct RawNodeEntry {
    pub document: RawNode,
    #[serde(flatten)]
    pub tables: RawTables,
}

/// Response of `GET /files/{key}/nodes`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNodes {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub last_modified: String,
    #[serde(default)]
    pub thumbnail_url: String,
    #[serde(default)]
    pub nodes: BTreeMap<String, Option<RawNodeEntry>>,
}

/// Response of `GET /files/{key}/meta`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawMeta {
    #[serde(default)]
    pub file: FileMeta,
}

/// A fetched document, before simplification.
#[derive(Debug, Clone)]
pub enum RawDocument {
    /// Whole-file response.
    File(RawFile),
    /// Node response, with the ids in the order they were requested.
    Nodes {
        requested: Vec<String>,
        response: RawNodes,
    },
}

/// Convert a raw response into the snapshot shape served to clients.
///
/// Pages become roots for a whole-file response; requested nodes become
/// roots, in request order, for a node response. Hidden layers are dropped.
#[must_use]
pub fn simplify(raw: RawDocument) -> Snapshot {
    match raw {
        RawDocument::File(file) => {
            let mut snapshot = Snapshot {
                name: file.name,
                last_modified: file.last_modified,
                thumbnail_url: file.thumbnail_url,
                nodes: simplify_children(file.document.children).unwrap_or_default(),
                ..Snapshot::default()
            };
            absorb(&mut snapshot, file.tables);
            snapshot
        }
        RawDocument::Nodes {
            requested,
            mut response,
        } => {
            let mut snapshot = Snapshot {
                name: response.name,
                last_modified: response.last_modified,
                thumbnail_url: response.thumbnail_url,
                ..Snapshot::default()
            };
            for id in &requested {
                let Some(Some(entry)) = response.nodes.remove(id) else {
                    continue;
                };
                absorb(&mut snapshot, entry.tables);
                snapshot.nodes.extend(simplify_node(entry.document));
            }
            snapshot
        }
    }
}

fn simplify_node(raw: RawNode) -> Option<Node> {
    if raw.visible == Some(false) {
        return None;
    }
    let mut node = Node::new(raw.id, raw.name, raw.node_type);
    node.text = raw.characters;
    node.children = simplify_children(raw.children);
    Some(node)
}

// Absent stays absent; a present list stays present even if every child is hidden.
fn simplify_children(children: Option<Vec<Option<RawNode>>>) -> Option<Vec<Node>> {
    children.map(|slots| slots.into_iter().flatten().filter_map(simplify_node).collect())
}

fn absorb(snapshot: &mut Snapshot, tables: RawTables) {
    snapshot
        .components
        .extend(tables.components.into_iter().map(|(id, raw)| {
            let meta = ComponentMeta {
                id: id.clone(),
                key: raw.key,
                name: raw.name,
                component_set_id: raw.component_set_id,
            };
            (id, meta)
        }));
    snapshot
        .component_sets
        .extend(tables.component_sets.into_iter().map(|(id, raw)| {
            let meta = ComponentSetMeta {
                id: id.clone(),
                key: raw.key,
                name: raw.name,
                description: raw.description.filter(|d| !d.is_empty()),
            };
            (id, meta)
        }));
    snapshot.global_vars.styles.extend(tables.styles);
}
