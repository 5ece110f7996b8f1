use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Element of a simplified design tree.
///
/// `children` is tri-state on purpose: `None` means the subtree was not
/// fetched (the traversal stopped here), `Some(vec![])` means it was fetched
/// and the node has no children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Identifier, unique within a file only.
    pub id: String,
    /// Layer name as shown in the design tool.
    pub name: String,
    /// Node type tag (`FRAME`, `TEXT`, ...).
    #[serde(rename = "type")]
    pub node_type: String,
    /// Text content for text layers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Further simplified properties, opaque to the cache.
    #[serde(flatten)]
    pub properties: Map<String, Value>,
    /// Child nodes, if they were fetched.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_children"
    )]
    pub children: Option<Vec<Self>>,
}

impl Node {
    /// Create a node whose children were not fetched.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, node_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            node_type: node_type.into(),
            text: None,
            properties: Map::new(),
            children: None,
        }
    }

    /// Attach a fetched child list (possibly empty).
    #[must_use]
    pub fn with_children(mut self, children: Vec<Self>) -> Self {
        self.children = Some(children);
        self
    }

    /// Attach text content.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Copy every field except `children`, which is left absent.
    #[must_use]
    pub fn without_children(&self) -> Self {
        Self {
            id: self.id.clone(),
            name: self.name.clone(),
            node_type: self.node_type.clone(),
            text: self.text.clone(),
            properties: self.properties.clone(),
            children: None,
        }
    }

    /// Iterate over present children; empty when none were fetched.
    pub fn child_nodes(&self) -> impl Iterator<Item = &Self> {
        self.children.iter().flatten()
    }
}

// `null` slots inside a child list are dropped instead of failing the document.
fn deserialize_children<'de, D>(deserializer: D) -> Result<Option<Vec<Node>>, D::Error>
where
    D: Deserializer<'de>,
{
    let slots: Option<Vec<Option<Node>>> = Option::deserialize(deserializer)?;
    Ok(slots.map(|slots| slots.into_iter().flatten().collect()))
}
