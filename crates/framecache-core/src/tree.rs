//! Pure helpers over node forests.
//!
//! Depths here describe what is materialized in a given snapshot, not the
//! structure of the document at the origin.

use crate::node::Node;

/// Number of levels materialized below `node`.
///
/// Zero when children are absent or empty.
#[must_use]
pub fn subtree_depth(node: &Node) -> u32 {
    node.child_nodes()
        .map(|child| 1 + subtree_depth(child))
        .max()
        .unwrap_or(0)
}

/// Deepest materialized level across a forest of roots.
#[must_use]
pub fn forest_depth(roots: &[Node]) -> u32 {
    roots.iter().map(subtree_depth).max().unwrap_or(0)
}

/// Edges between the forest root and the node with `id`.
///
/// Root-level nodes sit at depth 0. Returns `None` when the id is absent.
#[must_use]
pub fn root_depth(roots: &[Node], id: &str) -> Option<u32> {
    fn walk<'a>(nodes: impl Iterator<Item = &'a Node>, id: &str, level: u32) -> Option<u32> {
        for node in nodes {
            if node.id == id {
                return Some(level);
            }
            if let Some(found) = walk(node.child_nodes(), id, level + 1) {
                return Some(found);
            }
        }
        None
    }

    walk(roots.iter(), id, 0)
}

/// Copy of `node` truncated to at most `max_depth` levels below it.
///
/// At the cut, `children` is left absent (not empty) so that readers can tell
/// the subtree was not materialized.
#[must_use]
pub fn limit_depth(node: &Node, max_depth: u32) -> Node {
    let mut copy = node.without_children();
    if max_depth > 0 {
        copy.children = node
            .children
            .as_ref()
            .map(|children| children.iter().map(|child| limit_depth(child, max_depth - 1)).collect());
    }
    copy
}

/// Depth-first search for the first node carrying `id`.
#[must_use]
pub fn find_node<'a>(roots: &'a [Node], id: &str) -> Option<&'a Node> {
    fn walk<'a>(mut nodes: impl Iterator<Item = &'a Node>, id: &str) -> Option<&'a Node> {
        nodes.find_map(|node| {
            if node.id == id {
                Some(node)
            } else {
                walk(node.child_nodes(), id)
            }
        })
    }

    walk(roots.iter(), id)
}
