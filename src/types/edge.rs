//! Parent edges derived from file relations.

use serde::{Deserialize, Serialize};

/// Directed edge from a parent file type to a child file type.
///
/// A `None` parent marks a top-level file type. Implements `Ord` for
/// deterministic ordering: (parent, node), with top-level edges first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationEdge {
    /// Child file type name.
    pub node: String,
    /// Parent file type name.
    pub parent_node: Option<String>,
}

impl RelationEdge {
    /// Create a parent → child edge.
    pub fn new(node: impl Into<String>, parent_node: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            parent_node: Some(parent_node.into()),
        }
    }

    /// Create an edge for a top-level file type.
    pub fn root(node: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            parent_node: None,
        }
    }

    /// Whether this edge marks a top-level file type.
    pub fn is_root(&self) -> bool {
        self.parent_node.is_none()
    }

    /// Whether `name` is the parent of this edge.
    pub fn has_parent(&self, name: &str) -> bool {
        self.parent_node.as_deref() == Some(name)
    }
}

// Canonical ordering: parent, then node
impl PartialOrd for RelationEdge {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RelationEdge {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        match self.parent_node.cmp(&other.parent_node) {
            std::cmp::Ordering::Equal => self.node.cmp(&other.node),
            ord => ord,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_ordering() {
        let root = RelationEdge::root("donor");
        let e1 = RelationEdge::new("sample", "specimen");
        let e2 = RelationEdge::new("specimen", "donor");
        let e3 = RelationEdge::new("biomarker", "donor");

        // Top-level edges first
        assert!(root < e2);
        // Same parent, different child
        assert!(e3 < e2);
        // Different parent
        assert!(e2 < e1);
    }

    #[test]
    fn test_wire_shape() {
        let json = serde_json::to_value(RelationEdge::root("donor")).unwrap();
        assert_eq!(json, serde_json::json!({"node": "donor", "parentNode": null}));
    }
}
