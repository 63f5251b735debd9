//! Rooted relation tree.

use serde::{Deserialize, Serialize};

use super::dictionary::FileType;

/// A node of the relation tree.
///
/// Trees are acyclic and each file type name appears at most once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    /// File type name.
    pub name: String,
    /// Name of the parent node, `None` for the root.
    pub ancestor: Option<String>,
    /// The file type definition.
    pub data: FileType,
    /// Child nodes sorted by name.
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Number of nodes in the subtree.
    pub fn len(&self) -> usize {
        1 + self.children.iter().map(TreeNode::len).sum::<usize>()
    }

    /// Always false; a tree has at least its root.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Whether this node has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Node names in pre-order.
    pub fn names(&self) -> Vec<&str> {
        let mut names = Vec::with_capacity(self.len());
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            names.push(node.name.as_str());
            stack.extend(node.children.iter().rev());
        }
        names
    }

    /// Find a node by name.
    pub fn find(&self, name: &str) -> Option<&TreeNode> {
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if node.name == name {
                return Some(node);
            }
            stack.extend(node.children.iter());
        }
        None
    }

    /// Whether a node of this name is in the subtree.
    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// Height of the subtree; a leaf has depth 1.
    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(TreeNode::depth).max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(name: &str, ancestor: Option<&str>, children: Vec<TreeNode>) -> TreeNode {
        TreeNode {
            name: name.to_string(),
            ancestor: ancestor.map(str::to_string),
            data: FileType::new(name),
            children,
        }
    }

    #[test]
    fn test_traversal_helpers() {
        let tree = node(
            "donor",
            None,
            vec![
                node("biomarker", Some("donor"), vec![]),
                node(
                    "specimen",
                    Some("donor"),
                    vec![node("sample", Some("specimen"), vec![])],
                ),
            ],
        );

        assert_eq!(tree.len(), 4);
        assert_eq!(tree.depth(), 3);
        assert_eq!(tree.names(), vec!["donor", "biomarker", "specimen", "sample"]);
        assert_eq!(
            tree.find("sample").and_then(|n| n.ancestor.as_deref()),
            Some("specimen")
        );
        assert!(!tree.contains("ssm_m"));
        assert!(tree.find("biomarker").unwrap().is_leaf());
    }
}
