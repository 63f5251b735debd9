//! Cycle-safe tree folding.
//!
//! The edge list is not a tree: a file may have several parents and
//! relations may form cycles. Traversal uses an arena of file indices and a
//! single `seen` vector shared across the whole walk, so each file type is
//! placed at most once and the walk always terminates.

use std::collections::BTreeMap;

use crate::types::{Dictionary, RelationEdge, TreeNode};

/// Canonical top-level entity of a submission dictionary.
pub const DEFAULT_ROOT: &str = "donor";

/// Error raised when the tree reaches a name with no file type definition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown file type: {name}")]
pub struct UnknownFileTypeError {
    /// The undefined file type name.
    pub name: String,
}

impl UnknownFileTypeError {
    fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// One placed node during traversal.
struct Slot {
    /// Index into `dict.files`.
    file: usize,
    /// Slot index of the parent.
    parent: Option<usize>,
}

/// Lookup tables shared by tree and forest construction.
struct Arena<'a> {
    dict: &'a Dictionary,
    index: BTreeMap<&'a str, usize>,
    children: BTreeMap<&'a str, Vec<&'a str>>,
}

impl<'a> Arena<'a> {
    fn new(dict: &'a Dictionary, edges: &'a [RelationEdge]) -> Self {
        let index = dict
            .files
            .iter()
            .enumerate()
            .map(|(i, f)| (f.name.as_str(), i))
            .collect();

        let mut children: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for edge in edges {
            if let Some(parent) = edge.parent_node.as_deref() {
                children.entry(parent).or_default().push(edge.node.as_str());
            }
        }

        Self {
            dict,
            index,
            children,
        }
    }

    fn file_index(&self, name: &str) -> Result<usize, UnknownFileTypeError> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| UnknownFileTypeError::new(name))
    }

    fn name(&self, file: usize) -> &'a str {
        self.dict.files[file].name.as_str()
    }

    /// Depth-first walk from `root`, claiming unseen children per node.
    ///
    /// Children are claimed in edge order when their parent is expanded,
    /// then expanded in name order. A child's slot index is always greater
    /// than its parent's, and siblings occupy consecutive slots.
    fn walk(&self, root: usize, seen: &mut [bool]) -> Result<Vec<Slot>, UnknownFileTypeError> {
        seen[root] = true;
        let mut slots = vec![Slot {
            file: root,
            parent: None,
        }];
        let mut stack = vec![0usize];

        while let Some(slot) = stack.pop() {
            let name = self.name(slots[slot].file);

            let mut claimed = Vec::new();
            for child in self.children.get(name).into_iter().flatten() {
                let file = self.file_index(child)?;
                if seen[file] {
                    continue;
                }
                seen[file] = true;
                claimed.push(file);
            }
            claimed.sort_by(|a, b| self.name(*a).cmp(self.name(*b)));

            let first = slots.len();
            slots.extend(claimed.into_iter().map(|file| Slot {
                file,
                parent: Some(slot),
            }));
            stack.extend((first..slots.len()).rev());
        }

        Ok(slots)
    }

    /// Turn slots into an owned tree, bottom-up.
    fn materialize(&self, slots: &[Slot]) -> TreeNode {
        let mut pending: Vec<Vec<TreeNode>> = (0..slots.len()).map(|_| Vec::new()).collect();

        for slot in (1..slots.len()).rev() {
            let node = self.node(slots, slot, std::mem::take(&mut pending[slot]));
            if let Some(parent) = slots[slot].parent {
                pending[parent].push(node);
            }
        }

        let children = std::mem::take(&mut pending[0]);
        self.node(slots, 0, children)
    }

    fn node(&self, slots: &[Slot], slot: usize, mut children: Vec<TreeNode>) -> TreeNode {
        // Siblings were pushed last-first.
        children.reverse();
        let file = &self.dict.files[slots[slot].file];
        TreeNode {
            name: file.name.clone(),
            ancestor: slots[slot]
                .parent
                .map(|p| self.name(slots[p].file).to_string()),
            data: file.clone(),
            children,
        }
    }
}

/// Fold an edge list into a tree rooted at `root_name`.
///
/// Each file type appears at most once, even with cycles or multiple
/// parents. Children are sorted by name. Fails if the root or any reached
/// child has no definition in `dict.files`.
pub fn build_tree(
    root_name: &str,
    edges: &[RelationEdge],
    dict: &Dictionary,
) -> Result<TreeNode, UnknownFileTypeError> {
    let arena = Arena::new(dict, edges);
    let root = arena.file_index(root_name)?;
    let mut seen = vec![false; dict.files.len()];

    let slots = arena.walk(root, &mut seen)?;
    let tree = arena.materialize(&slots);

    tracing::debug!(
        version = %dict.version,
        root = %root_name,
        nodes = tree.len(),
        files = dict.files.len(),
        "relation tree built"
    );

    Ok(tree)
}

/// Build one tree per top-level edge, sharing a single seen set.
///
/// Roots are taken from edges with no parent, in edge order. A root already
/// placed under an earlier tree is skipped.
pub fn build_forest(
    edges: &[RelationEdge],
    dict: &Dictionary,
) -> Result<Vec<TreeNode>, UnknownFileTypeError> {
    let arena = Arena::new(dict, edges);
    let mut seen = vec![false; dict.files.len()];
    let mut forest = Vec::new();

    for edge in edges.iter().filter(|e| e.is_root()) {
        let root = arena.file_index(&edge.node)?;
        if seen[root] {
            continue;
        }
        let slots = arena.walk(root, &mut seen)?;
        forest.push(arena.materialize(&slots));
    }

    Ok(forest)
}

/// File type names of `dict` that do not appear in `tree`, in file order.
pub fn unreachable(tree: &TreeNode, dict: &Dictionary) -> Vec<String> {
    let placed: std::collections::BTreeSet<&str> = tree.names().into_iter().collect();
    dict.files
        .iter()
        .filter(|f| !placed.contains(f.name.as_str()))
        .map(|f| f.name.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FileType;

    fn dict_of(names: &[&str]) -> Dictionary {
        names
            .iter()
            .fold(Dictionary::new("1"), |d, n| d.with_file(FileType::new(*n)))
    }

    #[test]
    fn test_children_sorted_by_name() {
        let dict = dict_of(&["donor", "therapy", "specimen", "biomarker"]);
        let edges = vec![
            RelationEdge::root("donor"),
            RelationEdge::new("therapy", "donor"),
            RelationEdge::new("specimen", "donor"),
            RelationEdge::new("biomarker", "donor"),
        ];

        let tree = build_tree("donor", &edges, &dict).unwrap();
        let names: Vec<&str> = tree.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["biomarker", "specimen", "therapy"]);
        assert!(tree.children.iter().all(|c| c.ancestor.as_deref() == Some("donor")));
    }

    #[test]
    fn test_cycle_terminates() {
        let dict = dict_of(&["a", "b"]);
        let edges = vec![RelationEdge::new("b", "a"), RelationEdge::new("a", "b")];

        let tree = build_tree("a", &edges, &dict).unwrap();
        assert_eq!(tree.names(), vec!["a", "b"]);
        assert!(tree.children[0].is_leaf());
    }

    #[test]
    fn test_multiple_parents_placed_once() {
        // d is reachable from both b and c; b claims it first
        let dict = dict_of(&["a", "b", "c", "d"]);
        let edges = vec![
            RelationEdge::new("b", "a"),
            RelationEdge::new("c", "a"),
            RelationEdge::new("d", "c"),
            RelationEdge::new("d", "b"),
        ];

        let tree = build_tree("a", &edges, &dict).unwrap();
        assert_eq!(tree.len(), 4);
        assert_eq!(tree.find("d").and_then(|n| n.ancestor.as_deref()), Some("b"));
    }

    #[test]
    fn test_shared_seen_across_branches() {
        // c is a direct child of a, and also a child of b; claimed at a's level
        let dict = dict_of(&["a", "b", "c"]);
        let edges = vec![
            RelationEdge::new("b", "a"),
            RelationEdge::new("c", "a"),
            RelationEdge::new("c", "b"),
        ];

        let tree = build_tree("a", &edges, &dict).unwrap();
        assert_eq!(tree.children.len(), 2);
        assert!(tree.find("b").unwrap().is_leaf());
    }

    #[test]
    fn test_deep_preorder_expansion() {
        // b's subtree claims e before c is expanded
        let dict = dict_of(&["a", "b", "c", "d", "e"]);
        let edges = vec![
            RelationEdge::new("b", "a"),
            RelationEdge::new("c", "a"),
            RelationEdge::new("d", "b"),
            RelationEdge::new("e", "d"),
            RelationEdge::new("e", "c"),
        ];

        let tree = build_tree("a", &edges, &dict).unwrap();
        assert_eq!(tree.names(), vec!["a", "b", "d", "e", "c"]);
        assert_eq!(tree.find("e").and_then(|n| n.ancestor.as_deref()), Some("d"));
        assert_eq!(tree.depth(), 4);
    }

    #[test]
    fn test_unknown_root() {
        let dict = dict_of(&["specimen"]);
        let err = build_tree(DEFAULT_ROOT, &[], &dict).unwrap_err();
        assert_eq!(err.name, "donor");
    }

    #[test]
    fn test_unknown_child() {
        let dict = dict_of(&["donor"]);
        let edges = vec![RelationEdge::new("ghost", "donor")];

        let err = build_tree("donor", &edges, &dict).unwrap_err();
        assert_eq!(err, UnknownFileTypeError::new("ghost"));
    }

    #[test]
    fn test_unreached_unknown_parent_is_ignored() {
        let dict = dict_of(&["donor", "sample"]);
        let edges = vec![RelationEdge::root("donor"), RelationEdge::new("sample", "specimen")];

        let tree = build_tree("donor", &edges, &dict).unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(unreachable(&tree, &dict), vec!["sample".to_string()]);
    }

    #[test]
    fn test_forest_shares_seen() {
        let dict = dict_of(&["donor", "specimen", "probes", "meth_p"]);
        let edges = vec![
            RelationEdge::root("donor"),
            RelationEdge::new("specimen", "donor"),
            RelationEdge::root("probes"),
            RelationEdge::new("meth_p", "probes"),
            RelationEdge::new("meth_p", "specimen"),
        ];

        let forest = build_forest(&edges, &dict).unwrap();
        assert_eq!(forest.len(), 2);
        assert_eq!(forest[0].names(), vec!["donor", "specimen", "meth_p"]);
        assert_eq!(forest[1].names(), vec!["probes"]);
    }
}
