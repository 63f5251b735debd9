//! Relation graph: parent edges and rooted trees.
//!
//! Relation records are symmetric in data and carry no direction. The graph
//! builder derives a parent → child edge list using file roles, then folds it
//! into a tree for a chosen root file type.
//!
//! ## Architecture
//!
//! ```text
//! Dictionary → derive_parent_edges → RelationEdge[] → build_tree → TreeNode
//!                                                   ↘ build_forest → TreeNode[]
//! ```
//!
//! Trees are not transferable across versions; rebuild per dictionary.

pub mod edges;
pub mod tree;

pub use edges::derive_parent_edges;
pub use tree::{build_tree, build_forest, unreachable, UnknownFileTypeError, DEFAULT_ROOT};
