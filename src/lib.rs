//! # dictionary-kernel
//!
//! Deterministic comparison and structure analysis for versioned submission
//! data dictionaries.
//!
//! A dictionary describes the file types a data submitter may upload, the
//! fields of each file, the restrictions on each field, and the relations
//! between files. The kernel answers three questions:
//!
//! > What changed between two versions?
//! > How are the file types related?
//! > Which file types use a given code list?
//!
//! ## Architecture
//!
//! ```text
//! DictionarySource → DictionaryCache → Arc<Dictionary>
//!                                          ↓
//!        DiffEngine ─ compare ─ FileOrdering → ChangeReport
//!        derive_parent_edges → build_tree    → TreeNode
//!        coverage / DictionaryValidator      → Vec<String> / ConstraintViolations
//! ```
//!
//! ## Determinism Guarantees
//!
//! - Same inputs → same report contents, modulo entry ids
//! - File order follows the ordering table; unknown files sort last
//! - Tree children are sorted by name
//! - Core computations are pure and never partially succeed

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod types;
pub mod policy;
pub mod compare;
pub mod diff;
pub mod graph;
pub mod coverage;
pub mod validate;
pub mod catalog;
pub mod store;
pub mod canonical;

// Re-exports
pub use types::{
    Dictionary, FileType, FileRole, Relation, MalformedDictionaryError,
    Field, Restriction, RestrictionKind, CodeList, Term,
    ChangeReport, ChangeEntry, ChangeId, ChangeValue, ChangeBucket, FieldChange,
    FileChangeCounts, RelationEdge, TreeNode,
};
pub use policy::{FileOrdering, DEFAULT_FILE_ORDER};
pub use compare::{
    is_field_changed, diff_field_detailed, is_file_pattern_changed, is_file_label_changed,
    matches_query,
};
pub use diff::{DiffEngine, compute_diff, FILE_PATTERN_ENTRY_NAME};
pub use graph::{
    derive_parent_edges, build_tree, build_forest, unreachable, UnknownFileTypeError,
    DEFAULT_ROOT,
};
pub use coverage::{
    coverage, partition_code_lists, resolve_code_list, checked_coverage,
    CodeListPartition, CodeListUsage, UnknownCodeListError,
};
pub use validate::{DictionaryValidator, ConstraintViolation, ConstraintViolations};
pub use catalog::{DictionaryCatalog, DictionarySummary, DictionaryState};
pub use store::{
    DictionarySource, DictionaryCache, CacheConfig, CacheError, CacheStats,
    InMemoryDictionarySource,
};
#[cfg(feature = "cli")]
pub use store::FsDictionarySource;
pub use canonical::{
    to_canonical_bytes, canonical_hash, canonical_hash_hex, dictionary_fingerprint,
    content_fingerprint, report_fingerprint,
};

/// Schema version of the change report wire format.
/// Increment on breaking changes to any serialized type.
pub const REPORT_SCHEMA_VERSION: &str = "1.0.0";
