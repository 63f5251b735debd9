//! Core types for the dictionary kernel.

pub mod dictionary;
pub mod field;
pub mod codelist;
pub mod report;
pub mod edge;
pub mod tree;

pub use dictionary::{Dictionary, FileType, FileRole, Relation, MalformedDictionaryError};
pub use field::{Field, Restriction, RestrictionKind};
pub use codelist::{CodeList, Term};
pub use report::{
    ChangeReport, ChangeEntry, ChangeId, ChangeValue, ChangeBucket, FieldChange,
    FileChangeCounts, EntrySignature, Absent,
};
pub use edge::RelationEdge;
pub use tree::TreeNode;
