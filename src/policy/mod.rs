//! Ordering policy definitions.

pub mod ordering;

pub use ordering::{FileOrdering, DEFAULT_FILE_ORDER};
