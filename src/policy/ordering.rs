//! Canonical file type ordering.
//!
//! Files are sorted by a fixed priority table before diffing so that reports
//! come out in the same order regardless of payload order. Names missing from
//! the table sort after all known names and keep their relative order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::canonical::canonical_hash_hex;
use crate::types::FileType;

/// Priority table of the canonical submission file types.
pub const DEFAULT_FILE_ORDER: &[&str] = &[
    "donor", "specimen", "sample",
    "biomarker", "surgery", "therapy", "family", "exposure",
    "ssm_m", "ssm_p", "ssm_s",
    "sgv_m", "sgv_p",
    "cnsm_m", "cnsm_p", "cnsm_s",
    "stsm_m", "stsm_p", "stsm_s",
    "exp_g", "exp_m",
    "pexp_m", "pexp_p",
    "mirna_m", "mirna_p", "mirna_s",
    "jcn_m", "jcn_p",
    "meth_m", "meth_p", "meth_s",
    "meth_seq_m", "meth_seq_p",
    "mirna_seq_m", "mirna_seq_p",
    "exp_seq_m", "exp_seq_p",
    "exp_array_m", "exp_array_p",
    "meth_array_m", "meth_array_p",
    "meth_array_probes",
];

/// File type priority table.
///
/// Serializes as the plain list of names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct FileOrdering {
    names: Vec<String>,
    rank: BTreeMap<String, usize>,
}

impl FileOrdering {
    /// Create an ordering from names in priority order.
    ///
    /// A name listed twice keeps its first position.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let mut rank = BTreeMap::new();
        for (i, name) in names.iter().enumerate() {
            rank.entry(name.clone()).or_insert(i);
        }
        Self { names, rank }
    }

    /// Names in priority order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Position of a name in the table, `None` if unknown.
    pub fn rank(&self, name: &str) -> Option<usize> {
        self.rank.get(name).copied()
    }

    /// Sort key: known names by position, unknown names after all of them.
    fn sort_key(&self, name: &str) -> usize {
        self.rank(name).unwrap_or(usize::MAX)
    }

    /// File types in canonical order (stable).
    pub fn sorted<'a>(&self, files: &'a [FileType]) -> Vec<&'a FileType> {
        let mut sorted: Vec<&FileType> = files.iter().collect();
        sorted.sort_by_key(|f| self.sort_key(&f.name));
        sorted
    }

    /// Fingerprint of the table, for reproducibility records.
    pub fn fingerprint(&self) -> String {
        canonical_hash_hex(&self.names)
    }
}

impl From<Vec<String>> for FileOrdering {
    fn from(names: Vec<String>) -> Self {
        Self::new(names)
    }
}

impl From<FileOrdering> for Vec<String> {
    fn from(ordering: FileOrdering) -> Self {
        ordering.names
    }
}

impl Default for FileOrdering {
    fn default() -> Self {
        Self::new(DEFAULT_FILE_ORDER.iter().copied())
    }
}
