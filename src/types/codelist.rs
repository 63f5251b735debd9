//! Code list types.

use serde::{Deserialize, Serialize};

/// One permitted (code, value) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Term {
    /// Submitted code.
    pub code: String,
    /// Meaning of the code.
    pub value: String,
}

impl Term {
    /// Create a term.
    pub fn new(code: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            value: value.into(),
        }
    }
}

/// A named enumeration referenced by `codelist` restrictions.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CodeList {
    /// Unique name.
    pub name: String,
    /// Human readable label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Permitted terms.
    #[serde(default)]
    pub terms: Vec<Term>,
}

impl CodeList {
    /// Create a code list.
    pub fn new(name: impl Into<String>, terms: Vec<Term>) -> Self {
        Self {
            name: name.into(),
            label: None,
            terms,
        }
    }

    /// Value for a code.
    pub fn lookup(&self, code: &str) -> Option<&str> {
        self.terms
            .iter()
            .find(|t| t.code == code)
            .map(|t| t.value.as_str())
    }
}
