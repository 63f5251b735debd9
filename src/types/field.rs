//! Field and restriction types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Discriminant of a [`Restriction`], in comparison order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RestrictionKind {
    /// Pattern a value must match.
    Regex,
    /// Value must be present.
    Required,
    /// Scripted cross-field check.
    Script,
    /// Value must belong to a code list.
    Codelist,
    /// Numeric value must lie within inclusive bounds.
    Range,
}

impl RestrictionKind {
    /// All kinds in comparison order.
    pub const ALL: [RestrictionKind; 5] = [
        RestrictionKind::Regex,
        RestrictionKind::Required,
        RestrictionKind::Script,
        RestrictionKind::Codelist,
        RestrictionKind::Range,
    ];

    /// Wire tag of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Regex => "regex",
            Self::Required => "required",
            Self::Script => "script",
            Self::Codelist => "codelist",
            Self::Range => "range",
        }
    }
}

impl fmt::Display for RestrictionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A validation rule attached to a field.
///
/// Serialized as `{"type": "<tag>", "config": {...}}` to match the web service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "config", rename_all = "lowercase")]
pub enum Restriction {
    /// Value must be present; `acceptMissingCode` allows the missing-value codes.
    Required {
        /// Whether missing-value codes satisfy the rule.
        #[serde(rename = "acceptMissingCode", default)]
        accept_missing_code: bool,
    },
    /// Value must match `pattern`.
    Regex {
        /// Regular expression.
        pattern: String,
        /// Sample valid values.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        examples: Option<Vec<String>>,
    },
    /// Value is checked by a script.
    Script {
        /// Script source.
        #[serde(default)]
        script: String,
        /// Human readable description of the check.
        #[serde(default)]
        description: String,
    },
    /// Value must be a term of the named code list.
    Codelist {
        /// Code list name.
        #[serde(default)]
        name: String,
    },
    /// Value must lie within `[min, max]`.
    ///
    /// Bounds are kept as raw JSON so that a string or fractional bound on an
    /// integer field survives parsing and is reported by the validator.
    Range {
        /// Inclusive lower bound.
        #[serde(default)]
        min: serde_json::Value,
        /// Inclusive upper bound.
        #[serde(default)]
        max: serde_json::Value,
    },
}

impl Restriction {
    /// Build a `required` restriction.
    pub fn required(accept_missing_code: bool) -> Self {
        Self::Required { accept_missing_code }
    }

    /// Build a `regex` restriction without examples.
    pub fn regex(pattern: impl Into<String>) -> Self {
        Self::Regex {
            pattern: pattern.into(),
            examples: None,
        }
    }

    /// Build a `script` restriction.
    pub fn script(script: impl Into<String>, description: impl Into<String>) -> Self {
        Self::Script {
            script: script.into(),
            description: description.into(),
        }
    }

    /// Build a `codelist` restriction.
    pub fn codelist(name: impl Into<String>) -> Self {
        Self::Codelist { name: name.into() }
    }

    /// Build a `range` restriction with integer bounds.
    pub fn range(min: i64, max: i64) -> Self {
        Self::Range {
            min: min.into(),
            max: max.into(),
        }
    }

    /// Discriminant of this restriction.
    pub fn kind(&self) -> RestrictionKind {
        match self {
            Self::Required { .. } => RestrictionKind::Required,
            Self::Regex { .. } => RestrictionKind::Regex,
            Self::Script { .. } => RestrictionKind::Script,
            Self::Codelist { .. } => RestrictionKind::Codelist,
            Self::Range { .. } => RestrictionKind::Range,
        }
    }

    /// Code list name, if this is a `codelist` restriction.
    pub fn codelist_name(&self) -> Option<&str> {
        match self {
            Self::Codelist { name } => Some(name),
            _ => None,
        }
    }
}

/// A named, typed column within a file type.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    /// Unique within the owning file type.
    pub name: String,
    /// Human readable label.
    #[serde(default)]
    pub label: String,
    /// Value type tag, e.g. `TEXT`, `INTEGER`.
    #[serde(default)]
    pub value_type: String,
    /// Whether the field is access controlled.
    #[serde(default)]
    pub controlled: bool,
    /// Summary statistic computed for the field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary_type: Option<String>,
    /// Validation rules, at most one per kind.
    #[serde(default)]
    pub restrictions: Vec<Restriction>,
}

impl Field {
    /// Create an uncontrolled field with no restrictions.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Set the value type.
    pub fn with_value_type(mut self, value_type: impl Into<String>) -> Self {
        self.value_type = value_type.into();
        self
    }

    /// Set the controlled flag.
    pub fn with_controlled(mut self, controlled: bool) -> Self {
        self.controlled = controlled;
        self
    }

    /// Append a restriction.
    pub fn with_restriction(mut self, restriction: Restriction) -> Self {
        self.restrictions.push(restriction);
        self
    }

    /// First restriction of the given kind.
    pub fn restriction(&self, kind: RestrictionKind) -> Option<&Restriction> {
        self.restrictions.iter().find(|r| r.kind() == kind)
    }

    /// Name of the code list this field is bound to.
    pub fn codelist_name(&self) -> Option<&str> {
        self.restriction(RestrictionKind::Codelist)
            .and_then(Restriction::codelist_name)
    }

    /// Whether the field carries a `required` restriction.
    pub fn is_required(&self) -> bool {
        self.restriction(RestrictionKind::Required).is_some()
    }

    /// First kind that appears more than once, if any.
    pub(crate) fn duplicate_restriction_kind(&self) -> Option<RestrictionKind> {
        let mut seen = [false; RestrictionKind::ALL.len()];
        for restriction in &self.restrictions {
            let slot = &mut seen[restriction.kind() as usize];
            if *slot {
                return Some(restriction.kind());
            }
            *slot = true;
        }
        None
    }
}
