//! Dictionary constraint validation.
//!
//! Structural well-formedness ([`Dictionary::check_well_formed`]) is the
//! minimum needed to diff a snapshot. The validator goes further and reports
//! every semantic problem it finds, split into errors and warnings, without
//! stopping at the first one.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{CodeList, Dictionary, Field, FileType, Relation, Restriction, RestrictionKind};

/// One problem found in a dictionary.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ConstraintViolation {
    /// What is wrong.
    pub description: String,
    /// Names locating the problem, outermost first.
    pub context: Vec<String>,
}

impl ConstraintViolation {
    /// Create a violation.
    pub fn new<I, S>(description: impl Into<String>, context: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            description: description.into(),
            context: context.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.context.is_empty() {
            write!(f, "{}", self.description)
        } else {
            write!(f, "{}: {}", self.description, self.context.join(", "))
        }
    }
}

/// Violations grouped by severity, in discovery order without repeats.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConstraintViolations {
    /// Problems that make the dictionary unusable.
    pub errors: Vec<ConstraintViolation>,
    /// Suspicious but tolerated definitions.
    pub warnings: Vec<ConstraintViolation>,
}

impl ConstraintViolations {
    /// Whether no errors were found. Warnings do not count.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Whether nothing at all was found.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}

/// Insertion-ordered, deduplicated violation list.
#[derive(Default)]
struct Collector {
    seen: BTreeSet<ConstraintViolation>,
    items: Vec<ConstraintViolation>,
}

impl Collector {
    fn add(&mut self, violation: ConstraintViolation) {
        if self.seen.insert(violation.clone()) {
            self.items.push(violation);
        }
    }
}

/// Value types a `range` restriction can apply to.
#[derive(Clone, Copy)]
enum NumericType {
    Integer,
    Decimal,
}

impl NumericType {
    fn as_str(self) -> &'static str {
        match self {
            Self::Integer => "INTEGER",
            Self::Decimal => "DECIMAL",
        }
    }

    /// Whether a bound parses as this type. Numeric strings are accepted.
    fn accepts(self, value: &serde_json::Value) -> bool {
        match (self, value) {
            (Self::Integer, serde_json::Value::Number(n)) => n.is_i64() || n.is_u64(),
            (Self::Integer, serde_json::Value::String(s)) => s.trim().parse::<i64>().is_ok(),
            (Self::Decimal, serde_json::Value::Number(_)) => true,
            (Self::Decimal, serde_json::Value::String(s)) => s.trim().parse::<f64>().is_ok(),
            _ => false,
        }
    }
}

fn bound_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Validates one dictionary version against the known code lists.
pub struct DictionaryValidator<'a> {
    dict: &'a Dictionary,
    code_lists: &'a [CodeList],
    errors: Collector,
    warnings: Collector,
}

impl<'a> DictionaryValidator<'a> {
    /// Create a validator.
    pub fn new(dict: &'a Dictionary, code_lists: &'a [CodeList]) -> Self {
        Self {
            dict,
            code_lists,
            errors: Collector::default(),
            warnings: Collector::default(),
        }
    }

    /// Run every check.
    pub fn validate(mut self) -> ConstraintViolations {
        let dict = self.dict;
        for file in &dict.files {
            self.validate_pattern(file);
            self.validate_field_names(file);
            for field in &file.fields {
                self.validate_field(file, field);
            }
            for relation in &file.relations {
                self.validate_relation(file, relation);
            }
        }
        self.validate_code_lists();

        let violations = ConstraintViolations {
            errors: self.errors.items,
            warnings: self.warnings.items,
        };

        tracing::debug!(
            version = %dict.version,
            errors = violations.errors.len(),
            warnings = violations.warnings.len(),
            "dictionary validated"
        );

        violations
    }

    fn error<I, S>(&mut self, description: &str, context: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.errors.add(ConstraintViolation::new(description, context));
    }

    fn warning<I, S>(&mut self, description: &str, context: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.warnings.add(ConstraintViolation::new(description, context));
    }

    fn validate_pattern(&mut self, file: &FileType) {
        if file.pattern.trim().is_empty() {
            self.error("Missing file pattern", [file.name.as_str()]);
        } else if let Err(e) = regex_lite::Regex::new(&file.pattern) {
            self.error(
                "Invalid file pattern",
                [file.name.clone(), file.pattern.clone(), e.to_string()],
            );
        }
    }

    fn validate_field_names(&mut self, file: &FileType) {
        let mut names = BTreeSet::new();
        for field in &file.fields {
            if !names.insert(field.name.as_str()) {
                self.error("Duplicate field name", [file.name.as_str(), field.name.as_str()]);
            }
        }
    }

    fn validate_field(&mut self, file: &FileType, field: &Field) {
        if let Some(kind) = field.duplicate_restriction_kind() {
            self.error(
                "Duplicate field restriction",
                [file.name.as_str(), field.name.as_str(), kind.as_str()],
            );
        }

        if field.restriction(RestrictionKind::Codelist).is_some()
            && field.restriction(RestrictionKind::Regex).is_some()
        {
            self.warning(
                "Field has both codelist and regex restrictions",
                [file.name.as_str(), field.name.as_str()],
            );
        }

        for restriction in &field.restrictions {
            match restriction {
                Restriction::Codelist { name } if name.trim().is_empty() => {
                    self.error("Field code list name is blank", [&file.name, &field.name]);
                }
                Restriction::Codelist { name } => {
                    if !self.code_lists.iter().any(|list| &list.name == name) {
                        self.error(
                            "Field invalid code list reference",
                            [&file.name, &field.name, name],
                        );
                    }
                }
                Restriction::Regex { pattern, .. } => {
                    if let Err(e) = regex_lite::Regex::new(pattern) {
                        self.error(
                            "Invalid field regex pattern",
                            [file.name.clone(), field.name.clone(), pattern.clone(), e.to_string()],
                        );
                    }
                }
                Restriction::Script { script, description } => {
                    if description.trim().is_empty() {
                        self.error(
                            "Script restriction is missing description parameter",
                            [&file.name, &field.name],
                        );
                    }
                    if script.trim().is_empty() {
                        self.error(
                            "Script restriction is missing script parameter",
                            [&file.name, &field.name],
                        );
                    }
                }
                Restriction::Range { min, max } => self.validate_range(file, field, min, max),
                Restriction::Required { .. } => {}
            }
        }
    }

    fn validate_range(
        &mut self,
        file: &FileType,
        field: &Field,
        min: &serde_json::Value,
        max: &serde_json::Value,
    ) {
        let numeric = match field.value_type.as_str() {
            "INTEGER" => Some(NumericType::Integer),
            "DECIMAL" => Some(NumericType::Decimal),
            _ => None,
        };
        let Some(numeric) = numeric else {
            self.error(
                "Non-numeric range field value type",
                [&file.name, &field.name, &field.value_type],
            );
            return;
        };

        for (bound, value) in [("min", min), ("max", max)] {
            if !numeric.accepts(value) {
                self.error(
                    &format!("Non {} range {bound} value", numeric.as_str()),
                    [file.name.clone(), field.name.clone(), bound_text(value)],
                );
            }
        }
    }

    fn validate_relation(&mut self, file: &FileType, relation: &Relation) {
        let other = relation.other.as_str();

        if relation.fields.is_empty() {
            self.error("Missing fields for relation", [file.name.as_str(), other]);
        }
        if relation.other_fields.is_empty() {
            self.error("Missing other fields for relation", [file.name.as_str(), other]);
        }
        if relation.fields.len() != relation.other_fields.len() {
            self.error(
                "Mismatched field counts for relation",
                [
                    file.name.clone(),
                    other.to_string(),
                    relation.fields.len().to_string(),
                    relation.other_fields.len().to_string(),
                ],
            );
        }

        for name in &relation.fields {
            if !file.has_field(name) {
                self.error("Invalid field for relation", [file.name.as_str(), other, name]);
            }
        }

        let dict = self.dict;
        let Some(other_file) = dict.file(other) else {
            self.error("Invalid other file for relation", [file.name.as_str(), other]);
            return;
        };

        for name in &relation.other_fields {
            if !other_file.has_field(name) {
                self.error("Invalid other field for relation", [file.name.as_str(), other, name]);
            }
        }

        let uncovered: Vec<&str> = other_file
            .unique_fields
            .iter()
            .flatten()
            .filter(|unique| !relation.other_fields.contains(unique))
            .map(String::as_str)
            .collect();
        if !uncovered.is_empty() {
            let mut context = vec![file.name.as_str(), other];
            context.extend(uncovered);
            self.warning("Other fields are not unique for relation", context);
        }
    }

    fn validate_code_lists(&mut self) {
        let code_lists = self.code_lists;
        for list in code_lists {
            let mut codes = BTreeSet::new();
            let mut values = BTreeSet::new();
            for term in &list.terms {
                if !codes.insert(term.code.as_str()) {
                    self.error("Duplicate code list code", [&list.name, &term.code]);
                }
                if !values.insert(term.value.as_str()) {
                    self.error("Duplicate code list value", [&list.name, &term.value]);
                }
            }
        }
    }
}
