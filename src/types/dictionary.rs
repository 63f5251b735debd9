//! Dictionary and file type definitions.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::field::Field;

/// Error raised when a dictionary payload cannot be used for comparison.
///
/// Carries enough context to tell the caller which version and which element
/// broke the structural invariants.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MalformedDictionaryError {
    /// The payload is not valid dictionary JSON (missing `files`, wrong types, ...).
    #[error("Dictionary payload could not be parsed: {0}")]
    Parse(String),
    /// Two file types share a name.
    #[error("Dictionary {version}: duplicate file type '{name}'")]
    DuplicateFileType {
        /// Dictionary version.
        version: String,
        /// Repeated file type name.
        name: String,
    },
    /// A file type has an empty name.
    #[error("Dictionary {version}: file type at position {index} has a blank name")]
    BlankFileType {
        /// Dictionary version.
        version: String,
        /// Position of the file type in `files`.
        index: usize,
    },
    /// Two fields in one file type share a name.
    #[error("Dictionary {version}: file type '{file}' declares field '{field}' more than once")]
    DuplicateField {
        /// Dictionary version.
        version: String,
        /// Owning file type.
        file: String,
        /// Repeated field name.
        field: String,
    },
    /// A field has an empty name.
    #[error("Dictionary {version}: file type '{file}' has a blank field name at position {index}")]
    BlankField {
        /// Dictionary version.
        version: String,
        /// Owning file type.
        file: String,
        /// Position of the field in `fields`.
        index: usize,
    },
    /// A field carries more than one restriction of the same type.
    #[error("Dictionary {version}: field '{file}.{field}' has more than one '{kind}' restriction")]
    DuplicateRestriction {
        /// Dictionary version.
        version: String,
        /// Owning file type.
        file: String,
        /// Field name.
        field: String,
        /// Restriction type tag.
        kind: String,
    },
}

impl From<serde_json::Error> for MalformedDictionaryError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e.to_string())
    }
}

/// Role of a file type within a submission.
///
/// `System` files are provided by the platform rather than submitters; the
/// role is the only directionality signal available when turning relations
/// into a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileRole {
    /// Submitted by data providers.
    Submission,
    /// Supplied by the system.
    System,
}

impl Default for FileRole {
    fn default() -> Self {
        Self::Submission
    }
}

impl fmt::Display for FileRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Submission => write!(f, "SUBMISSION"),
            Self::System => write!(f, "SYSTEM"),
        }
    }
}

/// A foreign-key-like join between the owning file type and `other`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relation {
    /// Name of the related file type.
    pub other: String,
    /// Join fields on the owning side.
    #[serde(default)]
    pub fields: Vec<String>,
    /// Join fields on the `other` side.
    #[serde(default)]
    pub other_fields: Vec<String>,
    /// Whether every `other` row must be referenced back.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bidirectional: Option<bool>,
    /// Indices into `fields` that may be left empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optionals: Option<Vec<u32>>,
}

impl Relation {
    /// Create a relation with matching join fields.
    pub fn new(
        other: impl Into<String>,
        fields: Vec<String>,
        other_fields: Vec<String>,
    ) -> Self {
        Self {
            other: other.into(),
            fields,
            other_fields,
            bidirectional: None,
            optionals: None,
        }
    }
}

/// One submittable file category.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileType {
    /// Unique key within a dictionary.
    pub name: String,
    /// Human readable label.
    #[serde(default)]
    pub label: String,
    /// Regex describing valid file names.
    #[serde(default)]
    pub pattern: String,
    /// Submission or system file.
    #[serde(default)]
    pub role: FileRole,
    /// Joins to other file types.
    #[serde(default)]
    pub relations: Vec<Relation>,
    /// Columns of the file.
    #[serde(default)]
    pub fields: Vec<Field>,
    /// Fields forming the file's unique key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_fields: Option<Vec<String>>,
}

impl FileType {
    /// Create an empty submission file type.
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

    /// Set the file name pattern.
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = pattern.into();
        self
    }

    /// Set the role.
    pub fn with_role(mut self, role: FileRole) -> Self {
        self.role = role;
        self
    }

    /// Append a field.
    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Append a relation.
    pub fn with_relation(mut self, relation: Relation) -> Self {
        self.relations.push(relation);
        self
    }

    /// Set the unique key fields.
    pub fn with_unique_fields(mut self, fields: Vec<String>) -> Self {
        self.unique_fields = Some(fields);
        self
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Whether the file declares a field of this name.
    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Field names in declaration order.
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// Whether the file is supplied by the system.
    pub fn is_system(&self) -> bool {
        self.role == FileRole::System
    }
}

/// A versioned schema describing submittable file types.
///
/// Snapshots are immutable once fetched; share them behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Dictionary {
    /// Version string, e.g. `0.10a`.
    #[serde(default)]
    pub version: String,
    /// File types in payload order.
    pub files: Vec<FileType>,
}

impl Dictionary {
    /// Create an empty dictionary for a version.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            files: Vec::new(),
        }
    }

    /// Append a file type.
    pub fn with_file(mut self, file: FileType) -> Self {
        self.files.push(file);
        self
    }

    /// Parse a dictionary payload and check its structural invariants.
    pub fn from_json(payload: &str) -> Result<Self, MalformedDictionaryError> {
        let dict: Self = serde_json::from_str(payload)?;
        dict.check_well_formed()?;
        Ok(dict)
    }

    /// Look up a file type by name.
    pub fn file(&self, name: &str) -> Option<&FileType> {
        self.files.iter().find(|f| f.name == name)
    }

    /// Look up a field of a file type.
    pub fn field(&self, file: &str, field: &str) -> Option<&Field> {
        self.file(file).and_then(|f| f.field(field))
    }

    /// Whether a file type of this name exists.
    pub fn has_file(&self, name: &str) -> bool {
        self.file(name).is_some()
    }

    /// File type names in payload order.
    pub fn file_names(&self) -> Vec<&str> {
        self.files.iter().map(|f| f.name.as_str()).collect()
    }

    /// Find the file type whose pattern matches a concrete file name.
    ///
    /// Patterns that fail to compile never match.
    pub fn file_for_filename(&self, filename: &str) -> Option<&FileType> {
        self.files.iter().find(|f| {
            regex_lite::Regex::new(&f.pattern)
                .map(|re| re.is_match(filename))
                .unwrap_or(false)
        })
    }

    /// Check uniqueness of file names, field names and restriction types.
    pub fn check_well_formed(&self) -> Result<(), MalformedDictionaryError> {
        let mut file_names = BTreeSet::new();

        for (index, file) in self.files.iter().enumerate() {
            if file.name.trim().is_empty() {
                return Err(MalformedDictionaryError::BlankFileType {
                    version: self.version.clone(),
                    index,
                });
            }
            if !file_names.insert(file.name.as_str()) {
                return Err(MalformedDictionaryError::DuplicateFileType {
                    version: self.version.clone(),
                    name: file.name.clone(),
                });
            }

            let mut field_names = BTreeSet::new();
            for (index, field) in file.fields.iter().enumerate() {
                if field.name.trim().is_empty() {
                    return Err(MalformedDictionaryError::BlankField {
                        version: self.version.clone(),
                        file: file.name.clone(),
                        index,
                    });
                }
                if !field_names.insert(field.name.as_str()) {
                    return Err(MalformedDictionaryError::DuplicateField {
                        version: self.version.clone(),
                        file: file.name.clone(),
                        field: field.name.clone(),
                    });
                }
                if let Some(kind) = field.duplicate_restriction_kind() {
                    return Err(MalformedDictionaryError::DuplicateRestriction {
                        version: self.version.clone(),
                        file: file.name.clone(),
                        field: field.name.clone(),
                        kind: kind.to_string(),
                    });
                }
            }
        }

        Ok(())
    }
}
