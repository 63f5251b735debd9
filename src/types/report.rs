//! Change report types produced by the diff engine.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::field::{Field, RestrictionKind};

/// Process-unique identifier of a change entry.
///
/// UI layers key rows off this rather than array position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChangeId(Uuid);

impl ChangeId {
    /// Generate a fresh identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the inner UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for ChangeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Aspect of a field that changed between versions.
///
/// Declaration order is the order entries appear in `changes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldChange {
    /// The `controlled` flag flipped.
    Controlled,
    /// The regex restriction changed.
    Regex,
    /// The required restriction changed.
    Required,
    /// The script restriction changed.
    Script,
    /// The codelist restriction changed.
    Codelist,
}

impl FieldChange {
    /// Change class for a restriction kind.
    ///
    /// `range` has no class of its own: a range edit marks the field as
    /// changed without a detailed category.
    pub fn from_kind(kind: RestrictionKind) -> Option<Self> {
        match kind {
            RestrictionKind::Regex => Some(Self::Regex),
            RestrictionKind::Required => Some(Self::Required),
            RestrictionKind::Script => Some(Self::Script),
            RestrictionKind::Codelist => Some(Self::Codelist),
            RestrictionKind::Range => None,
        }
    }

    /// Wire literal.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Controlled => "controlled",
            Self::Regex => "regex",
            Self::Required => "required",
            Self::Script => "script",
            Self::Codelist => "codelist",
        }
    }
}

impl fmt::Display for FieldChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Serializes as `{}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Absent {}

/// Old or new side of a change entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChangeValue {
    /// A field definition.
    Field(Box<Field>),
    /// A file-level property (label or pattern).
    Text(String),
    /// The side does not exist.
    Absent(Absent),
}

impl ChangeValue {
    /// The absent side, `{}` on the wire.
    pub fn absent() -> Self {
        Self::Absent(Absent {})
    }

    /// Wrap a field.
    pub fn field(field: &Field) -> Self {
        Self::Field(Box::new(field.clone()))
    }

    /// Whether this side is absent.
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent(_))
    }

    /// The field, if this side holds one.
    pub fn as_field(&self) -> Option<&Field> {
        match self {
            Self::Field(field) => Some(field),
            _ => None,
        }
    }
}

/// One row of a change report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEntry {
    /// Unique row identifier.
    pub id: ChangeId,
    /// Owning file type name.
    #[serde(rename = "type")]
    pub file_type: String,
    /// Field name, or the property name for file-level changes.
    pub name: String,
    /// Value in the older version.
    pub from: ChangeValue,
    /// Value in the newer version.
    pub to: ChangeValue,
    /// Changed aspects, for `fieldsChanged` entries only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changes: Option<Vec<FieldChange>>,
}

impl ChangeEntry {
    /// Create an entry with a fresh id.
    pub fn new(
        file_type: impl Into<String>,
        name: impl Into<String>,
        from: ChangeValue,
        to: ChangeValue,
    ) -> Self {
        Self {
            id: ChangeId::generate(),
            file_type: file_type.into(),
            name: name.into(),
            from,
            to,
            changes: None,
        }
    }

    /// Attach the changed aspects.
    pub fn with_changes(mut self, changes: Vec<FieldChange>) -> Self {
        self.changes = Some(changes);
        self
    }
}

/// The four report buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChangeBucket {
    /// Field present only in the newer version.
    FieldsAdded,
    /// Field present only in the older version.
    FieldsRemoved,
    /// Field present in both with differing attributes.
    FieldsChanged,
    /// File label or pattern changed.
    FileDataChanged,
}

/// Per-file-type counts of each bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileChangeCounts {
    /// Entries in `fieldsAdded`.
    pub added: usize,
    /// Entries in `fieldsRemoved`.
    pub removed: usize,
    /// Entries in `fieldsChanged`.
    pub changed: usize,
    /// Entries in `fileDataChanged`.
    pub file_data: usize,
}

impl FileChangeCounts {
    /// Sum of all buckets.
    pub fn total(&self) -> usize {
        self.added + self.removed + self.changed + self.file_data
    }
}

/// Id-free view of one entry, used to compare reports regardless of ids and order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct EntrySignature {
    /// Bucket holding the entry.
    pub bucket: ChangeBucket,
    /// Owning file type.
    pub file_type: String,
    /// Entry name.
    pub name: String,
    /// Changed aspects.
    pub changes: Vec<FieldChange>,
}

/// Structured output of comparing two dictionary versions.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeReport {
    /// Fields present only in the newer version.
    pub fields_added: Vec<ChangeEntry>,
    /// Fields present only in the older version.
    pub fields_removed: Vec<ChangeEntry>,
    /// Fields whose restrictions or controlled flag changed.
    pub fields_changed: Vec<ChangeEntry>,
    /// File-level label or pattern changes.
    pub file_data_changed: Vec<ChangeEntry>,
}

impl ChangeReport {
    /// Create an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry to a bucket.
    pub fn push(&mut self, bucket: ChangeBucket, entry: ChangeEntry) {
        self.bucket_mut(bucket).push(entry);
    }

    /// Entries of one bucket.
    pub fn bucket(&self, bucket: ChangeBucket) -> &[ChangeEntry] {
        match bucket {
            ChangeBucket::FieldsAdded => &self.fields_added,
            ChangeBucket::FieldsRemoved => &self.fields_removed,
            ChangeBucket::FieldsChanged => &self.fields_changed,
            ChangeBucket::FileDataChanged => &self.file_data_changed,
        }
    }

    fn bucket_mut(&mut self, bucket: ChangeBucket) -> &mut Vec<ChangeEntry> {
        match bucket {
            ChangeBucket::FieldsAdded => &mut self.fields_added,
            ChangeBucket::FieldsRemoved => &mut self.fields_removed,
            ChangeBucket::FieldsChanged => &mut self.fields_changed,
            ChangeBucket::FileDataChanged => &mut self.file_data_changed,
        }
    }

    /// Iterate all entries with their bucket.
    pub fn entries(&self) -> impl Iterator<Item = (ChangeBucket, &ChangeEntry)> {
        [
            ChangeBucket::FieldsAdded,
            ChangeBucket::FieldsRemoved,
            ChangeBucket::FieldsChanged,
            ChangeBucket::FileDataChanged,
        ]
        .into_iter()
        .flat_map(move |bucket| self.bucket(bucket).iter().map(move |e| (bucket, e)))
    }

    /// Total number of entries.
    pub fn len(&self) -> usize {
        self.fields_added.len()
            + self.fields_removed.len()
            + self.fields_changed.len()
            + self.file_data_changed.len()
    }

    /// Whether no differences were found.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entries belonging to one file type, across buckets.
    pub fn entries_for_type<'a>(
        &'a self,
        file_type: &'a str,
    ) -> impl Iterator<Item = (ChangeBucket, &'a ChangeEntry)> + 'a {
        self.entries().filter(move |(_, e)| e.file_type == file_type)
    }

    /// Look up an entry by id.
    pub fn get(&self, id: ChangeId) -> Option<(ChangeBucket, &ChangeEntry)> {
        self.entries().find(|(_, e)| e.id == id)
    }

    /// Counts per file type, ordered by file type name.
    pub fn summary(&self) -> BTreeMap<String, FileChangeCounts> {
        let mut summary: BTreeMap<String, FileChangeCounts> = BTreeMap::new();
        for (bucket, entry) in self.entries() {
            let counts = summary.entry(entry.file_type.clone()).or_default();
            match bucket {
                ChangeBucket::FieldsAdded => counts.added += 1,
                ChangeBucket::FieldsRemoved => counts.removed += 1,
                ChangeBucket::FieldsChanged => counts.changed += 1,
                ChangeBucket::FileDataChanged => counts.file_data += 1,
            }
        }
        summary
    }

    /// Sorted, id-free view of the report.
    pub fn signature(&self) -> Vec<EntrySignature> {
        let mut signature: Vec<EntrySignature> = self
            .entries()
            .map(|(bucket, e)| EntrySignature {
                bucket,
                file_type: e.file_type.clone(),
                name: e.name.clone(),
                changes: e.changes.clone().unwrap_or_default(),
            })
            .collect();
        signature.sort();
        signature
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_wire_shape() {
        let entry = ChangeEntry::new(
            "donor",
            "donor_sex",
            ChangeValue::field(&Field::new("donor_sex")),
            ChangeValue::absent(),
        );
        let json = serde_json::to_value(&entry).unwrap();

        assert_eq!(json["type"], "donor");
        assert_eq!(json["to"], serde_json::json!({}));
        assert_eq!(json["from"]["name"], "donor_sex");
        assert!(json.get("changes").is_none());
    }

    #[test]
    fn test_absent_round_trips_as_absent() {
        let value: ChangeValue = serde_json::from_str("{}").unwrap();
        assert!(value.is_absent());
    }

    #[test]
    fn test_ids_are_unique() {
        let a = ChangeEntry::new("donor", "a", ChangeValue::absent(), ChangeValue::absent());
        let b = ChangeEntry::new("donor", "a", ChangeValue::absent(), ChangeValue::absent());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_summary_counts() {
        let mut report = ChangeReport::new();
        report.push(
            ChangeBucket::FieldsAdded,
            ChangeEntry::new("donor", "a", ChangeValue::absent(), ChangeValue::absent()),
        );
        report.push(
            ChangeBucket::FieldsChanged,
            ChangeEntry::new("donor", "b", ChangeValue::absent(), ChangeValue::absent())
                .with_changes(vec![FieldChange::Regex]),
        );
        report.push(
            ChangeBucket::FieldsRemoved,
            ChangeEntry::new("sample", "c", ChangeValue::absent(), ChangeValue::absent()),
        );

        let summary = report.summary();
        assert_eq!(summary["donor"].added, 1);
        assert_eq!(summary["donor"].changed, 1);
        assert_eq!(summary["donor"].total(), 2);
        assert_eq!(summary["sample"].removed, 1);
        assert_eq!(report.len(), 3);
        assert_eq!(report.entries_for_type("donor").count(), 2);
    }

    #[test]
    fn test_bucket_serialization_keys() {
        let json = serde_json::to_value(ChangeReport::new()).unwrap();
        for key in ["fieldsAdded", "fieldsRemoved", "fieldsChanged", "fileDataChanged"] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
    }
}
