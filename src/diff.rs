//! Dictionary diff engine.
//!
//! Walks two dictionary snapshots and produces a [`ChangeReport`].

use std::collections::BTreeMap;

use crate::compare::{diff_field_detailed, is_file_label_changed, is_file_pattern_changed};
use crate::policy::FileOrdering;
use crate::types::{
    ChangeBucket, ChangeEntry, ChangeReport, ChangeValue, Dictionary, Field, FileType,
    MalformedDictionaryError,
};

/// Entry name used for file pattern changes.
///
/// Label changes have no fixed name: their entry is named by the new label.
/// A field in the same file that happens to carry that exact name shares the
/// entry's `(type, name)` key, so consumers keying on that pair across
/// buckets must also check the bucket.
pub const FILE_PATTERN_ENTRY_NAME: &str = "File Name Pattern";

/// Deterministic dictionary diff engine.
///
/// ## Algorithm
///
/// 1. Check both snapshots for structural well-formedness
/// 2. Sort both file lists by the ordering table
/// 3. For each `from` file:
///    - absent in `to`: every field is removed
///    - present: label/pattern changes, then removed or changed fields,
///      then fields added to the file
/// 4. For each `to` file absent from `from`: every field is added
///
/// Removing fields never produces a file-level entry.
#[derive(Debug, Clone, Default)]
pub struct DiffEngine {
    ordering: FileOrdering,
}

impl DiffEngine {
    /// Create an engine with a custom ordering table.
    pub fn new(ordering: FileOrdering) -> Self {
        Self { ordering }
    }

    /// Get the ordering table.
    pub fn ordering(&self) -> &FileOrdering {
        &self.ordering
    }

    /// Compare two dictionary versions.
    ///
    /// Fails before producing any entry if either snapshot is malformed.
    pub fn compute(
        &self,
        from: &Dictionary,
        to: &Dictionary,
    ) -> Result<ChangeReport, MalformedDictionaryError> {
        from.check_well_formed()?;
        to.check_well_formed()?;

        let mut report = ChangeReport::new();

        if from.files == to.files {
            tracing::debug!(
                from_version = %from.version,
                to_version = %to.version,
                "identical dictionary content, empty diff"
            );
            return Ok(report);
        }

        let files_from = self.ordering.sorted(&from.files);
        let files_to = self.ordering.sorted(&to.files);

        let index_to: BTreeMap<&str, &FileType> =
            files_to.iter().map(|f| (f.name.as_str(), *f)).collect();
        let index_from: BTreeMap<&str, &FileType> =
            files_from.iter().map(|f| (f.name.as_str(), *f)).collect();

        for file_from in &files_from {
            match index_to.get(file_from.name.as_str()) {
                None => {
                    for field in &file_from.fields {
                        report.push(
                            ChangeBucket::FieldsRemoved,
                            ChangeEntry::new(
                                &file_from.name,
                                &field.name,
                                ChangeValue::field(field),
                                ChangeValue::absent(),
                            ),
                        );
                    }
                }
                Some(file_to) => diff_file(&mut report, file_from, file_to),
            }
        }

        for file_to in &files_to {
            if index_from.contains_key(file_to.name.as_str()) {
                continue;
            }
            for field in &file_to.fields {
                report.push(
                    ChangeBucket::FieldsAdded,
                    ChangeEntry::new(
                        &file_to.name,
                        &field.name,
                        ChangeValue::absent(),
                        ChangeValue::field(field),
                    ),
                );
            }
        }

        tracing::debug!(
            from_version = %from.version,
            to_version = %to.version,
            added = report.fields_added.len(),
            removed = report.fields_removed.len(),
            changed = report.fields_changed.len(),
            file_data_changed = report.file_data_changed.len(),
            "dictionary diff computed"
        );

        Ok(report)
    }
}

/// Diff one file type present in both versions.
fn diff_file(report: &mut ChangeReport, file_from: &FileType, file_to: &FileType) {
    if is_file_label_changed(file_from, file_to) {
        report.push(
            ChangeBucket::FileDataChanged,
            ChangeEntry::new(
                &file_to.name,
                &file_to.label,
                ChangeValue::Text(file_from.label.clone()),
                ChangeValue::Text(file_to.label.clone()),
            ),
        );
    }

    if is_file_pattern_changed(file_from, file_to) {
        report.push(
            ChangeBucket::FileDataChanged,
            ChangeEntry::new(
                &file_to.name,
                FILE_PATTERN_ENTRY_NAME,
                ChangeValue::Text(file_from.pattern.clone()),
                ChangeValue::Text(file_to.pattern.clone()),
            ),
        );
    }

    let fields_to: BTreeMap<&str, &Field> =
        file_to.fields.iter().map(|f| (f.name.as_str(), f)).collect();

    for field_from in &file_from.fields {
        match fields_to.get(field_from.name.as_str()) {
            None => report.push(
                ChangeBucket::FieldsRemoved,
                ChangeEntry::new(
                    &file_from.name,
                    &field_from.name,
                    ChangeValue::field(field_from),
                    ChangeValue::absent(),
                ),
            ),
            Some(field_to) => {
                let changes = diff_field_detailed(field_from, field_to);
                if !changes.is_empty() {
                    report.push(
                        ChangeBucket::FieldsChanged,
                        ChangeEntry::new(
                            &file_from.name,
                            &field_from.name,
                            ChangeValue::field(field_from),
                            ChangeValue::field(field_to),
                        )
                        .with_changes(changes),
                    );
                }
            }
        }
    }

    for field_to in &file_to.fields {
        if !file_from.has_field(&field_to.name) {
            report.push(
                ChangeBucket::FieldsAdded,
                ChangeEntry::new(
                    &file_to.name,
                    &field_to.name,
                    ChangeValue::absent(),
                    ChangeValue::field(field_to),
                ),
            );
        }
    }
}

/// Compare two dictionary versions using the default ordering table.
pub fn compute_diff(
    from: &Dictionary,
    to: &Dictionary,
) -> Result<ChangeReport, MalformedDictionaryError> {
    DiffEngine::default().compute(from, to)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FieldChange, Restriction};

    fn donor(fields: Vec<Field>) -> FileType {
        let mut file = FileType::new("donor").with_label("Donor").with_pattern("^donor.txt$");
        file.fields = fields;
        file
    }

    fn dict(version: &str, files: Vec<FileType>) -> Dictionary {
        Dictionary {
            version: version.to_string(),
            files,
        }
    }

    #[test]
    fn test_self_diff_is_empty() {
        let d = dict("1", vec![donor(vec![Field::new("donor_id"), Field::new("sex")])]);
        assert!(compute_diff(&d, &d).unwrap().is_empty());
    }

    #[test]
    fn test_field_changed() {
        let from = dict("1", vec![donor(vec![Field::new("sex")])]);
        let to = dict(
            "2",
            vec![donor(vec![Field::new("sex").with_restriction(Restriction::required(false))])],
        );

        let report = compute_diff(&from, &to).unwrap();
        assert_eq!(report.fields_changed.len(), 1);
        let entry = &report.fields_changed[0];
        assert_eq!(entry.file_type, "donor");
        assert_eq!(entry.name, "sex");
        assert_eq!(entry.changes, Some(vec![FieldChange::Required]));
        assert!(report.fields_added.is_empty());
        assert!(report.fields_removed.is_empty());
    }

    #[test]
    fn test_field_removed_not_changed() {
        let from = dict("1", vec![donor(vec![Field::new("donor_id"), Field::new("age")])]);
        let to = dict("2", vec![donor(vec![Field::new("donor_id")])]);

        let report = compute_diff(&from, &to).unwrap();
        assert_eq!(report.fields_removed.len(), 1);
        assert_eq!(report.fields_removed[0].name, "age");
        assert!(report.fields_removed[0].to.is_absent());
        assert!(report.fields_changed.is_empty());
        assert!(report.file_data_changed.is_empty());
    }

    #[test]
    fn test_removed_file_emits_field_entries() {
        let sample = FileType::new("sample")
            .with_field(Field::new("sample_id"))
            .with_field(Field::new("specimen_id"));
        let from = dict("1", vec![donor(vec![]), sample.clone()]);
        let to = dict("2", vec![donor(vec![])]);

        let report = compute_diff(&from, &to).unwrap();
        assert_eq!(report.fields_removed.len(), 2);
        assert!(report.fields_removed.iter().all(|e| e.file_type == "sample"));
        assert_eq!(
            report.fields_removed[0].from.as_field().map(|f| f.name.as_str()),
            Some("sample_id")
        );
    }

    #[test]
    fn test_new_file_emits_added_once() {
        let from = dict("1", vec![donor(vec![])]);
        let to = dict(
            "2",
            vec![donor(vec![]), FileType::new("exposure").with_field(Field::new("tobacco"))],
        );

        let report = compute_diff(&from, &to).unwrap();
        assert_eq!(report.fields_added.len(), 1);
        assert!(report.fields_added[0].from.is_absent());
    }

    #[test]
    fn test_file_data_changed_without_fields() {
        let from = dict("1", vec![donor(vec![])]);
        let to = dict(
            "2",
            vec![donor(vec![]).with_label("Donor clinical").with_pattern("^donor\\.txt$")],
        );

        let report = compute_diff(&from, &to).unwrap();
        assert_eq!(report.file_data_changed.len(), 2);
        assert_eq!(report.file_data_changed[0].name, "Donor clinical");
        assert_eq!(report.file_data_changed[0].from, ChangeValue::Text("Donor".to_string()));
        assert_eq!(report.file_data_changed[1].name, FILE_PATTERN_ENTRY_NAME);
        assert_eq!(report.len(), 2);
    }

    #[test]
    fn test_label_entry_named_by_new_label() {
        let from = dict("1", vec![donor(vec![Field::new("donor_id")])]);
        let to = dict(
            "2",
            vec![donor(vec![Field::new("donor_id").with_controlled(true)]).with_label("donor_id")],
        );

        let report = compute_diff(&from, &to).unwrap();
        assert_eq!(report.file_data_changed.len(), 1);
        assert_eq!(report.fields_changed.len(), 1);

        // Same (type, name) key, told apart by bucket and value shape
        let label = &report.file_data_changed[0];
        let field = &report.fields_changed[0];
        assert_eq!((label.file_type.as_str(), label.name.as_str()), ("donor", "donor_id"));
        assert_eq!((field.file_type.as_str(), field.name.as_str()), ("donor", "donor_id"));
        assert_eq!(label.to, ChangeValue::Text("donor_id".to_string()));
        assert!(field.to.as_field().is_some());
    }

    #[test]
    fn test_version_only_difference_is_empty() {
        let from = dict("1", vec![donor(vec![Field::new("donor_id")])]);
        let to = dict("2", vec![donor(vec![Field::new("donor_id")])]);
        assert!(compute_diff(&from, &to).unwrap().is_empty());

        let changed = dict(
            "2",
            vec![donor(vec![Field::new("donor_id").with_controlled(true)])],
        );
        let report = compute_diff(&from, &changed).unwrap();
        assert_eq!(report.fields_changed.len(), 1);
    }

    #[test]
    fn test_malformed_input_fails_fast() {
        let good = dict("1", vec![donor(vec![])]);
        let bad = dict("2", vec![donor(vec![]), donor(vec![])]);

        let err = compute_diff(&good, &bad).unwrap_err();
        assert!(matches!(err, MalformedDictionaryError::DuplicateFileType { .. }));
    }

    #[test]
    fn test_output_follows_ordering_table() {
        let from = dict("1", vec![]);
        let to = dict(
            "2",
            vec![
                FileType::new("sample").with_field(Field::new("a")),
                FileType::new("custom").with_field(Field::new("b")),
                FileType::new("donor").with_field(Field::new("c")),
            ],
        );

        let report = compute_diff(&from, &to).unwrap();
        let types: Vec<&str> = report.fields_added.iter().map(|e| e.file_type.as_str()).collect();
        assert_eq!(types, vec!["donor", "sample", "custom"]);
    }
}
