//! Code list coverage.
//!
//! Which file types reference a code list in a given version. An unused code
//! list is a valid result, not an error.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::types::{CodeList, Dictionary};

/// Error raised when a code list name is not in the known set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown code list: {name}")]
pub struct UnknownCodeListError {
    /// The unresolved code list name.
    pub name: String,
}

/// File types referencing `code_list_name`, each once, in file order.
pub fn coverage(code_list_name: &str, dict: &Dictionary) -> Vec<String> {
    dict.files
        .iter()
        .filter(|file| {
            file.fields
                .iter()
                .any(|field| field.codelist_name() == Some(code_list_name))
        })
        .map(|file| file.name.clone())
        .collect()
}

/// Names of all code lists referenced anywhere in the dictionary.
pub fn referenced_code_lists(dict: &Dictionary) -> BTreeSet<&str> {
    dict.files
        .iter()
        .flat_map(|file| file.fields.iter())
        .filter_map(|field| field.codelist_name())
        .collect()
}

/// Resolve a code list by name.
pub fn resolve_code_list<'a>(
    name: &str,
    code_lists: &'a [CodeList],
) -> Result<&'a CodeList, UnknownCodeListError> {
    code_lists
        .iter()
        .find(|list| list.name == name)
        .ok_or_else(|| UnknownCodeListError {
            name: name.to_string(),
        })
}

/// Coverage of a code list that must exist in `code_lists`.
pub fn checked_coverage(
    code_list_name: &str,
    dict: &Dictionary,
    code_lists: &[CodeList],
) -> Result<Vec<String>, UnknownCodeListError> {
    resolve_code_list(code_list_name, code_lists)?;
    Ok(coverage(code_list_name, dict))
}

/// Code lists split by whether a version references them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CodeListPartition {
    /// Referenced code lists with the file types using them.
    pub used: Vec<CodeListUsage>,
    /// Names of code lists no field references.
    pub unused: Vec<String>,
}

/// A referenced code list and where it is used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeListUsage {
    /// Code list name.
    pub name: String,
    /// File types referencing it, in file order.
    pub file_types: Vec<String>,
}

/// Split `code_lists` into used and unused for one dictionary version.
///
/// Input order is preserved within each side.
pub fn partition_code_lists(code_lists: &[CodeList], dict: &Dictionary) -> CodeListPartition {
    let referenced = referenced_code_lists(dict);
    let mut partition = CodeListPartition::default();

    for list in code_lists {
        if referenced.contains(list.name.as_str()) {
            partition.used.push(CodeListUsage {
                name: list.name.clone(),
                file_types: coverage(&list.name, dict),
            });
        } else {
            partition.unused.push(list.name.clone());
        }
    }

    partition
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Field, FileType, Restriction, Term};

    fn coded(name: &str, list: &str) -> Field {
        Field::new(name).with_restriction(Restriction::codelist(list))
    }

    fn sample_dict() -> Dictionary {
        Dictionary::new("1")
            .with_file(
                FileType::new("donor")
                    .with_field(coded("donor_tumour_stage_at_diagnosis", "tumour_stage"))
                    .with_field(coded("donor_relapse_stage", "tumour_stage"))
                    .with_field(coded("donor_sex", "donor.donor_sex")),
            )
            .with_file(FileType::new("specimen").with_field(Field::new("specimen_id")))
            .with_file(FileType::new("sample").with_field(coded("tumour_stage", "tumour_stage")))
    }

    #[test]
    fn test_each_file_once_in_order() {
        assert_eq!(coverage("tumour_stage", &sample_dict()), vec!["donor", "sample"]);
    }

    #[test]
    fn test_unused_is_empty() {
        assert!(coverage("specimen.specimen_type", &sample_dict()).is_empty());
    }

    #[test]
    fn test_checked_coverage_rejects_unknown() {
        let lists = vec![CodeList::new("tumour_stage", vec![Term::new("1", "I")])];

        assert_eq!(
            checked_coverage("tumour_stage", &sample_dict(), &lists).unwrap(),
            vec!["donor", "sample"]
        );
        assert_eq!(
            checked_coverage("nope", &sample_dict(), &lists),
            Err(UnknownCodeListError {
                name: "nope".to_string()
            })
        );
    }

    #[test]
    fn test_partition() {
        let lists = vec![
            CodeList::new("donor.donor_sex", vec![]),
            CodeList::new("specimen.specimen_type", vec![]),
            CodeList::new("tumour_stage", vec![]),
        ];

        let partition = partition_code_lists(&lists, &sample_dict());
        let used: Vec<&str> = partition.used.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(used, vec!["donor.donor_sex", "tumour_stage"]);
        assert_eq!(partition.used[0].file_types, vec!["donor"]);
        assert_eq!(partition.unused, vec!["specimen.specimen_type"]);
    }
}
