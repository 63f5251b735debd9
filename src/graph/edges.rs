//! Parent edge derivation.

use std::collections::BTreeMap;

use crate::types::{Dictionary, FileRole, RelationEdge};

/// Derive parent → child edges from a dictionary's relations.
///
/// For each file type `f`:
/// - no relations: `f` is top level (`parentNode: null`)
/// - relation to a `SYSTEM` file `o`: `o` becomes a child of `f`
/// - relation to any other file `o`: `f` becomes a child of `o`
///
/// Roles are the only directionality signal in the relation model; the
/// `SYSTEM` flip is kept for compatibility with existing consumers. A relation
/// to a file missing from the dictionary is treated as non-`SYSTEM`.
///
/// Edges are returned in file order, then relation order. Duplicates are kept.
pub fn derive_parent_edges(dict: &Dictionary) -> Vec<RelationEdge> {
    let roles: BTreeMap<&str, FileRole> = dict
        .files
        .iter()
        .map(|f| (f.name.as_str(), f.role))
        .collect();

    let mut edges = Vec::new();

    for file in &dict.files {
        if file.relations.is_empty() {
            edges.push(RelationEdge::root(&file.name));
            continue;
        }

        for relation in &file.relations {
            match roles.get(relation.other.as_str()) {
                Some(FileRole::System) => {
                    edges.push(RelationEdge::new(&relation.other, &file.name));
                }
                Some(FileRole::Submission) => {
                    edges.push(RelationEdge::new(&file.name, &relation.other));
                }
                None => {
                    tracing::warn!(
                        version = %dict.version,
                        file = %file.name,
                        other = %relation.other,
                        "relation references a file type missing from the dictionary"
                    );
                    edges.push(RelationEdge::new(&file.name, &relation.other));
                }
            }
        }
    }

    edges
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FileType, Relation};

    fn join(other: &str, key: &str) -> Relation {
        Relation::new(other, vec![key.to_string()], vec![key.to_string()])
    }

    #[test]
    fn test_submission_relation_points_up() {
        let dict = Dictionary::new("1")
            .with_file(FileType::new("donor"))
            .with_file(FileType::new("specimen").with_relation(join("donor", "donor_id")));

        let edges = derive_parent_edges(&dict);
        assert_eq!(
            edges,
            vec![
                RelationEdge::root("donor"),
                RelationEdge::new("specimen", "donor"),
            ]
        );
    }

    #[test]
    fn test_system_relation_flips() {
        let dict = Dictionary::new("1")
            .with_file(FileType::new("meth_array_probes").with_role(FileRole::System))
            .with_file(
                FileType::new("meth_array_p")
                    .with_relation(join("meth_array_m", "analysis_id"))
                    .with_relation(join("meth_array_probes", "probe_id")),
            )
            .with_file(FileType::new("meth_array_m"));

        let edges = derive_parent_edges(&dict);
        assert!(edges.contains(&RelationEdge::new("meth_array_p", "meth_array_m")));
        assert!(edges.contains(&RelationEdge::new("meth_array_probes", "meth_array_p")));
        assert!(edges.contains(&RelationEdge::root("meth_array_probes")));
        assert_eq!(edges.len(), 4);
    }

    #[test]
    fn test_unknown_other_is_not_system() {
        let dict = Dictionary::new("1")
            .with_file(FileType::new("sample").with_relation(join("specimen", "specimen_id")));

        assert_eq!(
            derive_parent_edges(&dict),
            vec![RelationEdge::new("sample", "specimen")]
        );
    }
}
