//! Field- and file-level comparison primitives.
//!
//! All functions are pure. Restriction lists are compared by kind, so
//! reordering restrictions within a field is never a change.

use regex_lite::Regex;

use crate::types::{Field, FieldChange, FileType, Restriction, RestrictionKind};

/// Whether two versions of a field differ in restrictions or label.
///
/// Restrictions are compared as a set; order is irrelevant.
pub fn is_field_changed(from: &Field, to: &Field) -> bool {
    from.label != to.label || !same_restrictions(&from.restrictions, &to.restrictions)
}

fn same_restrictions(a: &[Restriction], b: &[Restriction]) -> bool {
    a.len() == b.len() && a.iter().all(|r| b.contains(r)) && b.iter().all(|r| a.contains(r))
}

/// Which aspects of a field changed.
///
/// Returns a subset of controlled, regex, required, script, codelist in that
/// order. A restriction present on one side only is always a change.
pub fn diff_field_detailed(from: &Field, to: &Field) -> Vec<FieldChange> {
    let mut changes = Vec::new();

    if from.controlled != to.controlled {
        changes.push(FieldChange::Controlled);
    }

    for kind in RestrictionKind::ALL {
        let Some(change) = FieldChange::from_kind(kind) else {
            continue;
        };
        if from.restriction(kind) != to.restriction(kind) {
            changes.push(change);
        }
    }

    changes
}

/// Whether the file name pattern changed.
pub fn is_file_pattern_changed(from: &FileType, to: &FileType) -> bool {
    from.pattern != to.pattern
}

/// Whether the file label changed.
pub fn is_file_label_changed(from: &FileType, to: &FileType) -> bool {
    from.label != to.label
}

/// Whether a field matches a search pattern by name or by code list name.
pub fn matches_query(field: &Field, pattern: &Regex) -> bool {
    pattern.is_match(&field.name)
        || field
            .codelist_name()
            .map(|name| pattern.is_match(name))
            .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sex_field() -> Field {
        Field::new("donor_sex")
            .with_label("Donor sex")
            .with_restriction(Restriction::required(false))
            .with_restriction(Restriction::codelist("donor.donor_sex"))
    }

    #[test]
    fn test_reordered_restrictions_unchanged() {
        let from = sex_field();
        let mut to = sex_field();
        to.restrictions.reverse();

        assert!(!is_field_changed(&from, &to));
        assert!(diff_field_detailed(&from, &to).is_empty());
    }

    #[test]
    fn test_label_change_is_field_change() {
        let from = sex_field();
        let to = sex_field().with_label("Sex");

        assert!(is_field_changed(&from, &to));
        // Label is not part of the detailed taxonomy
        assert!(diff_field_detailed(&from, &to).is_empty());
    }

    #[test]
    fn test_detailed_order_is_fixed() {
        let from = Field::new("x").with_restriction(Restriction::codelist("a"));
        let to = Field::new("x")
            .with_controlled(true)
            .with_restriction(Restriction::regex("^[0-9]+$"))
            .with_restriction(Restriction::codelist("b"));

        assert_eq!(
            diff_field_detailed(&from, &to),
            vec![FieldChange::Controlled, FieldChange::Regex, FieldChange::Codelist]
        );
    }

    #[test]
    fn test_config_change_detected() {
        let from = Field::new("x").with_restriction(Restriction::required(false));
        let to = Field::new("x").with_restriction(Restriction::required(true));

        assert_eq!(diff_field_detailed(&from, &to), vec![FieldChange::Required]);
    }

    #[test]
    fn test_one_sided_restriction_is_change() {
        let from = Field::new("x");
        let to = Field::new("x").with_restriction(Restriction::script("x > 0", "positive"));

        assert_eq!(diff_field_detailed(&from, &to), vec![FieldChange::Script]);
        assert_eq!(diff_field_detailed(&to, &from), vec![FieldChange::Script]);
    }

    #[test]
    fn test_range_change_has_no_detailed_class() {
        let from = Field::new("donor_age_at_diagnosis").with_restriction(Restriction::range(0, 120));
        let to = Field::new("donor_age_at_diagnosis").with_restriction(Restriction::range(0, 130));

        assert!(is_field_changed(&from, &to));
        assert!(diff_field_detailed(&from, &to).is_empty());
        assert!(!is_field_changed(&from, &from.clone()));
    }

    #[test]
    fn test_file_level_predicates() {
        let from = FileType::new("donor").with_label("Donor").with_pattern("^donor.txt$");
        let to = from.clone().with_pattern("^donor(\\.[0-9]+)?.txt$");

        assert!(is_file_pattern_changed(&from, &to));
        assert!(!is_file_label_changed(&from, &to));
    }

    #[test]
    fn test_matches_query() {
        let field = sex_field();

        assert!(matches_query(&field, &Regex::new("sex").unwrap()));
        assert!(matches_query(&field, &Regex::new(r"^donor\.").unwrap()));
        assert!(!matches_query(&field, &Regex::new("age").unwrap()));
        assert!(!matches_query(&Field::new("age"), &Regex::new("donor").unwrap()));
    }
}
