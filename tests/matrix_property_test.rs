//! Property-based tests for the dependency matrix
//!
//! Uses proptest to generate random dependency sets and verify invariants

use fdnorm::matrix::canonical::canonicalize;
use fdnorm::{closure, DependencyMatrix, FunctionalDependency};
use proptest::prelude::*;
use std::collections::BTreeSet;

const ATTRIBUTES: [&str; 6] = ["a", "b", "c", "d", "e", "f"];

fn attribute_set() -> impl Strategy<Value = BTreeSet<String>> {
    prop::collection::btree_set(
        prop::sample::select(ATTRIBUTES.to_vec()).prop_map(String::from),
        1..=3,
    )
}

fn any_dependency() -> impl Strategy<Value = FunctionalDependency> {
    (attribute_set(), attribute_set()).prop_map(|(determinants, dependents)| {
        FunctionalDependency {
            determinants,
            dependents,
        }
    })
}

fn any_rows() -> impl Strategy<Value = Vec<FunctionalDependency>> {
    prop::collection::vec(any_dependency(), 0..8)
}

proptest! {
    #[test]
    fn test_canonicalize_is_idempotent(rows in any_rows()) {
        let once = canonicalize(&rows);
        prop_assert!(once.iter().all(FunctionalDependency::is_canonical));
        prop_assert_eq!(canonicalize(&once), once);
    }

    #[test]
    fn test_canonical_row_count(rows in any_rows()) {
        let expected: usize = rows.iter().map(|r| r.dependents.len()).sum();
        prop_assert_eq!(canonicalize(&rows).len(), expected);
    }

    #[test]
    fn test_merge_terminates_within_row_count(rows in any_rows()) {
        let mut matrix = DependencyMatrix::new(rows);
        matrix.canonicalize();
        let before = matrix.canonical_rows().len();

        let outcome = matrix.merge_transitive();
        // every counted iteration removed at least one row
        prop_assert!(outcome.iterations <= before);
        prop_assert!(outcome.iterations <= outcome.total_merged);
        prop_assert_eq!(matrix.canonical_rows().len(), before - outcome.total_merged);
    }

    #[test]
    fn test_determinants_are_never_rewritten(rows in any_rows()) {
        let given: BTreeSet<BTreeSet<String>> =
            rows.iter().map(|r| r.determinants.clone()).collect();

        let mut matrix = DependencyMatrix::new(rows);
        matrix.to_second_normal_form();

        for row in matrix.canonical_rows() {
            prop_assert!(given.contains(&row.determinants));
        }
    }

    #[test]
    fn test_determinant_sets_are_unique(rows in any_rows()) {
        let mut matrix = DependencyMatrix::new(rows);
        matrix.to_second_normal_form();

        let distinct: BTreeSet<_> = matrix
            .canonical_rows()
            .iter()
            .map(|r| r.determinants.clone())
            .collect();
        prop_assert_eq!(distinct.len(), matrix.canonical_rows().len());
    }

    #[test]
    fn test_no_partial_dependency_remains(rows in any_rows()) {
        let mut matrix = DependencyMatrix::new(rows);
        matrix.to_second_normal_form();
        let out = matrix.canonical_rows();

        for (i, subset) in out.iter().enumerate() {
            for (j, superset) in out.iter().enumerate() {
                if i != j && subset.determinants.is_subset(&superset.determinants) {
                    prop_assert!(subset.dependents.is_disjoint(&superset.dependents));
                }
            }
        }
    }

    #[test]
    fn test_migrations_point_at_subset_rows(rows in any_rows()) {
        let mut matrix = DependencyMatrix::new(rows);
        let migrations = matrix.to_second_normal_form();
        let out = matrix.canonical_rows();

        prop_assert_eq!(migrations.len(), out.len());
        for (source, records) in migrations.iter().enumerate() {
            for record in records {
                prop_assert_eq!(record.source_row, source);
                prop_assert_ne!(record.target_row, source);
                prop_assert_eq!(&record.moved_attributes, &out[record.target_row].determinants);
                prop_assert!(record.moved_attributes.is_subset(&out[source].determinants));
            }
        }
    }

    #[test]
    fn test_closure_is_extensive_and_closed(rows in any_rows(), start in attribute_set()) {
        let result = closure(start.iter().cloned(), &rows);

        prop_assert!(start.is_subset(&result));
        for row in &rows {
            if row.determinants.is_subset(&result) {
                prop_assert!(row.dependents.is_subset(&result));
            }
        }
        prop_assert_eq!(closure(result.iter().cloned(), &rows), result.clone());
    }

    #[test]
    fn test_closure_is_monotone(rows in any_rows(), start in attribute_set(), extra in attribute_set()) {
        let smaller = closure(start.iter().cloned(), &rows);
        let larger = closure(start.union(&extra).cloned(), &rows);
        prop_assert!(smaller.is_subset(&larger));
    }
}
