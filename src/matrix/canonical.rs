//! Canonical form: one dependent attribute per row

use super::FunctionalDependency;
use std::collections::BTreeSet;

/// Split every multi-dependent row into single-dependent rows
///
/// Rows with at most one dependent pass through as they are. Split rows come
/// out in alphabetical dependent order and each owns its copy of the
/// determinants, so later phases can mutate one row without touching its
/// siblings.
pub fn canonicalize(rows: &[FunctionalDependency]) -> Vec<FunctionalDependency> {
    let mut canonical = Vec::with_capacity(rows.len());

    for row in rows {
        if row.dependents.len() <= 1 {
            canonical.push(row.clone());
            continue;
        }

        for attr in &row.dependents {
            canonical.push(FunctionalDependency {
                determinants: row.determinants.clone(),
                dependents: BTreeSet::from([attr.clone()]),
            });
        }
    }

    canonical
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_multi_dependent_row() {
        let rows = vec![FunctionalDependency::new(["a", "b"], ["d", "c"])];
        let canonical = canonicalize(&rows);

        assert_eq!(
            canonical,
            vec![
                FunctionalDependency::new(["a", "b"], ["c"]),
                FunctionalDependency::new(["a", "b"], ["d"]),
            ]
        );
    }

    #[test]
    fn test_singleton_rows_pass_through() {
        let rows = vec![
            FunctionalDependency::new(["a"], ["b"]),
            FunctionalDependency::new(["b"], ["c"]),
        ];
        assert_eq!(canonicalize(&rows), rows);
    }

    #[test]
    fn test_empty_input() {
        assert!(canonicalize(&[]).is_empty());
    }

    #[test]
    fn test_split_rows_do_not_share_determinants() {
        let rows = vec![FunctionalDependency::new(["a"], ["b", "c"])];
        let mut canonical = canonicalize(&rows);
        canonical[0].determinants.insert("z".into());

        assert!(!canonical[1].determinants.contains("z"));
        assert!(!rows[0].determinants.contains("z"));
    }
}
