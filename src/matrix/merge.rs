//! Closure/merge engine
//!
//! Collapses transitive (`X → Y`, `Y → Z`) and pseudo-transitive
//! (`X → Y`, `YW → Z`) chains into a single row, repeating until a merge step
//! removes nothing.
//!
//! ## Row selection
//!
//! Both selections are deterministic and first-match:
//!
//! - **Start row**: attributes with the highest determinant order are tried in
//!   column order; for each, rows are tried in ascending determinant count
//!   (ties by row index). The first row holding the attribute as a
//!   determinant wins.
//! - **Next row**: rows with the highest *current* determinant count are
//!   tried in row order against attributes in ascending determinant order
//!   (ties by column). The first row with a determinant cell wins.
//!
//! Migration record identity downstream depends on these orders.

use super::attributes::{
    determinant_count_per_row, determinant_order_per_attribute, matrix_value, AttributeIndex,
    MatrixValue,
};
use super::{remove_marked, FunctionalDependency};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, trace};

/// Summary of one fixed-point run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeOutcome {
    /// Row the first merge step ran on
    pub start_row: usize,
    /// Merge steps that removed at least one row
    pub iterations: usize,
    /// Rows removed across all steps
    pub total_merged: usize,
}

/// Pick the row the fixed-point loop starts from
pub fn select_start_row(index: &AttributeIndex, rows: &[FunctionalDependency]) -> usize {
    let row_counts = determinant_count_per_row(rows);
    let attr_orders = determinant_order_per_attribute(index, rows);
    let max_order = attr_orders.iter().copied().max().unwrap_or(0);

    let mut rows_ascending: Vec<usize> = (0..rows.len()).collect();
    rows_ascending.sort_by_key(|&row| row_counts[row]);

    attr_orders
        .iter()
        .enumerate()
        .filter(|&(_, &order)| order == max_order)
        .find_map(|(column, _)| {
            rows_ascending.iter().copied().find(|&row| {
                matrix_value(index, rows, row, column) == Some(MatrixValue::Determinant)
            })
        })
        .unwrap_or(0)
}

/// Pick the row the next merge step runs on, `None` when no row qualifies
pub fn select_next_row(index: &AttributeIndex, rows: &[FunctionalDependency]) -> Option<usize> {
    let row_counts = determinant_count_per_row(rows);
    let attr_orders = determinant_order_per_attribute(index, rows);
    let max_count = row_counts.iter().copied().max()?;

    let mut columns_ascending: Vec<usize> = (0..index.len()).collect();
    columns_ascending.sort_by_key(|&column| attr_orders[column]);

    (0..rows.len())
        .filter(|&row| row_counts[row] == max_count)
        .find(|&row| {
            columns_ascending.iter().any(|&column| {
                matrix_value(index, rows, row, column) == Some(MatrixValue::Determinant)
            })
        })
}

/// Rows other than `row` reachable through `attr`
///
/// With `side == Dependent` the attribute is one of `row`'s dependents and we
/// look for rows where it is a determinant; with `side == Determinant` the
/// lookup is reversed.
pub fn pseudo_transitive_rows(
    rows: &[FunctionalDependency],
    row: usize,
    attr: &str,
    side: MatrixValue,
) -> Vec<usize> {
    rows.iter()
        .enumerate()
        .filter(|&(i, _)| i != row)
        .filter(|(_, other)| match side {
            MatrixValue::Dependent => other.determinants.contains(attr),
            MatrixValue::Determinant => other.dependents.contains(attr),
        })
        .map(|(i, _)| i)
        .collect()
}

/// One merge step on `row`; returns how many rows were absorbed and removed
pub fn merge_pseudo_transitive(rows: &mut Vec<FunctionalDependency>, row: usize) -> usize {
    let Some(target) = rows.get(row) else {
        return 0;
    };

    // dependents gained during this step are not followed until the next one
    let snapshot: Vec<String> = target.dependents.iter().cloned().collect();
    let mut marked = BTreeSet::new();

    for attr in &snapshot {
        for other in pseudo_transitive_rows(rows, row, attr, MatrixValue::Dependent) {
            trace!(from = other, into = row, attr = %attr, "absorbing dependents");

            let absorbed: Vec<String> = rows[other]
                .dependents
                .iter()
                .filter(|a| !rows[row].determinants.contains(*a))
                .cloned()
                .collect();
            rows[row].dependents.extend(absorbed);
            marked.insert(other);
        }
    }

    remove_marked(rows, &marked);
    marked.len()
}

/// Run merge steps from the selected start row until one removes nothing
pub fn merge_transitive(
    index: &AttributeIndex,
    rows: &mut Vec<FunctionalDependency>,
) -> MergeOutcome {
    let initial_rows = rows.len();
    let start_row = select_start_row(index, rows);
    debug!(start_row, rows = initial_rows, "selected start row");

    let mut outcome = MergeOutcome {
        start_row,
        ..MergeOutcome::default()
    };
    let mut current = start_row;

    loop {
        let merged = merge_pseudo_transitive(rows, current);
        if merged == 0 {
            break;
        }

        outcome.iterations += 1;
        outcome.total_merged += merged;
        debug!(row = current, merged, remaining = rows.len(), "merged by pseudo transitivity");

        match select_next_row(index, rows) {
            Some(next) => current = next,
            None => break,
        }
        debug!(row = current, "selected next row");
    }

    debug_assert!(outcome.iterations <= initial_rows);
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fd(determinants: &[&str], dependents: &[&str]) -> FunctionalDependency {
        FunctionalDependency::new(determinants.iter().copied(), dependents.iter().copied())
    }

    #[test]
    fn test_start_row_prefers_first_max_order_attribute() {
        let rows = vec![fd(&["a"], &["b"]), fd(&["b"], &["c"])];
        let index = AttributeIndex::from_rows(&rows);
        // "a" and "b" tie on order 1; "a" comes first in column order
        assert_eq!(select_start_row(&index, &rows), 0);
    }

    #[test]
    fn test_start_row_counts_first_column() {
        // "a" is column 0 and the most frequent determinant
        let rows = vec![fd(&["b"], &["d"]), fd(&["a"], &["c"]), fd(&["a"], &["e"])];
        let index = AttributeIndex::from_rows(&rows);
        assert_eq!(select_start_row(&index, &rows), 1);
    }

    #[test]
    fn test_start_row_prefers_fewest_determinants() {
        let rows = vec![fd(&["a", "b"], &["c"]), fd(&["a"], &["d"])];
        let index = AttributeIndex::from_rows(&rows);
        assert_eq!(select_start_row(&index, &rows), 1);
    }

    #[test]
    fn test_start_row_of_empty_matrix() {
        let index = AttributeIndex::default();
        assert_eq!(select_start_row(&index, &[]), 0);
        assert_eq!(select_next_row(&index, &[]), None);
    }

    #[test]
    fn test_next_row_takes_first_widest_row() {
        let rows = vec![
            fd(&["a"], &["b"]),
            fd(&["a", "c"], &["d"]),
            fd(&["b", "c"], &["e"]),
        ];
        let index = AttributeIndex::from_rows(&rows);
        assert_eq!(select_next_row(&index, &rows), Some(1));
    }

    #[test]
    fn test_pseudo_transitive_rows_by_side() {
        let rows = vec![fd(&["a"], &["b"]), fd(&["b", "c"], &["d"]), fd(&["e"], &["b"])];
        assert_eq!(
            pseudo_transitive_rows(&rows, 0, "b", MatrixValue::Dependent),
            vec![1]
        );
        assert_eq!(
            pseudo_transitive_rows(&rows, 0, "b", MatrixValue::Determinant),
            vec![2]
        );
    }

    #[test]
    fn test_merge_step_skips_own_determinants() {
        let mut rows = vec![fd(&["a"], &["b"]), fd(&["b"], &["a", "c"])];
        let merged = merge_pseudo_transitive(&mut rows, 0);

        assert_eq!(merged, 1);
        assert_eq!(rows, vec![fd(&["a"], &["b", "c"])]);
    }

    #[test]
    fn test_merge_step_out_of_range() {
        let mut rows = vec![fd(&["a"], &["b"])];
        assert_eq!(merge_pseudo_transitive(&mut rows, 3), 0);
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_merge_step_follows_snapshot_only() {
        // c is gained from row 1 during the step, so row 2 waits for the next step
        let mut rows = vec![fd(&["a"], &["b"]), fd(&["b"], &["c"]), fd(&["c"], &["d"])];
        assert_eq!(merge_pseudo_transitive(&mut rows, 0), 1);
        assert_eq!(rows, vec![fd(&["a"], &["b", "c"]), fd(&["c"], &["d"])]);
    }

    #[test]
    fn test_fixed_point_collapses_chain() {
        let mut rows = vec![fd(&["a"], &["b"]), fd(&["b"], &["c"]), fd(&["c"], &["d"])];
        let index = AttributeIndex::from_rows(&rows);
        let outcome = merge_transitive(&index, &mut rows);

        assert_eq!(rows, vec![fd(&["a"], &["b", "c", "d"])]);
        assert_eq!(
            outcome,
            MergeOutcome {
                start_row: 0,
                iterations: 2,
                total_merged: 2,
            }
        );
    }
}
