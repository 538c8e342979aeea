//! Determinant unification

use super::{remove_marked, FunctionalDependency};
use std::collections::{BTreeMap, BTreeSet};

/// Fold rows with identical determinant sets into the first of them
///
/// Single pass; returns the number of rows removed.
pub fn merge_identical_determinants(rows: &mut Vec<FunctionalDependency>) -> usize {
    let mut first_by_key: BTreeMap<BTreeSet<String>, usize> = BTreeMap::new();
    let mut marked = BTreeSet::new();

    for i in 0..rows.len() {
        match first_by_key.get(&rows[i].determinants) {
            Some(&first) => {
                let dependents = std::mem::take(&mut rows[i].dependents);
                rows[first].dependents.extend(dependents);
                marked.insert(i);
            }
            None => {
                first_by_key.insert(rows[i].determinants.clone(), i);
            }
        }
    }

    remove_marked(rows, &marked);
    marked.len()
}
