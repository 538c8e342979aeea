//! Partial-dependency splitting
//!
//! A row whose determinants strictly contain another row's determinants must
//! not repeat that row's dependents: those attributes depend on part of the
//! key only, which is exactly what second normal form forbids. The splitter
//! strips them and records a [`MigrationRecord`] so the caller can link the
//! two relations with a foreign key.

use super::{FunctionalDependency, MigrationRecord};
use tracing::debug;

/// Strip partial dependents from superset rows
///
/// Returns one list per row holding the migrations recorded against it.
/// Rows emptied here are kept so that row indices stay valid.
pub fn remove_duplicated_dependents(rows: &mut [FunctionalDependency]) -> Vec<Vec<MigrationRecord>> {
    let mut migrations = vec![Vec::new(); rows.len()];

    for i in 0..rows.len() {
        for j in 0..rows.len() {
            if i == j || !rows[i].determinants.is_subset(&rows[j].determinants) {
                continue;
            }

            let (subset, superset) = pair_mut(rows, i, j);
            superset
                .dependents
                .retain(|attr| !subset.dependents.contains(attr));

            debug!(source_row = j, target_row = i, "recorded partial dependency");
            migrations[j].push(MigrationRecord {
                moved_attributes: subset.determinants.clone(),
                source_row: j,
                target_row: i,
            });
        }
    }

    migrations
}

/// Shared borrow of `rows[i]` alongside a mutable borrow of `rows[j]`
fn pair_mut(
    rows: &mut [FunctionalDependency],
    i: usize,
    j: usize,
) -> (&FunctionalDependency, &mut FunctionalDependency) {
    if i < j {
        let (head, tail) = rows.split_at_mut(j);
        (&head[i], &mut tail[0])
    } else {
        let (head, tail) = rows.split_at_mut(i);
        (&tail[0], &mut head[j])
    }
}
