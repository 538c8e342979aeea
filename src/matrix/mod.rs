//! Dependency matrix — the normalization engine
//!
//! The matrix holds a relation's functional dependencies as rows over the
//! attribute universe (columns). A run to second normal form goes through
//! four phases, all mutating the same canonical-row collection:
//!
//! 1. [`canonical`] splits rows into one dependent per row
//! 2. [`merge`] folds transitive and pseudo-transitive chains to a fixed point
//! 3. [`unify`] merges rows with identical determinants
//! 4. [`split`] strips partial dependents and records migrations
//!
//! ## Example
//!
//! ```rust
//! use fdnorm::{DependencyMatrix, FunctionalDependency};
//!
//! let mut matrix = DependencyMatrix::new(vec![
//!     FunctionalDependency::new(["a", "b"], ["c", "d"]),
//!     FunctionalDependency::new(["a"], ["d"]),
//! ]);
//! let migrations = matrix.to_second_normal_form();
//!
//! assert_eq!(matrix.canonical_rows().len(), 2);
//! assert_eq!(migrations[0][0].target_row, 1);
//! ```

pub mod attributes;
pub mod canonical;
pub mod closure;
pub mod merge;
pub mod split;
pub mod unify;

pub use attributes::{AttributeIndex, MatrixValue};
pub use closure::{closure, implies, is_superkey};
pub use merge::MergeOutcome;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use tracing::debug;

/// A functional dependency `determinants → dependents`
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct FunctionalDependency {
    /// Left-hand side
    pub determinants: BTreeSet<String>,
    /// Right-hand side
    pub dependents: BTreeSet<String>,
}

impl FunctionalDependency {
    pub fn new<I, J, S, T>(determinants: I, dependents: J) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            determinants: determinants.into_iter().map(Into::into).collect(),
            dependents: dependents.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether this row has a single dependent (or none)
    pub fn is_canonical(&self) -> bool {
        self.dependents.len() <= 1
    }
}

impl fmt::Display for FunctionalDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let join = |set: &BTreeSet<String>| set.iter().map(String::as_str).collect::<Vec<_>>().join(", ");
        write!(f, "{{{}}} → {{{}}}", join(&self.determinants), join(&self.dependents))
    }
}

/// A partial dependency removed by the splitter
///
/// `source_row` lost dependents that `target_row` already determines with a
/// subset of its key; `moved_attributes` (the target's determinants) is the
/// foreign key the source relation keeps toward the target relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MigrationRecord {
    pub moved_attributes: BTreeSet<String>,
    pub source_row: usize,
    pub target_row: usize,
}

/// Functional dependencies of one relation, plus the working rows of a run
#[derive(Debug, Clone, Default)]
pub struct DependencyMatrix {
    rows: Vec<FunctionalDependency>,
    canonical_rows: Vec<FunctionalDependency>,
    attributes: AttributeIndex,
    last_merge: Option<MergeOutcome>,
}

impl DependencyMatrix {
    pub fn new(rows: Vec<FunctionalDependency>) -> Self {
        let attributes = AttributeIndex::from_rows(&rows);
        Self {
            rows,
            canonical_rows: Vec::new(),
            attributes,
            last_merge: None,
        }
    }

    /// Dependencies as given
    pub fn rows(&self) -> &[FunctionalDependency] {
        &self.rows
    }

    /// Every attribute on either side of any row, sorted alphabetically
    pub fn attributes(&self) -> &[String] {
        self.attributes.names()
    }

    pub fn attribute_index(&self) -> &AttributeIndex {
        &self.attributes
    }

    // Queries below follow the canonical rows; call `canonicalize` first.

    pub fn determinant_count_per_row(&self) -> Vec<usize> {
        attributes::determinant_count_per_row(&self.canonical_rows)
    }

    pub fn determinant_order_per_attribute(&self) -> Vec<usize> {
        attributes::determinant_order_per_attribute(&self.attributes, &self.canonical_rows)
    }

    pub fn matrix_value(&self, row: usize, column: usize) -> Option<MatrixValue> {
        attributes::matrix_value(&self.attributes, &self.canonical_rows, row, column)
    }

    pub fn canonical_row(&self, row: usize) -> Option<&FunctionalDependency> {
        self.canonical_rows.get(row)
    }

    pub fn canonical_rows(&self) -> &[FunctionalDependency] {
        &self.canonical_rows
    }

    /// Outcome of the last fixed-point merge, if one ran
    pub fn last_merge(&self) -> Option<&MergeOutcome> {
        self.last_merge.as_ref()
    }

    /// Rebuild the canonical rows from the raw rows
    pub fn canonicalize(&mut self) {
        self.canonical_rows = canonical::canonicalize(&self.rows);
        self.last_merge = None;
    }

    /// Single merge step on `row`; returns the number of rows removed
    pub fn merge_pseudo_transitive_rows(&mut self, row: usize) -> usize {
        merge::merge_pseudo_transitive(&mut self.canonical_rows, row)
    }

    /// Merge to a fixed point from the selected start row
    pub fn merge_transitive(&mut self) -> MergeOutcome {
        let outcome = merge::merge_transitive(&self.attributes, &mut self.canonical_rows);
        self.last_merge = Some(outcome);
        outcome
    }

    pub fn merge_identical_determinants(&mut self) -> usize {
        unify::merge_identical_determinants(&mut self.canonical_rows)
    }

    pub fn remove_duplicated_dependents(&mut self) -> Vec<Vec<MigrationRecord>> {
        split::remove_duplicated_dependents(&mut self.canonical_rows)
    }

    /// Run every phase and return the migrations recorded per row
    ///
    /// Afterwards [`canonical_rows`](Self::canonical_rows) holds one row per
    /// output relation, keyed by its determinants.
    pub fn to_second_normal_form(&mut self) -> Vec<Vec<MigrationRecord>> {
        debug!(rows = self.rows.len(), "initial matrix\n{}", self.display_initial());

        self.canonicalize();
        debug!(rows = self.canonical_rows.len(), "canonized matrix\n{}", self);

        let outcome = self.merge_transitive();
        debug!(
            merged = outcome.total_merged,
            iterations = outcome.iterations,
            "merged by pseudo transitivity\n{}",
            self
        );

        let unified = self.merge_identical_determinants();
        debug!(merged = unified, "merged identical determinants\n{}", self);

        let migrations = self.remove_duplicated_dependents();
        debug!("removed duplicated dependents\n{}", self);

        migrations
    }

    /// Closure of `attrs` under the raw rows
    pub fn closure_of<I, S>(&self, attrs: I) -> BTreeSet<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        closure(attrs, &self.rows)
    }

    /// Raw rows, one `i: {..} → {..}` line each
    pub fn display_initial(&self) -> String {
        render_rows(&self.rows)
    }
}

impl fmt::Display for DependencyMatrix {
    /// Canonical rows, one `i: {..} → {..}` line each
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render_rows(&self.canonical_rows))
    }
}

fn render_rows(rows: &[FunctionalDependency]) -> String {
    rows.iter()
        .enumerate()
        .map(|(i, row)| format!("{}: {}", i, row))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Drop the rows at `marked` indices, keeping the order of the rest
pub(crate) fn remove_marked(rows: &mut Vec<FunctionalDependency>, marked: &BTreeSet<usize>) {
    if marked.is_empty() {
        return;
    }
    let mut index = 0;
    rows.retain(|_| {
        let keep = !marked.contains(&index);
        index += 1;
        keep
    });
}
