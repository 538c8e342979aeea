//! Attribute indexing over the dependency matrix
//!
//! The matrix is addressed as `rows x attributes`. Columns follow the
//! alphabetical order of the attribute universe, which is derived once from
//! the raw dependencies and cached for the whole run.

use super::FunctionalDependency;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Sorted, deduplicated attribute universe with name → column lookup
#[derive(Debug, Clone, Default)]
pub struct AttributeIndex {
    names: Vec<String>,
    positions: HashMap<String, usize>,
}

impl AttributeIndex {
    /// Collect every attribute appearing on either side of any row
    pub fn from_rows(rows: &[FunctionalDependency]) -> Self {
        let unique: BTreeSet<&String> = rows
            .iter()
            .flat_map(|row| row.determinants.iter().chain(row.dependents.iter()))
            .collect();

        let names: Vec<String> = unique.into_iter().cloned().collect();
        let positions = names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();

        Self { names, positions }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Attribute names in column order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn name(&self, column: usize) -> Option<&str> {
        self.names.get(column).map(String::as_str)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }
}

/// Value of a single matrix cell
///
/// The numeric form (`1` for a determinant, `0` for a dependent) is what the
/// matrix is usually drawn with; an attribute absent from a row has no value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatrixValue {
    /// Attribute is on the right-hand side of the row
    Dependent,
    /// Attribute is on the left-hand side of the row
    Determinant,
}

impl MatrixValue {
    pub fn as_digit(self) -> u8 {
        match self {
            MatrixValue::Dependent => 0,
            MatrixValue::Determinant => 1,
        }
    }
}

/// `|determinants|` for every row, in row order
pub fn determinant_count_per_row(rows: &[FunctionalDependency]) -> Vec<usize> {
    rows.iter().map(|row| row.determinants.len()).collect()
}

/// Number of rows holding each attribute as a determinant, in column order
///
/// Every column is counted, the first one included.
pub fn determinant_order_per_attribute(
    index: &AttributeIndex,
    rows: &[FunctionalDependency],
) -> Vec<usize> {
    let mut orders = vec![0; index.len()];

    for row in rows {
        for attr in &row.determinants {
            if let Some(column) = index.position(attr) {
                orders[column] += 1;
            }
        }
    }

    orders
}

/// Cell value at `(row, column)`; `None` when out of range or empty
pub fn matrix_value(
    index: &AttributeIndex,
    rows: &[FunctionalDependency],
    row: usize,
    column: usize,
) -> Option<MatrixValue> {
    let row = rows.get(row)?;
    let name = index.name(column)?;

    if row.determinants.contains(name) {
        Some(MatrixValue::Determinant)
    } else if row.dependents.contains(name) {
        Some(MatrixValue::Dependent)
    } else {
        None
    }
}
