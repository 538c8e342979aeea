// Production-quality lints
#![warn(
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
// Deny truly dangerous patterns
#![deny(clippy::mem_forget)]
// Allow common patterns in library code
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! # fdnorm — Functional-Dependency Normalization
//!
//! Decomposes relations into second normal form from their functional
//! dependencies.
//!
//! ## Core Concept
//!
//! Each entity of a scheme carries a set of **functional dependencies**
//! (`determinants → dependents`). The primary key implicitly determines every
//! other attribute; further dependencies are authored by the user. From
//! those, fdnorm:
//!
//! - **Canonicalizes** dependencies to a single dependent each
//! - **Merges** transitive and pseudo-transitive chains to a fixed point
//! - **Unifies** dependencies sharing the same determinants
//! - **Splits** partial dependencies off composite keys, recording the
//!   foreign keys that link the resulting relations
//!
//! ## Quick Start
//!
//! ```rust
//! use fdnorm::{DependencyMatrix, FunctionalDependency};
//!
//! // {student, course} → {grade, name}, {student} → {name}
//! let mut matrix = DependencyMatrix::new(vec![
//!     FunctionalDependency::new(["student", "course"], ["grade", "name"]),
//!     FunctionalDependency::new(["student"], ["name"]),
//! ]);
//!
//! let migrations = matrix.to_second_normal_form();
//! for (i, row) in matrix.canonical_rows().iter().enumerate() {
//!     println!("{}: {}", i, row);
//! }
//!
//! // `name` moved out of the composite-key relation
//! assert_eq!(
//!     matrix.canonical_row(0),
//!     Some(&FunctionalDependency::new(["course", "student"], ["grade"]))
//! );
//! assert_eq!(migrations[0][0].target_row, 1);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                                                             │
//! │  SCHEME (YAML / JSON)                                       │
//! │       │                                                     │
//! │       ├──► validate_scheme(scheme) ──► Vec<Violation>       │
//! │       │                                                     │
//! │       └──► Normalizer::normalize(nf) ──► NormalizationReport│
//! │                 │                                           │
//! │                 │  per entity                               │
//! │                 ▼                                           │
//! │  DEPENDENCY MATRIX                                          │
//! │       canonicalize ─► merge_transitive ─►                   │
//! │       merge_identical_determinants ─►                       │
//! │       remove_duplicated_dependents ──► Vec<Vec<Migration>>  │
//! │                                                             │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod matrix;
pub mod normalize;
pub mod scheme;
pub mod validate;

// Re-exports
pub use config::{Config, NamingConfig, NormalizeConfig, OutputFormat, CONFIG_FILE};
pub use error::{Error, Result};
pub use matrix::{
    closure, implies, is_superkey, AttributeIndex, DependencyMatrix, FunctionalDependency,
    MatrixValue, MergeOutcome, MigrationRecord,
};
pub use normalize::{EntityDecomposition, NormalForm, NormalizationReport, Normalizer};
pub use scheme::{
    Attribute, AttributeConstraint, AttributeType, Entity, Relationship, RelationshipEnd, Scheme,
    TableDependency,
};
pub use validate::{validate_scheme, Violation, ViolationKind};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
