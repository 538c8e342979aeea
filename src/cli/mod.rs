//! CLI command implementations
//!
//! - `normalize`: normalization and validation commands
//! - `inspect`: matrix dump, attribute closure and JSON schema commands
//! - `util`: shared argument and I/O helpers

pub mod inspect;
pub mod normalize;
pub mod util;

pub use inspect::{cmd_closure, cmd_matrix, cmd_schema};
pub use normalize::{cmd_normalize, cmd_validate};
