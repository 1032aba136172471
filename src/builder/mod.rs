//! Builder API for defining machine types.
//!
//! Transitions are sealed with [`TransitionBuilder`], then wired onto the
//! edges of a [`StructureBuilder`]. Building the structure validates the
//! whole definition and reports every problem at once.

pub mod error;
pub mod macros;
mod structure;
mod transition;
mod validate;

pub use error::{BuildError, StructureViolation};
pub use structure::StructureBuilder;
pub use transition::TransitionBuilder;
