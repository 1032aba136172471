//! Build errors for structure and transition builders.

use thiserror::Error;

/// Errors that can occur when sealing transitions and structures.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BuildError {
    #[error("transition '{transition}' uses variable '{variable}' that is not declared local. Call .local(&var)")]
    UndeclaredVariable {
        transition: String,
        variable: String,
    },

    #[error(
        "structure '{structure}' has {} violation(s): {}",
        .violations.len(),
        .violations.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
    )]
    StructuralConfig {
        structure: String,
        violations: Vec<StructureViolation>,
    },
}

/// A single problem found while validating a structure.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StructureViolation {
    #[error("transition '{transition}' is wired from unknown location '{location}'")]
    UnknownSource {
        transition: String,
        location: String,
    },

    #[error("transition '{transition}' is wired to unknown location '{location}'")]
    UnknownTarget {
        transition: String,
        location: String,
    },

    #[error("location '{name}' is declared more than once")]
    DuplicateLocation { name: String },

    #[error("two different transitions are named '{name}'")]
    DuplicateTransition { name: String },

    #[error("state field '{name}' is declared more than once")]
    DuplicateField { name: String },
}
