//! Errors raised while constructing and running machine instances.

use crate::core::{BindError, StateError};
use thiserror::Error;

/// Failure inside a transition's update procedure.
///
/// Any of these signals a defect in the transition definition, not an
/// expected run-time condition.
#[derive(Debug, Error)]
pub enum UpdateError {
    #[error(transparent)]
    State(#[from] StateError),

    #[error("cannot bind output parameter: {0}")]
    Output(#[from] BindError),

    #[error("update rejected: {0}")]
    Rejected(String),
}

/// Errors that abort a dispatch call. The instance keeps its previous state.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("transition '{transition}' aborted in location '{location}': {source}")]
    Update {
        transition: String,
        location: String,
        source: UpdateError,
    },

    #[error(
        "{} transitions are eligible in location '{location}': {}",
        .transitions.len(),
        .transitions.join(", ")
    )]
    Ambiguous {
        location: String,
        transitions: Vec<String>,
    },
}

/// Errors that can occur when constructing a machine instance.
#[derive(Debug, Error)]
pub enum ConstructError {
    #[error("initial location '{location}' is not part of structure '{structure}'")]
    UnknownLocation { structure: String, location: String },

    #[error("invalid initial value: {0}")]
    InitialValue(#[from] StateError),
}
