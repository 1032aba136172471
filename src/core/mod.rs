//! Core data model and pure logic.
//!
//! This module contains the side-effect-free part of the engine:
//! - Terms, typed variables and binding environments
//! - Structural matching and substitution
//! - Guard predicates over bindings and state
//! - Locations, state vectors and firing history
//!
//! Nothing here performs I/O or holds shared mutable state.

mod bindings;
mod guard;
mod history;
mod location;
mod matcher;
mod state;
mod term;
mod variable;

pub use bindings::{BindError, Bindings};
pub use guard::Guard;
pub use history::{FiringHistory, FiringRecord};
pub use location::Location;
pub use matcher::{instantiate, match_into, match_term, MatchFailure};
pub use state::{StateData, StateError, StateSnapshot, StateVector};
pub use term::{Mapping, MappingIter, Term, TermType};
pub use variable::Variable;
