//! Sealed transitions, shared structures and running machine instances.
//!
//! A [`Structure`] is built once and shared behind an `Arc` by any number
//! of [`Machine`] instances. Each instance owns its state vector, so
//! instances can be driven from different threads without coordination.

mod config;
mod error;
mod machine;
mod structure;
mod transition;

pub use config::{MachineConfig, SelectionPolicy, DEFAULT_HISTORY_LIMIT};
pub use error::{ConstructError, DispatchError, UpdateError};
pub use machine::{Firing, Machine, Outcome};
pub use structure::{Edge, Structure};
pub use transition::{Rejection, Transition, Update};
