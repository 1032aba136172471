//! Efsm: extended finite state machines driven by structural pattern matching
//!
//! A machine type is a [`Structure`](runtime::Structure): a fixed set of
//! locations joined by wired transitions. Each transition carries a trigger
//! pattern, a guard, an update procedure and response templates, all over
//! [`Term`](core::Term) values. Instances own their state and share the
//! structure read-only.
//!
//! # Core Concepts
//!
//! - **Terms**: scalars, sequences, mappings and typed variable placeholders
//! - **Matching**: one-way structural matching of patterns against events
//! - **Substitution**: instantiating response templates from bindings
//! - **Dispatch**: atomic selection and firing of one eligible transition
//!
//! # Example
//!
//! ```rust
//! use efsm::builder::{StructureBuilder, TransitionBuilder};
//! use efsm::core::{Guard, Term, TermType, Variable};
//! use efsm::mapping;
//! use efsm::runtime::Machine;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut builder = StructureBuilder::new("task_control");
//! let [off, on] = builder.locations(["off", "on"]);
//! let task_id = builder.field("task_id", TermType::Int);
//!
//! let i = Variable::new("i", TermType::Int);
//! let (start_field, start_param) = (task_id.clone(), i.clone());
//! let start = TransitionBuilder::new("start")
//!     .local(&i)
//!     .trigger(mapping! { "command" => "Start", "arg" => &i })
//!     .update(move |bindings, state| {
//!         if let Some(value) = bindings.get(&start_param) {
//!             state.set(&start_field, value.clone())?;
//!         }
//!         Ok(())
//!     })
//!     .respond(mapping! { "reply" => () })
//!     .build()?;
//!
//! let stop_field = task_id.clone();
//! let stop = TransitionBuilder::new("stop")
//!     .local(&i)
//!     .trigger(mapping! { "command" => "Stop", "arg" => &i })
//!     .guard(Guard::equals(&i, &task_id))
//!     .update(move |_, state| Ok(state.clear(&stop_field)?))
//!     .respond(mapping! { "reply" => () })
//!     .build()?;
//!
//! builder.wire(&start, &off, &on).wire(&stop, &on, &off);
//! let structure = builder.build()?;
//!
//! let mut machine = Machine::new(structure, &off)?;
//! let reply = machine.dispatch(&mapping! { "command" => "Start", "arg" => 5 })?;
//! assert_eq!(reply, vec![mapping! { "reply" => () }]);
//! assert_eq!(machine.current_state().get(&task_id), Some(&Term::from(5)));
//!
//! // Wrong task id: the guard fails and nothing happens.
//! assert!(machine.dispatch(&mapping! { "command" => "Stop", "arg" => 7 })?.is_empty());
//! assert_eq!(machine.current_location(), &on);
//!
//! machine.dispatch(&mapping! { "command" => "Stop", "arg" => 5 })?;
//! assert_eq!(machine.current_location(), &off);
//! assert!(!machine.current_state().is_bound(&task_id));
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod core;
pub mod runtime;

// Re-export commonly used types
pub use crate::builder::{BuildError, StructureBuilder, TransitionBuilder};
pub use crate::core::{Bindings, Guard, Location, Term, TermType, Variable};
pub use crate::runtime::{DispatchError, Machine, MachineConfig, Outcome, Structure};
