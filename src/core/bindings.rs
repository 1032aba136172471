//! Binding environments produced by matching.

use super::term::{Term, TermType};
use super::variable::Variable;
use std::collections::HashMap;
use thiserror::Error;

/// Reasons a variable cannot be bound to a value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    #[error("variable '{variable}' expects {expected}, found {found}")]
    TypeMismatch {
        variable: String,
        expected: TermType,
        found: &'static str,
    },

    #[error("variable '{variable}' is bound to {existing}, cannot rebind it to {attempted}")]
    InconsistentBinding {
        variable: String,
        existing: String,
        attempted: String,
    },
}

/// Append-only mapping from variables to ground terms.
///
/// An environment lives for one match or firing attempt. Bindings are only
/// ever added; rebinding a variable to an equal value is accepted, rebinding
/// it to a different one fails.
///
/// # Example
///
/// ```rust
/// use efsm::core::{Bindings, Term, TermType, Variable};
///
/// let x = Variable::new("x", TermType::Int);
/// let mut bindings = Bindings::new();
///
/// bindings.bind(&x, Term::from(3)).unwrap();
/// assert!(bindings.bind(&x, Term::from(3)).is_ok());
/// assert!(bindings.bind(&x, Term::from(4)).is_err());
/// assert_eq!(bindings.get(&x), Some(&Term::from(3)));
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Bindings {
    values: HashMap<Variable, Term>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `var` to `value` after checking its type and any existing binding.
    pub fn bind(&mut self, var: &Variable, value: Term) -> Result<(), BindError> {
        if !var.accepts(&value) {
            return Err(BindError::TypeMismatch {
                variable: var.name().to_string(),
                expected: var.ty(),
                found: value.kind_name(),
            });
        }

        match self.values.get(var) {
            Some(existing) if *existing == value => Ok(()),
            Some(existing) => Err(BindError::InconsistentBinding {
                variable: var.name().to_string(),
                existing: existing.to_string(),
                attempted: value.to_string(),
            }),
            None => {
                self.values.insert(var.clone(), value);
                Ok(())
            }
        }
    }

    pub fn get(&self, var: &Variable) -> Option<&Term> {
        self.values.get(var)
    }

    pub fn contains(&self, var: &Variable) -> bool {
        self.values.contains_key(var)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Variable, &Term)> {
        self.values.iter()
    }
}
