//! Per-instance state: the current location plus typed data variables.

use super::location::Location;
use super::term::{Term, TermType};
use super::variable::Variable;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use thiserror::Error;

/// Errors raised by writes to state data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("'{field}' is not a declared state field")]
    UnknownField { field: String },

    #[error("state field '{field}' expects {expected}, found {found}")]
    TypeMismatch {
        field: String,
        expected: TermType,
        found: &'static str,
    },
}

/// Values of the data variables declared for a machine type.
///
/// Every field is a typed [`Variable`]. A field is either bound to a value
/// satisfying its type or unbound. Writes are type-checked.
#[derive(Clone, Debug, PartialEq)]
pub struct StateData {
    fields: Arc<[Variable]>,
    values: HashMap<Variable, Term>,
}

impl StateData {
    /// Create state data with all `fields` unbound.
    pub fn new(fields: impl Into<Arc<[Variable]>>) -> Self {
        Self {
            fields: fields.into(),
            values: HashMap::new(),
        }
    }

    pub fn fields(&self) -> &[Variable] {
        &self.fields
    }

    pub fn is_declared(&self, field: &Variable) -> bool {
        self.fields.contains(field)
    }

    pub fn get(&self, field: &Variable) -> Option<&Term> {
        self.values.get(field)
    }

    pub fn is_bound(&self, field: &Variable) -> bool {
        self.values.contains_key(field)
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&Variable> {
        self.fields.iter().find(|field| field.name() == name)
    }

    /// Bind `field` to `value`, replacing any previous value.
    pub fn set(&mut self, field: &Variable, value: impl Into<Term>) -> Result<(), StateError> {
        self.ensure_declared(field)?;

        let value = value.into();
        if !field.accepts(&value) {
            return Err(StateError::TypeMismatch {
                field: field.name().to_string(),
                expected: field.ty(),
                found: value.kind_name(),
            });
        }

        self.values.insert(field.clone(), value);
        Ok(())
    }

    /// Unbind `field`.
    pub fn clear(&mut self, field: &Variable) -> Result<(), StateError> {
        self.ensure_declared(field)?;
        self.values.remove(field);
        Ok(())
    }

    /// Fields in declaration order with their current values.
    pub fn iter(&self) -> impl Iterator<Item = (&Variable, Option<&Term>)> {
        self.fields
            .iter()
            .map(move |field| (field, self.values.get(field)))
    }

    fn ensure_declared(&self, field: &Variable) -> Result<(), StateError> {
        if self.is_declared(field) {
            Ok(())
        } else {
            Err(StateError::UnknownField {
                field: field.name().to_string(),
            })
        }
    }
}

/// Complete state of one machine instance.
#[derive(Clone, Debug, PartialEq)]
pub struct StateVector {
    location: Location,
    data: StateData,
}

impl StateVector {
    pub fn new(location: Location, data: StateData) -> Self {
        Self { location, data }
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn data(&self) -> &StateData {
        &self.data
    }

    /// Read-only, serializable copy keyed by names. Unbound fields are omitted.
    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            location: self.location.name().to_string(),
            data: self
                .data
                .iter()
                .filter_map(|(field, value)| {
                    value.map(|value| (field.name().to_string(), value.clone()))
                })
                .collect(),
        }
    }
}

/// Name-keyed view of a state vector, for diagnostics and transport.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub location: String,
    pub data: BTreeMap<String, Term>,
}
