//! Structural matching and substitution over [`Term`]s.
//!
//! [`match_term`] matches a pattern against a ground term and produces the
//! variable bindings that make them equal. [`instantiate`] goes the other
//! way, filling a template's variables from a binding environment.
//!
//! Matching is deterministic and never backtracks: the first failure
//! anywhere aborts the attempt.

use super::bindings::{BindError, Bindings};
use super::term::{Term, TermType};
use thiserror::Error;

/// Why a pattern did not match a ground term.
///
/// This is a control-flow result, not a fault: a dispatcher treats it as
/// "this candidate does not apply".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchFailure {
    #[error("variable '{variable}' expects {expected}, found {found}")]
    TypeMismatch {
        variable: String,
        expected: TermType,
        found: &'static str,
    },

    #[error("variable '{variable}' already bound to {existing}, found {attempted}")]
    InconsistentBinding {
        variable: String,
        existing: String,
        attempted: String,
    },

    #[error("expected {expected}, found {found}")]
    ScalarMismatch { expected: String, found: String },

    #[error("expected a {expected}, found a {found}")]
    ShapeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("key '{key}' is missing")]
    MissingKey { key: String },

    #[error("expected {expected} elements, found {found}")]
    LengthMismatch { expected: usize, found: usize },
}

impl From<BindError> for MatchFailure {
    fn from(error: BindError) -> Self {
        match error {
            BindError::TypeMismatch {
                variable,
                expected,
                found,
            } => MatchFailure::TypeMismatch {
                variable,
                expected,
                found,
            },
            BindError::InconsistentBinding {
                variable,
                existing,
                attempted,
            } => MatchFailure::InconsistentBinding {
                variable,
                existing,
                attempted,
            },
        }
    }
}

/// Match `pattern` against `ground` in a fresh binding environment.
///
/// - A variable binds the ground subterm if its type is satisfied; repeated
///   occurrences of one variable must bind equal values.
/// - Scalars must be equal in kind and value.
/// - A mapping pattern requires every one of its keys in the ground
///   mapping; extra ground keys are ignored.
/// - A sequence pattern requires exactly as many ground elements.
///
/// # Example
///
/// ```rust
/// use efsm::core::{match_term, Term, TermType, Variable};
/// use efsm::mapping;
///
/// let x = Variable::new("x", TermType::Int);
/// let pattern = mapping! { "arg1" => &x, "arg2" => &x };
///
/// let bindings = match_term(&pattern, &mapping! { "arg1" => 3, "arg2" => 3 }).unwrap();
/// assert_eq!(bindings.get(&x), Some(&Term::from(3)));
///
/// assert!(match_term(&pattern, &mapping! { "arg1" => 3, "arg2" => 4 }).is_err());
/// ```
pub fn match_term(pattern: &Term, ground: &Term) -> Result<Bindings, MatchFailure> {
    let mut bindings = Bindings::new();
    match_into(pattern, ground, &mut bindings)?;
    Ok(bindings)
}

/// Match `pattern` against `ground`, extending an existing environment.
///
/// On failure the environment may hold bindings from the part of the
/// pattern matched before the failure; callers discard it.
pub fn match_into(
    pattern: &Term,
    ground: &Term,
    bindings: &mut Bindings,
) -> Result<(), MatchFailure> {
    match (pattern, ground) {
        (Term::Variable(var), _) => bindings.bind(var, ground.clone()).map_err(Into::into),

        (Term::Mapping(expected), Term::Mapping(actual)) => {
            for (key, sub_pattern) in expected {
                let value = actual
                    .get(key)
                    .ok_or_else(|| MatchFailure::MissingKey { key: key.clone() })?;
                match_into(sub_pattern, value, bindings)?;
            }
            Ok(())
        }

        (Term::Sequence(expected), Term::Sequence(actual)) => {
            if expected.len() != actual.len() {
                return Err(MatchFailure::LengthMismatch {
                    expected: expected.len(),
                    found: actual.len(),
                });
            }
            expected
                .iter()
                .zip(actual)
                .try_for_each(|(sub_pattern, value)| match_into(sub_pattern, value, bindings))
        }

        (Term::Null, Term::Null) => Ok(()),
        (Term::Bool(a), Term::Bool(b)) if a == b => Ok(()),
        (Term::Int(a), Term::Int(b)) if a == b => Ok(()),
        (Term::Str(a), Term::Str(b)) if a == b => Ok(()),
        (Term::Bool(_), Term::Bool(_))
        | (Term::Int(_), Term::Int(_))
        | (Term::Str(_), Term::Str(_)) => Err(MatchFailure::ScalarMismatch {
            expected: pattern.to_string(),
            found: ground.to_string(),
        }),

        _ => Err(MatchFailure::ShapeMismatch {
            expected: pattern.kind_name(),
            found: ground.kind_name(),
        }),
    }
}

/// Replace every bound, type-satisfying variable in `template`.
///
/// Unbound variables, and variables whose binding does not satisfy their
/// type, are left in place. Substitution never fails.
pub fn instantiate(template: &Term, bindings: &Bindings) -> Term {
    match template {
        Term::Variable(var) => match bindings.get(var) {
            Some(value) if var.accepts(value) => value.clone(),
            _ => template.clone(),
        },
        Term::Sequence(items) => Term::Sequence(
            items
                .iter()
                .map(|item| instantiate(item, bindings))
                .collect(),
        ),
        Term::Mapping(mapping) => Term::Mapping(
            mapping
                .iter()
                .map(|(key, value)| (key.clone(), instantiate(value, bindings)))
                .collect(),
        ),
        Term::Null | Term::Bool(_) | Term::Int(_) | Term::Str(_) => template.clone(),
    }
}
