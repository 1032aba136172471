//! Typed variables: identity-bearing placeholders inside terms.

use super::term::{Term, TermType};
use serde::Serialize;
use std::fmt;
use std::hash::{Hash, Hasher};
use uuid::Uuid;

/// A named placeholder carrying a run-time type constraint.
///
/// Equality and hashing use only the identity assigned at construction.
/// Clones share that identity and denote the same variable; two variables
/// created separately are distinct even with the same name and type.
///
/// # Example
///
/// ```rust
/// use efsm::core::{Term, TermType, Variable};
///
/// let a = Variable::new("x", TermType::Int);
/// let b = Variable::new("x", TermType::Int);
///
/// assert_ne!(a, b);
/// assert_eq!(a, a.clone());
/// assert!(a.accepts(&Term::from(3)));
/// assert!(!a.accepts(&Term::from("three")));
/// ```
#[derive(Clone, Debug, Serialize)]
pub struct Variable {
    id: Uuid,
    name: String,
    ty: TermType,
}

impl Variable {
    pub fn new(name: impl Into<String>, ty: TermType) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            ty,
        }
    }

    /// A variable accepting any ground term.
    pub fn any(name: impl Into<String>) -> Self {
        Self::new(name, TermType::Any)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> TermType {
        self.ty
    }

    /// Whether `value` is a ground term satisfying this variable's type.
    pub fn accepts(&self, value: &Term) -> bool {
        value.satisfies(self.ty)
    }
}

impl PartialEq for Variable {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Variable {}

impl Hash for Variable {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "?{}:{}", self.name, self.ty)
    }
}
