//! Guard predicates for controlling transition eligibility.
//!
//! Guards are pure boolean functions over the bindings of a trigger match
//! and the current state data. They further restrict which transitions may
//! fire once a trigger has matched.

use super::bindings::Bindings;
use super::state::StateData;
use super::variable::Variable;
use std::fmt;
use std::sync::Arc;

type Predicate = dyn Fn(&Bindings, &StateData) -> bool + Send + Sync;

/// Pure predicate that decides whether a matched transition may fire.
///
/// # Example
///
/// ```rust
/// use efsm::core::{Bindings, Guard, StateData, Term, TermType, Variable};
///
/// let i = Variable::new("i", TermType::Int);
/// let task_id = Variable::new("task_id", TermType::Int);
///
/// let mut state = StateData::new(vec![task_id.clone()]);
/// state.set(&task_id, 5).unwrap();
///
/// let mut bindings = Bindings::new();
/// bindings.bind(&i, Term::from(5)).unwrap();
///
/// let same_task = Guard::equals(&i, &task_id);
/// assert!(same_task.check(&bindings, &state));
///
/// let positive = Guard::new(move |b: &Bindings, _: &StateData| {
///     b.get(&i).and_then(Term::as_int).is_some_and(|n| n > 0)
/// });
/// assert!(positive.check(&bindings, &state));
/// ```
#[derive(Clone)]
pub struct Guard {
    predicate: Arc<Predicate>,
}

impl Guard {
    /// Create a guard from a pure predicate function.
    ///
    /// The predicate must be deterministic, free of side effects and
    /// thread-safe (Send + Sync).
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&Bindings, &StateData) -> bool + Send + Sync + 'static,
    {
        Guard {
            predicate: Arc::new(predicate),
        }
    }

    /// Holds when `param` is bound and equal to the current value of `field`.
    pub fn equals(param: &Variable, field: &Variable) -> Self {
        let param = param.clone();
        let field = field.clone();
        Guard::new(move |bindings, state| match (bindings.get(&param), state.get(&field)) {
            (Some(bound), Some(current)) => bound == current,
            _ => false,
        })
    }

    /// Holds when both guards hold. `other` is not evaluated if `self` fails.
    pub fn and(self, other: Guard) -> Self {
        Guard::new(move |bindings, state| {
            self.check(bindings, state) && other.check(bindings, state)
        })
    }

    pub fn check(&self, bindings: &Bindings, state: &StateData) -> bool {
        (self.predicate)(bindings, state)
    }
}

impl fmt::Debug for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Guard").finish_non_exhaustive()
    }
}
