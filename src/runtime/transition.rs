//! Sealed transitions: trigger, guard, update and response templates.

use crate::core::{
    instantiate, match_term, Bindings, Guard, MatchFailure, StateData, Term, Variable,
};
use crate::runtime::error::UpdateError;
use std::fmt;
use std::sync::Arc;

/// Update procedure of a transition.
///
/// Receives the firing's bindings (to read parameters and bind output
/// parameters) and a working copy of the state data to mutate.
pub type Update =
    Arc<dyn Fn(&mut Bindings, &mut StateData) -> Result<(), UpdateError> + Send + Sync>;

/// Why a transition is not eligible in the current situation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// The transition has a trigger but no event was offered
    NoEvent,
    /// The event does not match the trigger
    Trigger(MatchFailure),
    /// The guard does not hold
    Guard,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoEvent => f.write_str("no event to match the trigger"),
            Self::Trigger(failure) => write!(f, "trigger mismatch: {failure}"),
            Self::Guard => f.write_str("guard does not hold"),
        }
    }
}

/// Immutable transition definition, shared by every edge it is wired onto.
///
/// Built with [`TransitionBuilder`](crate::builder::TransitionBuilder).
pub struct Transition {
    name: String,
    trigger: Option<Term>,
    guard: Option<Guard>,
    update: Option<Update>,
    response: Vec<Term>,
    locals: Vec<Variable>,
}

impl Transition {
    pub(crate) fn new(
        name: String,
        trigger: Option<Term>,
        guard: Option<Guard>,
        update: Option<Update>,
        response: Vec<Term>,
        locals: Vec<Variable>,
    ) -> Self {
        Self {
            name,
            trigger,
            guard,
            update,
            response,
            locals,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn trigger(&self) -> Option<&Term> {
        self.trigger.as_ref()
    }

    pub fn response(&self) -> &[Term] {
        &self.response
    }

    pub fn locals(&self) -> &[Variable] {
        &self.locals
    }

    /// A transition without trigger fires without an event.
    pub fn is_spontaneous(&self) -> bool {
        self.trigger.is_none()
    }

    /// Check whether this transition may fire (pure).
    ///
    /// Spontaneous transitions are eligible with or without an event and
    /// start from empty bindings. Otherwise the event must match the
    /// trigger. The guard is then evaluated over the bindings and `state`.
    pub fn enable(&self, event: Option<&Term>, state: &StateData) -> Result<Bindings, Rejection> {
        let bindings = match (&self.trigger, event) {
            (None, _) => Bindings::new(),
            (Some(_), None) => return Err(Rejection::NoEvent),
            (Some(trigger), Some(event)) => {
                match_term(trigger, event).map_err(Rejection::Trigger)?
            }
        };

        if self
            .guard
            .as_ref()
            .is_none_or(|guard| guard.check(&bindings, state))
        {
            Ok(bindings)
        } else {
            Err(Rejection::Guard)
        }
    }

    /// Run the update on a copy of `state` and instantiate the responses.
    ///
    /// Returns the next state data and the ordered responses. `state`
    /// itself is never touched, so a failed update leaves nothing behind.
    pub fn fire(
        &self,
        mut bindings: Bindings,
        state: &StateData,
    ) -> Result<(StateData, Vec<Term>), UpdateError> {
        let mut next = state.clone();
        if let Some(update) = &self.update {
            update(&mut bindings, &mut next)?;
        }

        let responses = self
            .response
            .iter()
            .map(|template| instantiate(template, &bindings))
            .collect();

        Ok((next, responses))
    }
}

impl fmt::Debug for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transition")
            .field("name", &self.name)
            .field("trigger", &self.trigger)
            .field("guard", &self.guard.is_some())
            .field("update", &self.update.is_some())
            .field("response", &self.response)
            .field("locals", &self.locals)
            .finish()
    }
}
