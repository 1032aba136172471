//! Machine instances and the dispatcher that drives them.

use crate::core::{
    Bindings, FiringHistory, FiringRecord, Location, StateData, StateSnapshot, StateVector, Term,
    Variable,
};
use crate::runtime::config::{MachineConfig, SelectionPolicy};
use crate::runtime::error::{ConstructError, DispatchError};
use crate::runtime::structure::{Edge, Structure};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

/// A committed transition firing.
#[derive(Clone, Debug, PartialEq)]
pub struct Firing {
    pub transition: String,
    pub from: Location,
    pub to: Location,
    pub responses: Vec<Term>,
}

/// Result of offering one event (or none) to an instance.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    /// Exactly one transition fired
    Fired(Firing),

    /// No candidate matched and passed its guard; nothing changed
    NoEligibleTransition,
}

impl Outcome {
    pub fn fired(&self) -> bool {
        matches!(self, Self::Fired(_))
    }

    pub fn responses(&self) -> &[Term] {
        match self {
            Self::Fired(firing) => &firing.responses,
            Self::NoEligibleTransition => &[],
        }
    }

    pub fn into_responses(self) -> Vec<Term> {
        match self {
            Self::Fired(firing) => firing.responses,
            Self::NoEligibleTransition => Vec::new(),
        }
    }
}

/// A running instance: a shared [`Structure`] plus an owned state vector.
///
/// Each call to [`dispatch`](Machine::dispatch) is one indivisible step:
/// either a single transition fires and its update, responses and location
/// change are committed together, or nothing changes at all.
///
/// # Example
///
/// ```rust
/// use efsm::builder::{StructureBuilder, TransitionBuilder};
/// use efsm::core::{Term, TermType, Variable};
/// use efsm::mapping;
/// use efsm::runtime::Machine;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut builder = StructureBuilder::new("echo");
/// let idle = builder.location("idle");
///
/// let x = Variable::any("x");
/// let echo = TransitionBuilder::new("echo")
///     .local(&x)
///     .trigger(mapping! { "say" => &x })
///     .respond(mapping! { "heard" => &x })
///     .build()?;
/// builder.wire(&echo, &idle, &idle);
/// let structure = builder.build()?;
///
/// let mut machine = Machine::new(structure, &idle)?;
/// let responses = machine.dispatch(&mapping! { "say" => "hello" })?;
///
/// assert_eq!(responses, vec![mapping! { "heard" => "hello" }]);
/// assert!(machine.dispatch(&Term::from(42))?.is_empty());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Machine {
    id: Uuid,
    structure: Arc<Structure>,
    state: StateVector,
    history: FiringHistory,
    config: MachineConfig,
}

impl Machine {
    /// Create an instance at `initial` with every state field unbound.
    pub fn new(structure: Arc<Structure>, initial: &Location) -> Result<Self, ConstructError> {
        Self::with_data(structure, initial, Vec::<(Variable, Term)>::new())
    }

    /// Create an instance at `initial` with the given initial field values.
    pub fn with_data<I, T>(
        structure: Arc<Structure>,
        initial: &Location,
        data: I,
    ) -> Result<Self, ConstructError>
    where
        I: IntoIterator<Item = (Variable, T)>,
        T: Into<Term>,
    {
        if !structure.contains(initial) {
            return Err(ConstructError::UnknownLocation {
                structure: structure.name().to_string(),
                location: initial.name().to_string(),
            });
        }

        let mut state = structure.empty_state();
        for (field, value) in data {
            state.set(&field, value)?;
        }

        let machine = Self {
            id: Uuid::new_v4(),
            state: StateVector::new(initial.clone(), state),
            structure,
            history: FiringHistory::new(),
            config: MachineConfig::default(),
        };
        tracing::debug!(
            machine = %machine.id,
            structure = machine.structure.name(),
            location = %initial,
            "machine constructed"
        );
        Ok(machine)
    }

    /// Replace the configuration.
    pub fn with_config(mut self, config: MachineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn structure(&self) -> &Arc<Structure> {
        &self.structure
    }

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    pub fn current_location(&self) -> &Location {
        self.state.location()
    }

    /// Read-only view of the data variables.
    pub fn current_state(&self) -> &StateData {
        self.state.data()
    }

    pub fn state(&self) -> &StateVector {
        &self.state
    }

    pub fn snapshot(&self) -> StateSnapshot {
        self.state.snapshot()
    }

    pub fn history(&self) -> &FiringHistory {
        &self.history
    }

    /// True when the current location has no outgoing edges.
    pub fn is_terminal(&self) -> bool {
        self.structure.is_terminal(self.state.location())
    }

    /// Offer an event and return the responses of the transition that fired.
    ///
    /// An event no transition accepts yields an empty response list and
    /// leaves the instance unchanged.
    pub fn dispatch(&mut self, event: &Term) -> Result<Vec<Term>, DispatchError> {
        self.step(event).map(Outcome::into_responses)
    }

    /// Offer an event and report exactly what happened.
    pub fn step(&mut self, event: &Term) -> Result<Outcome, DispatchError> {
        self.react(Some(event))
    }

    /// Fire one spontaneous (trigger-less) transition, if any is eligible.
    pub fn advance(&mut self) -> Result<Outcome, DispatchError> {
        self.react(None)
    }

    /// Fire spontaneous transitions until none is eligible or `limit`
    /// firings happened. Returns all responses in firing order.
    pub fn run_spontaneous(&mut self, limit: usize) -> Result<Vec<Term>, DispatchError> {
        let mut responses = Vec::new();
        for _ in 0..limit {
            match self.advance()? {
                Outcome::Fired(firing) => responses.extend(firing.responses),
                Outcome::NoEligibleTransition => break,
            }
        }
        Ok(responses)
    }

    fn react(&mut self, event: Option<&Term>) -> Result<Outcome, DispatchError> {
        let structure = Arc::clone(&self.structure);
        let from = self.state.location().clone();

        let Some((edge, bindings)) = self.select(&structure, &from, event)? else {
            tracing::debug!(
                machine = %self.id,
                location = %from,
                event = ?event.map(ToString::to_string),
                "no eligible transition"
            );
            return Ok(Outcome::NoEligibleTransition);
        };

        let transition = edge.transition();
        let (data, responses) = transition
            .fire(bindings, self.state.data())
            .map_err(|source| {
                tracing::warn!(
                    machine = %self.id,
                    transition = transition.name(),
                    location = %from,
                    error = %source,
                    "update aborted dispatch"
                );
                DispatchError::Update {
                    transition: transition.name().to_string(),
                    location: from.name().to_string(),
                    source,
                }
            })?;

        let to = edge.target().clone();
        self.state = StateVector::new(to.clone(), data);
        self.record(transition.name(), &from, &to, responses.len());

        tracing::info!(
            machine = %self.id,
            transition = transition.name(),
            from = %from,
            to = %to,
            responses = responses.len(),
            "transition fired"
        );

        Ok(Outcome::Fired(Firing {
            transition: transition.name().to_string(),
            from,
            to,
            responses,
        }))
    }

    /// Find the edge to fire from `location`, with the bindings it fires with.
    fn select<'s>(
        &self,
        structure: &'s Structure,
        location: &'s Location,
        event: Option<&Term>,
    ) -> Result<Option<(&'s Edge, Bindings)>, DispatchError> {
        let data = self.state.data();
        let mut eligible = structure.edges_from(location).filter_map(|edge| {
            match edge.transition().enable(event, data) {
                Ok(bindings) => Some((edge, bindings)),
                Err(rejection) => {
                    tracing::trace!(
                        machine = %self.id,
                        transition = edge.transition().name(),
                        %rejection,
                        "candidate rejected"
                    );
                    None
                }
            }
        });

        match self.config.selection {
            SelectionPolicy::FirstMatch => Ok(eligible.next()),
            SelectionPolicy::RejectAmbiguous => {
                let all: Vec<_> = eligible.collect();
                if all.len() > 1 {
                    let transitions: Vec<String> = all
                        .iter()
                        .map(|(edge, _)| edge.transition().name().to_string())
                        .collect();
                    tracing::warn!(
                        machine = %self.id,
                        location = %location,
                        ?transitions,
                        "ambiguous event rejected"
                    );
                    return Err(DispatchError::Ambiguous {
                        location: location.name().to_string(),
                        transitions,
                    });
                }
                Ok(all.into_iter().next())
            }
        }
    }

    fn record(&mut self, transition: &str, from: &Location, to: &Location, responses: usize) {
        if !self.config.track_history {
            return;
        }

        self.history.push(
            FiringRecord {
                transition: transition.to_string(),
                from: from.name().to_string(),
                to: to.name().to_string(),
                timestamp: Utc::now(),
                responses,
            },
            self.config.history_limit,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{StructureBuilder, TransitionBuilder};
    use crate::core::{Guard, TermType};
    use crate::mapping;
    use crate::runtime::config::DEFAULT_HISTORY_LIMIT;
    use crate::runtime::UpdateError;

    struct Counter {
        structure: Arc<Structure>,
        idle: Location,
        count: Variable,
    }

    /// One location, an `add` self loop and a `reset` self loop.
    fn counter() -> Counter {
        let mut builder = StructureBuilder::new("counter");
        let idle = builder.location("idle");
        let count = builder.field("count", TermType::Int);

        let n = Variable::new("n", TermType::Int);
        let (count_in, n_in) = (count.clone(), n.clone());
        let add = TransitionBuilder::new("add")
            .local(&n)
            .trigger(mapping! { "add" => &n })
            .update(move |bindings, state| {
                let current = state.get(&count_in).and_then(Term::as_int).unwrap_or(0);
                let delta = bindings.get(&n_in).and_then(Term::as_int).unwrap_or(0);
                state.set(&count_in, current + delta)?;
                Ok(())
            })
            .respond(mapping! { "added" => &n })
            .build()
            .unwrap();

        let count_in = count.clone();
        let reset = TransitionBuilder::new("reset")
            .trigger(mapping! { "command" => "reset" })
            .update(move |_, state| {
                state.set(&count_in, 0)?;
                Ok(())
            })
            .build()
            .unwrap();

        builder.wire(&add, &idle, &idle).wire(&reset, &idle, &idle);
        Counter {
            structure: builder.build().unwrap(),
            idle,
            count,
        }
    }

    #[test]
    fn construction_rejects_foreign_location() {
        let counter = counter();
        let stray = Location::new("idle");

        let result = Machine::new(counter.structure, &stray);
        assert!(matches!(
            result,
            Err(ConstructError::UnknownLocation { .. })
        ));
    }

    #[test]
    fn construction_type_checks_initial_data() {
        let counter = counter();
        let result = Machine::with_data(
            counter.structure.clone(),
            &counter.idle,
            [(counter.count.clone(), "zero")],
        );
        assert!(matches!(result, Err(ConstructError::InitialValue(_))));

        let machine =
            Machine::with_data(counter.structure, &counter.idle, [(counter.count.clone(), 3)])
                .unwrap();
        assert_eq!(
            machine.current_state().get(&counter.count),
            Some(&Term::from(3))
        );
    }

    #[test]
    fn dispatch_fires_matching_transition() {
        let counter = counter();
        let mut machine =
            Machine::with_data(counter.structure, &counter.idle, [(counter.count.clone(), 0)])
                .unwrap();

        let responses = machine.dispatch(&mapping! { "add" => 4 }).unwrap();
        assert_eq!(responses, vec![mapping! { "added" => 4 }]);
        machine.dispatch(&mapping! { "add" => 3 }).unwrap();
        assert_eq!(
            machine.current_state().get(&counter.count),
            Some(&Term::from(7))
        );

        machine.dispatch(&mapping! { "command" => "reset" }).unwrap();
        assert_eq!(
            machine.current_state().get(&counter.count),
            Some(&Term::from(0))
        );
        assert_eq!(machine.history().len(), 3);
    }

    #[test]
    fn unmatched_event_is_a_silent_no_op() {
        let counter = counter();
        let mut machine = Machine::new(counter.structure, &counter.idle).unwrap();
        let before = machine.state().clone();

        let outcome = machine.step(&mapping! { "add" => "four" }).unwrap();

        assert_eq!(outcome, Outcome::NoEligibleTransition);
        assert!(outcome.responses().is_empty());
        assert_eq!(machine.state(), &before);
        assert!(machine.history().is_empty());
    }

    #[test]
    fn failed_update_rolls_back_and_reports() {
        let mut builder = StructureBuilder::new("faulty");
        let [a, b] = builder.locations(["a", "b"]);
        let flag = builder.field("flag", TermType::Bool);
        let count = builder.field("count", TermType::Int);

        let (flag_in, count_in) = (flag.clone(), count.clone());
        let broken = TransitionBuilder::new("broken")
            .trigger(Term::from("go"))
            .update(move |_, state| {
                state.set(&flag_in, true)?;
                state.set(&count_in, "many")?;
                Ok(())
            })
            .respond(Term::from("done"))
            .build()
            .unwrap();
        builder.wire(&broken, &a, &b);
        let structure = builder.build().unwrap();

        let mut machine = Machine::new(structure, &a).unwrap();
        let result = machine.dispatch(&Term::from("go"));

        match result {
            Err(DispatchError::Update {
                transition,
                location,
                source: UpdateError::State(_),
            }) => {
                assert_eq!(transition, "broken");
                assert_eq!(location, "a");
            }
            other => panic!("expected update error, got {other:?}"),
        }
        assert_eq!(machine.current_location(), &a);
        assert!(!machine.current_state().is_bound(&flag));
        assert!(machine.history().is_empty());
    }

    #[test]
    fn first_eligible_candidate_wins() {
        let mut builder = StructureBuilder::new("choice");
        let [start, left, right] = builder.locations(["start", "left", "right"]);
        let x = Variable::any("x");
        let go_left = TransitionBuilder::new("go_left")
            .local(&x)
            .trigger(mapping! { "go" => &x })
            .build()
            .unwrap();
        let go_right = TransitionBuilder::new("go_right")
            .trigger(mapping! { "go" => "right" })
            .build()
            .unwrap();
        builder
            .wire(&go_left, &start, &left)
            .wire(&go_right, &start, &right);
        let structure = builder.build().unwrap();

        let mut machine = Machine::new(Arc::clone(&structure), &start).unwrap();
        let outcome = machine.step(&mapping! { "go" => "right" }).unwrap();
        match outcome {
            Outcome::Fired(firing) => {
                assert_eq!(firing.transition, "go_left");
                assert_eq!(firing.to, left);
            }
            Outcome::NoEligibleTransition => panic!("expected a firing"),
        }

        let mut strict = Machine::new(structure, &start)
            .unwrap()
            .with_config(MachineConfig::default().with_selection(SelectionPolicy::RejectAmbiguous));
        let result = strict.step(&mapping! { "go" => "right" });
        match result {
            Err(DispatchError::Ambiguous { transitions, .. }) => {
                assert_eq!(transitions, vec!["go_left", "go_right"]);
            }
            other => panic!("expected ambiguity, got {other:?}"),
        }
        assert_eq!(strict.current_location(), &start);

        let outcome = strict.step(&mapping! { "go" => "up" }).unwrap();
        assert!(outcome.fired());
        assert_eq!(strict.current_location(), &left);
    }

    #[test]
    fn guard_sees_bindings_and_state() {
        let mut builder = StructureBuilder::new("gate");
        let [closed, open] = builder.locations(["closed", "open"]);
        let code = builder.field("code", TermType::Int);
        let entered = Variable::new("entered", TermType::Int);
        let unlock = TransitionBuilder::new("unlock")
            .local(&entered)
            .trigger(mapping! { "code" => &entered })
            .guard(Guard::equals(&entered, &code))
            .build()
            .unwrap();
        builder.wire(&unlock, &closed, &open);
        let structure = builder.build().unwrap();

        let mut machine = Machine::with_data(structure, &closed, [(code, 1234)]).unwrap();
        assert!(!machine.step(&mapping! { "code" => 1111 }).unwrap().fired());
        assert!(machine.step(&mapping! { "code" => 1234 }).unwrap().fired());
        assert_eq!(machine.current_location(), &open);
        assert!(machine.is_terminal());
    }

    #[test]
    fn history_respects_config() {
        let counter = counter();
        let mut untracked = Machine::new(Arc::clone(&counter.structure), &counter.idle)
            .unwrap()
            .with_config(MachineConfig::default().with_history(false));
        untracked.dispatch(&mapping! { "add" => 1 }).unwrap();
        assert!(untracked.history().is_empty());

        let mut bounded = Machine::new(counter.structure, &counter.idle)
            .unwrap()
            .with_config(MachineConfig::default().with_history_limit(2));
        for n in 0..5 {
            bounded.dispatch(&mapping! { "add" => n }).unwrap();
        }
        assert_eq!(bounded.history().len(), 2);
        assert_eq!(bounded.history().path(), vec!["idle", "idle", "idle"]);
    }

    #[test]
    fn default_history_stays_bounded_over_long_runs() {
        let counter = counter();
        let mut machine = Machine::new(counter.structure, &counter.idle).unwrap();
        let limit = DEFAULT_HISTORY_LIMIT;

        let started = std::time::Instant::now();
        for n in 0..(limit as i64 * 20) {
            machine.dispatch(&mapping! { "add" => n % 7 }).unwrap();
        }
        let elapsed = started.elapsed();

        assert_eq!(machine.history().len(), limit);
        assert!(
            elapsed < std::time::Duration::from_secs(30),
            "dispatching took {elapsed:?}"
        );
    }

    #[test]
    fn spontaneous_transitions_run_without_events() {
        let mut builder = StructureBuilder::new("ready_completed");
        let [waiting, ready, completed] = builder.locations(["waiting", "ready", "completed"]);
        let notify_ready = TransitionBuilder::new("notify_ready")
            .respond(mapping! { "notification" => "Ready", "arg" => 7 })
            .build()
            .unwrap();
        let notify_completed = TransitionBuilder::new("notify_completed")
            .respond(mapping! { "notification" => "Completed", "arg" => 7 })
            .build()
            .unwrap();
        builder
            .wire(&notify_ready, &waiting, &ready)
            .wire(&notify_completed, &ready, &completed);
        let structure = builder.build().unwrap();

        let mut machine = Machine::new(structure, &waiting).unwrap();
        let responses = machine.run_spontaneous(10).unwrap();

        assert_eq!(
            responses,
            vec![
                mapping! { "notification" => "Ready", "arg" => 7 },
                mapping! { "notification" => "Completed", "arg" => 7 },
            ]
        );
        assert_eq!(machine.current_location(), &completed);
        assert!(machine.is_terminal());
        assert_eq!(machine.advance().unwrap(), Outcome::NoEligibleTransition);
    }

    #[test]
    fn advance_ignores_triggered_transitions() {
        let counter = counter();
        let mut machine = Machine::new(counter.structure, &counter.idle).unwrap();
        assert!(!machine.advance().unwrap().fired());
        assert!(machine.run_spontaneous(3).unwrap().is_empty());
    }

    #[test]
    fn snapshot_reflects_current_state() {
        let counter = counter();
        let mut machine = Machine::new(counter.structure, &counter.idle).unwrap();
        assert!(machine.snapshot().data.is_empty());

        machine.dispatch(&mapping! { "add" => 2 }).unwrap();
        let snapshot = machine.snapshot();
        assert_eq!(snapshot.location, "idle");
        assert_eq!(snapshot.data.get("count"), Some(&Term::from(2)));
    }
}
