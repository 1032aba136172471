//! Property-based tests for matching, substitution and dispatch.
//!
//! These tests use proptest to verify properties hold across
//! many randomly generated inputs.

use efsm::builder::{StructureBuilder, TransitionBuilder};
use efsm::core::{instantiate, match_term, Bindings, Location, Mapping, Term, TermType, Variable};
use efsm::mapping;
use efsm::runtime::{Machine, Structure};
use proptest::prelude::*;
use std::sync::Arc;

fn arbitrary_scalar() -> impl Strategy<Value = Term> {
    prop_oneof![
        Just(Term::Null),
        any::<bool>().prop_map(Term::Bool),
        any::<i64>().prop_map(Term::Int),
        "[a-z]{0,6}".prop_map(Term::Str),
    ]
}

fn arbitrary_ground() -> impl Strategy<Value = Term> {
    arbitrary_scalar().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Term::Sequence),
            prop::collection::btree_map("[a-z]{1,4}", inner, 0..4)
                .prop_map(|entries| Term::Mapping(entries.into_iter().collect())),
        ]
    })
}

/// Replace the scalar leaves selected by `mask` with fresh untyped variables.
fn abstract_leaves(term: &Term, mask: &mut impl Iterator<Item = bool>) -> Term {
    match term {
        Term::Sequence(items) => {
            Term::Sequence(items.iter().map(|item| abstract_leaves(item, mask)).collect())
        }
        Term::Mapping(entries) => Term::Mapping(
            entries
                .iter()
                .map(|(key, value)| (key.clone(), abstract_leaves(value, mask)))
                .collect(),
        ),
        leaf if mask.next().unwrap_or(false) => Term::from(Variable::any(leaf.kind_name())),
        leaf => leaf.clone(),
    }
}

proptest! {
    #[test]
    fn ground_term_matches_itself_without_bindings(term in arbitrary_ground()) {
        let bindings = match_term(&term, &term).unwrap();
        prop_assert!(bindings.is_empty());
    }

    #[test]
    fn match_then_instantiate_reconstructs_ground(
        term in arbitrary_ground(),
        mask in prop::collection::vec(any::<bool>(), 0..32),
    ) {
        let pattern = abstract_leaves(&term, &mut mask.into_iter());
        let bindings = match_term(&pattern, &term).unwrap();

        prop_assert_eq!(bindings.len(), pattern.variables().len());
        prop_assert_eq!(instantiate(&pattern, &bindings), term);
    }

    #[test]
    fn instantiate_without_bindings_is_identity(
        term in arbitrary_ground(),
        mask in prop::collection::vec(any::<bool>(), 0..32),
    ) {
        let template = abstract_leaves(&term, &mut mask.into_iter());
        prop_assert_eq!(instantiate(&template, &Bindings::new()), template);
    }

    #[test]
    fn extra_ground_keys_do_not_affect_mapping_match(
        pattern in prop::collection::btree_map("[a-m]{1,3}", arbitrary_scalar(), 0..4),
        extra in prop::collection::btree_map("[n-z]{1,3}", arbitrary_scalar(), 0..4),
    ) {
        let pattern: Mapping = pattern.into_iter().collect();
        let mut ground = pattern.clone();
        for (key, value) in extra {
            ground.insert(key, value);
        }

        prop_assert!(match_term(&Term::Mapping(pattern.clone()), &Term::Mapping(ground.clone())).is_ok());
        if ground.len() > pattern.len() {
            prop_assert!(match_term(&Term::Mapping(ground), &Term::Mapping(pattern)).is_err());
        }
    }

    #[test]
    fn sequence_pattern_requires_exact_length(
        arity in 0usize..5,
        items in prop::collection::vec(arbitrary_scalar(), 0..8),
    ) {
        let vars: Vec<Variable> = (0..arity).map(|n| Variable::any(format!("v{n}"))).collect();
        let pattern = Term::sequence(&vars);
        let ground = Term::Sequence(items.clone());

        let result = match_term(&pattern, &ground);
        prop_assert_eq!(result.is_ok(), items.len() == arity);
    }

    #[test]
    fn typed_variable_only_binds_its_type(value in arbitrary_scalar()) {
        let x = Variable::new("x", TermType::Int);
        let result = match_term(&Term::from(&x), &value);
        prop_assert_eq!(result.is_ok(), matches!(value, Term::Int(_)));
    }

    #[test]
    fn ground_terms_survive_json(term in arbitrary_ground()) {
        let json = serde_json::to_string(&term).unwrap();
        let decoded: Term = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(decoded, term);
    }

    #[test]
    fn dispatch_is_deterministic(
        events in prop::collection::vec((0u8..4, -3i64..3), 0..20)
    ) {
        let (structure, start) = accumulator();
        let mut first = Machine::new(Arc::clone(&structure), &start).unwrap();
        let mut second = Machine::new(structure, &start).unwrap();

        for (kind, amount) in events {
            let event = match kind {
                0 => mapping! { "open" => true },
                1 => mapping! { "add" => amount },
                2 => mapping! { "close" => true },
                _ => mapping! { "noise" => amount },
            };
            let a = first.dispatch(&event).unwrap();
            let b = second.dispatch(&event).unwrap();
            prop_assert_eq!(a, b);
            prop_assert_eq!(first.current_location().name(), second.current_location().name());
        }

        prop_assert_eq!(first.snapshot(), second.snapshot());
    }
}

/// `closed` --open--> `open` --add(n)*--> `open` --close--> `closed`.
/// Adding is guarded to non-negative amounts and reports the running total.
fn accumulator() -> (Arc<Structure>, Location) {
    let mut builder = StructureBuilder::new("accumulator");
    let [closed, open] = builder.locations(["closed", "open"]);
    let total = builder.field("total", TermType::Int);

    let total_in = total.clone();
    let open_t = TransitionBuilder::new("open")
        .trigger(mapping! { "open" => true })
        .update(move |_, state| {
            state.set(&total_in, 0)?;
            Ok(())
        })
        .build()
        .unwrap();

    let n = Variable::new("n", TermType::Int);
    let sum = Variable::new("sum", TermType::Int);
    let (n_in, sum_in, total_in) = (n.clone(), sum.clone(), total.clone());
    let n_guard = n.clone();
    let add = TransitionBuilder::new("add")
        .locals([&n, &sum])
        .trigger(mapping! { "add" => &n })
        .when(move |bindings, _| {
            bindings
                .get(&n_guard)
                .and_then(Term::as_int)
                .is_some_and(|amount| amount >= 0)
        })
        .update(move |bindings, state| {
            let current = state.get(&total_in).and_then(Term::as_int).unwrap_or(0);
            let delta = bindings.get(&n_in).and_then(Term::as_int).unwrap_or(0);
            state.set(&total_in, current + delta)?;
            bindings.bind(&sum_in, Term::from(current + delta))?;
            Ok(())
        })
        .respond(mapping! { "total" => &sum })
        .build()
        .unwrap();

    let close = TransitionBuilder::new("close")
        .trigger(mapping! { "close" => true })
        .respond("closed")
        .build()
        .unwrap();

    builder
        .wire(&open_t, &closed, &open)
        .wire(&add, &open, &open)
        .wire(&close, &open, &closed);
    (builder.build().unwrap(), closed)
}
