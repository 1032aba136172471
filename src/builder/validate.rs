//! Structural validation using Validation.
//!
//! Every check runs and every violation is reported, so a broken structure
//! definition can be fixed in one pass.

use crate::builder::error::StructureViolation;
use crate::core::{Location, Variable};
use crate::runtime::{Edge, Transition};
use std::collections::HashSet;
use std::sync::Arc;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

type Check = Validation<(), NonEmptyVec<StructureViolation>>;

/// Validate a structure definition, accumulating ALL violations.
pub(crate) fn validate_structure(
    locations: &[Location],
    fields: &[Variable],
    edges: &[Edge],
) -> Check {
    let mut checks: Vec<Check> = Vec::new();

    checks.extend(repeated_names(locations.iter().map(Location::name)).map(|name| {
        Validation::fail(StructureViolation::DuplicateLocation {
            name: name.to_string(),
        })
    }));

    checks.extend(repeated_names(fields.iter().map(Variable::name)).map(|name| {
        Validation::fail(StructureViolation::DuplicateField {
            name: name.to_string(),
        })
    }));

    for edge in edges {
        checks.push(wired_location(edge.source(), locations, |location| {
            StructureViolation::UnknownSource {
                transition: edge.transition().name().to_string(),
                location,
            }
        }));
        checks.push(wired_location(edge.target(), locations, |location| {
            StructureViolation::UnknownTarget {
                transition: edge.transition().name().to_string(),
                location,
            }
        }));
    }

    checks.extend(shared_transition_names(edges).into_iter().map(|name| {
        Validation::fail(StructureViolation::DuplicateTransition { name })
    }));

    Validation::all_vec(checks).map(|_| ())
}

fn wired_location<F>(location: &Location, known: &[Location], violation: F) -> Check
where
    F: FnOnce(String) -> StructureViolation,
{
    if known.contains(location) {
        Validation::success(())
    } else {
        Validation::fail(violation(location.name().to_string()))
    }
}

/// Names that occur more than once, each reported once.
fn repeated_names<'a>(names: impl Iterator<Item = &'a str>) -> impl Iterator<Item = &'a str> {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    names.filter(move |name| !seen.insert(*name) && reported.insert(*name))
}

/// Names carried by two or more distinct transitions.
fn shared_transition_names(edges: &[Edge]) -> Vec<String> {
    let mut distinct: Vec<&Arc<Transition>> = Vec::new();
    for edge in edges {
        let transition = edge.transition();
        if !distinct.iter().any(|known| Arc::ptr_eq(known, transition)) {
            distinct.push(transition);
        }
    }

    repeated_names(distinct.iter().map(|transition| transition.name()))
        .map(str::to_string)
        .collect()
}
