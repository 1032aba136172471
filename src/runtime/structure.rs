//! Immutable graph of locations and wired transitions for one machine type.

use crate::core::{Location, StateData, Variable};
use crate::runtime::transition::Transition;
use std::sync::Arc;

/// One wiring of a transition between two locations.
#[derive(Clone, Debug)]
pub struct Edge {
    transition: Arc<Transition>,
    source: Location,
    target: Location,
}

impl Edge {
    pub(crate) fn new(transition: Arc<Transition>, source: Location, target: Location) -> Self {
        Self {
            transition,
            source,
            target,
        }
    }

    pub fn transition(&self) -> &Arc<Transition> {
        &self.transition
    }

    pub fn source(&self) -> &Location {
        &self.source
    }

    pub fn target(&self) -> &Location {
        &self.target
    }
}

/// Locations, state fields and edges of a machine type.
///
/// Built once by [`StructureBuilder`](crate::builder::StructureBuilder),
/// never mutated afterwards, and shared read-only by every instance.
#[derive(Debug)]
pub struct Structure {
    name: String,
    locations: Vec<Location>,
    fields: Arc<[Variable]>,
    edges: Vec<Edge>,
}

impl Structure {
    pub(crate) fn new(
        name: String,
        locations: Vec<Location>,
        fields: Vec<Variable>,
        edges: Vec<Edge>,
    ) -> Self {
        Self {
            name,
            locations,
            fields: fields.into(),
            edges,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    pub fn location(&self, name: &str) -> Option<&Location> {
        self.locations.iter().find(|location| location.name() == name)
    }

    pub fn contains(&self, location: &Location) -> bool {
        self.locations.contains(location)
    }

    /// Declared state fields, in declaration order.
    pub fn fields(&self) -> &[Variable] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Variable> {
        self.fields.iter().find(|field| field.name() == name)
    }

    /// All edges in declaration order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Edges leaving `location`, in declaration order.
    pub fn edges_from<'a>(&'a self, location: &'a Location) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges
            .iter()
            .filter(move |edge| edge.source() == location)
    }

    /// Distinct transitions, in the order they were first wired.
    pub fn transitions(&self) -> Vec<&Arc<Transition>> {
        let mut found: Vec<&Arc<Transition>> = Vec::new();
        for edge in &self.edges {
            if !found
                .iter()
                .any(|known| Arc::ptr_eq(known, edge.transition()))
            {
                found.push(edge.transition());
            }
        }
        found
    }

    pub fn transition(&self, name: &str) -> Option<&Arc<Transition>> {
        self.edges
            .iter()
            .map(Edge::transition)
            .find(|transition| transition.name() == name)
    }

    /// A location without outgoing edges is terminal.
    pub fn is_terminal(&self, location: &Location) -> bool {
        self.edges_from(location).next().is_none()
    }

    /// State data with every declared field unbound.
    pub fn empty_state(&self) -> StateData {
        StateData::new(Arc::clone(&self.fields))
    }
}
