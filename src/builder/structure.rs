//! Builder for structures: locations, state fields and wired edges.

use crate::builder::error::BuildError;
use crate::builder::validate::validate_structure;
use crate::core::{Location, TermType, Variable};
use crate::runtime::{Edge, Structure, Transition};
use std::sync::Arc;
use stillwater::validation::Validation;

/// Builder for constructing a [`Structure`].
///
/// Locations and fields are created through the builder, which hands back
/// the values used to wire edges and to read state later. Sealing with
/// [`build`](Self::build) validates the whole definition at once.
///
/// # Example
///
/// ```rust
/// use efsm::builder::{StructureBuilder, TransitionBuilder};
/// use efsm::core::TermType;
///
/// let mut builder = StructureBuilder::new("camera");
/// let [off, on] = builder.locations(["off", "on"]);
/// let mode = builder.field("mode", TermType::Str);
///
/// let power = TransitionBuilder::new("power").build().unwrap();
/// builder.wire(&power, &off, &on).wire(&power, &on, &off);
///
/// let structure = builder.build().unwrap();
/// assert_eq!(structure.locations().len(), 2);
/// assert_eq!(structure.field("mode"), Some(&mode));
/// ```
#[derive(Debug)]
pub struct StructureBuilder {
    name: String,
    locations: Vec<Location>,
    fields: Vec<Variable>,
    edges: Vec<Edge>,
}

impl StructureBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            locations: Vec::new(),
            fields: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// Declare a new location and return it.
    pub fn location(&mut self, name: &str) -> Location {
        let location = Location::new(name);
        self.locations.push(location.clone());
        location
    }

    /// Declare several locations at once.
    pub fn locations<const N: usize>(&mut self, names: [&str; N]) -> [Location; N] {
        names.map(|name| self.location(name))
    }

    /// Add a location created elsewhere.
    pub fn add_location(&mut self, location: &Location) -> &mut Self {
        self.locations.push(location.clone());
        self
    }

    /// Declare a typed state field and return its variable.
    pub fn field(&mut self, name: &str, ty: TermType) -> Variable {
        let field = Variable::new(name, ty);
        self.fields.push(field.clone());
        field
    }

    /// Add a state field created elsewhere.
    pub fn add_field(&mut self, field: &Variable) -> &mut Self {
        self.fields.push(field.clone());
        self
    }

    /// Wire `transition` onto the edge `source -> target`.
    pub fn wire(
        &mut self,
        transition: &Arc<Transition>,
        source: &Location,
        target: &Location,
    ) -> &mut Self {
        self.edges.push(Edge::new(
            Arc::clone(transition),
            source.clone(),
            target.clone(),
        ));
        self
    }

    /// Validate and seal the structure.
    pub fn build(self) -> Result<Arc<Structure>, BuildError> {
        match validate_structure(&self.locations, &self.fields, &self.edges) {
            Validation::Success(_) => {
                tracing::debug!(
                    structure = %self.name,
                    locations = self.locations.len(),
                    fields = self.fields.len(),
                    edges = self.edges.len(),
                    "structure sealed"
                );
                Ok(Arc::new(Structure::new(
                    self.name,
                    self.locations,
                    self.fields,
                    self.edges,
                )))
            }
            Validation::Failure(violations) => Err(BuildError::StructuralConfig {
                structure: self.name,
                violations: violations.iter().cloned().collect(),
            }),
        }
    }
}
