//! Builder for sealing transitions.

use crate::builder::error::BuildError;
use crate::core::{Bindings, Guard, StateData, Term, Variable};
use crate::runtime::{Transition, Update, UpdateError};
use std::sync::Arc;

/// Builder for constructing transitions with a fluent API.
///
/// Every variable that appears in the trigger or a response template must
/// be declared with [`local`](Self::local) before [`build`](Self::build).
///
/// # Example
///
/// ```rust
/// use efsm::builder::TransitionBuilder;
/// use efsm::core::{TermType, Variable};
/// use efsm::mapping;
///
/// let i = Variable::new("i", TermType::Int);
/// let start = TransitionBuilder::new("start")
///     .local(&i)
///     .trigger(mapping! { "command" => "Start", "task_id" => &i })
///     .respond(mapping! { "reply" => () })
///     .build()
///     .unwrap();
///
/// assert_eq!(start.name(), "start");
/// assert!(!start.is_spontaneous());
/// ```
pub struct TransitionBuilder {
    name: String,
    trigger: Option<Term>,
    guard: Option<Guard>,
    update: Option<Update>,
    response: Vec<Term>,
    locals: Vec<Variable>,
}

impl TransitionBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            trigger: None,
            guard: None,
            update: None,
            response: Vec::new(),
            locals: Vec::new(),
        }
    }

    /// Set the trigger pattern. Without one the transition is spontaneous.
    pub fn trigger(mut self, pattern: impl Into<Term>) -> Self {
        self.trigger = Some(pattern.into());
        self
    }

    /// Set the guard. A second call combines both guards with `and`.
    pub fn guard(mut self, guard: Guard) -> Self {
        self.guard = Some(match self.guard.take() {
            Some(existing) => existing.and(guard),
            None => guard,
        });
        self
    }

    /// Add a guard using a closure.
    pub fn when<F>(self, predicate: F) -> Self
    where
        F: Fn(&Bindings, &StateData) -> bool + Send + Sync + 'static,
    {
        self.guard(Guard::new(predicate))
    }

    /// Set the update procedure.
    pub fn update<F>(mut self, update: F) -> Self
    where
        F: Fn(&mut Bindings, &mut StateData) -> Result<(), UpdateError> + Send + Sync + 'static,
    {
        self.update = Some(Arc::new(update));
        self
    }

    /// Append a response template.
    pub fn respond(mut self, template: impl Into<Term>) -> Self {
        self.response.push(template.into());
        self
    }

    /// Replace the response list.
    pub fn response<I, T>(mut self, templates: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Term>,
    {
        self.response = templates.into_iter().map(Into::into).collect();
        self
    }

    /// Declare a local variable (parameter or output parameter).
    pub fn local(mut self, variable: &Variable) -> Self {
        if !self.locals.contains(variable) {
            self.locals.push(variable.clone());
        }
        self
    }

    pub fn locals<'a>(self, variables: impl IntoIterator<Item = &'a Variable>) -> Self {
        variables.into_iter().fold(self, Self::local)
    }

    /// Seal the transition.
    pub fn build(self) -> Result<Arc<Transition>, BuildError> {
        let used = self
            .trigger
            .iter()
            .chain(self.response.iter())
            .flat_map(Term::variables);

        for variable in used {
            if !self.locals.contains(variable) {
                return Err(BuildError::UndeclaredVariable {
                    transition: self.name,
                    variable: variable.name().to_string(),
                });
            }
        }

        Ok(Arc::new(Transition::new(
            self.name,
            self.trigger,
            self.guard,
            self.update,
            self.response,
            self.locals,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TermType;
    use crate::mapping;

    #[test]
    fn builder_rejects_undeclared_trigger_variable() {
        let i = Variable::new("i", TermType::Int);
        let result = TransitionBuilder::new("start")
            .trigger(mapping! { "task_id" => &i })
            .build();

        assert_eq!(
            result.err(),
            Some(BuildError::UndeclaredVariable {
                transition: "start".to_string(),
                variable: "i".to_string(),
            })
        );
    }

    #[test]
    fn builder_rejects_undeclared_response_variable() {
        let out = Variable::any("out");
        let result = TransitionBuilder::new("report")
            .respond(mapping! { "value" => &out })
            .build();

        assert!(matches!(
            result,
            Err(BuildError::UndeclaredVariable { .. })
        ));
    }

    #[test]
    fn locals_are_deduplicated() {
        let a = Variable::any("a");
        let b = Variable::any("b");
        let transition = TransitionBuilder::new("pair")
            .locals([&a, &b, &a])
            .trigger(Term::sequence([&a, &b]))
            .build()
            .unwrap();

        assert_eq!(transition.locals(), &[a, b]);
    }

    #[test]
    fn repeated_guards_are_conjoined() {
        let transition = TransitionBuilder::new("never")
            .when(|_, _| true)
            .when(|_, _| false)
            .build()
            .unwrap();

        let state = StateData::new(Vec::<Variable>::new());
        assert!(transition.enable(None, &state).is_err());
    }

    #[test]
    fn response_replaces_templates_in_order() {
        let transition = TransitionBuilder::new("notify")
            .respond("ignored")
            .response(["first", "second"])
            .build()
            .unwrap();

        assert_eq!(
            transition.response(),
            &[Term::from("first"), Term::from("second")]
        );
    }
}
