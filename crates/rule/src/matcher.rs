use std::any::Any;

use vrkit_observable::{ActiveGate, Event, ObservableList};

use crate::rule::RuleContainer;

/// One rule paired with the event fired when it accepts a source.
#[derive(Debug)]
pub struct RulesMatcherElement<S> {
    pub name: String,
    pub rule: RuleContainer,
    pub matched: Event<S>,
}

impl<S> RulesMatcherElement<S> {
    pub fn new(name: impl Into<String>, rule: RuleContainer) -> Self {
        Self {
            name: name.into(),
            rule,
            matched: Event::new(),
        }
    }
}

/// Fires the event of every element whose rule accepts a source.
///
/// Matching is not first-match-wins: all accepting elements fire, in
/// configuration order. An element with an empty rule container accepts
/// every source and therefore always fires.
#[derive(Debug)]
pub struct RulesMatcher<S> {
    pub elements: ObservableList<RulesMatcherElement<S>>,
    gate: ActiveGate,
}

impl<S: Any> RulesMatcher<S> {
    pub fn new() -> Self {
        Self {
            elements: ObservableList::new(),
            gate: ActiveGate::default(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.gate.is_active()
    }

    pub fn set_active(&mut self, active: bool) {
        self.gate.set_active(active);
    }

    /// Append an element and return its index.
    pub fn add_element(&mut self, element: RulesMatcherElement<S>) -> usize {
        self.elements.add(element);
        self.elements.len() - 1
    }

    pub fn element_mut(&mut self, index: usize) -> Option<&mut RulesMatcherElement<S>> {
        self.elements.get_mut(index)
    }

    /// Names of the elements whose rule accepts `source`, without firing.
    pub fn matching_names(&self, source: &S) -> Vec<&str> {
        let target = Some(source as &dyn Any);
        self.elements
            .iter()
            .filter(|element| element.rule.accepts(target))
            .map(|element| element.name.as_str())
            .collect()
    }

    /// Fire every accepting element. Returns how many fired.
    pub fn match_source(&mut self, source: &S) -> usize {
        if !self.gate.is_active() {
            return 0;
        }
        let _span = tracing::info_span!("rules_match", elements = self.elements.len()).entered();
        let target = Some(source as &dyn Any);
        let mut fired = 0;
        for element in self.elements.iter_mut() {
            if element.rule.accepts(target) {
                tracing::trace!(name = %element.name, "rule matched");
                element.matched.emit(source);
                fired += 1;
            }
        }
        fired
    }
}

impl<S: Any> Default for RulesMatcher<S> {
    fn default() -> Self {
        Self::new()
    }
}
