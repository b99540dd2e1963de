use std::any::Any;
use std::cell::{Ref, RefCell, RefMut};

use vrkit_observable::ObservableList;

use crate::rule::{Rule, RuleContainer};

/// Inverts the contained rule.
///
/// An empty inner container accepts everything, so its negation rejects
/// everything.
#[derive(Debug, Clone, Default)]
pub struct NotRule {
    pub rule: RuleContainer,
}

impl NotRule {
    pub fn new(rule: RuleContainer) -> Self {
        Self { rule }
    }
}

impl Rule for NotRule {
    fn accepts(&self, target: Option<&dyn Any>) -> bool {
        !self.rule.accepts(target)
    }
}

/// Accepts when at least one contained rule accepts. An empty set rejects.
#[derive(Debug, Default)]
pub struct AnyRule {
    rules: RefCell<ObservableList<RuleContainer>>,
}

impl AnyRule {
    pub fn new(rules: impl IntoIterator<Item = RuleContainer>) -> Self {
        Self {
            rules: RefCell::new(rules.into_iter().collect()),
        }
    }

    pub fn rules(&self) -> Ref<'_, ObservableList<RuleContainer>> {
        self.rules.borrow()
    }

    pub fn rules_mut(&self) -> RefMut<'_, ObservableList<RuleContainer>> {
        self.rules.borrow_mut()
    }
}

impl Rule for AnyRule {
    fn accepts(&self, target: Option<&dyn Any>) -> bool {
        self.rules.borrow().iter().any(|rule| rule.accepts(target))
    }
}

/// Accepts when every contained rule accepts. An empty set rejects.
#[derive(Debug, Default)]
pub struct AllRule {
    rules: RefCell<ObservableList<RuleContainer>>,
}

impl AllRule {
    pub fn new(rules: impl IntoIterator<Item = RuleContainer>) -> Self {
        Self {
            rules: RefCell::new(rules.into_iter().collect()),
        }
    }

    pub fn rules(&self) -> Ref<'_, ObservableList<RuleContainer>> {
        self.rules.borrow()
    }

    pub fn rules_mut(&self) -> RefMut<'_, ObservableList<RuleContainer>> {
        self.rules.borrow_mut()
    }
}

impl Rule for AllRule {
    fn accepts(&self, target: Option<&dyn Any>) -> bool {
        let rules = self.rules.borrow();
        !rules.is_empty() && rules.iter().all(|rule| rule.accepts(target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leaf::TagRule;
    use crate::rule::as_target;
    use std::rc::Rc;
    use vrkit_common::SceneObject;

    #[derive(Debug)]
    struct Fixed(bool);

    impl Rule for Fixed {
        fn accepts(&self, _target: Option<&dyn Any>) -> bool {
            self.0
        }
    }

    fn fixed(value: bool) -> RuleContainer {
        RuleContainer::new(Fixed(value))
    }

    #[test]
    fn not_inverts() {
        let target = as_target(&1u8);
        assert!(!NotRule::new(fixed(true)).accepts(target));
        assert!(NotRule::new(fixed(false)).accepts(target));
    }

    #[test]
    fn not_of_empty_container_rejects() {
        assert!(!NotRule::default().accepts(None));
    }

    #[test]
    fn not_tag_accepts_null() {
        let rule = NotRule::new(RuleContainer::new(TagRule::new(["Player"])));
        assert!(rule.accepts(None));
        assert!(!rule.accepts(as_target(&SceneObject::new("p").with_tag("Player"))));
    }

    #[test]
    fn any_rule_semantics() {
        assert!(AnyRule::new([fixed(false), fixed(true)]).accepts(None));
        assert!(!AnyRule::new([fixed(false), fixed(false)]).accepts(None));
        assert!(!AnyRule::default().accepts(None));
    }

    #[test]
    fn all_rule_semantics() {
        assert!(AllRule::new([fixed(true), fixed(true)]).accepts(None));
        assert!(!AllRule::new([fixed(true), fixed(false)]).accepts(None));
        assert!(!AllRule::default().accepts(None));
    }

    #[test]
    fn composite_rules_editable_while_shared() {
        let any = Rc::new(AnyRule::new([fixed(false)]));
        let container = RuleContainer::shared(any.clone());
        assert!(!container.accepts(None));

        let added = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&added);
        any.rules_mut()
            .events
            .added
            .subscribe(move |_: &RuleContainer| *sink.borrow_mut() += 1);

        any.rules_mut().add(fixed(true));
        assert!(container.accepts(None));
        assert_eq!(*added.borrow(), 1);
        assert_eq!(any.rules().len(), 2);
    }
}
