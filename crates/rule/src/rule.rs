use std::any::Any;
use std::rc::Rc;

/// A pure predicate over an opaque object reference.
///
/// `target` is `None` for a null reference. Implementations must not have
/// side effects and must treat any target they cannot interpret as
/// non-matching.
pub trait Rule: std::fmt::Debug {
    fn accepts(&self, target: Option<&dyn Any>) -> bool;
}

/// Wrap a concrete value as a rule target.
pub fn as_target<T: Any>(value: &T) -> Option<&dyn Any> {
    Some(value as &dyn Any)
}

/// Holds at most one rule by shared reference and forwards acceptance to it.
///
/// An empty container accepts every target, null included; consumers rely
/// on this to treat "no rule configured" as "always valid".
#[derive(Debug, Clone, Default)]
pub struct RuleContainer {
    rule: Option<Rc<dyn Rule>>,
}

impl RuleContainer {
    pub fn new(rule: impl Rule + 'static) -> Self {
        Self {
            rule: Some(Rc::new(rule)),
        }
    }

    /// Reference a rule that is shared with other containers.
    pub fn shared(rule: Rc<dyn Rule>) -> Self {
        Self { rule: Some(rule) }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_set(&self) -> bool {
        self.rule.is_some()
    }

    pub fn rule(&self) -> Option<&Rc<dyn Rule>> {
        self.rule.as_ref()
    }

    pub fn set(&mut self, rule: Rc<dyn Rule>) {
        self.rule = Some(rule);
    }

    pub fn clear(&mut self) -> Option<Rc<dyn Rule>> {
        self.rule.take()
    }

    pub fn accepts(&self, target: Option<&dyn Any>) -> bool {
        match &self.rule {
            Some(rule) => rule.accepts(target),
            None => true,
        }
    }
}

/// Containers compare equal when they reference the same rule instance.
impl PartialEq for RuleContainer {
    fn eq(&self, other: &Self) -> bool {
        match (&self.rule, &other.rule) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}
