use std::collections::HashMap;
use std::hash::Hash;

use crate::deferred::Deferred;
use crate::event::Event;
use crate::gate::ActiveGate;
use crate::null::NullEquivalent;

/// Notification channels of an [`ObservableCounter`].
#[derive(Debug)]
pub struct CounterEvents<T> {
    /// The key went from untracked to tracked.
    pub added: Event<T>,
    /// The key went from tracked to untracked.
    pub removed: Event<T>,
}

impl<T> Default for CounterEvents<T> {
    fn default() -> Self {
        Self {
            added: Event::new(),
            removed: Event::new(),
        }
    }
}

enum CounterOp<T> {
    Increase(T),
    Decrease(T),
    Remove(T),
    Clear,
}

/// Count changes on an [`ObservableCounter`] from inside its own listeners.
///
/// Calls are queued and applied in order once the counter has settled from
/// the running notification.
pub struct CounterHandle<T>(Deferred<CounterOp<T>>);

impl<T> CounterHandle<T> {
    pub fn increase_count(&self, element: T) {
        self.0.push(CounterOp::Increase(element));
    }

    pub fn decrease_count(&self, element: T) {
        self.0.push(CounterOp::Decrease(element));
    }

    pub fn remove_from_count(&self, element: T) {
        self.0.push(CounterOp::Remove(element));
    }

    pub fn clear(&self) {
        self.0.push(CounterOp::Clear);
    }
}

impl<T> Clone for CounterHandle<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T> std::fmt::Debug for CounterHandle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("CounterHandle").field(&self.0).finish()
    }
}

/// Reference-counted membership tracker.
///
/// Used where the same element can arrive through several sources (e.g.
/// multiple colliders of one object touching a trigger) but should only be
/// reported once on entry and once on exit.
///
/// # Invariants
/// - Counts are always at least one for tracked keys.
/// - `added` fires once per untracked → tracked transition, `removed` once
///   per tracked → untracked transition.
/// - Null-equivalent keys are never tracked.
#[derive(Debug)]
pub struct ObservableCounter<T> {
    counts: HashMap<T, usize>,
    /// Tracked keys in first-seen order.
    order: Vec<T>,
    gate: ActiveGate,
    deferred: Deferred<CounterOp<T>>,
    pub events: CounterEvents<T>,
}

impl<T: Eq + Hash + Clone + NullEquivalent> ObservableCounter<T> {
    pub fn new() -> Self {
        Self {
            counts: HashMap::new(),
            order: Vec::new(),
            gate: ActiveGate::default(),
            deferred: Deferred::default(),
            events: CounterEvents::default(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.gate.is_active()
    }

    pub fn set_active(&mut self, active: bool) {
        self.gate.set_active(active);
    }

    /// Current count for `element`; zero when untracked.
    pub fn get_count(&self, element: &T) -> usize {
        self.counts.get(element).copied().unwrap_or(0)
    }

    pub fn contains(&self, element: &T) -> bool {
        self.counts.contains_key(element)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Tracked keys with their counts, in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&T, usize)> + '_ {
        self.order
            .iter()
            .map(|key| (key, self.counts.get(key).copied().unwrap_or(0)))
    }

    /// A handle listeners can capture to change counts on this counter.
    pub fn handle(&self) -> CounterHandle<T> {
        CounterHandle(self.deferred.clone())
    }

    pub fn increase_count(&mut self, element: T) {
        self.apply_increase(element);
        self.settle();
    }

    pub fn decrease_count(&mut self, element: &T) {
        self.apply_decrease(element);
        self.settle();
    }

    /// Stop tracking `element` regardless of its count.
    pub fn remove_from_count(&mut self, element: &T) {
        self.apply_remove(element);
        self.settle();
    }

    /// Stop tracking every key, notifying in first-seen order.
    pub fn clear(&mut self) {
        self.apply_clear();
        self.settle();
    }

    /// Apply operations queued through handles until none are left.
    fn settle(&mut self) {
        while let Some(op) = self.deferred.next() {
            match op {
                CounterOp::Increase(element) => self.apply_increase(element),
                CounterOp::Decrease(element) => self.apply_decrease(&element),
                CounterOp::Remove(element) => self.apply_remove(&element),
                CounterOp::Clear => self.apply_clear(),
            }
        }
    }

    fn apply_increase(&mut self, element: T) {
        if !self.gate.is_active() || element.is_null_equivalent() {
            return;
        }
        if let Some(count) = self.counts.get_mut(&element) {
            *count += 1;
            tracing::trace!(count = *count, "counter increased");
            return;
        }

        self.counts.insert(element.clone(), 1);
        self.order.push(element.clone());
        tracing::debug!(tracked = self.order.len(), "counter key added");
        self.events.added.emit(&element);
    }

    fn apply_decrease(&mut self, element: &T) {
        if !self.gate.is_active() || element.is_null_equivalent() {
            return;
        }
        let Some(count) = self.counts.get_mut(element) else {
            return;
        };
        *count -= 1;
        if *count == 0 {
            self.untrack(element);
        }
    }

    fn apply_remove(&mut self, element: &T) {
        if !self.gate.is_active() || element.is_null_equivalent() {
            return;
        }
        if self.counts.contains_key(element) {
            self.untrack(element);
        }
    }

    fn apply_clear(&mut self) {
        if !self.gate.is_active() {
            return;
        }
        self.counts.clear();
        let snapshot = std::mem::take(&mut self.order);
        for element in &snapshot {
            self.events.removed.emit(element);
        }
    }

    fn untrack(&mut self, element: &T) {
        self.counts.remove(element);
        self.order.retain(|key| key != element);
        tracing::debug!(tracked = self.order.len(), "counter key removed");
        self.events.removed.emit(element);
    }
}

impl<T: Eq + Hash + Clone + NullEquivalent> Default for ObservableCounter<T> {
    fn default() -> Self {
        Self::new()
    }
}
