use std::cell::Cell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::deferred::Deferred;
use crate::event::Event;
use crate::gate::ActiveGate;

/// Per-slot notification channels of an [`ObservableStack`].
///
/// Slot `i` reports on whatever element sits at stack position `i`.
#[derive(Debug)]
pub struct StackSlotEvents<T> {
    pub pushed: Event<T>,
    /// The element was the explicit target of a pop.
    pub popped: Event<T>,
    /// The element sat above the pop target and was removed with it.
    pub force_popped: Event<T>,
    /// The element became the top again after a settled pop cascade.
    pub restored: Event<T>,
}

impl<T> Default for StackSlotEvents<T> {
    fn default() -> Self {
        Self {
            pushed: Event::new(),
            popped: Event::new(),
            force_popped: Event::new(),
            restored: Event::new(),
        }
    }
}

/// Shared abort flag for a running pop cascade.
///
/// Listeners capture a clone of this handle to abort the cascade that is
/// notifying them. The flag is polled once per cascade step and cleared when
/// honored.
#[derive(Debug, Clone, Default)]
pub struct PopAbortHandle(Rc<Cell<bool>>);

impl PopAbortHandle {
    pub fn abort(&self) {
        self.0.set(true);
    }

    pub fn is_requested(&self) -> bool {
        self.0.get()
    }

    fn take(&self) -> bool {
        self.0.replace(false)
    }
}

enum StackOp<T> {
    Push(T),
    Pop,
    PopAt(T),
    PopAtIndex(usize),
}

/// Mutation access to an [`ObservableStack`] from inside its own listeners.
///
/// Calls are queued and applied in order once the running push or pop
/// cascade has settled, `restored` included. Outside a dispatch they apply
/// on the stack's next mutation.
pub struct StackHandle<T>(Deferred<StackOp<T>>);

impl<T> StackHandle<T> {
    pub fn push(&self, element: T) {
        self.0.push(StackOp::Push(element));
    }

    pub fn pop(&self) {
        self.0.push(StackOp::Pop);
    }

    pub fn pop_at(&self, element: T) {
        self.0.push(StackOp::PopAt(element));
    }

    pub fn pop_at_index(&self, index: usize) {
        self.0.push(StackOp::PopAtIndex(index));
    }

    /// Number of queued operations not yet applied.
    pub fn pending(&self) -> usize {
        self.0.len()
    }
}

impl<T> Clone for StackHandle<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T> std::fmt::Debug for StackHandle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("StackHandle").field(&self.0).finish()
    }
}

/// Errors from stack configuration.
#[derive(Debug, thiserror::Error)]
pub enum StackConfigError {
    #[error("a stack needs at least one event slot")]
    NoSlots,
}

/// Stack configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StackConfig {
    /// Number of pre-registered event slots, which is also the maximum depth.
    pub slot_count: usize,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self { slot_count: 1 }
    }
}

impl StackConfig {
    pub fn validate(&self) -> Result<(), StackConfigError> {
        if self.slot_count == 0 {
            return Err(StackConfigError::NoSlots);
        }
        Ok(())
    }
}

/// Indexed push/pop stack with per-slot notifications and force-pop cascades.
///
/// # Invariants
/// - `event_index` equals the depth once an operation has settled.
/// - Depth never exceeds the number of registered slots.
/// - An element is present at most once.
#[derive(Debug)]
pub struct ObservableStack<T> {
    elements: Vec<T>,
    slots: Vec<StackSlotEvents<T>>,
    event_index: usize,
    abort: PopAbortHandle,
    deferred: Deferred<StackOp<T>>,
    gate: ActiveGate,
}

impl<T> ObservableStack<T> {
    /// Create an empty stack with no slots; pushes are no-ops until slots
    /// are registered with [`add_slot`](ObservableStack::add_slot).
    pub fn new() -> Self {
        Self {
            elements: Vec::new(),
            slots: Vec::new(),
            event_index: 0,
            abort: PopAbortHandle::default(),
            deferred: Deferred::default(),
            gate: ActiveGate::default(),
        }
    }

    pub fn with_slots(slot_count: usize) -> Self {
        let mut stack = Self::new();
        for _ in 0..slot_count {
            stack.add_slot();
        }
        stack
    }

    pub fn from_config(config: &StackConfig) -> Result<Self, StackConfigError> {
        config.validate()?;
        Ok(Self::with_slots(config.slot_count))
    }

    /// Register another slot on top of the existing ones. Returns its index.
    pub fn add_slot(&mut self) -> usize {
        self.slots.push(StackSlotEvents::default());
        self.slots.len() - 1
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn slot(&self, index: usize) -> Option<&StackSlotEvents<T>> {
        self.slots.get(index)
    }

    pub fn slot_mut(&mut self, index: usize) -> Option<&mut StackSlotEvents<T>> {
        self.slots.get_mut(index)
    }

    pub fn is_active(&self) -> bool {
        self.gate.is_active()
    }

    pub fn set_active(&mut self, active: bool) {
        self.gate.set_active(active);
    }

    pub fn depth(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn event_index(&self) -> usize {
        self.event_index
    }

    pub fn top(&self) -> Option<&T> {
        self.elements.last()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.elements.get(index)
    }

    pub fn as_slice(&self) -> &[T] {
        &self.elements
    }

    /// Handle listeners can hold to abort a running cascade.
    pub fn abort_handle(&self) -> PopAbortHandle {
        self.abort.clone()
    }

    /// Handle listeners can hold to push and pop on this stack.
    pub fn handle(&self) -> StackHandle<T> {
        StackHandle(self.deferred.clone())
    }

    /// Request that the running pop cascade stop at its next step.
    pub fn abort_pop(&self) {
        self.abort.abort();
    }

    fn cascade(&mut self, target: usize) {
        // Abort requests made outside a cascade do not carry into this one.
        self.abort.take();

        for slot in (target..self.slots.len()).rev() {
            if self.abort.take() {
                tracing::debug!(slot, depth = self.elements.len(), "pop cascade aborted");
                return;
            }
            if slot >= self.elements.len() {
                continue;
            }

            let element = self.elements.remove(slot);
            self.event_index = self.event_index.saturating_sub(1);
            let events = &mut self.slots[slot];
            if slot == target {
                tracing::debug!(slot, "popped");
                events.popped.emit(&element);
            } else {
                tracing::debug!(slot, "force popped");
                events.force_popped.emit(&element);
            }
        }

        if self.abort.take() {
            tracing::debug!(depth = self.elements.len(), "pop cascade aborted after target");
            return;
        }

        if let Some(top) = self.event_index.checked_sub(1) {
            tracing::debug!(slot = top, "restored");
            self.slots[top].restored.emit(&self.elements[top]);
        }
    }

    fn apply_pop_at_index(&mut self, index: usize) {
        if !self.gate.is_active() || index >= self.elements.len() || index > self.event_index {
            tracing::trace!(index, depth = self.elements.len(), "stack pop_at_index ignored");
            return;
        }
        self.cascade(index);
    }
}

impl<T: PartialEq> ObservableStack<T> {
    pub fn contains(&self, element: &T) -> bool {
        self.elements.contains(element)
    }

    pub fn index_of(&self, element: &T) -> Option<usize> {
        self.elements.iter().position(|e| e == element)
    }

    /// Push `element` onto the next free slot.
    ///
    /// No-op when every slot is occupied or the element is already present.
    pub fn push(&mut self, element: T) {
        self.apply_push(element);
        self.settle();
    }

    /// Pop the top element.
    pub fn pop(&mut self) {
        self.apply_pop();
        self.settle();
    }

    /// Pop the element at `index` and everything above it.
    ///
    /// No-op when `index` does not name an element or lies beyond the
    /// current event index.
    pub fn pop_at_index(&mut self, index: usize) {
        self.apply_pop_at_index(index);
        self.settle();
    }

    /// Pop `element` and every element above it.
    ///
    /// The target's slot emits `popped`; each slot above it that held an
    /// element emits `force_popped`, topmost first. Once settled, the new
    /// top's slot emits `restored`. Popping an absent element is a no-op.
    pub fn pop_at(&mut self, element: &T) {
        self.apply_pop_at(element);
        self.settle();
    }

    /// Apply operations queued through handles until none are left.
    fn settle(&mut self) {
        while let Some(op) = self.deferred.next() {
            match op {
                StackOp::Push(element) => self.apply_push(element),
                StackOp::Pop => self.apply_pop(),
                StackOp::PopAt(element) => self.apply_pop_at(&element),
                StackOp::PopAtIndex(index) => self.apply_pop_at_index(index),
            }
        }
    }

    fn apply_push(&mut self, element: T) {
        if !self.gate.is_active() {
            tracing::trace!("stack push ignored: inactive");
            return;
        }
        if self.event_index >= self.slots.len() {
            tracing::trace!(slots = self.slots.len(), "stack push ignored: slots exhausted");
            return;
        }
        if self.contains(&element) {
            tracing::trace!("stack push ignored: already present");
            return;
        }

        let slot = self.event_index;
        self.elements.push(element);
        tracing::debug!(slot, "pushed");
        self.slots[slot].pushed.emit(&self.elements[slot]);
        self.event_index += 1;
    }

    fn apply_pop(&mut self) {
        if let Some(top) = self.event_index.checked_sub(1) {
            self.apply_pop_at_index(top);
        }
    }

    fn apply_pop_at(&mut self, element: &T) {
        if !self.gate.is_active() {
            return;
        }
        let Some(index) = self.index_of(element) else {
            tracing::trace!("stack pop_at ignored: element absent");
            return;
        };
        self.cascade(index);
    }
}

impl<T> Default for ObservableStack<T> {
    fn default() -> Self {
        Self::new()
    }
}
