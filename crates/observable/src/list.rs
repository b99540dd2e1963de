use crate::deferred::Deferred;
use crate::event::Event;
use crate::gate::ActiveGate;

/// Notification channels of an [`ObservableList`].
#[derive(Debug)]
pub struct ListEvents<T> {
    /// The list went from empty to non-empty. Fires before `added`.
    pub populated: Event<T>,
    pub added: Event<T>,
    pub removed: Event<T>,
    /// The list went from non-empty to empty. Fires after `removed`.
    pub emptied: Event<()>,
}

impl<T> Default for ListEvents<T> {
    fn default() -> Self {
        Self {
            populated: Event::new(),
            added: Event::new(),
            removed: Event::new(),
            emptied: Event::new(),
        }
    }
}

enum ListOp<T> {
    Add(T),
    InsertAt(T, usize),
    SetAt(T, usize),
    RemoveAt(usize),
    RemoveFirst(Box<dyn Fn(&T) -> bool>),
    Clear,
}

/// Mutation access to an [`ObservableList`] from inside its own listeners.
///
/// Calls are queued and applied in order as soon as the list has settled
/// from the dispatch that is running. Outside a dispatch they apply on the
/// list's next mutation.
pub struct ListHandle<T>(Deferred<ListOp<T>>);

impl<T> ListHandle<T> {
    pub fn add(&self, item: T) {
        self.0.push(ListOp::Add(item));
    }

    pub fn insert_at(&self, item: T, index: usize) {
        self.0.push(ListOp::InsertAt(item, index));
    }

    pub fn set_at(&self, item: T, index: usize) {
        self.0.push(ListOp::SetAt(item, index));
    }

    pub fn remove_at(&self, index: usize) {
        self.0.push(ListOp::RemoveAt(index));
    }

    pub fn clear(&self) {
        self.0.push(ListOp::Clear);
    }

    /// Number of queued operations not yet applied.
    pub fn pending(&self) -> usize {
        self.0.len()
    }
}

impl<T: PartialEq + 'static> ListHandle<T> {
    pub fn remove(&self, item: T) {
        self.0
            .push(ListOp::RemoveFirst(Box::new(move |element| *element == item)));
    }
}

impl<T> Clone for ListHandle<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T> std::fmt::Debug for ListHandle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ListHandle").field(&self.0).finish()
    }
}

/// Ordered collection whose structural changes notify listeners.
///
/// Insertion order is significant and duplicates are allowed unless the
/// caller uses [`add_unique`](ObservableList::add_unique). Each successful
/// change emits exactly one `added`/`removed` per affected element, in the
/// order the elements were affected. Listeners change the list itself
/// through a [`ListHandle`].
#[derive(Debug)]
pub struct ObservableList<T> {
    elements: Vec<T>,
    gate: ActiveGate,
    deferred: Deferred<ListOp<T>>,
    pub events: ListEvents<T>,
}

impl<T> ObservableList<T> {
    pub fn new() -> Self {
        Self {
            elements: Vec::new(),
            gate: ActiveGate::default(),
            deferred: Deferred::default(),
            events: ListEvents::default(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.gate.is_active()
    }

    pub fn set_active(&mut self, active: bool) {
        self.gate.set_active(active);
    }

    /// A handle listeners can capture to mutate this list.
    pub fn handle(&self) -> ListHandle<T> {
        ListHandle(self.deferred.clone())
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.elements.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.elements.iter()
    }

    /// Mutable access to elements in place. Not a structural change, so
    /// nothing is emitted.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.elements.iter_mut()
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.elements.get_mut(index)
    }

    pub fn as_slice(&self) -> &[T] {
        &self.elements
    }

    /// Append `item` to the end of the list.
    pub fn add(&mut self, item: T) {
        self.apply_add(item);
        self.settle();
    }

    /// Insert `item` at `index`, clamped to `[0, len]`.
    pub fn insert_at(&mut self, item: T, index: usize) {
        self.apply_insert_at(item, index);
        self.settle();
    }

    /// Replace the element at `index`. Emits `removed` for the old element
    /// then `added` for the new one. No-op when `index` is out of range.
    pub fn set_at(&mut self, item: T, index: usize) {
        self.apply_set_at(item, index);
        self.settle();
    }

    /// Remove the element at `index`. No-op when out of range.
    pub fn remove_at(&mut self, index: usize) -> Option<T> {
        let removed = self.apply_remove_at(index);
        self.settle();
        removed
    }

    pub fn remove_last(&mut self) -> Option<T> {
        let last = self.elements.len().checked_sub(1)?;
        self.remove_at(last)
    }

    /// Remove every element front to back, notifying for each.
    pub fn clear(&mut self) {
        self.apply_clear();
        self.settle();
    }

    /// Apply operations queued through handles until none are left.
    fn settle(&mut self) {
        while let Some(op) = self.deferred.next() {
            match op {
                ListOp::Add(item) => self.apply_add(item),
                ListOp::InsertAt(item, index) => self.apply_insert_at(item, index),
                ListOp::SetAt(item, index) => self.apply_set_at(item, index),
                ListOp::RemoveAt(index) => {
                    self.apply_remove_at(index);
                }
                ListOp::RemoveFirst(matches) => {
                    if let Some(index) = self.elements.iter().position(|e| matches(e)) {
                        self.apply_remove_at(index);
                    }
                }
                ListOp::Clear => self.apply_clear(),
            }
        }
    }

    fn apply_add(&mut self, item: T) {
        if !self.gate.is_active() {
            tracing::trace!("list add ignored: inactive");
            return;
        }
        self.elements.push(item);
        self.emit_added(self.elements.len() - 1);
    }

    fn apply_insert_at(&mut self, item: T, index: usize) {
        if !self.gate.is_active() {
            tracing::trace!("list insert ignored: inactive");
            return;
        }
        let index = index.min(self.elements.len());
        self.elements.insert(index, item);
        self.emit_added(index);
    }

    fn apply_set_at(&mut self, item: T, index: usize) {
        if !self.gate.is_active() || index >= self.elements.len() {
            return;
        }
        let old = std::mem::replace(&mut self.elements[index], item);
        self.events.removed.emit(&old);
        if let Some(new) = self.elements.get(index) {
            self.events.added.emit(new);
        }
    }

    fn apply_remove_at(&mut self, index: usize) -> Option<T> {
        if !self.gate.is_active() || index >= self.elements.len() {
            tracing::trace!(index, len = self.elements.len(), "list remove_at ignored");
            return None;
        }
        let removed = self.elements.remove(index);
        self.events.removed.emit(&removed);
        if self.elements.is_empty() {
            self.events.emptied.emit(&());
        }
        Some(removed)
    }

    fn apply_clear(&mut self) {
        if !self.gate.is_active() || self.elements.is_empty() {
            return;
        }
        let snapshot = std::mem::take(&mut self.elements);
        tracing::debug!(count = snapshot.len(), "list cleared");
        for item in &snapshot {
            self.events.removed.emit(item);
        }
        self.events.emptied.emit(&());
    }

    fn emit_added(&mut self, index: usize) {
        let item = &self.elements[index];
        if self.elements.len() == 1 {
            self.events.populated.emit(item);
        }
        self.events.added.emit(item);
    }
}

impl<T: PartialEq> ObservableList<T> {
    pub fn contains(&self, item: &T) -> bool {
        self.elements.contains(item)
    }

    pub fn index_of(&self, item: &T) -> Option<usize> {
        self.elements.iter().position(|element| element == item)
    }

    /// Append `item` unless an equal element is already present.
    /// Returns whether it was added.
    pub fn add_unique(&mut self, item: T) -> bool {
        if !self.gate.is_active() || self.contains(&item) {
            return false;
        }
        self.add(item);
        true
    }

    /// Remove the first element equal to `item`. No-op when absent.
    pub fn remove(&mut self, item: &T) -> Option<T> {
        let index = self.index_of(item)?;
        self.remove_at(index)
    }
}

impl<T> Default for ObservableList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<T> for ObservableList<T> {
    /// Builds a populated list without notifying; nothing can be subscribed yet.
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            elements: iter.into_iter().collect(),
            ..Self::new()
        }
    }
}

impl<'a, T> IntoIterator for &'a ObservableList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}
