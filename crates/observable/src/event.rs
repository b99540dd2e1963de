/// Handle returned by [`Event::subscribe`], used to unsubscribe later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// A single notification channel carrying payloads of type `T`.
///
/// Listeners are invoked synchronously, in subscription order, on every
/// [`emit`](Event::emit). This is the one publish/subscribe primitive every
/// collection uses; named channels (added, removed, pushed, ...) are just
/// separate `Event` fields.
pub struct Event<T> {
    listeners: Vec<(ListenerId, Box<dyn FnMut(&T)>)>,
    next_id: u64,
}

impl<T> Event<T> {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
            next_id: 0,
        }
    }

    /// Register a listener. Returns an id for [`unsubscribe`](Event::unsubscribe).
    pub fn subscribe(&mut self, listener: impl FnMut(&T) + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    /// Invoke every listener with `payload`.
    pub fn emit(&mut self, payload: &T) {
        for (_, listener) in &mut self.listeners {
            listener(payload);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn clear_listeners(&mut self) {
        self.listeners.clear();
    }
}

impl<T> Default for Event<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for Event<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Event")
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn emit_reaches_listeners_in_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut event = Event::new();

        let first = Rc::clone(&log);
        event.subscribe(move |v: &i32| first.borrow_mut().push(("first", *v)));
        let second = Rc::clone(&log);
        event.subscribe(move |v: &i32| second.borrow_mut().push(("second", *v)));

        event.emit(&7);
        assert_eq!(*log.borrow(), vec![("first", 7), ("second", 7)]);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let count = Rc::new(RefCell::new(0));
        let mut event = Event::new();
        let sink = Rc::clone(&count);
        let id = event.subscribe(move |_: &()| *sink.borrow_mut() += 1);

        event.emit(&());
        assert!(event.unsubscribe(id));
        assert!(!event.unsubscribe(id));
        event.emit(&());

        assert_eq!(*count.borrow(), 1);
        assert_eq!(event.listener_count(), 0);
    }

    #[test]
    fn emit_without_listeners_is_silent() {
        let mut event: Event<String> = Event::default();
        event.emit(&"nobody".to_string());
        assert_eq!(event.listener_count(), 0);
    }
}
