use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Operations queued from listeners, drained by the owning collection once
/// its current dispatch has settled.
pub(crate) struct Deferred<Op>(Rc<RefCell<VecDeque<Op>>>);

impl<Op> Deferred<Op> {
    pub(crate) fn push(&self, op: Op) {
        self.0.borrow_mut().push_back(op);
    }

    /// Take the oldest queued operation. The queue is not borrowed once this
    /// returns, so applying the operation may queue more.
    pub(crate) fn next(&self) -> Option<Op> {
        self.0.borrow_mut().pop_front()
    }

    pub(crate) fn len(&self) -> usize {
        self.0.borrow().len()
    }
}

impl<Op> Clone for Deferred<Op> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<Op> Default for Deferred<Op> {
    fn default() -> Self {
        Self(Rc::new(RefCell::new(VecDeque::new())))
    }
}

impl<Op> std::fmt::Debug for Deferred<Op> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Deferred")
            .field("pending", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_one_queue() {
        let queue: Deferred<u8> = Deferred::default();
        let handle = queue.clone();
        handle.push(1);
        handle.push(2);
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.next(), Some(1));
        assert_eq!(queue.next(), Some(2));
        assert_eq!(queue.next(), None);
    }
}
