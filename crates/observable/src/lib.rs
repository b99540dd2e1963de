//! Observable collections: structural mutations synchronously notify listeners.
//!
//! # Invariants
//! - Every mutator is a no-op while the collection's [`ActiveGate`] is closed.
//! - Misuse (bad index, absent key, duplicate push) is a silent no-op, never an error.
//! - Listeners run after the collection has settled for the affected element.
//! - Listeners may mutate the collection that is notifying them through its
//!   handle ([`ListHandle`], [`StackHandle`], [`CounterHandle`]). Handle calls
//!   are queued and applied in order once the running dispatch has settled.
//! - Sibling collections shared through `Rc<RefCell<_>>` may be mutated
//!   directly from listeners.

mod counter;
mod deferred;
mod event;
mod gate;
mod list;
mod null;
mod stack;

pub use counter::{CounterEvents, CounterHandle, ObservableCounter};
pub use event::{Event, ListenerId};
pub use gate::ActiveGate;
pub use list::{ListEvents, ListHandle, ObservableList};
pub use null::NullEquivalent;
pub use stack::{
    ObservableStack, PopAbortHandle, StackConfig, StackConfigError, StackHandle, StackSlotEvents,
};

pub fn crate_info() -> &'static str {
    "vrkit-observable v0.1.0"
}
