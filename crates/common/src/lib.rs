//! Shared types for the vrkit interaction core.
//!
//! # Invariants
//! - Types here are plain data; nothing in this crate emits events.
//! - `EntityId::NIL` is the null-equivalent id and never names a live object.

mod cast;
mod object;
mod types;

pub use cast::{Ray, RaycastHit, RaycastProvider};
pub use object::SceneObject;
pub use types::{EntityId, LayerMask, Transform};

pub fn crate_info() -> &'static str {
    "vrkit-common v0.1.0"
}
