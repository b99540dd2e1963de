//! Scene: scene objects plus simple colliders answering ray queries.
//!
//! Stands in for the engine's physics scene. Only the query shape matters
//! to the interaction core. Colliders are spheres and oriented boxes.
//!
//! # Invariants
//! - Objects are stored in a BTreeMap for deterministic iteration order.
//! - Inactive objects and objects without a collider are never hit.
//! - A ray starting inside a collider does not hit that collider.

mod collider;
mod scene;

pub use collider::Collider;
pub use scene::{Scene, SceneDescription, SceneEntry};

pub fn crate_info() -> &'static str {
    "vrkit-scene v0.1.0"
}
