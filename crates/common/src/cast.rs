use glam::Vec3;

use crate::object::SceneObject;
use crate::types::{EntityId, Transform};

/// A half-line used for spatial queries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Normalized on construction; a zero direction stays zero.
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    pub fn point_at(&self, distance: f32) -> Vec3 {
        self.origin + self.direction * distance
    }
}

/// A single intersection reported by a [`RaycastProvider`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastHit {
    /// Object owning the collider that was hit.
    pub object: EntityId,
    /// Transform of the hit object at query time.
    pub transform: Transform,
    pub point: Vec3,
    pub normal: Vec3,
    pub distance: f32,
}

/// External spatial query provider.
///
/// The interaction core only depends on this shape; the physics engine
/// behind it is an external collaborator.
pub trait RaycastProvider {
    /// Every hit along `ray` within `max_distance`, sorted by ascending distance.
    fn raycast_all(&self, ray: &Ray, max_distance: f32) -> Vec<RaycastHit>;

    /// Resolve the object a hit refers to, if it still exists.
    fn object(&self, id: EntityId) -> Option<&SceneObject>;

    /// The nearest hit along `ray` within `max_distance`.
    fn raycast(&self, ray: &Ray, max_distance: f32) -> Option<RaycastHit> {
        self.raycast_all(ray, max_distance).into_iter().next()
    }
}
