use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use vrkit_common::{EntityId, Ray, RaycastHit, RaycastProvider, SceneObject, Transform};

use crate::collider::Collider;

/// Object store plus colliders.
///
/// All objects live in BTreeMaps keyed by id so queries iterate in a
/// deterministic order; ties in hit distance resolve by id.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    objects: BTreeMap<EntityId, SceneObject>,
    colliders: BTreeMap<EntityId, Collider>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of objects in the scene.
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Add an object, replacing any object with the same id. Returns its id.
    pub fn spawn(&mut self, object: SceneObject) -> EntityId {
        let id = object.id;
        tracing::debug!(%id, name = %object.name, "object spawned");
        self.objects.insert(id, object);
        id
    }

    /// Add an object with a collider attached.
    pub fn spawn_with_collider(&mut self, object: SceneObject, collider: Collider) -> EntityId {
        let id = self.spawn(object);
        self.colliders.insert(id, collider);
        id
    }

    /// Remove an object and its collider. Returns the object if it existed.
    pub fn despawn(&mut self, id: EntityId) -> Option<SceneObject> {
        self.colliders.remove(&id);
        let removed = self.objects.remove(&id);
        if removed.is_some() {
            tracing::debug!(%id, "object despawned");
        }
        removed
    }

    pub fn get(&self, id: EntityId) -> Option<&SceneObject> {
        self.objects.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut SceneObject> {
        self.objects.get_mut(&id)
    }

    /// Find the first object with the given name.
    pub fn find_by_name(&self, name: &str) -> Option<&SceneObject> {
        self.objects.values().find(|object| object.name == name)
    }

    pub fn objects(&self) -> impl Iterator<Item = &SceneObject> {
        self.objects.values()
    }

    pub fn set_transform(&mut self, id: EntityId, transform: Transform) -> bool {
        match self.objects.get_mut(&id) {
            Some(object) => {
                object.transform = transform;
                true
            }
            None => false,
        }
    }

    pub fn set_active(&mut self, id: EntityId, active: bool) -> bool {
        match self.objects.get_mut(&id) {
            Some(object) => {
                object.active = active;
                true
            }
            None => false,
        }
    }

    /// Attach or replace a collider. Returns false if the object does not exist.
    pub fn set_collider(&mut self, id: EntityId, collider: Collider) -> bool {
        if !self.objects.contains_key(&id) {
            return false;
        }
        self.colliders.insert(id, collider);
        true
    }

    pub fn remove_collider(&mut self, id: EntityId) -> Option<Collider> {
        self.colliders.remove(&id)
    }

    pub fn collider(&self, id: EntityId) -> Option<&Collider> {
        self.colliders.get(&id)
    }
}

impl RaycastProvider for Scene {
    fn raycast_all(&self, ray: &Ray, max_distance: f32) -> Vec<RaycastHit> {
        let mut hits: Vec<RaycastHit> = self
            .colliders
            .iter()
            .filter_map(|(id, collider)| {
                let object = self.objects.get(id).filter(|object| object.active)?;
                let intersection = collider.intersect(&object.transform, ray)?;
                (intersection.distance <= max_distance).then(|| RaycastHit {
                    object: *id,
                    transform: object.transform,
                    point: ray.point_at(intersection.distance),
                    normal: intersection.normal,
                    distance: intersection.distance,
                })
            })
            .collect();
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        tracing::trace!(hits = hits.len(), "raycast");
        hits
    }

    fn object(&self, id: EntityId) -> Option<&SceneObject> {
        self.objects.get(&id)
    }
}

/// One object of a [`SceneDescription`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneEntry {
    #[serde(flatten)]
    pub object: SceneObject,
    #[serde(default)]
    pub collider: Option<Collider>,
}

/// Serializable scene contents, as loaded from a scene file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneDescription {
    pub objects: Vec<SceneEntry>,
}

impl SceneDescription {
    pub fn into_scene(self) -> Scene {
        let mut scene = Scene::new();
        for entry in self.objects {
            match entry.collider {
                Some(collider) => scene.spawn_with_collider(entry.object, collider),
                None => scene.spawn(entry.object),
            };
        }
        scene
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn wall(name: &str, z: f32) -> SceneObject {
        SceneObject::new(name).with_transform(Transform::from_position(Vec3::new(0.0, 0.0, z)))
    }

    #[test]
    fn spawn_and_despawn() {
        let mut scene = Scene::new();
        let id = scene.spawn_with_collider(wall("a", -2.0), Collider::default());
        assert_eq!(scene.object_count(), 1);
        assert!(scene.collider(id).is_some());

        assert!(scene.despawn(id).is_some());
        assert_eq!(scene.object_count(), 0);
        assert!(scene.collider(id).is_none());
        assert!(scene.despawn(id).is_none());
    }

    #[test]
    fn raycast_all_sorted_by_distance() {
        let mut scene = Scene::new();
        let far = scene.spawn_with_collider(wall("far", -9.0), Collider::default());
        let near = scene.spawn_with_collider(wall("near", -3.0), Collider::default());
        scene.spawn(wall("ghost", -1.0));

        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        let hits = scene.raycast_all(&ray, 100.0);
        let ids: Vec<EntityId> = hits.iter().map(|hit| hit.object).collect();
        assert_eq!(ids, vec![near, far]);
        assert!((hits[0].distance - 2.5).abs() < 1e-5);
        assert_eq!(scene.raycast(&ray, 100.0).map(|hit| hit.object), Some(near));
    }

    #[test]
    fn raycast_respects_max_distance_and_activity() {
        let mut scene = Scene::new();
        let near = scene.spawn_with_collider(wall("near", -3.0), Collider::default());
        let far = scene.spawn_with_collider(wall("far", -9.0), Collider::default());
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);

        assert_eq!(scene.raycast_all(&ray, 5.0).len(), 1);
        scene.set_active(near, false);
        assert_eq!(scene.raycast(&ray, 100.0).map(|hit| hit.object), Some(far));
    }

    #[test]
    fn description_from_yaml() {
        let yaml = r#"
objects:
  - name: floor
    tag: Ground
    transform:
      position: [0.0, -1.0, 0.0]
    collider:
      shape: box
      half_extents: [10.0, 0.5, 10.0]
  - name: marker
"#;
        let description: SceneDescription = serde_yaml::from_str(yaml).expect("valid yaml");
        let scene = description.into_scene();
        assert_eq!(scene.object_count(), 2);

        let floor = scene.find_by_name("floor").expect("floor");
        assert_eq!(floor.tag, "Ground");
        assert!(scene.collider(floor.id).is_some());
        let marker = scene.find_by_name("marker").expect("marker");
        assert!(scene.collider(marker.id).is_none());
    }
}
