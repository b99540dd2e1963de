use std::any::Any;

use glam::Vec3;
use vrkit_common::{EntityId, Ray, RaycastHit, RaycastProvider, Transform};
use vrkit_observable::{ActiveGate, Event};
use vrkit_rule::{RuleContainer, as_target};

/// Minimum movement of the resolved position for a new `surface_located`.
pub const POSITION_EPSILON: f32 = 1e-3;

/// A located surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceData {
    pub object: EntityId,
    pub transform: Transform,
    pub position: Vec3,
    pub normal: Vec3,
    pub distance: f32,
    /// Position of the previously located surface, if any.
    pub previous_position: Option<Vec3>,
}

/// Finds the nearest valid surface along a ray.
///
/// The ray starts at the search origin shifted by `destination_offset` in the
/// origin's rotated frame and travels along `search_direction` for at most
/// `maximum_distance`.
#[derive(Debug)]
pub struct SurfaceLocator {
    pub search_origin: Option<Transform>,
    pub search_direction: Option<Vec3>,
    pub destination_offset: Vec3,
    pub maximum_distance: f32,
    /// Emit only when the located position moved.
    pub must_change_position: bool,
    /// Hit objects must satisfy this rule. Unset means "nearest hit wins".
    pub target_validity: RuleContainer,
    /// Hit points (`Vec3`) must satisfy this rule.
    pub target_point_validity: RuleContainer,
    /// A hit object accepted by this rule ends the search with no result.
    pub locator_termination: RuleContainer,
    pub surface_located: Event<SurfaceData>,
    surface: Option<SurfaceData>,
    gate: ActiveGate,
}

impl SurfaceLocator {
    pub fn new() -> Self {
        Self {
            search_origin: None,
            search_direction: None,
            destination_offset: Vec3::ZERO,
            maximum_distance: 50.0,
            must_change_position: true,
            target_validity: RuleContainer::empty(),
            target_point_validity: RuleContainer::empty(),
            locator_termination: RuleContainer::empty(),
            surface_located: Event::new(),
            surface: None,
            gate: ActiveGate::default(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.gate.is_active()
    }

    pub fn set_active(&mut self, active: bool) {
        self.gate.set_active(active);
    }

    /// The most recently located surface.
    pub fn surface(&self) -> Option<&SurfaceData> {
        self.surface.as_ref()
    }

    /// Per-tick entry point.
    pub fn process<P: RaycastProvider>(&mut self, provider: &P) {
        let _span = tracing::info_span!("surface_locator_process").entered();
        self.locate(provider);
    }

    /// Cast and resolve a surface. Returns whether one was located.
    pub fn locate<P: RaycastProvider>(&mut self, provider: &P) -> bool {
        if !self.gate.is_active() {
            return false;
        }
        let (Some(origin), Some(direction)) = (self.search_origin, self.search_direction) else {
            tracing::trace!("locate skipped: no search origin or direction");
            return false;
        };

        let start = origin.position + origin.rotation * self.destination_offset;
        let ray = Ray::new(start, direction);

        let Some(hit) = self.resolve_hit(provider, &ray) else {
            return false;
        };

        let previous_position = self.surface.map(|surface| surface.position);
        let moved = previous_position
            .is_none_or(|previous| previous.distance(hit.point) > POSITION_EPSILON);

        let data = SurfaceData {
            object: hit.object,
            transform: hit.transform,
            position: hit.point,
            normal: hit.normal,
            distance: hit.distance,
            previous_position,
        };
        self.surface = Some(data);

        if moved || !self.must_change_position {
            tracing::debug!(object = %data.object, distance = data.distance, "surface located");
            self.surface_located.emit(&data);
        }
        true
    }

    fn resolve_hit<P: RaycastProvider>(&self, provider: &P, ray: &Ray) -> Option<RaycastHit> {
        if !self.target_validity.is_set() {
            let hit = provider.raycast(ray, self.maximum_distance)?;
            let valid = !self.terminates(provider, &hit) && self.point_is_valid(&hit);
            return valid.then_some(hit);
        }

        for hit in provider.raycast_all(ray, self.maximum_distance) {
            if self.terminates(provider, &hit) {
                tracing::trace!(object = %hit.object, "locator terminated");
                return None;
            }
            if self.object_is_valid(provider, &hit) && self.point_is_valid(&hit) {
                return Some(hit);
            }
        }
        None
    }

    fn terminates<P: RaycastProvider>(&self, provider: &P, hit: &RaycastHit) -> bool {
        self.locator_termination.is_set()
            && self
                .locator_termination
                .accepts(hit_target(provider, hit))
    }

    fn object_is_valid<P: RaycastProvider>(&self, provider: &P, hit: &RaycastHit) -> bool {
        self.target_validity.accepts(hit_target(provider, hit))
    }

    fn point_is_valid(&self, hit: &RaycastHit) -> bool {
        self.target_point_validity.accepts(as_target(&hit.point))
    }
}

impl Default for SurfaceLocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Rule target for a hit: the hit object when the provider can resolve it,
/// otherwise its id.
fn hit_target<'a, P: RaycastProvider>(
    provider: &'a P,
    hit: &'a RaycastHit,
) -> Option<&'a dyn Any> {
    match provider.object(hit.object) {
        Some(object) => Some(object as &dyn Any),
        None => Some(&hit.object as &dyn Any),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use vrkit_common::SceneObject;
    use vrkit_rule::{NotRule, TagRule, VectorEqualityRule};
    use vrkit_scene::{Collider, Scene};

    /// A floor plate at `z`, facing the origin along -Z.
    fn plate(name: &str, tag: &str, z: f32) -> (SceneObject, Collider) {
        let object = SceneObject::new(name)
            .with_tag(tag)
            .with_transform(Transform::from_position(Vec3::new(0.0, 0.0, z)));
        let collider = Collider::Box {
            half_extents: Vec3::new(1.0, 1.0, 0.1),
        };
        (object, collider)
    }

    fn scene_with(plates: &[(&str, &str, f32)]) -> Scene {
        let mut scene = Scene::new();
        for (name, tag, z) in plates {
            let (object, collider) = plate(name, tag, *z);
            scene.spawn_with_collider(object, collider);
        }
        scene
    }

    fn aimed_locator() -> (SurfaceLocator, Rc<RefCell<Vec<SurfaceData>>>) {
        let mut locator = SurfaceLocator::new();
        locator.search_origin = Some(Transform::default());
        locator.search_direction = Some(Vec3::NEG_Z);
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        locator
            .surface_located
            .subscribe(move |data: &SurfaceData| sink.borrow_mut().push(*data));
        (locator, log)
    }

    fn located_name(scene: &Scene, locator: &SurfaceLocator) -> Option<String> {
        let surface = locator.surface()?;
        scene.get(surface.object).map(|object| object.name.clone())
    }

    #[test]
    fn nearest_hit_without_validity_rule() {
        let scene = scene_with(&[("near", "Wall", -2.0), ("far", "Floor", -5.0)]);
        let (mut locator, log) = aimed_locator();

        assert!(locator.locate(&scene));
        assert_eq!(located_name(&scene, &locator).as_deref(), Some("near"));
        assert_eq!(log.borrow().len(), 1);
        assert!((log.borrow()[0].distance - 1.9).abs() < 1e-4);
    }

    #[test]
    fn first_valid_hit_wins() {
        let scene = scene_with(&[
            ("near", "Wall", -2.0),
            ("mid", "Floor", -4.0),
            ("far", "Floor", -6.0),
        ]);
        let (mut locator, _log) = aimed_locator();
        locator.target_validity = RuleContainer::new(TagRule::new(["Floor"]));

        assert!(locator.locate(&scene));
        assert_eq!(located_name(&scene, &locator).as_deref(), Some("mid"));
    }

    #[test]
    fn no_valid_hit_locates_nothing() {
        let scene = scene_with(&[("near", "Wall", -2.0)]);
        let (mut locator, log) = aimed_locator();
        locator.target_validity = RuleContainer::new(TagRule::new(["Floor"]));

        assert!(!locator.locate(&scene));
        assert!(locator.surface().is_none());
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn termination_rule_stops_search() {
        let scene = scene_with(&[("glass", "Blocker", -2.0), ("floor", "Floor", -4.0)]);
        let (mut locator, _log) = aimed_locator();
        locator.target_validity = RuleContainer::new(TagRule::new(["Floor"]));
        locator.locator_termination = RuleContainer::new(TagRule::new(["Blocker"]));

        assert!(!locator.locate(&scene));
    }

    #[test]
    fn point_validity_filters_hit_points() {
        let scene = scene_with(&[("near", "Wall", -2.0), ("far", "Floor", -5.0)]);
        let (mut locator, _log) = aimed_locator();
        locator.target_validity = RuleContainer::new(TagRule::new(["Wall", "Floor"]));
        locator.target_point_validity = RuleContainer::new(NotRule::new(RuleContainer::new(
            VectorEqualityRule::new(Vec3::new(0.0, 0.0, -1.9)).with_tolerance(1e-3),
        )));

        assert!(locator.locate(&scene));
        assert_eq!(located_name(&scene, &locator).as_deref(), Some("far"));
    }

    #[test]
    fn stationary_surface_is_not_reemitted() {
        let scene = scene_with(&[("wall", "Wall", -2.0)]);
        let (mut locator, log) = aimed_locator();

        locator.process(&scene);
        locator.process(&scene);
        assert_eq!(log.borrow().len(), 1);

        locator.search_origin = Some(Transform::from_position(Vec3::new(0.5, 0.0, 0.0)));
        locator.process(&scene);
        assert_eq!(log.borrow().len(), 2);
        assert_eq!(log.borrow()[1].previous_position, Some(log.borrow()[0].position));
    }

    #[test]
    fn stationary_surface_reemitted_when_change_not_required() {
        let scene = scene_with(&[("wall", "Wall", -2.0)]);
        let (mut locator, log) = aimed_locator();
        locator.must_change_position = false;

        locator.process(&scene);
        locator.process(&scene);
        assert_eq!(log.borrow().len(), 2);
    }

    #[test]
    fn offset_applies_in_origin_frame() {
        let scene = scene_with(&[("wall", "Wall", -2.0)]);
        let (mut locator, _log) = aimed_locator();
        locator.destination_offset = Vec3::new(5.0, 0.0, 0.0);
        assert!(!locator.locate(&scene));

        locator.destination_offset = Vec3::new(0.5, 0.0, 0.0);
        assert!(locator.locate(&scene));
        let surface = locator.surface().expect("located");
        assert!((surface.position.x - 0.5).abs() < 1e-5);
    }

    #[test]
    fn unaimed_or_inactive_locator_does_nothing() {
        let scene = scene_with(&[("wall", "Wall", -2.0)]);
        let mut locator = SurfaceLocator::new();
        assert!(!locator.locate(&scene));

        let (mut locator, log) = aimed_locator();
        locator.set_active(false);
        assert!(!locator.locate(&scene));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn maximum_distance_limits_search() {
        let scene = scene_with(&[("far", "Floor", -20.0)]);
        let (mut locator, _log) = aimed_locator();
        locator.maximum_distance = 10.0;
        assert!(!locator.locate(&scene));
    }
}
