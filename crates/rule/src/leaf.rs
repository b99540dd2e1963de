use std::any::Any;
use std::cell::{Ref, RefCell, RefMut};

use glam::Vec3;
use vrkit_common::{EntityId, LayerMask, SceneObject};
use vrkit_observable::ObservableList;

use crate::rule::Rule;

/// Resolve `target` as a scene object, honoring the inactive-object filter.
fn object_target(target: Option<&dyn Any>, reject_inactive: bool) -> Option<&SceneObject> {
    let object = target?.downcast_ref::<SceneObject>()?;
    if reject_inactive && !object.active {
        return None;
    }
    Some(object)
}

/// Accepts objects whose tag is any of the configured tags.
#[derive(Debug, Clone, PartialEq)]
pub struct TagRule {
    pub tags: Vec<String>,
    pub reject_inactive: bool,
}

impl TagRule {
    pub fn new<S: Into<String>>(tags: impl IntoIterator<Item = S>) -> Self {
        Self {
            tags: tags.into_iter().map(Into::into).collect(),
            reject_inactive: true,
        }
    }
}

impl Rule for TagRule {
    fn accepts(&self, target: Option<&dyn Any>) -> bool {
        object_target(target, self.reject_inactive)
            .is_some_and(|object| self.tags.iter().any(|tag| *tag == object.tag))
    }
}

/// Accepts objects that live on a layer in the mask.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerRule {
    pub mask: LayerMask,
    pub reject_inactive: bool,
}

impl LayerRule {
    pub fn new(mask: LayerMask) -> Self {
        Self {
            mask,
            reject_inactive: true,
        }
    }
}

impl Rule for LayerRule {
    fn accepts(&self, target: Option<&dyn Any>) -> bool {
        object_target(target, self.reject_inactive)
            .is_some_and(|object| self.mask.contains(object.layer))
    }
}

/// Accepts objects carrying any of the configured component types.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentRule {
    pub components: Vec<String>,
    pub reject_inactive: bool,
}

impl ComponentRule {
    pub fn new<S: Into<String>>(components: impl IntoIterator<Item = S>) -> Self {
        Self {
            components: components.into_iter().map(Into::into).collect(),
            reject_inactive: true,
        }
    }
}

impl Rule for ComponentRule {
    fn accepts(&self, target: Option<&dyn Any>) -> bool {
        object_target(target, self.reject_inactive).is_some_and(|object| {
            self.components
                .iter()
                .any(|component| object.has_component(component))
        })
    }
}

/// Accepts objects listed by id.
///
/// The list is observable and can be edited while the rule is shared
/// between containers. A bare [`EntityId`] target is matched directly.
#[derive(Debug)]
pub struct ListContainsRule {
    objects: RefCell<ObservableList<EntityId>>,
    pub reject_inactive: bool,
}

impl ListContainsRule {
    pub fn new(objects: impl IntoIterator<Item = EntityId>) -> Self {
        Self {
            objects: RefCell::new(objects.into_iter().collect()),
            reject_inactive: true,
        }
    }

    pub fn objects(&self) -> Ref<'_, ObservableList<EntityId>> {
        self.objects.borrow()
    }

    pub fn objects_mut(&self) -> RefMut<'_, ObservableList<EntityId>> {
        self.objects.borrow_mut()
    }
}

impl Rule for ListContainsRule {
    fn accepts(&self, target: Option<&dyn Any>) -> bool {
        let Some(any) = target else {
            return false;
        };
        let id = match any.downcast_ref::<EntityId>() {
            Some(id) => *id,
            None => match object_target(target, self.reject_inactive) {
                Some(object) => object.id,
                None => return false,
            },
        };
        !id.is_nil() && self.objects.borrow().contains(&id)
    }
}

/// Accepts a [`Vec3`] target equal to `value` within `tolerance` on every axis.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorEqualityRule {
    pub value: Vec3,
    pub tolerance: f32,
}

impl VectorEqualityRule {
    pub fn new(value: Vec3) -> Self {
        Self {
            value,
            tolerance: f32::EPSILON,
        }
    }

    pub fn with_tolerance(mut self, tolerance: f32) -> Self {
        self.tolerance = tolerance;
        self
    }
}

impl Rule for VectorEqualityRule {
    fn accepts(&self, target: Option<&dyn Any>) -> bool {
        target
            .and_then(|any| any.downcast_ref::<Vec3>())
            .is_some_and(|v| v.abs_diff_eq(self.value, self.tolerance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::as_target;

    fn player() -> SceneObject {
        SceneObject::new("player")
            .with_tag("Player")
            .with_layer(3)
            .with_component("Rigidbody")
    }

    #[test]
    fn leaf_rules_reject_null() {
        assert!(!TagRule::new(["Player"]).accepts(None));
        assert!(!LayerRule::new(LayerMask::ALL).accepts(None));
        assert!(!ComponentRule::new(["Rigidbody"]).accepts(None));
        assert!(!ListContainsRule::new([EntityId::new()]).accepts(None));
        assert!(!VectorEqualityRule::new(Vec3::ZERO).accepts(None));
    }

    #[test]
    fn leaf_rules_reject_foreign_targets() {
        let target = as_target(&"not an object");
        assert!(!TagRule::new(["Player"]).accepts(target));
        assert!(!LayerRule::new(LayerMask::ALL).accepts(target));
        assert!(!VectorEqualityRule::new(Vec3::ZERO).accepts(target));
    }

    #[test]
    fn tag_rule_matches_any_tag() {
        let rule = TagRule::new(["Enemy", "Player"]);
        assert!(rule.accepts(as_target(&player())));
        assert!(!rule.accepts(as_target(&SceneObject::new("rock").with_tag("Prop"))));
    }

    #[test]
    fn layer_rule_uses_mask() {
        assert!(LayerRule::new(LayerMask::from_layers([3, 4])).accepts(as_target(&player())));
        assert!(!LayerRule::new(LayerMask::from_layer(0)).accepts(as_target(&player())));
    }

    #[test]
    fn component_rule_matches_any_component() {
        assert!(ComponentRule::new(["Collider", "Rigidbody"]).accepts(as_target(&player())));
        assert!(!ComponentRule::new(["Collider"]).accepts(as_target(&player())));
    }

    #[test]
    fn inactive_objects_rejected_by_default() {
        let sleeping = player().inactive();
        let mut rule = TagRule::new(["Player"]);
        assert!(!rule.accepts(as_target(&sleeping)));
        rule.reject_inactive = false;
        assert!(rule.accepts(as_target(&sleeping)));
    }

    #[test]
    fn list_rule_tracks_edits() {
        let obj = player();
        let rule = ListContainsRule::new(Vec::<EntityId>::new());
        assert!(!rule.accepts(as_target(&obj)));

        rule.objects_mut().add(obj.id);
        assert!(rule.accepts(as_target(&obj)));
        assert!(rule.accepts(as_target(&obj.id)));

        rule.objects_mut().remove(&obj.id);
        assert!(!rule.accepts(as_target(&obj)));
        assert!(rule.objects().is_empty());
    }

    #[test]
    fn list_rule_ignores_nil_id() {
        let rule = ListContainsRule::new([EntityId::NIL]);
        assert!(!rule.accepts(as_target(&EntityId::NIL)));
    }

    #[test]
    fn vector_rule_respects_tolerance() {
        let rule = VectorEqualityRule::new(Vec3::new(1.0, 2.0, 3.0)).with_tolerance(0.1);
        assert!(rule.accepts(as_target(&Vec3::new(1.05, 2.0, 2.95))));
        assert!(!rule.accepts(as_target(&Vec3::new(1.2, 2.0, 3.0))));
        assert!(VectorEqualityRule::new(Vec3::X).accepts(as_target(&Vec3::X)));
    }
}
