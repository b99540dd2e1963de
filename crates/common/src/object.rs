use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::types::{EntityId, Transform};

/// An engine-hosted object as seen by rules and spatial queries.
///
/// Carries the handful of properties leaf rules inspect: tag, layer,
/// component types and whether the object is active. Component types are
/// stored by name so rules can be configured from data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    #[serde(default)]
    pub id: EntityId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tag: String,
    #[serde(default)]
    pub layer: u8,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub components: BTreeSet<String>,
    #[serde(default)]
    pub transform: Transform,
}

fn default_active() -> bool {
    true
}

impl SceneObject {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: EntityId::new(),
            name: name.into(),
            tag: String::new(),
            layer: 0,
            active: true,
            components: BTreeSet::new(),
            transform: Transform::default(),
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    pub fn with_layer(mut self, layer: u8) -> Self {
        self.layer = layer;
        self
    }

    pub fn with_component(mut self, component: impl Into<String>) -> Self {
        self.components.insert(component.into());
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    pub fn has_component(&self, component: &str) -> bool {
        self.components.contains(component)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_fields() {
        let obj = SceneObject::new("door")
            .with_tag("Interactable")
            .with_layer(4)
            .with_component("Grabbable");
        assert_eq!(obj.name, "door");
        assert_eq!(obj.tag, "Interactable");
        assert_eq!(obj.layer, 4);
        assert!(obj.active);
        assert!(obj.has_component("Grabbable"));
        assert!(!obj.has_component("Rigidbody"));
    }

    #[test]
    fn deserialize_fills_defaults() {
        let obj: SceneObject = serde_json::from_str(r#"{ "name": "floor", "tag": "Ground" }"#)
            .expect("valid object json");
        assert_eq!(obj.tag, "Ground");
        assert!(obj.active);
        assert!(!obj.id.is_nil());
        assert!(obj.components.is_empty());
    }
}
