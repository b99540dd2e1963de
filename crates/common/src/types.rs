use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an object in the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub Uuid);

impl EntityId {
    /// The null-equivalent id. Collections that ignore null keys ignore this one.
    pub const NIL: Self = Self(Uuid::nil());

    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0.to_string()[..8])
    }
}

/// Spatial transform: position, rotation, scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Forward direction (-Z rotated into world space).
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    /// Map a point expressed in this transform's local frame into world space.
    ///
    /// Scale is applied before rotation, matching how a child object's
    /// position is resolved against its parent.
    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.position + self.rotation * (local * self.scale)
    }
}

/// Bit set of the 32 collision layers an object may live on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const NONE: Self = Self(0);
    pub const ALL: Self = Self(u32::MAX);

    /// Highest valid layer index.
    pub const MAX_LAYER: u8 = 31;

    /// Mask containing only `layer`. Layers above 31 yield an empty mask.
    pub fn from_layer(layer: u8) -> Self {
        if layer > Self::MAX_LAYER {
            return Self::NONE;
        }
        Self(1 << layer)
    }

    pub fn from_layers(layers: impl IntoIterator<Item = u8>) -> Self {
        layers
            .into_iter()
            .fold(Self::NONE, |mask, layer| mask.with(layer))
    }

    pub fn with(self, layer: u8) -> Self {
        Self(self.0 | Self::from_layer(layer).0)
    }

    pub fn contains(&self, layer: u8) -> bool {
        layer <= Self::MAX_LAYER && self.0 & (1 << layer) != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_id_uniqueness() {
        let a = EntityId::new();
        let b = EntityId::new();
        assert_ne!(a, b);
        assert!(!a.is_nil());
        assert!(EntityId::NIL.is_nil());
    }

    #[test]
    fn transform_default_is_identity() {
        let t = Transform::default();
        assert_eq!(t.position, Vec3::ZERO);
        assert_eq!(t.rotation, Quat::IDENTITY);
        assert_eq!(t.scale, Vec3::ONE);
        assert_eq!(t.forward(), Vec3::NEG_Z);
    }

    #[test]
    fn transform_point_applies_rotation() {
        let t = Transform {
            position: Vec3::new(1.0, 0.0, 0.0),
            rotation: Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
            scale: Vec3::ONE,
        };
        let p = t.transform_point(Vec3::new(0.0, 0.0, -1.0));
        assert!((p - Vec3::new(0.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn layer_mask_membership() {
        let mask = LayerMask::from_layers([0, 5, 31]);
        assert!(mask.contains(0));
        assert!(mask.contains(5));
        assert!(mask.contains(31));
        assert!(!mask.contains(6));
        assert!(!mask.contains(32));
        assert_eq!(LayerMask::from_layer(40), LayerMask::NONE);
    }
}
