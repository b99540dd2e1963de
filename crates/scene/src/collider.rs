use glam::Vec3;
use serde::{Deserialize, Serialize};
use vrkit_common::{Ray, Transform};

/// Collision shape, centered on its object's transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum Collider {
    Box { half_extents: Vec3 },
    Sphere { radius: f32 },
}

impl Default for Collider {
    fn default() -> Self {
        Self::Box {
            half_extents: Vec3::splat(0.5),
        }
    }
}

/// Entry point and surface normal of a ray intersection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Intersection {
    pub distance: f32,
    pub normal: Vec3,
}

impl Collider {
    /// Nearest entry intersection of `ray` with this collider placed at
    /// `transform`. Rays starting inside the collider report nothing.
    pub(crate) fn intersect(&self, transform: &Transform, ray: &Ray) -> Option<Intersection> {
        if ray.direction == Vec3::ZERO {
            return None;
        }
        match *self {
            Self::Sphere { radius } => {
                let radius = radius * transform.scale.abs().max_element();
                intersect_sphere(transform.position, radius, ray)
            }
            Self::Box { half_extents } => {
                intersect_box(transform, half_extents * transform.scale.abs(), ray)
            }
        }
    }
}

fn intersect_sphere(center: Vec3, radius: f32, ray: &Ray) -> Option<Intersection> {
    let oc = ray.origin - center;
    let b = oc.dot(ray.direction);
    let c = oc.length_squared() - radius * radius;
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }
    let distance = -b - discriminant.sqrt();
    if distance < 0.0 {
        return None;
    }
    let normal = (ray.point_at(distance) - center).normalize_or_zero();
    Some(Intersection { distance, normal })
}

/// Slab test in the box's local frame.
fn intersect_box(transform: &Transform, half: Vec3, ray: &Ray) -> Option<Intersection> {
    let inverse = transform.rotation.inverse();
    let origin = inverse * (ray.origin - transform.position);
    let direction = inverse * ray.direction;

    let mut t_min = f32::NEG_INFINITY;
    let mut t_max = f32::INFINITY;
    let mut hit_axis = 0;

    for axis in 0..3 {
        let o = origin[axis];
        let d = direction[axis];
        let h = half[axis];
        if d.abs() < f32::EPSILON {
            if o.abs() > h {
                return None;
            }
            continue;
        }
        let t1 = (-h - o) / d;
        let t2 = (h - o) / d;
        let (near, far) = if t1 < t2 { (t1, t2) } else { (t2, t1) };
        if near > t_min {
            t_min = near;
            hit_axis = axis;
        }
        t_max = t_max.min(far);
        if t_max < t_min {
            return None;
        }
    }

    if t_min < 0.0 {
        return None;
    }

    let mut local_normal = Vec3::ZERO;
    local_normal[hit_axis] = -direction[hit_axis].signum();
    Some(Intersection {
        distance: t_min,
        normal: transform.rotation * local_normal,
    })
}
