//! Collision service: directional probes against entity colliders
//!
//! Weapons never step blindly. Each tick they probe exactly the distance
//! they are about to travel, so fast projectiles cannot tunnel through thin
//! targets. The [`Physics`] trait is the seam to the host engine;
//! [`SpherePhysics`] is the bundled implementation used by the demo and tests.

use std::collections::BTreeMap;

use glam::Vec3;

use super::registry::EntityId;

/// Below this distance a hit counts as "at the origin"
const ORIGIN_EPSILON: f32 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit direction
    pub direction: Vec3,
    pub max_distance: f32,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3, max_distance: f32) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
            max_distance,
        }
    }

    #[inline]
    pub fn at(&self, distance: f32) -> Vec3 {
        self.origin + self.direction * distance
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayParams {
    /// Whether a collider already containing the origin counts as a hit
    pub can_hit_from_origin: bool,
}

impl Default for RayParams {
    fn default() -> Self {
        Self {
            can_hit_from_origin: true,
        }
    }
}

/// Nearest hit of a probe
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Entity owning the struck collider
    pub entity: EntityId,
    pub point: Vec3,
    /// Surface normal at the hit point (pointing out of the collider)
    pub normal: Vec3,
    pub distance: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collider {
    pub center: Vec3,
    pub radius: f32,
    /// Inactive colliders are skipped (dead ships)
    pub active: bool,
}

impl Collider {
    pub fn sphere(center: Vec3, radius: f32) -> Self {
        Self {
            center,
            radius,
            active: true,
        }
    }
}

/// Collision world as seen by the simulation
pub trait Physics {
    /// Insert or replace an entity's collider
    fn set_collider(&mut self, entity: EntityId, collider: Collider);

    fn remove_collider(&mut self, entity: EntityId);

    /// Nearest hit along `ray` within `ray.max_distance`
    fn raycast(&self, ray: &Ray, params: RayParams) -> Option<RayHit>;
}

/// Sphere colliders with analytic ray intersection
#[derive(Debug, Default)]
pub struct SpherePhysics {
    colliders: BTreeMap<EntityId, Collider>,
}

impl SpherePhysics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn collider(&self, entity: EntityId) -> Option<&Collider> {
        self.colliders.get(&entity)
    }

    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }
}

impl Physics for SpherePhysics {
    fn set_collider(&mut self, entity: EntityId, collider: Collider) {
        self.colliders.insert(entity, collider);
    }

    fn remove_collider(&mut self, entity: EntityId) {
        self.colliders.remove(&entity);
    }

    fn raycast(&self, ray: &Ray, params: RayParams) -> Option<RayHit> {
        let mut nearest: Option<RayHit> = None;

        for (&entity, collider) in &self.colliders {
            if !collider.active {
                continue;
            }
            let Some(distance) = ray_sphere(ray, collider, params) else {
                continue;
            };
            // Strictly nearer wins, so ties keep the lower id
            if nearest.is_some_and(|hit| hit.distance <= distance) {
                continue;
            }

            let point = ray.at(distance);
            let normal = (point - collider.center).normalize_or(-ray.direction);
            nearest = Some(RayHit {
                entity,
                point,
                normal,
                distance,
            });
        }

        nearest
    }
}

/// Distance along `ray` to the sphere surface, if within range
fn ray_sphere(ray: &Ray, sphere: &Collider, params: RayParams) -> Option<f32> {
    let oc = ray.origin - sphere.center;
    let c = oc.length_squared() - sphere.radius * sphere.radius;

    // Origin inside (or on) the sphere
    if c <= 0.0 {
        return params.can_hit_from_origin.then_some(0.0);
    }

    let b = oc.dot(ray.direction);
    if b > 0.0 {
        // Pointing away from a sphere we are outside of
        return None;
    }
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }

    let distance = -b - discriminant.sqrt();
    if distance > ray.max_distance {
        return None;
    }
    if distance < ORIGIN_EPSILON && !params.can_hit_from_origin {
        return None;
    }
    Some(distance.max(0.0))
}
