//! Straight-line shots fired in pairs by `GameState::shoot`

use glam::Vec3;

use super::collision::{Physics, Ray, RayHit, RayParams};
use super::registry::{EntityId, ShipId};
use super::transform::Transform;
use crate::tuning::ProjectileTuning;

/// Outcome of one projectile tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProjectileStep {
    Moved,
    /// Struck something other than its owner; the projectile is spent
    Hit(RayHit),
    /// Lifetime ran out
    Expired,
}

#[derive(Debug, Clone)]
pub struct Projectile {
    pub id: EntityId,
    /// Firing ship; may no longer resolve
    pub owner: ShipId,
    pub transform: Transform,
    pub color: u32,
    pub damage: f32,
    pub move_speed: f32,
    pub knockback_force: f32,
    age: f32,
    lifetime: f32,
}

impl Projectile {
    pub fn new(id: EntityId, owner: ShipId, transform: Transform, color: u32, tuning: &ProjectileTuning) -> Self {
        Self {
            id,
            owner,
            transform,
            color,
            damage: tuning.damage,
            move_speed: tuning.move_speed,
            knockback_force: tuning.knockback_force,
            age: 0.0,
            lifetime: tuning.lifetime,
        }
    }

    pub fn age(&self) -> f32 {
        self.age
    }

    /// Probe exactly this tick's displacement and only move when nothing
    /// but the owner is in the way
    pub fn step(&mut self, dt: f32, physics: &dyn Physics) -> ProjectileStep {
        let distance = self.move_speed * dt;
        let forward = self.transform.forward();
        let ray = Ray::new(self.transform.location, forward, distance);

        if let Some(hit) = physics.raycast(&ray, RayParams::default()) {
            if hit.entity != self.owner {
                return ProjectileStep::Hit(hit);
            }
        }

        self.transform.location += forward * distance;

        self.age += dt;
        if self.age >= self.lifetime {
            return ProjectileStep::Expired;
        }
        ProjectileStep::Moved
    }

    /// Knockback pushes into the struck surface
    pub fn knockback(&self, hit: &RayHit) -> Vec3 {
        -hit.normal * self.knockback_force
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::collision::{Collider, SpherePhysics};

    const OWNER: EntityId = EntityId(1);
    const DT: f32 = 1.0 / 60.0;

    fn projectile_at(location: Vec3) -> Projectile {
        Projectile::new(
            EntityId(10),
            OWNER,
            Transform::from_location(location),
            0xFFFFFFFF,
            &ProjectileTuning::default(),
        )
    }

    #[test]
    fn test_moves_when_clear() {
        let physics = SpherePhysics::new();
        let mut projectile = projectile_at(Vec3::ZERO);
        assert_eq!(projectile.step(DT, &physics), ProjectileStep::Moved);
        assert!((projectile.transform.location.x - 750.0 * DT).abs() < 1e-4);
    }

    #[test]
    fn test_hit_stops_before_moving() {
        let mut physics = SpherePhysics::new();
        // 12.5 u per tick, target 10 u ahead: tunnelling without the probe
        physics.set_collider(EntityId(2), Collider::sphere(Vec3::new(10.0, 0.0, 0.0), 0.5));
        let mut projectile = projectile_at(Vec3::ZERO);

        match projectile.step(DT, &physics) {
            ProjectileStep::Hit(hit) => {
                assert_eq!(hit.entity, EntityId(2));
                assert!(projectile.knockback(&hit).abs_diff_eq(Vec3::new(80.0, 0.0, 0.0), 1e-3));
            }
            other => panic!("expected hit, got {:?}", other),
        }
        assert_eq!(projectile.transform.location, Vec3::ZERO);
    }

    #[test]
    fn test_owner_is_ignored() {
        let mut physics = SpherePhysics::new();
        physics.set_collider(OWNER, Collider::sphere(Vec3::new(5.0, 0.0, 0.0), 2.0));
        let mut projectile = projectile_at(Vec3::ZERO);
        assert_eq!(projectile.step(DT, &physics), ProjectileStep::Moved);
        assert!(projectile.transform.location.x > 0.0);
    }

    #[test]
    fn test_expires_after_lifetime() {
        let physics = SpherePhysics::new();
        let mut projectile = projectile_at(Vec3::ZERO);

        let mut ticks = 0;
        while projectile.step(DT, &physics) == ProjectileStep::Moved {
            ticks += 1;
            assert!(ticks < 1000, "projectile never expired");
        }
        // 3 s at 60 Hz, give or take float accumulation
        assert!((179..=181).contains(&ticks));
    }
}
