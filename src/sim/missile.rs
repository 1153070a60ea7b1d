//! Homing missiles launched in salvos by `GameState::launch_missiles`
//!
//! Move and turn rates ease up from reduced launch values. Turning stays
//! locked for a short window after launch so a salvo leaves the rack
//! before breaking toward its target. The target is a ship id that may go
//! stale; the missile then flies on along its last heading.

use glam::Vec3;

use super::collision::{Physics, Ray, RayHit, RayParams};
use super::registry::{EntityId, ShipId};
use super::transform::Transform;
use crate::tuning::MissileTuning;
use crate::{FORWARD, lerp, look_rotation};

/// What the state knows about the missile's target this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetView {
    pub location: Vec3,
    pub is_alive: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MissileStep {
    Flying,
    /// Probe struck a non-owner collider
    Impact(RayHit),
    Expired,
}

#[derive(Debug, Clone)]
pub struct GuidedMissile {
    pub id: EntityId,
    pub owner: ShipId,
    pub target: Option<ShipId>,
    pub transform: Transform,
    /// Roll reference for look rotations
    pub up_direction: Vec3,
    pub color: u32,
    current_move_speed: f32,
    current_rotation_speed: f32,
    desired_direction: Vec3,
    age: f32,
}

impl GuidedMissile {
    pub fn new(
        id: EntityId,
        owner: ShipId,
        target: Option<ShipId>,
        transform: Transform,
        up_direction: Vec3,
        color: u32,
        target_location: Option<Vec3>,
        tuning: &MissileTuning,
    ) -> Self {
        // Without a target the missile levels out along world forward
        let desired_direction = target_location
            .map(|location| (location - transform.location).normalize_or(FORWARD))
            .unwrap_or(FORWARD);

        Self {
            id,
            owner,
            target,
            transform,
            up_direction,
            color,
            current_move_speed: tuning.move_speed * tuning.starting_move_speed_ratio,
            current_rotation_speed: 0.0,
            desired_direction,
            age: 0.0,
        }
    }

    pub fn move_speed(&self) -> f32 {
        self.current_move_speed
    }

    pub fn rotation_speed(&self) -> f32 {
        self.current_rotation_speed
    }

    pub fn desired_direction(&self) -> Vec3 {
        self.desired_direction
    }

    pub fn age(&self) -> f32 {
        self.age
    }

    /// One tick of guidance, motion and impact probing.
    ///
    /// `target` is `None` when the target id no longer resolves. A dead or
    /// vanished target is dropped for good.
    pub fn step(
        &mut self,
        dt: f32,
        target: Option<TargetView>,
        physics: &dyn Physics,
        tuning: &MissileTuning,
    ) -> MissileStep {
        self.age += dt;

        self.current_move_speed = lerp(
            self.current_move_speed,
            tuning.move_speed,
            (dt * tuning.move_acceleration).min(1.0),
        );
        if self.age > tuning.locked_rotation_time {
            self.current_rotation_speed = lerp(
                self.current_rotation_speed,
                tuning.rotation_speed,
                (dt * tuning.rotation_acceleration).min(1.0),
            );
        }

        self.update_target(dt, target);

        let forward = self.transform.forward();
        self.transform.location += forward * self.current_move_speed * dt;

        if let Some(hit) = self.check_impact(physics, tuning) {
            return MissileStep::Impact(hit);
        }

        if self.age >= tuning.lifetime {
            return MissileStep::Expired;
        }
        MissileStep::Flying
    }

    fn update_target(&mut self, dt: f32, target: Option<TargetView>) {
        if self.target.is_some() {
            match target {
                Some(view) if view.is_alive => {
                    self.desired_direction = (view.location - self.transform.location)
                        .normalize_or(self.desired_direction);
                }
                _ => {
                    log::debug!("Missile {} lost its target", self.id);
                    self.target = None;
                }
            }
        }

        let look = look_rotation(self.desired_direction, self.up_direction);
        let t = (dt * self.current_rotation_speed).clamp(0.0, 1.0);
        self.transform.rotation = self.transform.rotation.slerp(look, t).normalize();
    }

    fn check_impact(&self, physics: &dyn Physics, tuning: &MissileTuning) -> Option<RayHit> {
        let ray = Ray::new(
            self.transform.location,
            self.transform.forward(),
            tuning.impact_distance,
        );
        let params = RayParams {
            can_hit_from_origin: false,
        };

        physics
            .raycast(&ray, params)
            .filter(|hit| hit.entity != self.owner)
    }

    /// Knockback away from the missile, toward the victim
    pub fn knockback(&self, victim_location: Vec3, tuning: &MissileTuning) -> Vec3 {
        (victim_location - self.transform.location).normalize_or_zero() * tuning.knockback_force
    }
}
