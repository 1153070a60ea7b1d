//! Explosion effects left by dead ships and spent missiles
//!
//! Purely visual: an explosion deals no damage and has no collider.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::registry::EntityId;
use crate::lerp;
use crate::tuning::{ExplosionTuning, MissileTuning};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Explosion {
    pub id: EntityId,
    pub location: Vec3,
    pub size: f32,
    pub color: u32,
    /// Random visual scale factor (0.8..1.2)
    pub scale_jitter: f32,
    pub age: f32,
    pub max_lifetime: f32,
}

impl Explosion {
    pub fn new(
        id: EntityId,
        location: Vec3,
        size: f32,
        color: u32,
        tuning: &ExplosionTuning,
        rng: &mut impl Rng,
    ) -> Self {
        let spread = tuning.lifetime_deviation;
        Self {
            id,
            location,
            size,
            color,
            scale_jitter: rng.random_range(0.8..1.2),
            age: 0.0,
            max_lifetime: (tuning.lifetime + deviation(-spread, spread, rng)).max(0.0),
        }
    }

    /// Advance; returns true once the effect has run its course
    pub fn update(&mut self, dt: f32) -> bool {
        self.age += dt;
        self.age >= self.max_lifetime
    }

    /// 0 at spawn, 1 at expiry
    pub fn progress(&self) -> f32 {
        if self.max_lifetime <= 0.0 {
            return 1.0;
        }
        (self.age / self.max_lifetime).clamp(0.0, 1.0)
    }
}

/// Ship death: bigger the harder the killing blow overshot
pub fn death_explosion_size(overkill: f32, tuning: &ExplosionTuning, rng: &mut impl Rng) -> f32 {
    let ratio = (overkill / tuning.damage_for_max_size).clamp(0.0, 1.0);
    lerp(tuning.size.x, tuning.size.y, ratio) + deviation(tuning.size_deviation.x, tuning.size_deviation.y, rng)
}

pub fn missile_explosion_size(tuning: &MissileTuning, rng: &mut impl Rng) -> f32 {
    tuning.explosion_size
        + deviation(
            tuning.explosion_size_deviation.x,
            tuning.explosion_size_deviation.y,
            rng,
        )
}

fn deviation(min: f32, max: f32, rng: &mut impl Rng) -> f32 {
    if max > min {
        rng.random_range(min..max)
    } else {
        min
    }
}
