//! Data-driven game balance
//!
//! Every gameplay constant lives here so a session can be rebalanced from a
//! JSON file without recompiling. Missing keys fall back to the defaults,
//! so a minimal override only names the values it changes.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// Ship movement, weapons and lifecycle
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShipTuning {
    pub max_health: f32,
    /// Throttle change per second
    pub throttle_gain_speed: f32,
    /// Extra throttle above 1.0 reached while accelerating
    pub max_throttle_forward_offset: f32,
    /// Forward speed (u/s) at throttle 1.0
    pub max_throttle_speed: f32,
    /// Cooldown after `shoot()` (seconds)
    pub shoot_time: f32,
    pub respawn_delay: f32,
    pub collider_radius: f32,
    /// Muzzle offsets along forward, right and up
    pub shoot_offset_forward: f32,
    pub shoot_offset_right: f32,
    pub shoot_offset_up: f32,
    /// Throttle above which the engine trail shows
    pub trail_throttle_start: f32,
    pub trail_intensity_speed: f32,
}

impl Default for ShipTuning {
    fn default() -> Self {
        Self {
            max_health: 100.0,
            throttle_gain_speed: 0.5,
            max_throttle_forward_offset: 0.2,
            max_throttle_speed: 150.0,
            shoot_time: 0.15,
            respawn_delay: 5.0,
            collider_radius: 2.0,
            shoot_offset_forward: 3.7,
            shoot_offset_right: 2.0,
            shoot_offset_up: 0.25,
            trail_throttle_start: 0.5,
            trail_intensity_speed: 5.0,
        }
    }
}

/// Missile lock-on cone
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LockTuning {
    pub max_distance: f32,
    /// Minimum dot(view, direction-to-target) to stay inside the cone
    pub dot_threshold: f32,
}

impl Default for LockTuning {
    fn default() -> Self {
        Self {
            max_distance: 500.0,
            dot_threshold: 0.9,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileTuning {
    pub move_speed: f32,
    /// Damage assigned by `Ship::shoot`
    pub damage: f32,
    pub knockback_force: f32,
    pub lifetime: f32,
    pub scale: f32,
}

impl Default for ProjectileTuning {
    fn default() -> Self {
        Self {
            move_speed: 750.0,
            damage: 25.0,
            knockback_force: 80.0,
            lifetime: 3.0,
            scale: 1.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MissileTuning {
    pub move_speed: f32,
    pub move_acceleration: f32,
    pub rotation_speed: f32,
    pub rotation_acceleration: f32,
    pub impact_distance: f32,
    pub damage: f32,
    pub knockback_force: f32,
    pub lifetime: f32,
    /// Window after launch during which the missile cannot turn
    pub locked_rotation_time: f32,
    /// Fraction of `move_speed` at launch
    pub starting_move_speed_ratio: f32,
    pub explosion_size: f32,
    pub explosion_size_deviation: Vec2,
    /// Missiles per salvo (two per row)
    pub salvo_count: u32,
    /// Delay between rows (seconds)
    pub row_delay: f32,
    pub lateral_offset: f32,
    pub row_forward_offset: f32,
}

impl Default for MissileTuning {
    fn default() -> Self {
        Self {
            move_speed: 175.0,
            move_acceleration: 16.0,
            rotation_speed: 30.0,
            rotation_acceleration: 6.0,
            impact_distance: 4.0,
            damage: 17.0,
            knockback_force: 45.0,
            lifetime: 6.0,
            locked_rotation_time: 0.04,
            starting_move_speed_ratio: 0.6,
            explosion_size: 2.0,
            explosion_size_deviation: Vec2::new(-1.0, 1.5),
            salvo_count: 6,
            row_delay: 0.1,
            lateral_offset: 2.0,
            row_forward_offset: 3.0,
        }
    }
}

/// Ship death explosion sizing and effect lifetime
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplosionTuning {
    /// Size range, min at no overkill, max at full overkill
    pub size: Vec2,
    /// Overkill damage that produces the max size
    pub damage_for_max_size: f32,
    pub size_deviation: Vec2,
    pub lifetime: f32,
    pub lifetime_deviation: f32,
}

impl Default for ExplosionTuning {
    fn default() -> Self {
        Self {
            size: Vec2::new(5.0, 15.0),
            damage_for_max_size: 20.0,
            size_deviation: Vec2::new(-1.0, 1.5),
            lifetime: 1.5,
            lifetime_deviation: 0.2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiTuning {
    pub smooth_rotation_speed: f32,
    /// Forward alignment required before firing
    pub fire_alignment: f32,
}

impl Default for AiTuning {
    fn default() -> Self {
        Self {
            smooth_rotation_speed: 2.0,
            fire_alignment: 0.9,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    /// Roll (look x), pitch (look y), yaw (move x)
    pub aim_sensitivity: [f32; 3],
    /// Aim velocity drag per second
    pub aim_velocity_decrease: f32,
    pub max_aim_velocity: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            aim_sensitivity: [0.4, 0.3, 0.2],
            aim_velocity_decrease: 5.0,
            max_aim_velocity: 10.0,
        }
    }
}

/// Third-person camera, each range is (min throttle, max throttle)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraTuning {
    pub fov: Vec2,
    pub backward: Vec2,
    pub rearview_distance: Vec2,
    pub move_speed: Vec2,
    pub up_range: Vec2,
    pub rotation_speed: f32,
}

impl Default for CameraTuning {
    fn default() -> Self {
        Self {
            fov: Vec2::new(77.0, 99.0),
            backward: Vec2::new(6.0, 2.0),
            rearview_distance: Vec2::new(12.0, 25.0),
            move_speed: Vec2::new(7.0, 12.0),
            up_range: Vec2::new(2.0, 4.0),
            rotation_speed: 10.0,
        }
    }
}

/// Complete gameplay balance
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub ship: ShipTuning,
    pub lock: LockTuning,
    pub projectile: ProjectileTuning,
    pub missile: MissileTuning,
    pub explosion: ExplosionTuning,
    pub ai: AiTuning,
    pub player: PlayerTuning,
    pub camera: CameraTuning,
}

impl Tuning {
    /// Parse a (possibly partial) JSON override and validate it
    pub fn from_json(json: &str) -> SimResult<Self> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load tuning from a JSON file
    pub fn load(path: impl AsRef<Path>) -> SimResult<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.as_ref().display());
        Ok(tuning)
    }

    pub fn to_json(&self) -> SimResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values that would break the simulation (zero health, frozen
    /// projectiles, instant lifetimes, negative spreads)
    pub fn validate(&self) -> SimResult<()> {
        let checks = [
            ("ship.max_health", self.ship.max_health),
            ("ship.throttle_gain_speed", self.ship.throttle_gain_speed),
            ("ship.max_throttle_speed", self.ship.max_throttle_speed),
            ("ship.respawn_delay", self.ship.respawn_delay),
            ("ship.collider_radius", self.ship.collider_radius),
            ("lock.max_distance", self.lock.max_distance),
            ("projectile.move_speed", self.projectile.move_speed),
            ("projectile.lifetime", self.projectile.lifetime),
            ("missile.move_speed", self.missile.move_speed),
            ("missile.lifetime", self.missile.lifetime),
            ("missile.impact_distance", self.missile.impact_distance),
            ("explosion.damage_for_max_size", self.explosion.damage_for_max_size),
            ("explosion.lifetime", self.explosion.lifetime),
        ];

        for (field, value) in checks {
            if !(value > 0.0) {
                return Err(SimError::InvalidTuning { field, value });
            }
        }

        let non_negative = [
            ("explosion.lifetime_deviation", self.explosion.lifetime_deviation),
            ("missile.row_delay", self.missile.row_delay),
        ];
        for (field, value) in non_negative {
            if !(value >= 0.0) {
                return Err(SimError::InvalidTuning { field, value });
            }
        }
        Ok(())
    }
}
