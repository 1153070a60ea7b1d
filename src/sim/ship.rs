//! The physical actor: movement, weapons geometry, death and respawn state
//!
//! A ship never reads input devices. Each tick it is handed the
//! [`ControlInputs`] its possessing controller produced (or nothing, when
//! unpossessed) and integrates throttle and rotation from them. Spawning
//! projectiles, missiles and explosions needs the whole simulation, so the
//! ship only computes *where* they go and [`GameState`](super::GameState)
//! does the spawning.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::controller::ControlInputs;
use super::event::Event;
use super::health::{DamageResult, HealthComponent};
use super::registry::{ControllerId, ShipId, ShipRegistry};
use super::transform::Transform;
use crate::tuning::{LockTuning, MissileTuning, ShipTuning};
use crate::{approach, lerp, look_rotation, remap, UP};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShipState {
    /// Flying and collidable
    Active,
    /// Dead, hidden and waiting for respawn
    Paused,
}

#[derive(Debug)]
pub struct Ship {
    pub id: ShipId,
    pub transform: Transform,
    pub state: ShipState,
    pub health: HealthComponent,
    /// Possessing controller (back-reference, kept in sync by possession)
    pub(crate) controller: Option<ControllerId>,
    /// Fired with every valid hit this ship's weapons land
    pub on_hit: Event<DamageResult>,
    color: u32,
    throttle: f32,
    shoot_time: f32,
    trail_intensity: f32,
    visible: bool,
    collider_active: bool,
}

impl Ship {
    pub fn new(id: ShipId, color: u32, tuning: &ShipTuning) -> Self {
        Self {
            id,
            transform: Transform::default(),
            state: ShipState::Active,
            health: HealthComponent::new(id, tuning.max_health),
            controller: None,
            on_hit: Event::new(),
            color,
            throttle: 0.0,
            shoot_time: 0.0,
            trail_intensity: 0.0,
            visible: true,
            collider_active: true,
        }
    }

    pub fn controller(&self) -> Option<ControllerId> {
        self.controller
    }

    pub fn color(&self) -> u32 {
        self.color
    }

    pub fn set_color(&mut self, color: u32) {
        self.color = color;
    }

    pub fn throttle(&self) -> f32 {
        self.throttle
    }

    /// Remaining weapon cooldown (seconds)
    pub fn shoot_time(&self) -> f32 {
        self.shoot_time
    }

    pub fn can_shoot(&self) -> bool {
        self.shoot_time <= 0.0
    }

    pub fn trail_intensity(&self) -> f32 {
        self.trail_intensity
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_collider_active(&self) -> bool {
        self.collider_active
    }

    pub fn is_active(&self) -> bool {
        self.state == ShipState::Active
    }

    /// Integrate throttle, forward motion and rotation for one tick.
    ///
    /// `inputs` is `None` when no controller is attached: the ship keeps
    /// coasting on its throttle and its rotation is left untouched.
    pub fn update_movement(&mut self, inputs: Option<&ControlInputs>, dt: f32, tuning: &ShipTuning) {
        let neutral = ControlInputs::default();
        let controls = inputs.unwrap_or(&neutral);

        let throttle_target = if controls.throttle_delta > 0.0 {
            1.0 + tuning.max_throttle_forward_offset
        } else if controls.throttle_delta < 0.0 {
            0.0
        } else {
            self.throttle.clamp(0.0, 1.0)
        };
        self.throttle = approach(self.throttle, throttle_target, dt * tuning.throttle_gain_speed);

        let move_speed = dt * self.throttle * tuning.max_throttle_speed;
        self.transform.location += self.transform.forward() * move_speed;

        if let Some(controls) = inputs {
            let rotation = if controls.should_smooth_rotation {
                let t = (dt * controls.smooth_rotation_speed).clamp(0.0, 1.0);
                self.transform.rotation.slerp(controls.desired_rotation, t)
            } else {
                controls.desired_rotation
            };
            self.transform.rotation = rotation.normalize();
        }
    }

    /// Engine trail strength, only a presentation value
    pub fn update_trail(&mut self, dt: f32, tuning: &ShipTuning) {
        let target = if self.throttle > tuning.trail_throttle_start {
            remap(self.throttle, tuning.trail_throttle_start, 1.0, 0.0, 1.0)
        } else {
            0.0
        };
        self.trail_intensity = lerp(
            self.trail_intensity,
            target,
            (dt * tuning.trail_intensity_speed).min(1.0),
        );
    }

    pub fn decay_cooldown(&mut self, dt: f32) {
        self.shoot_time = (self.shoot_time - dt).max(0.0);
    }

    pub(crate) fn start_cooldown(&mut self, tuning: &ShipTuning) {
        self.shoot_time = tuning.shoot_time;
    }

    /// Best lock-on candidate among registered ships.
    ///
    /// Candidates must be alive, closer than the max lock distance and
    /// inside the view cone. A candidate replaces the incumbent unless it is
    /// both no nearer and less aligned; best distance and best alignment
    /// are tracked independently, so the result can depend on registry
    /// order when two candidates split the axes.
    pub fn find_lockable_target(
        &self,
        ships: &ShipRegistry,
        view_direction: Vec3,
        tuning: &LockTuning,
    ) -> Option<ShipId> {
        let mut target = None;
        let mut best_alignment = -1.0_f32;
        let mut best_distance = tuning.max_distance;

        for ship in ships.iter() {
            if ship.id == self.id || !ship.health.is_alive() {
                continue;
            }

            let diff = ship.transform.location - self.transform.location;
            let distance = diff.length();
            if distance >= tuning.max_distance {
                continue;
            }

            let direction = diff / distance;
            let alignment = direction.dot(view_direction);
            if alignment <= tuning.dot_threshold {
                continue;
            }

            if distance >= best_distance && alignment < best_alignment {
                continue;
            }

            best_distance = best_distance.min(distance);
            best_alignment = best_alignment.max(alignment);
            target = Some(ship.id);
        }

        target
    }

    /// Muzzle point; `axis_scale` scales the forward/right/up offsets
    pub fn shoot_location(&self, axis_scale: Vec3, tuning: &ShipTuning) -> Vec3 {
        let t = &self.transform;
        t.location
            + t.forward() * tuning.shoot_offset_forward * axis_scale.x
            + t.right() * tuning.shoot_offset_right * axis_scale.y
            + t.up() * tuning.shoot_offset_up * axis_scale.z
    }

    /// Spawn transforms for the two symmetric shots of one volley
    pub fn projectile_spawns(&self, tuning: &ShipTuning, projectile_scale: f32) -> [Transform; 2] {
        [-1.0, 1.0].map(|side| Transform {
            location: self.shoot_location(Vec3::new(projectile_scale, side, 1.0), tuning),
            rotation: self.transform.rotation,
            scale: Vec3::splat(projectile_scale),
        })
    }

    /// Spawn transform and up axis for missile `slot` of a salvo
    ///
    /// Even slots go right, odd slots left; each row of two sits further
    /// forward. Missiles leave nose-up along the ship's up axis.
    pub fn missile_spawn(&self, slot: u32, tuning: &MissileTuning) -> (Transform, Vec3) {
        let t = &self.transform;
        let row = (slot / 2) as f32;
        let side = if slot % 2 == 0 { 1.0 } else { -1.0 };
        let up = t.up();

        let transform = Transform {
            location: t.location
                + t.right() * side * tuning.lateral_offset
                + t.forward() * row * tuning.row_forward_offset,
            rotation: look_rotation(up, UP),
            scale: Vec3::ONE,
        };
        (transform, up)
    }

    /// Switch to the dead state and return the overkill damage.
    ///
    /// Health is clamped to zero, throttle cut, visuals and collider
    /// disabled.
    pub(crate) fn enter_dead_state(&mut self) -> f32 {
        let overkill = (-self.health.health).max(0.0);
        self.health.health = 0.0;
        self.throttle = 0.0;
        self.visible = false;
        self.collider_active = false;
        self.trail_intensity = 0.0;
        self.state = ShipState::Paused;
        overkill
    }

    /// Back at the origin, visible, collidable and fully healed
    pub(crate) fn enter_respawn_state(&mut self) {
        self.transform.reset();
        self.visible = true;
        self.collider_active = true;
        self.state = ShipState::Active;
        self.health.heal_to_full();
    }

    /// Directly set orientation (spawning, tests)
    pub fn set_rotation(&mut self, rotation: Quat) {
        self.transform.rotation = rotation.normalize();
    }
}
