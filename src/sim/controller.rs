//! Controllers: the brains that drive ships
//!
//! A controller produces one [`ControlInputs`] per tick for the ship it
//! possesses. Two brains exist: the player, fed by device actions, and the
//! AI, which chases a target ship. The possession protocol that binds
//! controllers to ships lives in `possession.rs`.

use glam::{Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::camera::CameraRig;
use super::event::Event;
use super::registry::{ControllerId, ShipId};
use super::transform::Transform;
use crate::look_rotation;
use crate::tuning::{AiTuning, PlayerTuning};
use crate::UP;

/// What a controller asks its ship to do this tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlInputs {
    /// > 0 accelerates, < 0 brakes, 0 holds
    pub throttle_delta: f32,
    pub desired_rotation: Quat,
    /// Slerp toward `desired_rotation` instead of applying it directly
    pub should_smooth_rotation: bool,
    pub smooth_rotation_speed: f32,
}

impl Default for ControlInputs {
    fn default() -> Self {
        Self {
            throttle_delta: 0.0,
            desired_rotation: Quat::IDENTITY,
            should_smooth_rotation: false,
            smooth_rotation_speed: 0.0,
        }
    }
}

/// Device-independent action values for one player, one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionState {
    /// x: yaw, y: throttle
    pub move_axis: Vec2,
    /// x: roll, y: pitch
    pub look_axis: Vec2,
    pub shoot: bool,
    pub missile: bool,
    pub rearview: bool,
}

/// Payload of `on_possess_changed`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PossessionChange {
    pub controller: ControllerId,
    pub previous: Option<ShipId>,
    pub current: Option<ShipId>,
}

/// Weapon requests raised by a brain, carried out by the state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeaponCommand {
    Shoot,
    LaunchMissiles { target: ShipId },
}

#[derive(Debug)]
pub struct PlayerBrain {
    pub gamepad_id: u32,
    /// When false the last inputs are kept as-is
    pub inputs_enabled: bool,
    pub camera: CameraRig,
    aim_velocity: Vec3,
    last_missile_input: bool,
    locked_target: Option<ShipId>,
}

impl PlayerBrain {
    pub fn new(gamepad_id: u32) -> Self {
        Self {
            gamepad_id,
            inputs_enabled: true,
            camera: CameraRig::default(),
            aim_velocity: Vec3::ZERO,
            last_missile_input: false,
            locked_target: None,
        }
    }

    pub fn locked_target(&self) -> Option<ShipId> {
        self.locked_target
    }

    pub fn aim_velocity(&self) -> Vec3 {
        self.aim_velocity
    }

    /// Translate actions into direct (unsmoothed) steering
    pub fn update_inputs(
        &mut self,
        actions: &ActionState,
        ship: &Transform,
        dt: f32,
        tuning: &PlayerTuning,
        inputs: &mut ControlInputs,
    ) {
        if !self.inputs_enabled {
            return;
        }

        inputs.throttle_delta = actions.move_axis.y;

        // x: roll, y: pitch, z: yaw
        let deltas = Vec3::new(-actions.look_axis.x, -actions.look_axis.y, actions.move_axis.x);
        let sensitivity = Vec3::from_array(tuning.aim_sensitivity);
        let max = Vec3::splat(tuning.max_aim_velocity);
        self.aim_velocity = (self.aim_velocity + deltas * sensitivity).clamp(-max, max);
        self.aim_velocity = self
            .aim_velocity
            .lerp(Vec3::ZERO, (dt * tuning.aim_velocity_decrease).min(1.0));

        let roll = Quat::from_axis_angle(ship.forward(), self.aim_velocity.x * dt);
        let pitch = Quat::from_axis_angle(ship.right(), self.aim_velocity.y * dt);
        let yaw = Quat::from_axis_angle(ship.up(), self.aim_velocity.z * dt);
        inputs.desired_rotation = (yaw * pitch * roll * ship.rotation).normalize();
        inputs.should_smooth_rotation = false;
    }

    /// Shoot while held and off cooldown; missiles on the press edge only
    pub fn update_weapons(
        &mut self,
        actions: &ActionState,
        can_shoot: bool,
        locked_target: Option<ShipId>,
    ) -> Vec<WeaponCommand> {
        let mut commands = Vec::new();

        if actions.shoot && can_shoot {
            commands.push(WeaponCommand::Shoot);
        }

        self.locked_target = locked_target;
        if actions.missile && !self.last_missile_input {
            if let Some(target) = self.locked_target {
                commands.push(WeaponCommand::LaunchMissiles { target });
            }
        }
        self.last_missile_input = actions.missile;

        commands
    }

    fn reset(&mut self) {
        self.aim_velocity = Vec3::ZERO;
        self.last_missile_input = false;
        self.locked_target = None;
    }
}

#[derive(Debug, Default)]
pub struct AiBrain {
    /// Ship to chase; goes stale silently when it is destroyed
    pub target: Option<ShipId>,
}

impl AiBrain {
    pub fn new(target: Option<ShipId>) -> Self {
        Self { target }
    }

    /// Steer toward `target_location`; returns true when the ship should fire.
    ///
    /// Without a target only the throttle is zeroed, the last rotation
    /// request stays.
    pub fn update_inputs(
        &self,
        ship: &Transform,
        can_shoot: bool,
        target_location: Option<Vec3>,
        tuning: &AiTuning,
        inputs: &mut ControlInputs,
    ) -> bool {
        let Some(target_location) = target_location else {
            inputs.throttle_delta = 0.0;
            return false;
        };

        let direction = (target_location - ship.location).normalize_or_zero();
        let forward_alignment = direction.dot(ship.forward());

        inputs.throttle_delta = forward_alignment;
        inputs.desired_rotation = look_rotation(direction, UP);
        inputs.should_smooth_rotation = true;
        inputs.smooth_rotation_speed = tuning.smooth_rotation_speed;

        can_shoot && forward_alignment >= tuning.fire_alignment
    }
}

#[derive(Debug)]
pub enum ControllerKind {
    Player(PlayerBrain),
    Ai(AiBrain),
}

#[derive(Debug)]
pub struct Controller {
    pub id: ControllerId,
    pub kind: ControllerKind,
    pub on_possess_changed: Event<PossessionChange>,
    pub(crate) ship: Option<ShipId>,
    pub(crate) inputs: ControlInputs,
    /// Set while `possess` silently drops the previous ship
    pub(crate) suppress_event: bool,
}

impl Controller {
    pub fn new(id: ControllerId, kind: ControllerKind) -> Self {
        Self {
            id,
            kind,
            on_possess_changed: Event::new(),
            ship: None,
            inputs: ControlInputs::default(),
            suppress_event: false,
        }
    }

    pub fn player(id: ControllerId, gamepad_id: u32) -> Self {
        Self::new(id, ControllerKind::Player(PlayerBrain::new(gamepad_id)))
    }

    pub fn ai(id: ControllerId, target: Option<ShipId>) -> Self {
        Self::new(id, ControllerKind::Ai(AiBrain::new(target)))
    }

    /// Possessed ship, if any
    pub fn ship(&self) -> Option<ShipId> {
        self.ship
    }

    pub fn inputs(&self) -> &ControlInputs {
        &self.inputs
    }

    pub fn as_player(&self) -> Option<&PlayerBrain> {
        match &self.kind {
            ControllerKind::Player(brain) => Some(brain),
            ControllerKind::Ai(_) => None,
        }
    }

    pub fn as_player_mut(&mut self) -> Option<&mut PlayerBrain> {
        match &mut self.kind {
            ControllerKind::Player(brain) => Some(brain),
            ControllerKind::Ai(_) => None,
        }
    }

    pub fn as_ai_mut(&mut self) -> Option<&mut AiBrain> {
        match &mut self.kind {
            ControllerKind::Ai(brain) => Some(brain),
            ControllerKind::Player(_) => None,
        }
    }

    pub(crate) fn on_possess(&mut self, ship: ShipId) {
        log::debug!("Controller {} possessed ship {}", self.id, ship);
        // Start each possession with fresh aim and camera
        if let ControllerKind::Player(brain) = &mut self.kind {
            brain.reset();
            brain.camera.request_snap();
        }
    }

    pub(crate) fn on_unpossess(&mut self, ship: ShipId) {
        log::debug!("Controller {} released ship {}", self.id, ship);
        if let ControllerKind::Player(brain) = &mut self.kind {
            brain.locked_target = None;
        }
    }
}
