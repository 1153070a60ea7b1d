//! Local player bookkeeping
//!
//! One player per gamepad, each a ship plus a possessing player controller.
//! Viewport layout for split-screen is left to the presentation layer.

use glam::{Quat, Vec3};
use rand::Rng;

use super::registry::ControllerId;
use super::state::GameState;
use crate::consts::{MAX_PLAYERS, PLAYER_COLORS};
use crate::error::{SimError, SimResult};

#[derive(Debug, Clone, Default)]
pub struct PlayerManager {
    /// Player controllers in creation order
    controllers: Vec<ControllerId>,
    /// Next palette index; picked at random on first use
    next_color: Option<usize>,
}

impl PlayerManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn players(&self) -> &[ControllerId] {
        &self.controllers
    }

    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }

    pub fn player_for_gamepad(&self, state: &GameState, gamepad_id: u32) -> Option<ControllerId> {
        self.controllers.iter().copied().find(|&id| {
            state
                .controller(id)
                .and_then(|c| c.as_player())
                .is_some_and(|brain| brain.gamepad_id == gamepad_id)
        })
    }

    /// Spawn a ship and a player controller possessing it.
    ///
    /// A gamepad that already has a player gets that player back.
    pub fn create_player(
        &mut self,
        state: &mut GameState,
        location: Vec3,
        rotation: Quat,
        gamepad_id: u32,
    ) -> SimResult<ControllerId> {
        if let Some(existing) = self.player_for_gamepad(state, gamepad_id) {
            log::info!("Player with gamepad {} already exists, skipping creation", gamepad_id);
            return Ok(existing);
        }

        if self.controllers.len() >= MAX_PLAYERS {
            log::error!("Cannot create player for gamepad {}: {} players max", gamepad_id, MAX_PLAYERS);
            return Err(SimError::TooManyPlayers { max: MAX_PLAYERS });
        }

        let color = self.next_player_color(state);
        let ship = state.spawn_ship(location, rotation, color);
        let controller = state.spawn_player_controller(gamepad_id);
        state.possess(controller, ship)?;

        self.controllers.push(controller);
        log::info!("Player using gamepad {} has been created", gamepad_id);
        Ok(controller)
    }

    /// Destroy a player's ship and controller; false if not tracked here
    pub fn destroy_player(&mut self, state: &mut GameState, controller: ControllerId) -> bool {
        let Some(index) = self.controllers.iter().position(|&id| id == controller) else {
            log::warn!("Tried to destroy untracked player {}", controller);
            return false;
        };

        if let Some(ship) = state.controller(controller).and_then(|c| c.ship()) {
            state.destroy_ship(ship);
        }
        state.destroy_controller(controller);
        self.controllers.remove(index);

        log::info!("Player {} has been destroyed", controller);
        true
    }

    /// Spread new players along -Y so they don't spawn inside each other
    pub fn on_gamepad_connected(&mut self, state: &mut GameState, gamepad_id: u32) -> SimResult<ControllerId> {
        let location = Vec3::new(0.0, -100.0 * gamepad_id as f32, 0.0);
        self.create_player(state, location, Quat::IDENTITY, gamepad_id)
    }

    pub fn on_gamepad_disconnected(&mut self, state: &mut GameState, gamepad_id: u32) -> bool {
        match self.player_for_gamepad(state, gamepad_id) {
            Some(controller) => self.destroy_player(state, controller),
            None => false,
        }
    }

    fn next_player_color(&mut self, state: &mut GameState) -> u32 {
        let index = *self
            .next_color
            .get_or_insert_with(|| state.rng().random_range(0..PLAYER_COLORS.len()));
        self.next_color = Some((index + 1) % PLAYER_COLORS.len());
        PLAYER_COLORS[index]
    }
}
