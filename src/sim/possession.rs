//! Controller ⇄ ship possession
//!
//! Possession is a strict 1:1 link: a controller drives at most one ship
//! and a ship answers to at most one controller. Both sides hold the
//! other's id and these two functions are the only place either is
//! written.

use super::controller::PossessionChange;
use super::registry::{ControllerId, ShipId};
use super::state::GameState;
use crate::error::{SimError, SimResult};

impl GameState {
    /// Bind `controller` to `ship`.
    ///
    /// A ship the controller was already driving is released silently. A
    /// controller already driving `ship` is forced off it (and notified).
    /// Possessing the ship a controller already holds changes nothing.
    pub fn possess(&mut self, controller: ControllerId, ship: ShipId) -> SimResult<()> {
        let index = self
            .controller_index(controller)
            .ok_or(SimError::UnknownController { id: controller.0 })?;
        let other = self
            .ships
            .get(ship)
            .ok_or(SimError::UnknownShip { id: ship.0 })?
            .controller();

        let previous = self.controllers[index].ship;
        if previous == Some(ship) {
            return Ok(());
        }

        if previous.is_some() {
            self.controllers[index].suppress_event = true;
            self.unpossess(controller);
            self.controllers[index].suppress_event = false;
        }

        if let Some(other) = other.filter(|&other| other != controller) {
            self.unpossess(other);
        }

        if let Some(target) = self.ships.get_mut(ship) {
            target.controller = Some(controller);
        }
        let possessor = &mut self.controllers[index];
        possessor.ship = Some(ship);
        possessor.on_possess(ship);
        possessor.on_possess_changed.invoke(&PossessionChange {
            controller,
            previous,
            current: Some(ship),
        });
        Ok(())
    }

    /// Release the possessed ship; returns false when there was none
    pub fn unpossess(&mut self, controller: ControllerId) -> bool {
        let Some(index) = self.controller_index(controller) else {
            return false;
        };
        let Some(ship) = self.controllers[index].ship else {
            return false;
        };

        // A forced re-possession may already have pointed the ship elsewhere
        if let Some(target) = self.ships.get_mut(ship) {
            if target.controller == Some(controller) {
                target.controller = None;
            }
        }

        let possessor = &mut self.controllers[index];
        possessor.on_unpossess(ship);
        possessor.ship = None;
        if !possessor.suppress_event {
            possessor.on_possess_changed.invoke(&PossessionChange {
                controller,
                previous: Some(ship),
                current: None,
            });
        }
        true
    }
}
