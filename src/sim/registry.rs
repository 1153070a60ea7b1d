//! Entity ids and the live-ship directory
//!
//! Ids are handed out monotonically and never reused, so an id held past
//! its entity's destruction simply stops resolving. That is the only weak
//! reference the simulation needs.

use serde::{Deserialize, Serialize};

use super::ship::Ship;

/// Stable entity identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

pub type ShipId = EntityId;
pub type ControllerId = EntityId;

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Every live ship, in registration order.
///
/// Owned by the [`GameState`](super::GameState) and handed to whatever
/// needs cross-ship queries (target lock).
#[derive(Debug, Default)]
pub struct ShipRegistry {
    ships: Vec<Ship>,
}

impl ShipRegistry {
    pub fn new() -> Self {
        Self { ships: Vec::new() }
    }

    pub fn register(&mut self, ship: Ship) {
        debug_assert!(
            self.ships.last().is_none_or(|last| last.id < ship.id),
            "ship {} registered out of id order",
            ship.id
        );
        self.ships.push(ship);
    }

    /// Remove a ship; asserts in debug builds that it was registered
    pub fn unregister(&mut self, id: ShipId) -> Option<Ship> {
        match self.index_of(id) {
            Some(index) => Some(self.ships.remove(index)),
            None => {
                debug_assert!(false, "unregistering unknown ship {}", id);
                log::warn!("Tried to unregister unknown ship {}", id);
                None
            }
        }
    }

    pub fn contains(&self, id: ShipId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn get(&self, id: ShipId) -> Option<&Ship> {
        self.index_of(id).map(|i| &self.ships[i])
    }

    pub fn get_mut(&mut self, id: ShipId) -> Option<&mut Ship> {
        self.index_of(id).map(move |i| &mut self.ships[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Ship> {
        self.ships.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Ship> {
        self.ships.iter_mut()
    }

    /// Snapshot of registered ids, safe to hold while ships come and go
    pub fn ids(&self) -> Vec<ShipId> {
        self.ships.iter().map(|s| s.id).collect()
    }

    pub fn len(&self) -> usize {
        self.ships.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ships.is_empty()
    }

    fn index_of(&self, id: ShipId) -> Option<usize> {
        // Ids are allocated in increasing order and ships are appended
        self.ships.binary_search_by_key(&id, |s| s.id).ok()
    }
}
