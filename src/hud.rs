//! Hit markers and kill feed
//!
//! A presentation-side listener on a ship's `on_hit` event. The feed sits
//! behind `Rc<RefCell<_>>` so the listener closure and the drawing code can
//! share it; nothing in the simulation holds on to it.

use std::cell::RefCell;
use std::rc::Rc;

use crate::consts::COLOR_WHITE;
use crate::sim::{DamageResult, EntityId, ListenerId, Ship, ShipRegistry};

/// How long a kill stays in the feed (seconds)
pub const KILL_TIME: f32 = 2.5;
/// Crosshair hit flash (seconds)
pub const HIT_TIME: f32 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KillEntry {
    pub victim: EntityId,
    /// Seconds left on screen
    pub life_time: f32,
}

#[derive(Debug, Default)]
pub struct HitFeed {
    hit_time: f32,
    kills: Vec<KillEntry>,
}

impl HitFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a shared feed to `ship`'s landed hits
    pub fn attach(feed: &Rc<RefCell<HitFeed>>, ship: &mut Ship) -> ListenerId {
        let feed = Rc::clone(feed);
        ship.on_hit.listen(move |result| feed.borrow_mut().on_hit(result))
    }

    pub fn detach(ship: &mut Ship, listener: ListenerId) -> bool {
        ship.on_hit.unlisten(listener)
    }

    pub fn on_hit(&mut self, result: &DamageResult) {
        self.hit_time = HIT_TIME;

        if let Some(victim) = result.victim.filter(|_| !result.is_alive) {
            self.kills.push(KillEntry {
                victim,
                life_time: KILL_TIME,
            });
        }
    }

    pub fn update(&mut self, dt: f32) {
        self.hit_time = (self.hit_time - dt).max(0.0);
        for kill in &mut self.kills {
            kill.life_time -= dt;
        }
        self.kills.retain(|kill| kill.life_time > 0.0);
    }

    /// 1 right after a hit, fading to 0
    pub fn hit_ratio(&self) -> f32 {
        self.hit_time / HIT_TIME
    }

    pub fn kills(&self) -> &[KillEntry] {
        &self.kills
    }

    /// Kill icon colours, white for victims that no longer resolve
    pub fn kill_colors(&self, ships: &ShipRegistry) -> Vec<u32> {
        self.kills
            .iter()
            .map(|kill| ships.get(kill.victim).map_or(COLOR_WHITE, |ship| ship.color()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use glam::{Quat, Vec3};

    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::{tick, GameState, TickInput};

    #[test]
    fn test_feed_records_hits_and_kills() {
        let mut state = GameState::new(1);
        let a = state.spawn_ship(Vec3::ZERO, Quat::IDENTITY, COLOR_WHITE);
        let b = state.spawn_ship(Vec3::new(100.0, -2.0, 0.25), Quat::IDENTITY, 0xFF6978FF);

        let feed = Rc::new(RefCell::new(HitFeed::new()));
        let listener = HitFeed::attach(&feed, state.ship_mut(a).unwrap());

        // 4 volleys of one landing shot each: 25 damage per hit
        for _ in 0..4 {
            state.shoot(a);
            for _ in 0..12 {
                tick(&mut state, &TickInput::default(), SIM_DT);
            }
        }

        assert_eq!(feed.borrow().kills().len(), 1);
        assert_eq!(feed.borrow().kills()[0].victim, b);
        assert_eq!(feed.borrow().kill_colors(&state.ships), vec![0xFF6978FF]);

        assert!(HitFeed::detach(state.ship_mut(a).unwrap(), listener));
    }

    #[test]
    fn test_entries_expire() {
        let mut feed = HitFeed::new();
        let kill = DamageResult {
            is_valid: true,
            victim: Some(EntityId(7)),
            is_alive: false,
            info: crate::sim::DamageInfo::new(EntityId(1), 30.0),
        };
        feed.on_hit(&kill);
        assert_eq!(feed.hit_ratio(), 1.0);

        feed.update(1.0);
        assert_eq!(feed.hit_ratio(), 0.0);
        assert_eq!(feed.kills().len(), 1);

        feed.update(2.0);
        assert!(feed.kills().is_empty());
    }

    #[test]
    fn test_vanished_victim_is_white() {
        let mut feed = HitFeed::new();
        let kill = DamageResult {
            is_valid: true,
            victim: Some(EntityId(42)),
            is_alive: false,
            info: crate::sim::DamageInfo::new(EntityId(1), 30.0),
        };
        feed.on_hit(&kill);
        assert_eq!(feed.kill_colors(&ShipRegistry::new()), vec![COLOR_WHITE]);
    }
}
