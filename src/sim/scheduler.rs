//! Deferred one-shot actions keyed by elapsed time
//!
//! Tasks carry plain data (ids, slot numbers) instead of live references.
//! The state re-resolves every id when a task fires, so a task whose ship
//! vanished in the meantime quietly does nothing.

use serde::{Deserialize, Serialize};

use super::registry::ShipId;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DeferredAction {
    /// Spawn one missile of a salvo
    SpawnMissile {
        owner: ShipId,
        target: Option<ShipId>,
        /// Index within the salvo (row = slot / 2)
        slot: u32,
    },
    /// Bring a dead ship back
    Respawn { ship: ShipId },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduledTask {
    /// Elapsed time at which the task fires
    pub fire_at: f32,
    /// Delay requested when scheduling
    pub delay: f32,
    pub action: DeferredAction,
    seq: u64,
}

#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    now: f32,
    tasks: Vec<ScheduledTask>,
    next_seq: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Elapsed simulation time (seconds)
    pub fn now(&self) -> f32 {
        self.now
    }

    pub fn schedule(&mut self, delay: f32, action: DeferredAction) {
        let delay = delay.max(0.0);
        self.tasks.push(ScheduledTask {
            fire_at: self.now + delay,
            delay,
            action,
            seq: self.next_seq,
        });
        self.next_seq += 1;
    }

    /// Advance the clock and pop every due task, earliest first
    /// (same-time tasks keep scheduling order)
    pub fn advance(&mut self, dt: f32) -> Vec<DeferredAction> {
        self.now += dt;
        let now = self.now;

        let (mut due, pending): (Vec<_>, Vec<_>) =
            self.tasks.drain(..).partition(|task| task.fire_at <= now);
        self.tasks = pending;

        due.sort_by(|a, b| a.fire_at.total_cmp(&b.fire_at).then(a.seq.cmp(&b.seq)));
        due.into_iter().map(|task| task.action).collect()
    }

    pub fn pending(&self) -> &[ScheduledTask] {
        &self.tasks
    }

    /// Drop every task that references `ship`
    pub fn cancel_for_ship(&mut self, ship: ShipId) {
        self.tasks.retain(|task| match task.action {
            DeferredAction::SpawnMissile { owner, .. } => owner != ship,
            DeferredAction::Respawn { ship: id } => id != ship,
        });
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::EntityId;

    fn respawn(id: u32) -> DeferredAction {
        DeferredAction::Respawn { ship: EntityId(id) }
    }

    #[test]
    fn test_fires_after_delay_only() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(0.5, respawn(1));

        assert!(scheduler.advance(0.25).is_empty());
        assert_eq!(scheduler.pending().len(), 1);
        assert_eq!(scheduler.advance(0.25), vec![respawn(1)]);
        assert!(scheduler.pending().is_empty());
    }

    #[test]
    fn test_due_tasks_in_time_then_schedule_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(0.2, respawn(3));
        scheduler.schedule(0.1, respawn(1));
        scheduler.schedule(0.1, respawn(2));

        assert_eq!(
            scheduler.advance(1.0),
            vec![respawn(1), respawn(2), respawn(3)]
        );
    }

    #[test]
    fn test_zero_delay_fires_next_advance() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(0.0, respawn(7));
        assert_eq!(scheduler.advance(0.0), vec![respawn(7)]);
    }

    #[test]
    fn test_cancel_for_ship() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(1.0, respawn(1));
        scheduler.schedule(
            1.0,
            DeferredAction::SpawnMissile {
                owner: EntityId(1),
                target: Some(EntityId(2)),
                slot: 0,
            },
        );
        scheduler.schedule(1.0, respawn(2));
        scheduler.cancel_for_ship(EntityId(1));

        assert_eq!(scheduler.pending().len(), 1);
        assert_eq!(scheduler.advance(1.0), vec![respawn(2)]);
    }
}
