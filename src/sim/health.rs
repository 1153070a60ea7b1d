//! Hit points and damage application

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::event::Event;
use super::registry::EntityId;

/// Input to [`HealthComponent::damage`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DamageInfo {
    /// Dealing actor; damage without an attacker is rejected
    pub attacker: Option<EntityId>,
    pub damage: f32,
    pub knockback: Vec3,
}

impl DamageInfo {
    pub fn new(attacker: EntityId, damage: f32) -> Self {
        Self {
            attacker: Some(attacker),
            damage,
            knockback: Vec3::ZERO,
        }
    }

    pub fn with_knockback(mut self, knockback: Vec3) -> Self {
        self.knockback = knockback;
        self
    }
}

/// Outcome of one damage attempt
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DamageResult {
    pub is_valid: bool,
    /// Entity owning the damaged health; only resolves while it lives
    pub victim: Option<EntityId>,
    pub is_alive: bool,
    pub info: DamageInfo,
}

impl DamageResult {
    fn rejected(info: DamageInfo) -> Self {
        Self {
            is_valid: false,
            victim: None,
            is_alive: false,
            info,
        }
    }

    /// Valid hit that took the victim to zero
    pub fn is_kill(&self) -> bool {
        self.is_valid && !self.is_alive
    }
}

/// Hit-point state owned by exactly one entity.
///
/// `health` may dip below zero after a hit; the owner clamps it when it
/// dies so the overshoot can size the death explosion first.
#[derive(Debug)]
pub struct HealthComponent {
    pub health: f32,
    max_health: f32,
    owner: EntityId,
    pub on_damage: Event<DamageResult>,
}

impl HealthComponent {
    pub fn new(owner: EntityId, max_health: f32) -> Self {
        Self {
            health: max_health,
            max_health,
            owner,
            on_damage: Event::new(),
        }
    }

    pub fn owner(&self) -> EntityId {
        self.owner
    }

    pub fn max_health(&self) -> f32 {
        self.max_health
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    /// Apply damage and notify `on_damage` listeners.
    ///
    /// Rejected with no state change when already dead, when the attacker
    /// is missing or when the amount is not positive.
    pub fn damage(&mut self, info: DamageInfo) -> DamageResult {
        if !self.is_alive() || info.attacker.is_none() || info.damage <= 0.0 {
            return DamageResult::rejected(info);
        }

        self.health -= info.damage;

        let result = DamageResult {
            is_valid: true,
            victim: Some(self.owner),
            is_alive: self.is_alive(),
            info,
        };
        self.on_damage.invoke(&result);
        result
    }

    pub fn heal(&mut self, amount: f32) {
        self.health = self.max_health.min(self.health + amount);
    }

    pub fn heal_to_full(&mut self) {
        self.health = self.max_health;
    }
}
