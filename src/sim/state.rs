//! Game state: the simulation context
//!
//! Owns every ship, controller and transient combat entity, plus the
//! services they share (collision world, scheduler, seeded RNG). All
//! cross-entity operations go through here so that weak references stay
//! plain ids resolved at use time.

use glam::{Quat, Vec3};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::collision::{Collider, Physics, SpherePhysics};
use super::controller::{Controller, ControllerKind};
use super::explosion::{death_explosion_size, missile_explosion_size, Explosion};
use super::health::{DamageInfo, DamageResult};
use super::missile::GuidedMissile;
use super::projectile::Projectile;
use super::registry::{ControllerId, EntityId, ShipId, ShipRegistry};
use super::scheduler::{DeferredAction, Scheduler};
use super::ship::Ship;
use crate::consts::COLOR_WHITE;
use crate::tuning::Tuning;

pub struct GameState {
    pub tuning: Tuning,
    /// Seed the RNG was created from
    pub seed: u64,
    pub(crate) rng: Pcg32,
    pub ships: ShipRegistry,
    /// Sorted by id
    pub(crate) controllers: Vec<Controller>,
    pub projectiles: Vec<Projectile>,
    pub missiles: Vec<GuidedMissile>,
    pub explosions: Vec<Explosion>,
    pub scheduler: Scheduler,
    pub(crate) physics: Box<dyn Physics>,
    /// Simulation tick counter
    pub time_ticks: u64,
    next_entity_id: u32,
}

impl std::fmt::Debug for GameState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameState")
            .field("seed", &self.seed)
            .field("ships", &self.ships.len())
            .field("controllers", &self.controllers.len())
            .field("projectiles", &self.projectiles.len())
            .field("missiles", &self.missiles.len())
            .field("explosions", &self.explosions.len())
            .field("time_ticks", &self.time_ticks)
            .finish()
    }
}

impl GameState {
    /// Default balance with the bundled sphere collision world
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::default(), Box::new(SpherePhysics::new()))
    }

    pub fn with_tuning(seed: u64, tuning: Tuning, physics: Box<dyn Physics>) -> Self {
        Self {
            tuning,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            ships: ShipRegistry::new(),
            controllers: Vec::new(),
            projectiles: Vec::new(),
            missiles: Vec::new(),
            explosions: Vec::new(),
            scheduler: Scheduler::new(),
            physics,
            time_ticks: 0,
            next_entity_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = EntityId(self.next_entity_id);
        self.next_entity_id += 1;
        id
    }

    /// Elapsed simulation time (seconds)
    pub fn elapsed(&self) -> f32 {
        self.scheduler.now()
    }

    pub fn rng(&mut self) -> &mut Pcg32 {
        &mut self.rng
    }

    pub fn physics(&self) -> &dyn Physics {
        self.physics.as_ref()
    }

    pub fn physics_mut(&mut self) -> &mut dyn Physics {
        self.physics.as_mut()
    }

    pub fn ship(&self, id: ShipId) -> Option<&Ship> {
        self.ships.get(id)
    }

    pub fn ship_mut(&mut self, id: ShipId) -> Option<&mut Ship> {
        self.ships.get_mut(id)
    }

    pub(crate) fn controller_index(&self, id: ControllerId) -> Option<usize> {
        self.controllers.binary_search_by_key(&id, |c| c.id).ok()
    }

    pub fn controller(&self, id: ControllerId) -> Option<&Controller> {
        self.controller_index(id).map(|index| &self.controllers[index])
    }

    pub fn controller_mut(&mut self, id: ControllerId) -> Option<&mut Controller> {
        let index = self.controller_index(id)?;
        Some(&mut self.controllers[index])
    }

    pub fn controllers(&self) -> impl Iterator<Item = &Controller> {
        self.controllers.iter()
    }

    // === Spawning ===

    /// Create and register a ship with its collider
    pub fn spawn_ship(&mut self, location: Vec3, rotation: Quat, color: u32) -> ShipId {
        let id = self.next_entity_id();
        let mut ship = Ship::new(id, color, &self.tuning.ship);
        ship.transform.location = location;
        ship.set_rotation(rotation);
        self.ships.register(ship);
        self.sync_collider(id);

        log::debug!("Spawned ship {} at {:?}", id, location);
        id
    }

    pub fn spawn_controller(&mut self, kind: ControllerKind) -> ControllerId {
        let id = self.next_entity_id();
        // Ids are monotonic, so pushing keeps the list sorted
        self.controllers.push(Controller::new(id, kind));
        id
    }

    pub fn spawn_player_controller(&mut self, gamepad_id: u32) -> ControllerId {
        let id = self.next_entity_id();
        self.controllers.push(Controller::player(id, gamepad_id));
        id
    }

    pub fn spawn_ai_controller(&mut self, target: Option<ShipId>) -> ControllerId {
        let id = self.next_entity_id();
        self.controllers.push(Controller::ai(id, target));
        id
    }

    /// Health-less obstacle (asteroid): stops projectiles, nothing else
    pub fn add_static_collider(&mut self, center: Vec3, radius: f32) -> EntityId {
        let id = self.next_entity_id();
        self.physics.set_collider(id, Collider::sphere(center, radius));
        id
    }

    /// Row of AI ships at x = 100 + 50 i, each chasing a distinct squad
    /// member in shuffled order. Returns the controllers.
    pub fn spawn_ai_squad(&mut self, count: usize) -> Vec<ControllerId> {
        let mut ships = Vec::with_capacity(count);
        let mut controllers = Vec::with_capacity(count);

        for i in 0..count {
            let color = self.rng.random::<u32>() | 0xFF;
            let location = Vec3::new(100.0 + i as f32 * 50.0, 0.0, 0.0);
            let ship = self.spawn_ship(location, Quat::IDENTITY, color);
            let controller = self.spawn_ai_controller(None);
            // Both ids were just created
            let _ = self.possess(controller, ship);
            ships.push(ship);
            controllers.push(controller);
        }

        ships.shuffle(&mut self.rng);
        for (&controller, target) in controllers.iter().zip(ships) {
            if let Some(brain) = self.controller_mut(controller).and_then(|c| c.as_ai_mut()) {
                brain.target = Some(target);
            }
        }

        log::info!("Spawned AI squad of {}", count);
        controllers
    }

    pub(crate) fn spawn_explosion(&mut self, location: Vec3, size: f32, color: u32) -> EntityId {
        let id = self.next_entity_id();
        let explosion = Explosion::new(id, location, size, color, &self.tuning.explosion, &mut self.rng);
        self.explosions.push(explosion);
        id
    }

    // === Weapons ===

    /// Fire both guns. The cooldown is the caller's check
    /// (see [`Ship::can_shoot`]); this always fires.
    pub fn shoot(&mut self, ship_id: ShipId) -> bool {
        let Some(ship) = self.ships.get(ship_id) else {
            return false;
        };
        let spawns = ship.projectile_spawns(&self.tuning.ship, self.tuning.projectile.scale);
        let color = ship.color();

        for transform in spawns {
            let id = self.next_entity_id();
            let projectile = Projectile::new(id, ship_id, transform, color, &self.tuning.projectile);
            self.projectiles.push(projectile);
        }

        if let Some(ship) = self.ships.get_mut(ship_id) {
            ship.start_cooldown(&self.tuning.ship);
        }
        true
    }

    /// Queue a salvo: two missiles per row, one row per `row_delay`
    pub fn launch_missiles(&mut self, ship_id: ShipId, target: Option<ShipId>) -> bool {
        if !self.ships.contains(ship_id) {
            return false;
        }

        let tuning = &self.tuning.missile;
        for slot in 0..tuning.salvo_count {
            let delay = (slot / 2) as f32 * tuning.row_delay;
            self.scheduler.schedule(
                delay,
                DeferredAction::SpawnMissile {
                    owner: ship_id,
                    target,
                    slot,
                },
            );
        }

        log::debug!(
            "Ship {} launching {} missiles at {:?}",
            ship_id,
            tuning.salvo_count,
            target
        );
        true
    }

    /// Deferred half of `launch_missiles`; skipped when the owner vanished
    /// or died in the meantime
    pub(crate) fn spawn_missile(&mut self, owner: ShipId, target: Option<ShipId>, slot: u32) {
        let Some(ship) = self.ships.get(owner).filter(|ship| ship.is_active()) else {
            return;
        };
        let (transform, up) = ship.missile_spawn(slot, &self.tuning.missile);
        let color = ship.color();
        let target_location = target
            .and_then(|id| self.ships.get(id))
            .map(|ship| ship.transform.location);

        let id = self.next_entity_id();
        self.missiles.push(GuidedMissile::new(
            id,
            owner,
            target,
            transform,
            up,
            color,
            target_location,
            &self.tuning.missile,
        ));
    }

    pub(crate) fn explode_missile(&mut self, missile: &GuidedMissile) {
        let color = self
            .ships
            .get(missile.owner)
            .map_or(COLOR_WHITE, |ship| ship.color());
        let size = missile_explosion_size(&self.tuning.missile, &mut self.rng);
        self.spawn_explosion(missile.transform.location, size, color);
    }

    // === Damage, death, respawn ===

    /// Damage info whose attacker only resolves while the owner lives
    pub(crate) fn damage_from(&self, owner: ShipId, damage: f32) -> DamageInfo {
        let mut info = DamageInfo::new(owner, damage);
        if !self.ships.contains(owner) {
            info.attacker = None;
        }
        info
    }

    /// Damage a ship's health; a result reporting not-alive kills it.
    ///
    /// Returns `None` when `victim` is not a ship (no health to damage).
    pub fn apply_damage(&mut self, victim: EntityId, info: DamageInfo) -> Option<DamageResult> {
        let ship = self.ships.get_mut(victim)?;
        let result = ship.health.damage(info);
        if result.is_valid && !result.is_alive {
            self.die(victim);
        }
        Some(result)
    }

    /// Raise `on_hit` on the attacking ship for valid results
    pub(crate) fn forward_hit(&mut self, owner: ShipId, result: &DamageResult) {
        if !result.is_valid {
            return;
        }
        if let Some(ship) = self.ships.get_mut(owner) {
            ship.on_hit.invoke(result);
        }
    }

    pub(crate) fn die(&mut self, ship_id: ShipId) {
        let Some(ship) = self.ships.get_mut(ship_id) else {
            return;
        };
        let overkill = ship.enter_dead_state();
        let location = ship.transform.location;
        let color = ship.color();
        self.sync_collider(ship_id);

        let size = death_explosion_size(overkill, &self.tuning.explosion, &mut self.rng);
        self.spawn_explosion(location, size, color);
        self.scheduler
            .schedule(self.tuning.ship.respawn_delay, DeferredAction::Respawn { ship: ship_id });

        log::info!("Ship {} killed (overkill {:.1})", ship_id, overkill);
    }

    pub(crate) fn respawn(&mut self, ship_id: ShipId) {
        let Some(ship) = self.ships.get_mut(ship_id) else {
            return;
        };
        ship.enter_respawn_state();
        self.sync_collider(ship_id);

        log::info!("Ship {} respawned", ship_id);
    }

    pub(crate) fn run_deferred(&mut self, action: DeferredAction) {
        match action {
            DeferredAction::SpawnMissile { owner, target, slot } => {
                self.spawn_missile(owner, target, slot)
            }
            DeferredAction::Respawn { ship } => self.respawn(ship),
        }
    }

    /// Mirror a ship's location and collider state into the physics world
    pub(crate) fn sync_collider(&mut self, ship_id: ShipId) {
        let Some(ship) = self.ships.get(ship_id) else {
            return;
        };
        let mut collider = Collider::sphere(ship.transform.location, self.tuning.ship.collider_radius);
        collider.active = ship.is_collider_active();
        self.physics.set_collider(ship_id, collider);
    }

    // === Destruction ===

    /// Remove a ship for good. Its controller is released and any pending
    /// callback for it is dropped.
    pub fn destroy_ship(&mut self, ship_id: ShipId) -> bool {
        let Some(controller) = self.ships.get(ship_id).map(|ship| ship.controller()) else {
            return false;
        };
        if let Some(controller) = controller {
            self.unpossess(controller);
        }

        self.ships.unregister(ship_id);
        self.physics.remove_collider(ship_id);
        self.scheduler.cancel_for_ship(ship_id);

        log::debug!("Destroyed ship {}", ship_id);
        true
    }

    /// Remove a controller, releasing its ship first
    pub fn destroy_controller(&mut self, controller_id: ControllerId) -> bool {
        if self.controller_index(controller_id).is_none() {
            return false;
        }
        self.unpossess(controller_id);

        if let Some(index) = self.controller_index(controller_id) {
            self.controllers.remove(index);
        }
        log::debug!("Destroyed controller {}", controller_id);
        true
    }
}
