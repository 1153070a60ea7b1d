//! Fixed timestep simulation tick
//!
//! One call advances every entity once, in a fixed order:
//! deferred actions, controllers and ship movement, player weapons and
//! camera, projectiles, missiles, explosions.

use std::collections::BTreeMap;

use super::controller::{ActionState, ControllerKind, WeaponCommand};
use super::missile::{MissileStep, TargetView};
use super::projectile::ProjectileStep;
use super::registry::ShipId;
use super::state::GameState;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Action values per gamepad id; missing pads read as idle
    pub actions: BTreeMap<u32, ActionState>,
}

impl TickInput {
    pub fn with_actions(mut self, gamepad_id: u32, actions: ActionState) -> Self {
        self.actions.insert(gamepad_id, actions);
        self
    }

    pub fn actions_for(&self, gamepad_id: u32) -> ActionState {
        self.actions.get(&gamepad_id).copied().unwrap_or_default()
    }
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    state.time_ticks += 1;

    for action in state.scheduler.advance(dt) {
        state.run_deferred(action);
    }

    update_ships(state, input, dt);
    update_players(state, input, dt);
    update_projectiles(state, dt);
    update_missiles(state, dt);

    state.explosions.retain_mut(|explosion| !explosion.update(dt));
}

/// Controller inputs, then movement, for every active ship
fn update_ships(state: &mut GameState, input: &TickInput, dt: f32) {
    for id in state.ships.ids() {
        let Some(ship) = state.ships.get(id) else {
            continue;
        };
        if !ship.is_active() {
            continue;
        }

        let mut fire = false;
        let mut inputs = None;
        if let Some(index) = ship.controller().and_then(|c| state.controller_index(c)) {
            let controller = &mut state.controllers[index];
            match &mut controller.kind {
                ControllerKind::Player(brain) => {
                    let actions = input.actions_for(brain.gamepad_id);
                    brain.update_inputs(
                        &actions,
                        &ship.transform,
                        dt,
                        &state.tuning.player,
                        &mut controller.inputs,
                    );
                }
                ControllerKind::Ai(brain) => {
                    // A dead target still resolves and keeps being chased
                    let target_location = brain
                        .target
                        .and_then(|target| state.ships.get(target))
                        .map(|target| target.transform.location);
                    fire = brain.update_inputs(
                        &ship.transform,
                        ship.can_shoot(),
                        target_location,
                        &state.tuning.ai,
                        &mut controller.inputs,
                    );
                }
            }
            inputs = Some(controller.inputs);
        }

        if let Some(ship) = state.ships.get_mut(id) {
            ship.update_movement(inputs.as_ref(), dt, &state.tuning.ship);
            ship.update_trail(dt, &state.tuning.ship);
            ship.decay_cooldown(dt);
        }
        if fire {
            state.shoot(id);
        }
        state.sync_collider(id);
    }
}

/// Camera, lock-on and weapon triggers for player-driven active ships
fn update_players(state: &mut GameState, input: &TickInput, dt: f32) {
    for index in 0..state.controllers.len() {
        let controller = &mut state.controllers[index];
        let Some(ship_id) = controller.ship else {
            continue;
        };
        let ControllerKind::Player(brain) = &mut controller.kind else {
            continue;
        };
        let Some(ship) = state.ships.get(ship_id).filter(|ship| ship.is_active()) else {
            continue;
        };

        let actions = input.actions_for(brain.gamepad_id);
        brain.camera.update(
            &ship.transform,
            ship.throttle(),
            actions.rearview,
            dt,
            &state.tuning.camera,
        );
        if !brain.inputs_enabled {
            continue;
        }

        let locked = ship.find_lockable_target(&state.ships, brain.camera.forward(), &state.tuning.lock);
        let commands = brain.update_weapons(&actions, ship.can_shoot(), locked);
        run_weapon_commands(state, ship_id, &commands);
    }
}

fn run_weapon_commands(state: &mut GameState, ship: ShipId, commands: &[WeaponCommand]) {
    for command in commands {
        match *command {
            WeaponCommand::Shoot => {
                state.shoot(ship);
            }
            WeaponCommand::LaunchMissiles { target } => {
                state.launch_missiles(ship, Some(target));
            }
        }
    }
}

fn update_projectiles(state: &mut GameState, dt: f32) {
    let mut projectiles = std::mem::take(&mut state.projectiles);

    projectiles.retain_mut(|projectile| match projectile.step(dt, state.physics.as_ref()) {
        ProjectileStep::Moved => true,
        ProjectileStep::Expired => false,
        ProjectileStep::Hit(hit) => {
            let info = state
                .damage_from(projectile.owner, projectile.damage)
                .with_knockback(projectile.knockback(&hit));
            if let Some(result) = state.apply_damage(hit.entity, info) {
                state.forward_hit(projectile.owner, &result);
            }
            false
        }
    });

    // Anything spawned mid-update goes after the survivors
    projectiles.append(&mut state.projectiles);
    state.projectiles = projectiles;
}

fn update_missiles(state: &mut GameState, dt: f32) {
    let mut missiles = std::mem::take(&mut state.missiles);

    missiles.retain_mut(|missile| {
        let target = missile
            .target
            .and_then(|id| state.ships.get(id))
            .map(|ship| TargetView {
                location: ship.transform.location,
                is_alive: ship.health.is_alive(),
            });

        match missile.step(dt, target, state.physics.as_ref(), &state.tuning.missile) {
            MissileStep::Flying => true,
            MissileStep::Expired => {
                state.explode_missile(missile);
                false
            }
            MissileStep::Impact(hit) => {
                let Some(victim) = state.ships.get(hit.entity).map(|ship| ship.transform.location) else {
                    // Nothing to damage: fly through
                    if missile.age() >= state.tuning.missile.lifetime {
                        state.explode_missile(missile);
                        return false;
                    }
                    return true;
                };

                let info = state
                    .damage_from(missile.owner, state.tuning.missile.damage)
                    .with_knockback(missile.knockback(victim, &state.tuning.missile));
                if let Some(result) = state.apply_damage(hit.entity, info) {
                    state.forward_hit(missile.owner, &result);
                }
                state.explode_missile(missile);
                false
            }
        }
    });

    missiles.append(&mut state.missiles);
    state.missiles = missiles;
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::{Quat, Vec3};

    use super::*;
    use crate::consts::{COLOR_WHITE, SIM_DT};
    use crate::sim::collision::{Collider, Physics, Ray, RayHit, RayParams};
    use crate::sim::{DamageInfo, DamageResult, DeferredAction, EntityId, ShipState};
    use crate::Tuning;

    fn run(state: &mut GameState, input: &TickInput, ticks: usize) {
        for _ in 0..ticks {
            tick(state, input, SIM_DT);
        }
    }

    fn spawn(state: &mut GameState, location: Vec3) -> ShipId {
        state.spawn_ship(location, Quat::IDENTITY, COLOR_WHITE)
    }

    #[test]
    fn test_damage_death_respawn_cycle() {
        let mut state = GameState::new(12345);
        let a = spawn(&mut state, Vec3::new(30.0, 40.0, 0.0));
        let b = spawn(&mut state, Vec3::new(-300.0, 0.0, 0.0));

        let first = state.apply_damage(a, DamageInfo::new(b, 30.0)).unwrap();
        assert!(first.is_valid);
        assert!(first.is_alive);
        assert_eq!(state.ship(a).unwrap().health.health, 70.0);

        let second = state.apply_damage(a, DamageInfo::new(b, 80.0)).unwrap();
        assert!(second.is_valid);
        assert!(!second.is_alive);
        assert_eq!(state.ship(a).unwrap().state, ShipState::Paused);

        let input = TickInput::default();
        run(&mut state, &input, 290);
        assert_eq!(state.ship(a).unwrap().state, ShipState::Paused);

        run(&mut state, &input, 20);
        let ship = state.ship(a).unwrap();
        assert_eq!(ship.state, ShipState::Active);
        assert_eq!(ship.health.health, ship.health.max_health());
        assert_eq!(ship.transform.location, Vec3::ZERO);
        assert!(ship.is_collider_active());
    }

    #[test]
    fn test_dead_ship_rejects_damage_until_respawn() {
        let mut state = GameState::new(1);
        let a = spawn(&mut state, Vec3::ZERO);
        let b = spawn(&mut state, Vec3::new(100.0, 0.0, 0.0));
        state.apply_damage(a, DamageInfo::new(b, 500.0));

        let again = state.apply_damage(a, DamageInfo::new(b, 10.0)).unwrap();
        assert!(!again.is_valid);
        assert_eq!(state.ship(a).unwrap().health.health, 0.0);
        // Only one respawn queued
        assert_eq!(state.scheduler.pending().len(), 1);
    }

    #[test]
    fn test_salvo_spawns_six_missiles_over_three_rows() {
        let mut state = GameState::new(1);
        let a = spawn(&mut state, Vec3::ZERO);
        let b = spawn(&mut state, Vec3::new(300.0, 0.0, 0.0));
        state.launch_missiles(a, Some(b));

        let mut delays: Vec<f32> = state.scheduler.pending().iter().map(|t| t.delay).collect();
        assert_eq!(delays.len(), 6);
        delays.dedup();
        assert_eq!(delays, vec![0.0, 0.1, 0.2]);

        let input = TickInput::default();
        run(&mut state, &input, 1);
        assert_eq!(state.missiles.len(), 2);
        run(&mut state, &input, 15);
        assert_eq!(state.missiles.len(), 6);
        assert!(state.missiles.iter().all(|m| m.owner == a && m.target == Some(b)));
    }

    #[test]
    fn test_missiles_keep_flying_after_target_dies() {
        let mut state = GameState::new(1);
        let a = spawn(&mut state, Vec3::ZERO);
        let b = spawn(&mut state, Vec3::new(400.0, 0.0, 0.0));
        state.launch_missiles(a, Some(b));

        let input = TickInput::default();
        run(&mut state, &input, 20);
        assert_eq!(state.missiles.len(), 6);

        state.apply_damage(b, DamageInfo::new(a, 500.0));
        let before: Vec<Vec3> = state.missiles.iter().map(|m| m.transform.location).collect();
        run(&mut state, &input, 1);

        assert_eq!(state.missiles.len(), 6);
        for (missile, before) in state.missiles.iter().zip(before) {
            assert_eq!(missile.target, None);
            assert!(missile.transform.location != before);
        }
    }

    #[test]
    fn test_missiles_skip_when_owner_destroyed() {
        let mut state = GameState::new(1);
        let a = spawn(&mut state, Vec3::ZERO);
        let b = spawn(&mut state, Vec3::new(300.0, 0.0, 0.0));
        state.launch_missiles(a, Some(b));
        state.destroy_ship(a);

        run(&mut state, &TickInput::default(), 30);
        assert!(state.missiles.is_empty());
    }

    const OWNER_COLOR: u32 = 0x112233FF;

    fn record_hits(state: &mut GameState, ship: ShipId) -> Rc<RefCell<Vec<DamageResult>>> {
        let hits: Rc<RefCell<Vec<DamageResult>>> = Rc::default();
        let sink = Rc::clone(&hits);
        state
            .ship_mut(ship)
            .unwrap()
            .on_hit
            .listen(move |result| sink.borrow_mut().push(*result));
        hits
    }

    /// Tick until `done` holds, giving up after `limit` ticks
    fn run_until(state: &mut GameState, limit: usize, done: impl Fn(&GameState) -> bool) -> bool {
        for _ in 0..limit {
            if done(state) {
                return true;
            }
            tick(state, &TickInput::default(), SIM_DT);
        }
        done(state)
    }

    #[test]
    fn test_missile_salvo_damages_kills_and_credits_owner() {
        let mut state = GameState::new(1);
        let a = state.spawn_ship(Vec3::ZERO, Quat::IDENTITY, OWNER_COLOR);
        // Straight above, where the salvo leaves nose-up
        let b = spawn(&mut state, Vec3::new(0.0, 0.0, 60.0));
        let hits = record_hits(&mut state, a);

        state.launch_missiles(a, Some(b));
        assert!(run_until(&mut state, 300, |_| !hits.borrow().is_empty()));

        let first = hits.borrow()[0];
        assert!(first.is_valid && first.is_alive);
        assert_eq!(first.victim, Some(b));
        assert_eq!(first.info.attacker, Some(a));
        assert_eq!(first.info.damage, 17.0);
        assert!(state.explosions.iter().any(|e| e.color == OWNER_COLOR));

        assert!(run_until(&mut state, 300, |state| state.missiles.is_empty()));
        assert_eq!(hits.borrow().len(), 6);
        assert!(!hits.borrow()[5].is_alive);
        let victim = state.ship(b).unwrap();
        assert_eq!(victim.state, ShipState::Paused);
        assert_eq!(victim.health.health, 0.0);
    }

    #[test]
    fn test_orphaned_missiles_explode_white_without_damage() {
        let mut state = GameState::new(1);
        let a = state.spawn_ship(Vec3::ZERO, Quat::IDENTITY, OWNER_COLOR);
        let b = state.spawn_ship(Vec3::new(0.0, 0.0, 60.0), Quat::IDENTITY, 0x445566FF);

        state.launch_missiles(a, Some(b));
        run(&mut state, &TickInput::default(), 1);
        assert_eq!(state.missiles.len(), 2);
        state.destroy_ship(a);

        assert!(run_until(&mut state, 300, |state| state.missiles.is_empty()));
        assert!(!state.explosions.is_empty());
        assert!(state.explosions.iter().all(|e| e.color == COLOR_WHITE));
        assert_eq!(state.ship(b).unwrap().health.health, 100.0);
    }

    #[test]
    fn test_missiles_fly_through_static_colliders() {
        let mut state = GameState::new(1);
        let a = state.spawn_ship(Vec3::ZERO, Quat::IDENTITY, OWNER_COLOR);
        // Asteroid squarely across the climb
        state.add_static_collider(Vec3::new(0.0, 0.0, 30.0), 15.0);
        let b = spawn(&mut state, Vec3::new(0.0, 0.0, 60.0));
        let hits = record_hits(&mut state, a);

        state.launch_missiles(a, Some(b));
        assert!(run_until(&mut state, 600, |state| state.missiles.is_empty()));

        assert_eq!(hits.borrow().len(), 6);
        assert_eq!(state.ship(b).unwrap().state, ShipState::Paused);
    }

    #[test]
    fn test_projectile_hit_damages_and_credits_owner() {
        let mut state = GameState::new(1);
        let a = spawn(&mut state, Vec3::ZERO);
        // In line with the right-hand gun
        let b = spawn(&mut state, Vec3::new(100.0, -2.0, 0.25));
        let hits = record_hits(&mut state, a);

        state.shoot(a);
        run(&mut state, &TickInput::default(), 20);

        assert_eq!(state.ship(b).unwrap().health.health, 75.0);
        assert_eq!(hits.borrow().len(), 1);
        assert_eq!(hits.borrow()[0].victim, Some(b));
        assert_eq!(hits.borrow()[0].info.attacker, Some(a));
        // The other shot misses and flies on
        assert_eq!(state.projectiles.len(), 1);
    }

    #[test]
    fn test_projectile_stopped_by_static_collider() {
        let mut state = GameState::new(1);
        let a = spawn(&mut state, Vec3::ZERO);
        state.add_static_collider(Vec3::new(60.0, 0.0, 0.0), 20.0);

        state.shoot(a);
        run(&mut state, &TickInput::default(), 10);
        assert!(state.projectiles.is_empty());
    }

    /// Collision world whose every probe reports the same entity
    struct AlwaysHits(EntityId);

    impl Physics for AlwaysHits {
        fn set_collider(&mut self, _entity: EntityId, _collider: Collider) {}

        fn remove_collider(&mut self, _entity: EntityId) {}

        fn raycast(&self, ray: &Ray, _params: RayParams) -> Option<RayHit> {
            Some(RayHit {
                entity: self.0,
                point: ray.origin,
                normal: -ray.direction,
                distance: 0.0,
            })
        }
    }

    #[test]
    fn test_probe_hitting_owner_is_ignored() {
        // First id handed out is 1
        let owner = EntityId(1);
        let mut state = GameState::with_tuning(1, Tuning::default(), Box::new(AlwaysHits(owner)));
        let a = spawn(&mut state, Vec3::ZERO);
        assert_eq!(a, owner);

        state.shoot(a);
        let before: Vec<Vec3> = state.projectiles.iter().map(|p| p.transform.location).collect();
        run(&mut state, &TickInput::default(), 1);

        assert_eq!(state.projectiles.len(), 2);
        assert_eq!(state.ship(a).unwrap().health.health, 100.0);
        for (projectile, before) in state.projectiles.iter().zip(before) {
            assert!(projectile.transform.location.x > before.x);
        }
    }

    #[test]
    fn test_ai_chases_and_fires_at_target() {
        let mut state = GameState::new(1);
        let hunter = spawn(&mut state, Vec3::ZERO);
        let prey = spawn(&mut state, Vec3::new(200.0, 0.0, 0.0));
        let brain = state.spawn_ai_controller(Some(prey));
        state.possess(brain, hunter).unwrap();

        run(&mut state, &TickInput::default(), 1);
        assert_eq!(state.projectiles.len(), 2);
        assert!(state.projectiles.iter().all(|p| p.owner == hunter));

        run(&mut state, &TickInput::default(), 30);
        let ship = state.ship(hunter).unwrap();
        assert!(ship.throttle() > 0.0);
        assert!(ship.transform.location.x > 0.0);
    }

    #[test]
    fn test_ai_keeps_chasing_a_dead_target() {
        let mut state = GameState::new(1);
        let hunter = spawn(&mut state, Vec3::ZERO);
        let prey = spawn(&mut state, Vec3::new(200.0, 0.0, 0.0));
        let brain = state.spawn_ai_controller(Some(prey));
        state.possess(brain, hunter).unwrap();
        state.apply_damage(prey, DamageInfo::new(hunter, 500.0));
        assert_eq!(state.ship(prey).unwrap().state, ShipState::Paused);

        run(&mut state, &TickInput::default(), 30);
        let ship = state.ship(hunter).unwrap();
        assert!(ship.throttle() > 0.0);
        assert!(ship.transform.location.x > 0.0);
    }

    #[test]
    fn test_unpossessed_ship_coasts_without_turning() {
        let mut state = GameState::new(1);
        let rotation = Quat::from_rotation_z(0.3);
        let ship = state.spawn_ship(Vec3::ZERO, rotation, COLOR_WHITE);

        run(&mut state, &TickInput::default(), 10);
        let ship = state.ship(ship).unwrap();
        assert!(ship.transform.rotation.abs_diff_eq(rotation, 1e-6));
        assert_eq!(ship.transform.location, Vec3::ZERO);
    }

    #[test]
    fn test_player_locks_and_launches_on_press_edge() {
        let mut state = GameState::new(1);
        let ship = spawn(&mut state, Vec3::ZERO);
        let target = spawn(&mut state, Vec3::new(200.0, 0.0, 0.0));
        let player = state.spawn_player_controller(0);
        state.possess(player, ship).unwrap();

        run(&mut state, &TickInput::default(), 1);
        let locked = state.controller(player).and_then(|c| c.as_player()).and_then(|p| p.locked_target());
        assert_eq!(locked, Some(target));

        let pressed = TickInput::default().with_actions(
            0,
            ActionState {
                missile: true,
                ..Default::default()
            },
        );
        run(&mut state, &pressed, 1);
        let launches = |state: &GameState| {
            state
                .scheduler
                .pending()
                .iter()
                .filter(|t| matches!(t.action, DeferredAction::SpawnMissile { .. }))
                .count()
        };
        assert_eq!(launches(&state), 6);

        // Held, not re-pressed: no second salvo
        run(&mut state, &pressed, 1);
        assert!(launches(&state) <= 6);
        assert_eq!(state.missiles.len() + launches(&state), 6);
    }

    #[test]
    fn test_player_shoots_while_held_respecting_cooldown() {
        let mut state = GameState::new(1);
        let ship = spawn(&mut state, Vec3::ZERO);
        let player = state.spawn_player_controller(3);
        state.possess(player, ship).unwrap();

        let held = TickInput::default().with_actions(
            3,
            ActionState {
                shoot: true,
                ..Default::default()
            },
        );
        run(&mut state, &held, 1);
        assert_eq!(state.projectiles.len(), 2);
        run(&mut state, &held, 3);
        assert_eq!(state.projectiles.len(), 2);
        // 0.15 s cooldown is 9 ticks
        run(&mut state, &held, 10);
        assert_eq!(state.projectiles.len(), 4);
    }

    #[test]
    fn test_explosions_expire() {
        let mut state = GameState::new(1);
        let a = spawn(&mut state, Vec3::ZERO);
        let b = spawn(&mut state, Vec3::new(100.0, 0.0, 0.0));
        state.apply_damage(a, DamageInfo::new(b, 100.0));
        assert_eq!(state.explosions.len(), 1);

        run(&mut state, &TickInput::default(), 120);
        assert!(state.explosions.is_empty());
    }

    #[test]
    fn test_same_seed_same_outcome() {
        let outcome = |seed: u64| {
            let mut state = GameState::new(seed);
            state.spawn_ai_squad(4);
            run(&mut state, &TickInput::default(), 600);
            state
                .ships
                .iter()
                .map(|s| (s.transform.location, s.health.health, s.color()))
                .collect::<Vec<_>>()
        };
        assert_eq!(outcome(99), outcome(99));
    }
}
