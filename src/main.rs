//! Spaceship headless demo
//!
//! Spawns one player and an AI squad, then runs the fixed-step loop for a
//! few simulated seconds with scripted player input. Combat events are
//! logged; run with `RUST_LOG=info` (or `debug`) to see them.
//!
//! Usage: `spaceship [tuning.json]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::{Vec2, Vec3};
    use spaceship::consts::*;
    use spaceship::hud::HitFeed;
    use spaceship::sim::{
        ActionState, GameState, PlayerManager, SpherePhysics, TickInput, tick,
    };
    use spaceship::Tuning;

    env_logger::init();
    log::info!("Spaceship (headless) starting...");

    let tuning = match std::env::args().nth(1) {
        Some(path) => match Tuning::load(&path) {
            Ok(tuning) => tuning,
            Err(err) => {
                log::error!("{}", err);
                std::process::exit(1);
            }
        },
        None => Tuning::default(),
    };

    let seed = 0x5EED;
    let mut state = GameState::with_tuning(seed, tuning, Box::new(SpherePhysics::new()));
    let mut players = PlayerManager::new();

    let player = match players.on_gamepad_connected(&mut state, 0) {
        Ok(player) => player,
        Err(err) => {
            log::error!("{}", err);
            std::process::exit(1);
        }
    };
    state.spawn_ai_squad(4);
    for i in 0..3 {
        state.add_static_collider(Vec3::new(250.0, 150.0 * (i as f32 - 1.0), 40.0), 25.0);
    }

    let feed = Rc::new(RefCell::new(HitFeed::new()));
    let player_ship = state.controller(player).and_then(|c| c.ship());
    if let Some(ship) = player_ship.and_then(|id| state.ship_mut(id)) {
        HitFeed::attach(&feed, ship);
    }

    // Pretend frames arrive at an uneven ~50 Hz
    let frame_times = [0.021_f32, 0.019, 0.020, 0.024, 0.016];
    let mut accumulator = 0.0;
    let mut elapsed = 0.0;
    let mut frame = 0;

    while elapsed < 20.0 {
        let dt = frame_times[frame % frame_times.len()].min(0.1);
        frame += 1;
        elapsed += dt;
        accumulator += dt;

        // Full throttle, gentle right yaw, guns held, missile tapped every 2 s
        let actions = ActionState {
            move_axis: Vec2::new(0.2, 1.0),
            look_axis: Vec2::ZERO,
            shoot: true,
            missile: (elapsed % 2.0) < 0.1,
            rearview: false,
        };
        let input = TickInput::default().with_actions(0, actions);

        let mut substeps = 0;
        while accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            tick(&mut state, &input, SIM_DT);
            feed.borrow_mut().update(SIM_DT);
            accumulator -= SIM_DT;
            substeps += 1;
        }
    }

    for ship in state.ships.iter() {
        log::info!(
            "Ship {}: {:?} health {:.0} at {:.0}",
            ship.id,
            ship.state,
            ship.health.health,
            ship.transform.location
        );
    }
    log::info!(
        "{} ticks, {} projectiles, {} missiles, {} explosions in flight; {} recent kills",
        state.time_ticks,
        state.projectiles.len(),
        state.missiles.len(),
        state.explosions.len(),
        feed.borrow().kills().len()
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Library-only on the web; embedders drive `tick` themselves
}
