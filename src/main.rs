//! Asteroids Sim entry point
//!
//! Headless driver: builds a small asteroid field, runs it for a few seconds
//! of simulated time and logs every collision as JSON.
//!
//! Usage: `asteroids-sim [config.json]`

use asteroids_sim::SimConfig;
use asteroids_sim::sim::{CollisionEvent, Entity, EntityId, EntityKind, Vector, World};

/// Simulated frame length (s)
const FRAME: f64 = 1.0 / 60.0;
/// Frames to run
const FRAMES: u32 = 600;
/// Fire a bullet every this many frames
const FIRE_EVERY: u32 = 90;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Asteroids Sim (headless) starting...");

    let config = match std::env::args().nth(1) {
        Some(path) => SimConfig::load(path),
        None => SimConfig::default(),
    };
    log::info!("Seed: {}", config.seed);

    if let Err(e) = run(config) {
        log::error!("Simulation failed: {}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Library only on the web; nothing to drive here
}

fn run(config: SimConfig) -> asteroids_sim::error::Result<()> {
    let mut world = World::with_config(2000.0, 1200.0, config)?;
    let ship = populate(&mut world)?;

    let mut collisions = 0usize;
    let mut report = |event: &CollisionEvent| {
        collisions += 1;
        match serde_json::to_string(event) {
            Ok(json) => log::info!("collision {}", json),
            Err(e) => log::warn!("Could not encode collision: {}", e),
        }
    };

    for frame in 0..FRAMES {
        if world.has_entity(ship) {
            if frame % FIRE_EVERY == 0 {
                world.ship_mut(ship)?.turn(0.4)?;
                if let Some(bullet) = world.fire_bullet(ship)? {
                    log::info!("Fired {:?}", bullet);
                }
            }
            if frame == FRAMES / 4 {
                world.ship_mut(ship)?.thrust_on();
            }
        }
        world.evolve(FRAME, Some(&mut report))?;
    }

    log::info!(
        "Done: {} collisions, {} ships, {} bullets, {} asteroids, {} planetoids left",
        collisions,
        world.entities_of(EntityKind::Ship).count(),
        world.entities_of(EntityKind::Bullet).count(),
        world.entities_of(EntityKind::Asteroid).count(),
        world.entities_of(EntityKind::Planetoid).count(),
    );
    Ok(())
}

/// Demo field: one armed ship, a drifting rival, rocks and two planetoids.
/// Returns the armed ship.
fn populate(world: &mut World) -> asteroids_sim::error::Result<EntityId> {
    let v = Vector::new;
    let config = world.config().clone();

    let ship = world
        .add_entity(Entity::ship(v(300.0, 600.0), v(0.0, 0.0), 20.0, 0.0, config.thruster()?)?)
        .map_err(|e| e.reason)?;
    let bullets = (0..6)
        .map(|_| Entity::bullet(v(0.0, 0.0), v(0.0, 0.0), 3.0, config.bullet_max_bounces))
        .collect::<Result<Vec<_>, _>>()?;
    for bullet in bullets {
        world.load_bullet(ship, bullet)?;
    }

    let others = [
        Entity::ship(v(1700.0, 900.0), v(-40.0, -10.0), 25.0, 3.0, config.thruster()?)?,
        Entity::asteroid(v(900.0, 300.0), v(-30.0, 45.0), 40.0)?,
        Entity::asteroid(v(1200.0, 700.0), v(25.0, -60.0), 25.0)?,
        Entity::asteroid(v(600.0, 1000.0), v(80.0, -20.0), 15.0)?,
        Entity::planetoid(v(1000.0, 600.0), v(-20.0, 0.0), 60.0)?,
        Entity::planetoid(v(1600.0, 250.0), v(0.0, 35.0), 20.0)?,
    ];
    for entity in others {
        match world.add_entity(entity) {
            Ok(id) => log::debug!("Added {:?}", id),
            Err(e) => log::warn!("Skipped {}: {}", e.entity.kind(), e.reason),
        }
    }
    Ok(ship)
}
