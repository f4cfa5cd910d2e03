//! Hazard field headless driver
//!
//! Seeds a field with debris, announces one hazard of every kind and runs
//! the simulation for a fixed number of ticks, then prints a JSON summary.
//!
//! Usage: `hazard-field [tuning.json] [seed]`

use glam::Vec2;
use rand::Rng;
use serde::Serialize;

use hazard_field::consts::TICKS_PER_SECOND;
use hazard_field::sim::{GameEvent, HazardTag, RunPhase, Simulation};
use hazard_field::{Tuning, ticks_to_ms};

/// How long the driver runs (30 s of simulated time)
const RUN_TICKS: u64 = 30 * TICKS_PER_SECOND;

const ASTEROIDS: usize = 24;
const MISSILES: usize = 8;

/// Outcome printed at the end of a run
#[derive(Debug, Serialize)]
struct RunSummary {
    seed: u64,
    ticks: u64,
    elapsed_ms: u64,
    score: u64,
    cause: Option<String>,
    hazards_alive: usize,
    warnings_pending: usize,
    asteroids: usize,
    missiles: usize,
    fragments: usize,
    shield_hits: u32,
    events: usize,
}

fn load_tuning(path: Option<&str>) -> Tuning {
    let Some(path) = path else {
        return Tuning::default();
    };
    match Tuning::load(path) {
        Ok(tuning) => tuning,
        Err(e) => {
            log::warn!("Using default tuning: {}", e);
            Tuning::default()
        }
    }
}

fn populate(sim: &mut Simulation) {
    let bounds = sim.world.bounds;
    for _ in 0..ASTEROIDS {
        let rng = &mut sim.world.rng;
        let pos = Vec2::new(rng.random_range(0.0..bounds.x), rng.random_range(0.0..bounds.y));
        let vel = Vec2::new(rng.random_range(-1.0..1.0), rng.random_range(-1.0..1.0));
        let radius = rng.random_range(10.0..30.0);
        sim.world.spawn_asteroid(pos, vel, radius);
    }
    for _ in 0..MISSILES {
        let rng = &mut sim.world.rng;
        let pos = Vec2::new(rng.random_range(0.0..bounds.x), rng.random_range(0.0..bounds.y));
        let vel = Vec2::new(rng.random_range(-2.0..2.0), rng.random_range(-2.0..2.0));
        sim.world.spawn_missile(pos, vel);
    }

    // Stagger the warnings so hazards arrive one after another
    for (i, tag) in HazardTag::ALL.iter().enumerate() {
        let rng = &mut sim.world.rng;
        let pos = Vec2::new(
            rng.random_range(0.1..0.9) * bounds.x,
            rng.random_range(0.1..0.9) * bounds.y,
        );
        let dir = rng.random_range(0.0..std::f32::consts::TAU);
        let duration = sim.field.tuning.field.warning_ticks + i as u32 * 60;
        sim.field.warn_for(*tag, pos, Some(dir), duration, &mut sim.world);
    }
}

fn run(seed: u64, tuning: Tuning) -> RunSummary {
    let mut sim = Simulation::new(seed, tuning);
    populate(&mut sim);

    let mut events = 0;
    while sim.world.ticks < RUN_TICKS && sim.world.is_running() {
        sim.tick();
        for event in sim.world.drain_events() {
            events += 1;
            match event {
                GameEvent::GameOver { cause } => log::info!("Run ended: {}", cause),
                GameEvent::ShieldHit { pos } => {
                    log::debug!("Shield hit at ({:.0}, {:.0})", pos.x, pos.y)
                }
                GameEvent::Cue { cue, .. } => log::trace!("Cue {}", cue.as_str()),
                GameEvent::ScreenShake { .. } => {}
            }
        }
    }

    let world = &sim.world;
    RunSummary {
        seed,
        ticks: world.ticks,
        elapsed_ms: ticks_to_ms(world.ticks),
        score: world.score,
        cause: match &world.phase {
            RunPhase::Running => None,
            RunPhase::GameOver { cause } => Some(cause.clone()),
        },
        hazards_alive: sim.field.len(),
        warnings_pending: sim.field.queue.len(),
        asteroids: world.asteroids.len(),
        missiles: world.missiles.len(),
        fragments: world.fragments.len(),
        shield_hits: world.player.shield_hits,
        events,
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Hazard field (native) starting...");

    let args: Vec<String> = std::env::args().collect();
    let tuning = load_tuning(args.get(1).map(String::as_str));
    let seed = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(12345);
    log::info!("Running {} ticks with seed: {}", RUN_TICKS, seed);

    let summary = run(seed, tuning);
    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("{json}"),
        Err(e) => log::error!("Failed to encode summary: {}", e),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Library-only on the web; hosts drive `Simulation` directly
}
