//! Laser turret: turns toward the most threatening target in range and
//! fires a beam along its current facing

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::{HazardCtx, HazardInfo, Life};
use crate::normalize_angle;
use crate::sim::geom::{angle_to, unit};
use crate::sim::query::{BodyKey, Hit, Population};
use crate::sim::state::Cue;
use crate::tuning::LaserTurretConfig;

/// Ticks a fired beam stays visible
const BEAM_TICKS: u32 = 10;

/// Non-player targets wait this much longer between shots
const DEBRIS_INTERVAL_SCALE: f32 = 1.5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Beam {
    pub from: Vec2,
    pub to: Vec2,
    pub age: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaserTurret {
    /// Barrel angle in radians
    pub facing: f32,
    tracking_range: f32,
    turn_rate: f32,
    fire_interval: u32,
    beam_length: f32,
    beam_width: f32,
    /// Ticks since the last shot
    pub cooldown: u32,
    pub target: Option<BodyKey>,
    pub beam: Option<Beam>,
}

/// Base threat per population
fn priority(population: Population) -> f32 {
    match population {
        Population::Player => 3.0,
        Population::Missile => 2.0,
        Population::Asteroid => 1.0,
        Population::Fragment => 0.0,
    }
}

/// Threat score: priority scaled up for closer targets
pub fn threat(hit: &Hit) -> f32 {
    priority(hit.target.population) / (hit.distance.max(1.0) / 100.0)
}

impl LaserTurret {
    pub fn new(dir: Option<f32>, cfg: &LaserTurretConfig) -> Self {
        Self {
            facing: dir.unwrap_or(0.0),
            tracking_range: cfg.tracking_range,
            turn_rate: cfg.turn_rate,
            fire_interval: cfg.fire_interval,
            beam_length: cfg.beam_length,
            beam_width: cfg.beam_width,
            cooldown: 0,
            target: None,
            beam: None,
        }
    }

    pub(super) fn update(&mut self, info: &HazardInfo, ctx: &mut HazardCtx) -> Life {
        if let Some(beam) = self.beam.as_mut() {
            beam.age += 1;
            if beam.age >= BEAM_TICKS {
                self.beam = None;
            }
        }
        self.cooldown = self.cooldown.saturating_add(1);

        let best = ctx
            .world
            .within(info.pos, self.tracking_range, &Population::TRIGGERS)
            .into_iter()
            .max_by(|a, b| threat(a).total_cmp(&threat(b)));
        let Some(best) = best else {
            self.target = None;
            return Life::Alive;
        };
        self.target = Some(best.target.key());

        let wanted = angle_to(info.pos, info.pos + best.offset);
        let delta = normalize_angle(wanted - self.facing);
        self.facing = normalize_angle(self.facing + delta.clamp(-self.turn_rate, self.turn_rate));

        let interval = if best.target.is_player() {
            self.fire_interval as f32
        } else {
            self.fire_interval as f32 * DEBRIS_INTERVAL_SCALE
        };
        if self.cooldown as f32 >= interval {
            self.fire(info.pos, ctx);
        }
        Life::Alive
    }

    fn fire(&mut self, from: Vec2, ctx: &mut HazardCtx) {
        self.cooldown = 0;
        let to = from + unit(self.facing) * self.beam_length;
        ctx.world.play_cue(Cue::LaserFire, 0.6);

        for hit in ctx.world.near_segment(from, to, self.beam_width * 0.5, &Population::TRIGGERS) {
            if hit.target.is_player() {
                ctx.world.hit_player("laser turret");
            } else {
                ctx.world.destroy(hit.target);
            }
        }
        self.beam = Some(Beam { from, to, age: 0 });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::hazards::{Hazard, HazardKind, step_alone};
    use crate::sim::query::Target;
    use crate::sim::state::{Shield, World};

    fn hit(population: Population, distance: f32) -> Hit {
        Hit {
            target: Target {
                population,
                index: 0,
                id: 1,
            },
            distance,
            offset: Vec2::new(distance, 0.0),
        }
    }

    #[test]
    fn test_threat_ordering() {
        // A close asteroid can outrank a distant player
        assert!(threat(&hit(Population::Asteroid, 50.0)) > threat(&hit(Population::Player, 200.0)));
        assert!(threat(&hit(Population::Player, 100.0)) > threat(&hit(Population::Missile, 100.0)));
        assert!(
            threat(&hit(Population::Missile, 100.0)) > threat(&hit(Population::Asteroid, 100.0))
        );
        assert!((threat(&hit(Population::Player, 100.0)) - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_turns_at_limited_rate() {
        let mut world = World::new(6);
        let pos = world.player.body.pos + Vec2::new(0.0, -200.0);
        let cfg = LaserTurretConfig {
            turn_rate: 0.1,
            fire_interval: 1000,
            ..Default::default()
        };
        let mut hazard = Hazard::laser_turret(1, pos, Some(0.0), &cfg);
        step_alone(&mut hazard, &mut world);
        let HazardKind::LaserTurret(turret) = &hazard.kind else {
            panic!("wrong kind");
        };
        assert!((turret.facing - 0.1).abs() < 1e-5);
        assert_eq!(
            turret.target.map(|k| k.population),
            Some(Population::Player)
        );
    }

    #[test]
    fn test_kills_unshielded_player() {
        let mut world = World::new(6);
        let pos = world.player.body.pos - Vec2::new(150.0, 0.0);
        let cfg = LaserTurretConfig {
            fire_interval: 5,
            ..Default::default()
        };
        let mut hazard = Hazard::laser_turret(1, pos, Some(0.0), &cfg);
        for _ in 0..4 {
            step_alone(&mut hazard, &mut world);
        }
        assert!(world.is_running());
        step_alone(&mut hazard, &mut world);
        assert!(!world.is_running());
    }

    #[test]
    fn test_shield_absorbs_beam() {
        let mut world = World::new(6);
        world.player.shield = Shield::Basic;
        let pos = world.player.body.pos - Vec2::new(150.0, 0.0);
        let cfg = LaserTurretConfig {
            fire_interval: 2,
            ..Default::default()
        };
        let mut hazard = Hazard::laser_turret(1, pos, Some(0.0), &cfg);
        step_alone(&mut hazard, &mut world);
        step_alone(&mut hazard, &mut world);
        assert!(world.is_running());
        assert_eq!(world.player.shield_hits, 1);
        let HazardKind::LaserTurret(turret) = &hazard.kind else {
            panic!("wrong kind");
        };
        assert!(turret.beam.is_some());
    }

    #[test]
    fn test_debris_targets_wait_longer() {
        let mut world = World::new(6);
        world.player.body.pos = Vec2::new(-5000.0, 0.0);
        let pos = Vec2::new(300.0, 300.0);
        world.spawn_asteroid(pos + Vec2::new(100.0, 0.0), Vec2::ZERO, 10.0);
        let cfg = LaserTurretConfig {
            fire_interval: 4,
            ..Default::default()
        };
        let mut hazard = Hazard::laser_turret(1, pos, Some(0.0), &cfg);
        for _ in 0..5 {
            step_alone(&mut hazard, &mut world);
        }
        assert!(world.asteroids[0].alive);
        step_alone(&mut hazard, &mut world);
        assert!(!world.asteroids[0].alive);
        // Beam kills score nothing
        assert_eq!(world.score, 0);
    }
}
