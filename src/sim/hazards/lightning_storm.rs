//! Lightning storm: two gates charge up and discharge jagged bolts between
//! them. A fresh bolt touching the player grants the thunder shield buff.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::{HazardCtx, HazardInfo, Life};
use crate::consts::FRESH_BOLT_TICKS;
use crate::sim::geom::{point_polyline_distance, unit};
use crate::sim::query::Population;
use crate::sim::state::Cue;
use crate::tuning::LightningStormConfig;

/// How long a bolt stays around for drawing
const BOLT_FADE_TICKS: u32 = 45;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gate {
    pub pos: Vec2,
    pub charge: f32,
    /// Charge gained per tick
    pub rate: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StormBolt {
    pub points: Vec<Vec2>,
    pub age: u32,
}

impl StormBolt {
    pub fn is_fresh(&self) -> bool {
        self.age < FRESH_BOLT_TICKS
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LightningStorm {
    pub gates: [Gate; 2],
    max_charge: f32,
    bolt_segments: u32,
    bolt_jitter: f32,
    bolt_width: f32,
    buff_ticks: u32,
    buff_speed: f32,
    pub bolts: Vec<StormBolt>,
}

fn jittered_rate(base: f32, jitter: f32, rng: &mut Pcg32) -> f32 {
    if jitter > 0.0 {
        base * (1.0 + rng.random_range(-jitter..jitter))
    } else {
        base
    }
}

impl LightningStorm {
    /// Gates sit either side of `pos` along `dir` (horizontal by default)
    pub fn new(pos: Vec2, dir: Option<f32>, cfg: &LightningStormConfig, rng: &mut Pcg32) -> Self {
        let half = unit(dir.unwrap_or(0.0)) * (cfg.gate_spacing * 0.5);
        let gate = |pos: Vec2, rng: &mut Pcg32| Gate {
            pos,
            charge: 0.0,
            rate: jittered_rate(cfg.charge_rate, cfg.rate_jitter, rng),
        };
        Self {
            gates: [gate(pos - half, rng), gate(pos + half, rng)],
            max_charge: cfg.max_charge,
            bolt_segments: cfg.bolt_segments.max(1),
            bolt_jitter: cfg.bolt_jitter,
            bolt_width: cfg.bolt_width,
            buff_ticks: cfg.buff_ticks,
            buff_speed: cfg.buff_speed,
            bolts: Vec::new(),
        }
    }

    /// Jagged polyline between the two gates
    fn bolt_path(&self, rng: &mut Pcg32) -> Vec<Vec2> {
        let a = self.gates[0].pos;
        let b = self.gates[1].pos;
        let normal = (b - a).perp().try_normalize().unwrap_or(Vec2::Y);
        let n = self.bolt_segments;
        (0..=n)
            .map(|k| {
                let p = a.lerp(b, k as f32 / n as f32);
                if k == 0 || k == n || self.bolt_jitter <= 0.0 {
                    p
                } else {
                    p + normal * rng.random_range(-self.bolt_jitter..self.bolt_jitter)
                }
            })
            .collect()
    }

    fn discharge(&mut self, ctx: &mut HazardCtx) {
        let points = self.bolt_path(&mut ctx.world.rng);
        let reach = self.bolt_width * 0.5;

        let struck: Vec<_> = ctx
            .world
            .live_targets(&[Population::Asteroid, Population::Missile])
            .into_iter()
            .filter(|(_, body)| point_polyline_distance(body.pos, &points) < reach + body.radius)
            .map(|(target, _)| target)
            .collect();
        for target in struck {
            ctx.destroy_scored(target);
        }

        ctx.world.play_cue(Cue::StormDischarge, 0.8);
        ctx.world.screen_shake(0.2);
        self.bolts.push(StormBolt { points, age: 0 });
    }

    pub(super) fn update(&mut self, _info: &HazardInfo, ctx: &mut HazardCtx) -> Life {
        for bolt in &mut self.bolts {
            bolt.age += 1;
        }
        self.bolts.retain(|b| b.age < BOLT_FADE_TICKS);

        for i in 0..self.gates.len() {
            self.gates[i].charge += self.gates[i].rate;
            if self.gates[i].charge >= self.max_charge {
                self.gates[i].charge = 0.0;
                self.discharge(ctx);
            }
        }

        if ctx.world.storm_buff.is_none() {
            let player = &ctx.world.player.body;
            let reach = self.bolt_width * 0.5 + player.radius;
            let touched = self
                .bolts
                .iter()
                .filter(|b| b.is_fresh())
                .any(|b| point_polyline_distance(player.pos, &b.points) < reach);
            if touched && ctx.world.grant_storm_buff(self.buff_ticks, self.buff_speed) {
                log::info!("Player charged by lightning storm");
            }
        }

        Life::Alive
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::hazards::{Hazard, HazardKind, step_alone};
    use crate::sim::state::{Shield, World};
    use rand::SeedableRng;

    fn quick_storm() -> LightningStormConfig {
        LightningStormConfig {
            max_charge: 3.0,
            charge_rate: 1.0,
            rate_jitter: 0.0,
            bolt_jitter: 0.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_gates_straddle_center() {
        let mut rng = Pcg32::seed_from_u64(1);
        let cfg = LightningStormConfig::default();
        let storm = LightningStorm::new(
            Vec2::new(500.0, 300.0),
            Some(std::f32::consts::FRAC_PI_2),
            &cfg,
            &mut rng,
        );
        let mid = (storm.gates[0].pos + storm.gates[1].pos) * 0.5;
        assert!((mid - Vec2::new(500.0, 300.0)).length() < 1e-3);
        assert!((storm.gates[0].pos.distance(storm.gates[1].pos) - cfg.gate_spacing).abs() < 1e-3);
        for gate in &storm.gates {
            let lo = cfg.charge_rate * (1.0 - cfg.rate_jitter);
            let hi = cfg.charge_rate * (1.0 + cfg.rate_jitter);
            assert!(gate.rate >= lo && gate.rate <= hi);
        }
    }

    #[test]
    fn test_discharge_destroys_debris_on_path() {
        let mut world = World::new(3);
        world.player.body.pos = Vec2::new(-5000.0, 0.0);
        let center = Vec2::new(500.0, 300.0);
        world.spawn_asteroid(center, Vec2::ZERO, 8.0);
        world.spawn_missile(center + Vec2::new(50.0, 0.0), Vec2::ZERO);
        world.spawn_asteroid(center + Vec2::new(0.0, 100.0), Vec2::ZERO, 8.0);

        let mut rng = Pcg32::seed_from_u64(2);
        let mut hazard = Hazard::lightning_storm(1, center, None, &quick_storm(), &mut rng);
        step_alone(&mut hazard, &mut world);
        step_alone(&mut hazard, &mut world);
        assert!(world.asteroids.iter().all(|b| b.alive));
        step_alone(&mut hazard, &mut world);
        assert!(!world.asteroids[0].alive);
        assert!(!world.missiles[0].alive);
        assert!(world.asteroids[1].alive);
        assert_eq!(world.score, 10 + 25);
    }

    #[test]
    fn test_fresh_bolt_grants_buff_once() {
        let mut world = World::new(3);
        let center = world.player.body.pos;
        world.player.shield = Shield::Basic;
        let mut rng = Pcg32::seed_from_u64(2);
        let mut hazard = Hazard::lightning_storm(1, center, None, &quick_storm(), &mut rng);
        for _ in 0..3 {
            step_alone(&mut hazard, &mut world);
        }
        assert!(world.storm_buff.is_some());
        assert_eq!(world.player.shield, Shield::Thunder);
        let modifier = world.storm_buff.as_ref().map(|b| b.modifier);

        // Later discharges do not stack a second buff
        for _ in 0..6 {
            step_alone(&mut hazard, &mut world);
        }
        assert_eq!(world.speed.active(), 1);
        assert_eq!(world.storm_buff.as_ref().map(|b| b.modifier), modifier);
    }

    #[test]
    fn test_old_bolt_does_not_grant_buff() {
        let mut world = World::new(3);
        let center = world.player.body.pos;
        let mut rng = Pcg32::seed_from_u64(2);
        let mut hazard = Hazard::lightning_storm(1, center, None, &quick_storm(), &mut rng);
        if let HazardKind::LightningStorm(storm) = &mut hazard.kind {
            storm.gates[0].rate = 0.0;
            storm.gates[1].rate = 0.0;
            storm.bolts.push(StormBolt {
                points: vec![center - Vec2::X * 50.0, center + Vec2::X * 50.0],
                age: FRESH_BOLT_TICKS,
            });
        }
        step_alone(&mut hazard, &mut world);
        assert!(world.storm_buff.is_none());
    }
}
