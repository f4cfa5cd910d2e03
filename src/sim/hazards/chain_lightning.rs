//! Chain lightning: periodically arcs from its anchor through the nearest
//! bodies, one jump at a time

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{HazardCtx, HazardInfo, Life};
use crate::consts::FRESH_BOLT_TICKS;
use crate::sim::query::{BodyKey, Population};
use crate::sim::state::Cue;
use crate::tuning::ChainLightningConfig;

/// A drawn arc, kept briefly for rendering
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainBolt {
    pub points: Vec<Vec2>,
    pub age: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainLightning {
    interval: u32,
    chain_range: f32,
    max_jumps: u32,
    damage_chance: f32,
    pub bolts: Vec<ChainBolt>,
}

impl ChainLightning {
    pub fn new(cfg: &ChainLightningConfig) -> Self {
        Self {
            interval: cfg.interval.max(1),
            chain_range: cfg.chain_range,
            max_jumps: cfg.max_jumps,
            damage_chance: cfg.damage_chance,
            bolts: Vec::new(),
        }
    }

    pub(super) fn update(&mut self, info: &HazardInfo, ctx: &mut HazardCtx) -> Life {
        for bolt in &mut self.bolts {
            bolt.age += 1;
        }
        self.bolts.retain(|b| b.age < FRESH_BOLT_TICKS);

        if info.age % self.interval == 0 {
            self.strike(info.pos, ctx);
        }
        Life::Alive
    }

    fn strike(&mut self, origin: Vec2, ctx: &mut HazardCtx) {
        let mut from = origin;
        let mut points = vec![origin];
        let mut struck: Vec<BodyKey> = Vec::new();

        for _ in 0..self.max_jumps {
            let next = ctx
                .world
                .within(from, self.chain_range, &Population::ALL)
                .into_iter()
                .filter(|hit| !struck.contains(&hit.target.key()))
                .min_by(|a, b| a.distance.total_cmp(&b.distance));
            let Some(hit) = next else {
                break;
            };

            from += hit.offset;
            points.push(from);
            struck.push(hit.target.key());

            if hit.target.is_player() {
                // Shields do not stop the arc
                if ctx.world.rng.random::<f32>() < self.damage_chance {
                    ctx.world.end_game("chain lightning");
                }
            } else {
                ctx.destroy_scored(hit.target);
            }
        }

        if points.len() > 1 {
            log::trace!("Chain lightning struck {} bodies", struck.len());
            ctx.world.play_cue(Cue::LightningStrike, 0.7);
            self.bolts.push(ChainBolt { points, age: 0 });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::hazards::{Hazard, HazardKind, step_alone};
    use crate::sim::state::World;

    fn world_far_player() -> World {
        let mut world = World::new(5);
        world.player.body.pos = Vec2::new(-5000.0, -5000.0);
        world
    }

    #[test]
    fn test_chain_follows_nearest() {
        let mut world = world_far_player();
        let origin = Vec2::new(200.0, 200.0);
        world.spawn_asteroid(origin + Vec2::new(50.0, 0.0), Vec2::ZERO, 8.0);
        world.spawn_asteroid(origin + Vec2::new(150.0, 0.0), Vec2::ZERO, 8.0);
        world.spawn_missile(origin + Vec2::new(250.0, 0.0), Vec2::ZERO);
        // Out of reach of the last link
        world.spawn_asteroid(origin + Vec2::new(1000.0, 0.0), Vec2::ZERO, 8.0);

        let cfg = ChainLightningConfig {
            interval: 1,
            chain_range: 120.0,
            ..Default::default()
        };
        let mut hazard = Hazard::chain_lightning(1, origin, &cfg);
        step_alone(&mut hazard, &mut world);

        let alive = world.asteroids.iter().filter(|b| b.alive).count();
        assert_eq!(alive, 1);
        assert!(!world.missiles[0].alive);
        assert_eq!(world.score, 10 + 10 + 25);

        let HazardKind::ChainLightning(state) = &hazard.kind else {
            panic!("wrong kind");
        };
        assert_eq!(state.bolts.len(), 1);
        assert_eq!(state.bolts[0].points.len(), 4);
    }

    #[test]
    fn test_max_jumps() {
        let mut world = world_far_player();
        let origin = Vec2::new(100.0, 100.0);
        for i in 1..=10 {
            world.spawn_asteroid(origin + Vec2::new(i as f32 * 20.0, 0.0), Vec2::ZERO, 5.0);
        }
        let cfg = ChainLightningConfig {
            interval: 1,
            max_jumps: 3,
            ..Default::default()
        };
        let mut hazard = Hazard::chain_lightning(1, origin, &cfg);
        step_alone(&mut hazard, &mut world);
        assert_eq!(world.asteroids.iter().filter(|b| !b.alive).count(), 3);
    }

    #[test]
    fn test_strikes_on_interval() {
        let mut world = world_far_player();
        let origin = Vec2::new(100.0, 100.0);
        world.spawn_asteroid(origin + Vec2::new(20.0, 0.0), Vec2::ZERO, 5.0);
        let cfg = ChainLightningConfig {
            interval: 3,
            ..Default::default()
        };
        let mut hazard = Hazard::chain_lightning(1, origin, &cfg);
        step_alone(&mut hazard, &mut world);
        step_alone(&mut hazard, &mut world);
        assert!(world.asteroids[0].alive);
        step_alone(&mut hazard, &mut world);
        assert!(!world.asteroids[0].alive);
    }

    #[test]
    fn test_player_damage_roll() {
        let mut world = World::new(5);
        let origin = world.player.body.pos + Vec2::new(30.0, 0.0);
        world.player.shield = crate::sim::state::Shield::Basic;
        let cfg = ChainLightningConfig {
            interval: 1,
            damage_chance: 1.0,
            ..Default::default()
        };
        let mut hazard = Hazard::chain_lightning(1, origin, &cfg);
        step_alone(&mut hazard, &mut world);
        assert!(!world.is_running());
    }
}
