//! Cosmic mine: dormant, then armed, then one explosion with shrapnel

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{HazardCtx, HazardInfo, Life};
use crate::sim::geom::{ForceMode, radial_force, unit};
use crate::sim::query::Population;
use crate::sim::state::Cue;
use crate::tuning::CosmicMineConfig;

/// Mine lifecycle; only ever moves forward
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MineState {
    Dormant,
    Armed,
    Triggered,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CosmicMine {
    pub state: MineState,
    arm_time: u32,
    trigger_radius: f32,
    explosion_radius: f32,
    explosion_force: f32,
    shrapnel_count: u32,
    shrapnel_speed: f32,
    shrapnel_lifetime: u32,
}

impl CosmicMine {
    pub fn new(cfg: &CosmicMineConfig) -> Self {
        Self {
            state: MineState::Dormant,
            arm_time: cfg.arm_time,
            trigger_radius: cfg.trigger_radius,
            explosion_radius: cfg.explosion_radius,
            explosion_force: cfg.explosion_force,
            shrapnel_count: cfg.shrapnel_count,
            shrapnel_speed: cfg.shrapnel_speed,
            shrapnel_lifetime: cfg.shrapnel_lifetime,
        }
    }

    /// Arming progress in `[0, 1]` for the blink indicator
    pub fn arm_progress(&self, age: u32) -> f32 {
        if self.state != MineState::Dormant || self.arm_time == 0 {
            return 1.0;
        }
        (age as f32 / self.arm_time as f32).min(1.0)
    }

    pub(super) fn update(&mut self, info: &HazardInfo, ctx: &mut HazardCtx) -> Life {
        if self.state == MineState::Triggered {
            return Life::Finished;
        }
        if self.state == MineState::Dormant && info.age >= self.arm_time {
            self.state = MineState::Armed;
            log::debug!("Mine {} armed", info.id);
            ctx.world.play_cue(Cue::MineArmed, 0.4);
        }
        if self.state != MineState::Armed {
            return Life::Alive;
        }

        let triggered = !ctx
            .world
            .within(info.pos, self.trigger_radius, &Population::TRIGGERS)
            .is_empty();
        if !triggered {
            return Life::Alive;
        }

        self.state = MineState::Triggered;
        self.explode(info.pos, ctx);
        Life::Finished
    }

    fn explode(&mut self, pos: Vec2, ctx: &mut HazardCtx) {
        ctx.world.play_cue(Cue::MineExplosion, 1.0);
        ctx.world.screen_shake(0.6);

        let mut player_caught = false;
        for hit in ctx.world.within(pos, self.explosion_radius, &Population::ALL) {
            let push = radial_force(
                pos,
                pos + hit.offset,
                self.explosion_radius,
                self.explosion_force,
                ForceMode::Push,
            );
            if let Some(body) = ctx.world.body_mut(hit.target) {
                body.apply_impulse(push);
            }
            player_caught |= hit.target.is_player();
        }
        if player_caught {
            ctx.world.hit_player("cosmic mine");
        }

        // Shrapnel goes out after the blast so it keeps its own speed
        let phase = ctx.world.rng.random_range(0.0..TAU);
        for i in 0..self.shrapnel_count {
            let angle = phase + TAU * i as f32 / self.shrapnel_count as f32;
            let dir = unit(angle);
            ctx.world
                .spawn_fragment(pos + dir * 4.0, dir * self.shrapnel_speed, self.shrapnel_lifetime);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::hazards::{Hazard, HazardKind, step_alone};
    use crate::sim::state::{Shield, World};

    fn mine_state(hazard: &Hazard) -> MineState {
        match &hazard.kind {
            HazardKind::CosmicMine(mine) => mine.state,
            _ => panic!("wrong kind"),
        }
    }

    #[test]
    fn test_state_only_moves_forward() {
        let mut world = World::new(10);
        world.player.body.pos = Vec2::new(-5000.0, 0.0);
        let pos = Vec2::new(400.0, 400.0);
        let cfg = CosmicMineConfig {
            arm_time: 5,
            ..Default::default()
        };
        let mut hazard = Hazard::cosmic_mine(1, pos, &cfg);

        let mut seen = vec![mine_state(&hazard)];
        for tick in 1..=12 {
            if tick == 8 {
                world.spawn_missile(pos + Vec2::new(10.0, 0.0), Vec2::ZERO);
            }
            let life = step_alone(&mut hazard, &mut world);
            seen.push(mine_state(&hazard));
            if life == Life::Finished {
                break;
            }
        }
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(seen.last(), Some(&MineState::Triggered));
        assert!(hazard.is_done());
        // Armed exactly at arm_time
        assert_eq!(seen[4], MineState::Dormant);
        assert_eq!(seen[5], MineState::Armed);
    }

    #[test]
    fn test_arm_progress() {
        let cfg = CosmicMineConfig {
            arm_time: 40,
            ..Default::default()
        };
        let mut mine = CosmicMine::new(&cfg);
        assert_eq!(mine.arm_progress(0), 0.0);
        assert!((mine.arm_progress(10) - 0.25).abs() < 1e-6);
        assert_eq!(mine.arm_progress(80), 1.0);
        mine.state = MineState::Armed;
        assert_eq!(mine.arm_progress(0), 1.0);

        let instant = CosmicMine::new(&CosmicMineConfig {
            arm_time: 0,
            ..Default::default()
        });
        assert_eq!(instant.arm_progress(0), 1.0);
    }

    #[test]
    fn test_dormant_mine_ignores_bodies() {
        let mut world = World::new(10);
        let pos = world.player.body.pos;
        let mut hazard = Hazard::cosmic_mine(1, pos, &CosmicMineConfig::default());
        for _ in 0..10 {
            assert_eq!(step_alone(&mut hazard, &mut world), Life::Alive);
        }
        assert!(world.is_running());
    }

    #[test]
    fn test_explosion_spawns_even_shrapnel() {
        let mut world = World::new(10);
        world.player.body.pos = Vec2::new(-5000.0, 0.0);
        let pos = Vec2::new(400.0, 400.0);
        world.spawn_asteroid(pos + Vec2::new(20.0, 0.0), Vec2::ZERO, 10.0);
        let cfg = CosmicMineConfig {
            arm_time: 0,
            shrapnel_count: 8,
            ..Default::default()
        };
        let mut hazard = Hazard::cosmic_mine(1, pos, &cfg);
        assert_eq!(step_alone(&mut hazard, &mut world), Life::Finished);

        assert_eq!(world.fragments.len(), 8);
        assert!(world.asteroids[0].vel.x > 0.0);
        let mut angles: Vec<f32> = world.fragments.iter().map(|f| f.vel.y.atan2(f.vel.x)).collect();
        angles.sort_by(f32::total_cmp);
        for w in angles.windows(2) {
            assert!((w[1] - w[0] - TAU / 8.0).abs() < 1e-3);
        }
        for frag in &world.fragments {
            assert!((frag.vel.length() - cfg.shrapnel_speed).abs() < 1e-4);
            assert_eq!(frag.ttl, Some(cfg.shrapnel_lifetime));
        }
    }

    #[test]
    fn test_player_in_blast() {
        let mut world = World::new(10);
        let pos = world.player.body.pos + Vec2::new(30.0, 0.0);
        world.player.shield = Shield::Basic;
        let cfg = CosmicMineConfig {
            arm_time: 0,
            ..Default::default()
        };
        let mut hazard = Hazard::cosmic_mine(1, pos, &cfg);
        step_alone(&mut hazard, &mut world);
        assert!(world.is_running());
        assert_eq!(world.player.shield_hits, 1);
    }
}
