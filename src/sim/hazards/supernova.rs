//! Supernova: an expanding shockwave that clears everything it sweeps over,
//! ending in a full-radius blast.
//!
//! Each tick clears the annulus between last tick's radius and this one, so
//! a stationary body is hit on exactly one tick however fast the front moves.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::{HazardCtx, HazardInfo, Life};
use crate::sim::geom::distance;
use crate::sim::query::Population;
use crate::sim::state::{Cue, Shield};
use crate::tuning::SupernovaConfig;

/// Outcome of one sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sweep {
    Continue,
    /// Broken up by the thunder shield
    Countered,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Supernova {
    pub radius: f32,
    /// Outer edge already swept
    pub swept: f32,
    expansion_speed: f32,
    max_radius: f32,
    fade_ticks: u32,
    pub exploded: bool,
    pub fade_remaining: u32,
}

impl Supernova {
    pub fn new(cfg: &SupernovaConfig) -> Self {
        Self {
            radius: cfg.start_radius,
            swept: 0.0,
            expansion_speed: cfg.expansion_speed,
            max_radius: cfg.max_radius,
            fade_ticks: cfg.fade_ticks,
            exploded: false,
            fade_remaining: 0,
        }
    }

    pub(super) fn update(&mut self, info: &HazardInfo, ctx: &mut HazardCtx) -> Life {
        if self.exploded {
            self.fade_remaining = self.fade_remaining.saturating_sub(1);
            return if self.fade_remaining == 0 {
                Life::Finished
            } else {
                Life::Alive
            };
        }

        self.radius = (self.radius + self.expansion_speed).min(self.max_radius);
        if self.sweep(info.pos, self.swept, self.radius, ctx) == Sweep::Countered {
            return Life::Finished;
        }
        self.swept = self.radius;

        if self.radius < self.max_radius {
            return Life::Alive;
        }

        self.exploded = true;
        self.fade_remaining = self.fade_ticks;
        log::debug!("Supernova {} exploded", info.id);
        ctx.world.play_cue(Cue::SupernovaExplosion, 1.0);
        ctx.world.screen_shake(1.0);
        // Anything that drifted in behind the front goes too
        if self.sweep(info.pos, 0.0, self.max_radius, ctx) == Sweep::Countered
            || self.fade_ticks == 0
        {
            return Life::Finished;
        }
        Life::Alive
    }

    /// Clear `inner <= d < outer`. The player is handled first; a thunder
    /// shield stops the sweep before any debris is touched.
    fn sweep(&self, pos: Vec2, inner: f32, outer: f32, ctx: &mut HazardCtx) -> Sweep {
        let d = distance(ctx.world.player.body.pos, pos);
        if d >= inner && d < outer {
            match ctx.world.player.shield {
                Shield::Thunder => {
                    log::info!("Thunder shield broke up a supernova");
                    ctx.world.shield_hit();
                    return Sweep::Countered;
                }
                Shield::Basic => ctx.world.shield_hit(),
                Shield::None => {
                    ctx.world.end_game("supernova explosion");
                }
            }
        }

        for hit in ctx.world.within_ring(pos, inner, outer, &Population::DEBRIS) {
            ctx.destroy_scored(hit.target);
        }
        Sweep::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::hazards::{Hazard, HazardKind, step_alone};
    use crate::sim::state::{GameEvent, World};
    use proptest::prelude::*;

    fn far_player(seed: u64) -> World {
        let mut world = World::new(seed);
        world.player.body.pos = Vec2::new(-5000.0, -5000.0);
        world
    }

    #[test]
    fn test_expands_then_fades() {
        let mut world = far_player(1);
        let cfg = SupernovaConfig {
            start_radius: 0.0,
            expansion_speed: 100.0,
            max_radius: 300.0,
            fade_ticks: 2,
            lifetime: None,
        };
        let mut hazard = Hazard::supernova(1, Vec2::new(600.0, 360.0), &cfg);
        assert_eq!(step_alone(&mut hazard, &mut world), Life::Alive);
        assert_eq!(step_alone(&mut hazard, &mut world), Life::Alive);
        // Reaches max radius and explodes
        assert_eq!(step_alone(&mut hazard, &mut world), Life::Alive);
        let HazardKind::Supernova(nova) = &hazard.kind else {
            panic!("wrong kind");
        };
        assert!(nova.exploded);
        assert_eq!(step_alone(&mut hazard, &mut world), Life::Alive);
        assert_eq!(step_alone(&mut hazard, &mut world), Life::Finished);
    }

    #[test]
    fn test_player_death_still_clears_debris() {
        let mut world = World::new(1);
        let center = world.player.body.pos + Vec2::new(5.0, 0.0);
        world.spawn_asteroid(center + Vec2::new(0.0, 3.0), Vec2::ZERO, 5.0);
        world.spawn_missile(center - Vec2::new(4.0, 0.0), Vec2::ZERO);
        let cfg = SupernovaConfig {
            start_radius: 0.0,
            expansion_speed: 6.0,
            ..Default::default()
        };
        let mut hazard = Hazard::supernova(1, center, &cfg);
        step_alone(&mut hazard, &mut world);

        assert!(!world.is_running());
        let overs = world
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::GameOver { .. }))
            .count();
        assert_eq!(overs, 1);
        assert!(!world.asteroids[0].alive);
        assert!(!world.missiles[0].alive);
        assert_eq!(world.score, 10 + 25);
    }

    #[test]
    fn test_thunder_shield_counters() {
        let mut world = World::new(1);
        world.player.shield = Shield::Thunder;
        let center = world.player.body.pos + Vec2::new(5.0, 0.0);
        world.spawn_asteroid(center + Vec2::new(0.0, 3.0), Vec2::ZERO, 5.0);
        let mut hazard = Hazard::supernova(1, center, &SupernovaConfig::default());
        assert_eq!(step_alone(&mut hazard, &mut world), Life::Finished);
        assert!(world.is_running());
        assert!(world.asteroids[0].alive);
        assert_eq!(world.player.shield_hits, 1);
    }

    #[test]
    fn test_basic_shield_absorbs() {
        let mut world = World::new(1);
        world.player.shield = Shield::Basic;
        let center = world.player.body.pos + Vec2::new(5.0, 0.0);
        let mut hazard = Hazard::supernova(1, center, &SupernovaConfig::default());
        assert_eq!(step_alone(&mut hazard, &mut world), Life::Alive);
        assert!(world.is_running());
        assert_eq!(world.player.shield, Shield::Basic);
    }

    proptest! {
        #[test]
        fn prop_stationary_body_cleared_exactly_once(
            d in 0.0f32..299.0,
            angle in 0.0f32..std::f32::consts::TAU,
        ) {
            let mut world = far_player(3);
            let center = Vec2::new(600.0, 360.0);
            world.spawn_asteroid(center + crate::sim::geom::unit(angle) * d, Vec2::ZERO, 5.0);
            let cfg = SupernovaConfig {
                start_radius: 10.0,
                expansion_speed: 11.0,
                max_radius: 300.0,
                fade_ticks: 5,
                lifetime: None,
            };
            let mut hazard = Hazard::supernova(1, center, &cfg);

            let mut cleared_on = Vec::new();
            for tick in 1..=40u32 {
                let before = world.score;
                let life = step_alone(&mut hazard, &mut world);
                if world.score != before {
                    cleared_on.push(tick);
                }
                if life == Life::Finished {
                    break;
                }
            }
            prop_assert_eq!(cleared_on.len(), 1);
            prop_assert_eq!(world.score, 10);
        }
    }
}
