//! Quantum portal: two linked mouths; a body entering one leaves the other
//! with its velocity intact

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::{HazardCtx, HazardInfo, Life};
use crate::sim::geom::{clamp_to_field, unit};
use crate::sim::query::{BodyKey, Population};
use crate::sim::state::Cue;
use crate::tuning::QuantumPortalConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuantumPortal {
    /// Second mouth; the first sits at the hazard position
    pub exit: Vec2,
    pub radius: f32,
    cooldown_ticks: u32,
    /// Bodies that warped recently, with ticks left before they may warp again
    pub cooldowns: Vec<(BodyKey, u32)>,
}

impl QuantumPortal {
    pub fn new(pos: Vec2, dir: Option<f32>, cfg: &QuantumPortalConfig) -> Self {
        Self {
            exit: pos + unit(dir.unwrap_or(0.0)) * cfg.span,
            radius: cfg.radius,
            cooldown_ticks: cfg.cooldown_ticks,
            cooldowns: Vec::new(),
        }
    }

    fn cooling(&self, key: BodyKey) -> bool {
        self.cooldowns.iter().any(|(k, _)| *k == key)
    }

    pub(super) fn update(&mut self, info: &HazardInfo, ctx: &mut HazardCtx) -> Life {
        for (_, left) in &mut self.cooldowns {
            *left = left.saturating_sub(1);
        }
        self.cooldowns.retain(|(_, left)| *left > 0);

        for (mouth, other) in [(info.pos, self.exit), (self.exit, info.pos)] {
            for hit in ctx.world.within(mouth, self.radius, &Population::ALL) {
                let key = hit.target.key();
                if self.cooling(key) {
                    continue;
                }
                let bounds = ctx.world.bounds;
                let Some(body) = ctx.world.body_mut(hit.target) else {
                    continue;
                };
                // Come out moving the same way, clear of the far mouth
                let heading = body
                    .vel
                    .try_normalize()
                    .or_else(|| (other - mouth).try_normalize())
                    .unwrap_or(Vec2::X);
                let exit = other + heading * (self.radius + body.radius + 1.0);
                body.pos = clamp_to_field(exit, bounds);

                if self.cooldown_ticks > 0 {
                    self.cooldowns.push((key, self.cooldown_ticks));
                }
                if hit.target.is_player() {
                    ctx.world.play_cue(Cue::PortalWarp, 0.7);
                }
            }
        }
        Life::Alive
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::hazards::{Hazard, step_alone};
    use crate::sim::state::World;

    #[test]
    fn test_warp_preserves_velocity() {
        let mut world = World::new(13);
        world.player.body.pos = Vec2::new(-5000.0, 0.0);
        let pos = Vec2::new(200.0, 300.0);
        world.spawn_asteroid(pos + Vec2::new(5.0, 0.0), Vec2::new(2.0, 1.0), 6.0);
        let cfg = QuantumPortalConfig {
            span: 500.0,
            ..Default::default()
        };
        let mut hazard = Hazard::quantum_portal(1, pos, Some(0.0), &cfg);
        step_alone(&mut hazard, &mut world);

        let rock = &world.asteroids[0];
        assert_eq!(rock.vel, Vec2::new(2.0, 1.0));
        let exit = pos + Vec2::new(500.0, 0.0);
        assert!(rock.pos.distance(exit) > cfg.radius);
        assert!(rock.pos.distance(exit) < cfg.radius + rock.radius + 2.0);
    }

    #[test]
    fn test_cooldown_blocks_bounce_back() {
        let mut world = World::new(13);
        world.player.body.pos = Vec2::new(-5000.0, 0.0);
        let pos = Vec2::new(200.0, 300.0);
        world.spawn_asteroid(pos, Vec2::ZERO, 6.0);
        let cfg = QuantumPortalConfig {
            cooldown_ticks: 3,
            ..Default::default()
        };
        let mut hazard = Hazard::quantum_portal(1, pos, Some(0.0), &cfg);
        step_alone(&mut hazard, &mut world);
        let landed = world.asteroids[0].pos;

        // Drop it straight back into the far mouth
        let exit = pos + Vec2::new(cfg.span, 0.0);
        world.asteroids[0].pos = exit;
        step_alone(&mut hazard, &mut world);
        assert_eq!(world.asteroids[0].pos, exit);
        step_alone(&mut hazard, &mut world);
        assert_eq!(world.asteroids[0].pos, exit);
        // Cooldown over
        step_alone(&mut hazard, &mut world);
        assert_ne!(world.asteroids[0].pos, exit);
        assert_ne!(landed, exit);
    }

    #[test]
    fn test_player_warps() {
        let mut world = World::new(13);
        let pos = world.player.body.pos;
        let cfg = QuantumPortalConfig::default();
        let mut hazard = Hazard::quantum_portal(1, pos, Some(std::f32::consts::PI), &cfg);
        step_alone(&mut hazard, &mut world);
        assert!(world.player.body.pos.distance(pos) > 300.0);
        assert!(world.is_running());
    }
}
