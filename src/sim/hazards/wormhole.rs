//! Wormhole: pulls everything in, swallows debris past the event horizon
//! and collapses once it has eaten enough

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::{HazardCtx, HazardInfo, Life};
use crate::sim::geom::{ForceMode, radial_force};
use crate::sim::query::Population;
use crate::sim::state::Cue;
use crate::tuning::WormholeConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wormhole {
    /// Grows with every body consumed
    pub horizon_radius: f32,
    pull_radius: f32,
    pull_force: f32,
    growth_per_body: f32,
    capacity: u32,
    pub consumed: u32,
}

impl Wormhole {
    pub fn new(cfg: &WormholeConfig) -> Self {
        Self {
            horizon_radius: cfg.horizon_radius,
            pull_radius: cfg.pull_radius,
            pull_force: cfg.pull_force,
            growth_per_body: cfg.growth_per_body,
            capacity: cfg.capacity,
            consumed: 0,
        }
    }

    pub(super) fn update(&mut self, info: &HazardInfo, ctx: &mut HazardCtx) -> Life {
        let reach = self.pull_radius.max(self.horizon_radius);
        for hit in ctx.world.within(info.pos, reach, &Population::ALL) {
            let pull = radial_force(
                info.pos,
                info.pos + hit.offset,
                reach,
                self.pull_force,
                ForceMode::Pull,
            );
            if let Some(body) = ctx.world.body_mut(hit.target) {
                body.apply_impulse(pull);
            }
        }

        for hit in ctx.world.within(info.pos, self.horizon_radius, &Population::DEBRIS) {
            if ctx.world.destroy(hit.target) {
                self.consumed += 1;
                self.horizon_radius += self.growth_per_body;
            }
        }

        let offset = ctx.world.player.body.pos - info.pos;
        if offset.length() < self.horizon_radius {
            if ctx.world.player.is_shielded() {
                ctx.world.shield_hit();
                let dir = offset.try_normalize().unwrap_or(Vec2::X);
                let player = &mut ctx.world.player.body;
                player.pos = info.pos + dir * (self.horizon_radius + player.radius);
            } else {
                ctx.world.end_game("wormhole");
            }
        }

        if self.consumed >= self.capacity {
            log::info!("Wormhole {} collapsed after consuming {} bodies", info.id, self.consumed);
            ctx.world.play_cue(Cue::WormholeCollapse, 1.0);
            ctx.world.screen_shake(0.8);
            return Life::Finished;
        }
        Life::Alive
    }
}
