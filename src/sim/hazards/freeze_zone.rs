//! Freeze zone: debris inside is held still; the player is only dragged

use serde::{Deserialize, Serialize};

use super::{HazardCtx, HazardInfo, Life};
use crate::sim::geom::distance;
use crate::sim::query::Population;
use crate::tuning::FreezeZoneConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FreezeZone {
    pub radius: f32,
    freeze_ticks: u32,
    player_drag: f32,
}

impl FreezeZone {
    pub fn new(cfg: &FreezeZoneConfig) -> Self {
        Self {
            radius: cfg.radius,
            freeze_ticks: cfg.freeze_ticks,
            player_drag: cfg.player_drag,
        }
    }

    pub(super) fn update(&mut self, info: &HazardInfo, ctx: &mut HazardCtx) -> Life {
        for hit in ctx.world.within(info.pos, self.radius, &Population::DEBRIS) {
            if let Some(body) = ctx.world.body_mut(hit.target) {
                body.freeze_for(self.freeze_ticks);
            }
        }

        let player = &mut ctx.world.player.body;
        if distance(player.pos, info.pos) < self.radius {
            player.vel *= self.player_drag;
        }
        Life::Alive
    }
}
