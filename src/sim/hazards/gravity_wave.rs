//! Expanding ring that shoves everything near its front outward

use serde::{Deserialize, Serialize};

use super::{HazardCtx, HazardInfo, Life};
use crate::sim::geom::{ForceMode, radial_force};
use crate::sim::query::Population;
use crate::tuning::GravityWaveConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GravityWave {
    /// Current ring radius
    pub radius: f32,
    speed: f32,
    max_radius: f32,
    force: f32,
    band: f32,
}

impl GravityWave {
    pub fn new(cfg: &GravityWaveConfig) -> Self {
        Self {
            radius: 0.0,
            speed: cfg.speed,
            max_radius: cfg.max_radius,
            force: cfg.force,
            band: cfg.band,
        }
    }

    pub(super) fn update(&mut self, info: &HazardInfo, ctx: &mut HazardCtx) -> Life {
        self.radius = (self.radius + self.speed).min(self.max_radius);

        let inner = (self.radius - self.band).max(0.0);
        let outer = self.radius + self.band;
        for hit in ctx.world.within_ring(info.pos, inner, outer, &Population::ALL) {
            let push = radial_force(
                info.pos,
                info.pos + hit.offset,
                self.max_radius,
                self.force,
                ForceMode::Push,
            );
            if let Some(body) = ctx.world.body_mut(hit.target) {
                body.apply_impulse(push);
            }
        }

        if self.radius >= self.max_radius {
            Life::Finished
        } else {
            Life::Alive
        }
    }
}
