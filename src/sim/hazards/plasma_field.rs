//! Pulsing plasma cloud that repels bodies and burns up debris at its core

use std::f32::consts::TAU;

use serde::{Deserialize, Serialize};

use super::{HazardCtx, HazardInfo, Life};
use crate::sim::geom::{ForceMode, radial_force};
use crate::sim::query::Population;
use crate::tuning::PlasmaFieldConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlasmaField {
    pub radius: f32,
    force: f32,
    burn_radius: f32,
    pulse_period: u32,
}

impl PlasmaField {
    pub fn new(cfg: &PlasmaFieldConfig) -> Self {
        Self {
            radius: cfg.radius,
            force: cfg.force,
            burn_radius: cfg.burn_radius,
            pulse_period: cfg.pulse_period.max(1),
        }
    }

    /// Force scale in `[0.5, 1.0]` for the given age
    pub fn pulse(&self, age: u32) -> f32 {
        let phase = TAU * (age % self.pulse_period) as f32 / self.pulse_period as f32;
        0.75 + 0.25 * phase.sin()
    }

    pub(super) fn update(&mut self, info: &HazardInfo, ctx: &mut HazardCtx) -> Life {
        let force = self.force * self.pulse(info.age);
        for hit in ctx.world.within(info.pos, self.radius, &Population::ALL) {
            if !hit.target.is_player() && hit.distance < self.burn_radius {
                ctx.destroy_scored(hit.target);
                continue;
            }
            let push =
                radial_force(info.pos, info.pos + hit.offset, self.radius, force, ForceMode::Push);
            if let Some(body) = ctx.world.body_mut(hit.target) {
                body.apply_impulse(push);
            }
        }
        Life::Alive
    }
}
