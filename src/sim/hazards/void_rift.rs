//! Void rift: pulls bodies in and throws whatever reaches the core out
//! through its partner rift (or anywhere, when unpaired)

use std::collections::HashSet;
use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{HazardCtx, HazardId, HazardInfo, HazardKind, Life, Peers};
use crate::consts::RIFT_MEMORY_TICKS;
use crate::sim::geom::{ForceMode, clamp_to_field, distance, radial_force, unit};
use crate::sim::query::{BodyKey, Population};
use crate::sim::state::{Cue, Shield};
use crate::tuning::VoidRiftConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoidRift {
    pub core_radius: f32,
    pull_radius: f32,
    pull_force: f32,
    teleport_chance: f32,
    player_death_chance: f32,
    exit_margin: f32,
    kick_min: f32,
    kick_max: f32,
    /// Linked rift; links are always mutual
    pub partner: Option<HazardId>,
    /// Bodies that came through recently and may not bounce straight back
    pub recent: HashSet<BodyKey>,
}

/// A live partner rift and its position
fn partner_mut<'p>(peers: &'p mut Peers, id: HazardId) -> Option<(Vec2, &'p mut VoidRift)> {
    let hazard = peers.get_mut(id)?;
    let pos = hazard.pos;
    match &mut hazard.kind {
        HazardKind::VoidRift(rift) => Some((pos, rift)),
        _ => None,
    }
}

impl VoidRift {
    pub fn new(cfg: &VoidRiftConfig) -> Self {
        Self {
            core_radius: cfg.core_radius,
            pull_radius: cfg.pull_radius,
            pull_force: cfg.pull_force,
            teleport_chance: cfg.teleport_chance,
            player_death_chance: cfg.player_death_chance,
            exit_margin: cfg.exit_margin,
            kick_min: cfg.kick_min,
            kick_max: cfg.kick_max,
            partner: None,
            recent: HashSet::new(),
        }
    }

    pub(super) fn update(&mut self, info: &HazardInfo, ctx: &mut HazardCtx) -> Life {
        if info.age % RIFT_MEMORY_TICKS == 0 {
            self.recent.clear();
        }

        // A thunder-shielded player tears the rift apart
        let player = &ctx.world.player;
        if player.shield == Shield::Thunder
            && distance(player.body.pos, info.pos) < self.core_radius + player.body.radius
        {
            log::info!("Thunder shield collapsed void rift {}", info.id);
            ctx.world.play_cue(Cue::RiftCollapse, 0.9);
            ctx.world.screen_shake(0.4);
            return Life::Finished;
        }

        for hit in ctx.world.within(info.pos, self.pull_radius, &Population::ALL) {
            let pull = radial_force(
                info.pos,
                info.pos + hit.offset,
                self.pull_radius,
                self.pull_force,
                ForceMode::Pull,
            );
            if let Some(body) = ctx.world.body_mut(hit.target) {
                body.apply_impulse(pull);
            }
        }

        let exit = match self.partner {
            Some(id) => partner_mut(&mut ctx.peers, id).map(|(pos, rift)| (pos, rift.core_radius)),
            None => None,
        };

        for hit in ctx.world.within(info.pos, self.core_radius, &Population::ALL) {
            let key = hit.target.key();
            if self.recent.contains(&key) {
                continue;
            }
            if ctx.world.rng.random::<f32>() >= self.teleport_chance {
                continue;
            }

            let angle = ctx.world.rng.random_range(0.0..TAU);
            let dest = match exit {
                Some((partner_pos, partner_core)) => {
                    partner_pos + unit(angle) * (partner_core + self.exit_margin)
                }
                None => {
                    let bounds = ctx.world.bounds;
                    Vec2::new(
                        ctx.world.rng.random_range(0.0..=bounds.x),
                        ctx.world.rng.random_range(0.0..=bounds.y),
                    )
                }
            };
            let dest = clamp_to_field(dest, ctx.world.bounds);
            let kick = if self.kick_max > self.kick_min {
                ctx.world.rng.random_range(self.kick_min..self.kick_max)
            } else {
                self.kick_min
            };

            if let Some(body) = ctx.world.body_mut(hit.target) {
                body.pos = dest;
                body.apply_impulse(unit(angle) * kick);
            } else {
                continue;
            }

            self.recent.insert(key);
            if let Some(id) = self.partner {
                if let Some((_, partner)) = partner_mut(&mut ctx.peers, id) {
                    partner.recent.insert(key);
                }
            }

            if hit.target.is_player() {
                ctx.world.play_cue(Cue::RiftTeleport, 0.8);
                // The trip is dangerous whatever shield is up
                if ctx.world.rng.random::<f32>() < self.player_death_chance {
                    ctx.world.end_game("void rift");
                }
            }
        }

        Life::Alive
    }

    /// Break the link from the partner's side when this rift goes away
    pub(super) fn unlink(&mut self, own_id: HazardId, peers: &mut Peers) {
        let Some(partner_id) = self.partner.take() else {
            return;
        };
        if let Some((_, partner)) = partner_mut(peers, partner_id) {
            if partner.partner == Some(own_id) {
                partner.partner = None;
            }
        }
    }
}
