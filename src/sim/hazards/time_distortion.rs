//! Time distortion: a bubble that scales the velocity of whatever is inside.
//!
//! The field snapshots a body's velocity on entry and owns that snapshot
//! (`Body::time_anchor`) until the body leaves or the field goes away, at
//! which point the velocity is put back exactly. A body already held by
//! another field is left alone, so overlapping bubbles never compound.

use serde::{Deserialize, Serialize};

use super::{HazardCtx, HazardId, HazardInfo, Life};
use crate::sim::geom::distance;
use crate::sim::query::Population;
use crate::sim::state::{TimeAnchor, World};
use crate::tuning::TimeDistortionConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeDistortion {
    pub radius: f32,
    /// Speed factor at the center (1.0 = no effect)
    pub factor: f32,
}

impl TimeDistortion {
    pub fn new(cfg: &TimeDistortionConfig) -> Self {
        Self {
            radius: cfg.radius,
            factor: cfg.factor,
        }
    }

    /// Velocity scale at `d` from the center, blending to 1 at the edge
    fn scale_at(&self, d: f32) -> f32 {
        let strength = (1.0 - d / self.radius).clamp(0.0, 1.0);
        1.0 + (self.factor - 1.0) * strength
    }

    pub(super) fn update(&mut self, info: &HazardInfo, ctx: &mut HazardCtx) -> Life {
        // Release anything of ours that drifted out
        for body in ctx.world.all_bodies_mut() {
            let Some(anchor) = body.time_anchor else {
                continue;
            };
            if anchor.field == info.id && distance(body.pos, info.pos) >= self.radius {
                body.restore_velocity(anchor.original_vel);
                body.time_anchor = None;
            }
        }

        for hit in ctx.world.within(info.pos, self.radius, &Population::ALL) {
            let scale = self.scale_at(hit.distance);
            let Some(body) = ctx.world.body_mut(hit.target) else {
                continue;
            };
            if body.is_frozen() {
                continue;
            }
            let original = match body.time_anchor {
                None => {
                    body.time_anchor = Some(TimeAnchor {
                        field: info.id,
                        original_vel: body.vel,
                    });
                    body.vel
                }
                Some(anchor) if anchor.field == info.id => anchor.original_vel,
                Some(_) => continue,
            };
            body.vel = original * scale;
        }

        Life::Alive
    }

    /// Restore every body this field is holding
    pub(super) fn release_all(&mut self, own_id: HazardId, world: &mut World) {
        let mut released = 0;
        for body in world.all_bodies_mut() {
            if let Some(anchor) = body.time_anchor {
                if anchor.field == own_id {
                    body.restore_velocity(anchor.original_vel);
                    body.time_anchor = None;
                    released += 1;
                }
            }
        }
        log::debug!("Time distortion {} released {} bodies", own_id, released);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::hazards::{Hazard, step_alone};
    use glam::Vec2;
    use proptest::prelude::*;

    fn world_far_player() -> World {
        let mut world = World::new(2);
        world.player.body.pos = Vec2::new(-5000.0, -5000.0);
        world
    }

    #[test]
    fn test_slows_inside() {
        let mut world = world_far_player();
        let center = Vec2::new(500.0, 300.0);
        world.spawn_asteroid(center, Vec2::new(4.0, 0.0), 10.0);
        let cfg = TimeDistortionConfig {
            factor: 0.5,
            ..Default::default()
        };
        let mut field = Hazard::time_distortion(1, center, &cfg);
        step_alone(&mut field, &mut world);
        assert!((world.asteroids[0].vel.x - 2.0).abs() < 1e-5);
        // Repeated ticks do not compound
        step_alone(&mut field, &mut world);
        assert!((world.asteroids[0].vel.x - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_overlapping_fields_do_not_compound() {
        let mut world = world_far_player();
        let center = Vec2::new(500.0, 300.0);
        world.spawn_asteroid(center, Vec2::new(4.0, 0.0), 10.0);
        let cfg = TimeDistortionConfig {
            factor: 0.5,
            ..Default::default()
        };
        let mut a = Hazard::time_distortion(1, center, &cfg);
        let mut b = Hazard::time_distortion(2, center, &cfg);
        step_alone(&mut a, &mut world);
        step_alone(&mut b, &mut world);
        assert!((world.asteroids[0].vel.x - 2.0).abs() < 1e-5);
        assert_eq!(world.asteroids[0].time_anchor.map(|a| a.field), Some(1));
    }

    #[test]
    fn test_exit_restores_velocity() {
        let mut world = world_far_player();
        let center = Vec2::new(500.0, 300.0);
        world.spawn_asteroid(center + Vec2::new(30.0, 0.0), Vec2::new(3.0, -1.0), 10.0);
        let mut field = Hazard::time_distortion(1, center, &TimeDistortionConfig::default());
        step_alone(&mut field, &mut world);
        assert_ne!(world.asteroids[0].vel, Vec2::new(3.0, -1.0));

        world.asteroids[0].pos = center + Vec2::new(1000.0, 0.0);
        step_alone(&mut field, &mut world);
        assert_eq!(world.asteroids[0].vel, Vec2::new(3.0, -1.0));
        assert!(world.asteroids[0].time_anchor.is_none());
    }

    #[test]
    fn test_frozen_bodies_ignored() {
        let mut world = world_far_player();
        let center = Vec2::new(500.0, 300.0);
        world.spawn_asteroid(center, Vec2::new(4.0, 0.0), 10.0);
        world.asteroids[0].freeze_for(10);
        let mut field = Hazard::time_distortion(1, center, &TimeDistortionConfig::default());
        step_alone(&mut field, &mut world);
        assert!(world.asteroids[0].time_anchor.is_none());
    }

    #[test]
    fn test_release_while_frozen_restores_on_thaw() {
        let mut world = world_far_player();
        let center = Vec2::new(500.0, 300.0);
        world.spawn_asteroid(center, Vec2::new(4.0, 0.0), 10.0);
        let cfg = TimeDistortionConfig {
            factor: 0.5,
            lifetime: Some(2),
            ..Default::default()
        };
        let mut field = Hazard::time_distortion(1, center, &cfg);
        step_alone(&mut field, &mut world);
        world.asteroids[0].freeze_for(5);

        assert_eq!(step_alone(&mut field, &mut world), Life::Finished);
        let rock = &world.asteroids[0];
        assert_eq!(rock.vel, Vec2::ZERO);
        assert!(rock.time_anchor.is_none());
        assert_eq!(rock.freeze.map(|f| f.stored_vel), Some(Vec2::new(4.0, 0.0)));
    }

    proptest! {
        #[test]
        fn prop_removal_restores_original(
            vx in -8.0f32..8.0,
            vy in -8.0f32..8.0,
            ox in -100.0f32..100.0,
            oy in -100.0f32..100.0,
            factor in 0.05f32..3.0,
            ticks in 1u32..40,
        ) {
            let mut world = world_far_player();
            let center = Vec2::new(600.0, 360.0);
            let original = Vec2::new(vx, vy);
            world.spawn_missile(center + Vec2::new(ox, oy), original);
            let cfg = TimeDistortionConfig {
                radius: 150.0,
                factor,
                lifetime: Some(ticks),
            };
            let mut field = Hazard::time_distortion(1, center, &cfg);
            let mut finished = false;
            for _ in 0..ticks {
                finished = step_alone(&mut field, &mut world) == Life::Finished;
            }
            prop_assert!(finished);
            prop_assert_eq!(world.missiles[0].vel, original);
            prop_assert!(world.missiles[0].time_anchor.is_none());
        }
    }
}
