//! Influence queries over the body populations
//!
//! Hazards find their targets here each tick. Results carry the population
//! index plus the body id; `World::body_mut` re-checks both (and liveness)
//! before handing out a mutable reference, so a body destroyed earlier in
//! the tick is never touched again.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geom::point_segment_distance;
use super::state::{Body, World};

/// One of the shared body collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Population {
    Player,
    Asteroid,
    Missile,
    Fragment,
}

impl Population {
    pub const ALL: [Population; 4] = [
        Population::Player,
        Population::Asteroid,
        Population::Missile,
        Population::Fragment,
    ];

    /// Everything except the player
    pub const DEBRIS: [Population; 3] =
        [Population::Asteroid, Population::Missile, Population::Fragment];

    /// Bodies that set off proximity triggers
    pub const TRIGGERS: [Population; 3] =
        [Population::Player, Population::Asteroid, Population::Missile];
}

/// Stable identity of a body across ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyKey {
    pub population: Population,
    pub id: u32,
}

/// Handle to a body valid for the current tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    pub population: Population,
    pub index: usize,
    pub id: u32,
}

impl Target {
    pub fn key(&self) -> BodyKey {
        BodyKey {
            population: self.population,
            id: self.id,
        }
    }

    pub fn is_player(&self) -> bool {
        self.population == Population::Player
    }
}

/// A body found by a query
#[derive(Debug, Clone, Copy)]
pub struct Hit {
    pub target: Target,
    pub distance: f32,
    /// Body position minus query origin
    pub offset: Vec2,
}

impl World {
    fn population(&self, population: Population) -> &[Body] {
        match population {
            Population::Player => std::slice::from_ref(&self.player.body),
            Population::Asteroid => &self.asteroids,
            Population::Missile => &self.missiles,
            Population::Fragment => &self.fragments,
        }
    }

    fn population_mut(&mut self, population: Population) -> &mut [Body] {
        match population {
            Population::Player => std::slice::from_mut(&mut self.player.body),
            Population::Asteroid => &mut self.asteroids,
            Population::Missile => &mut self.missiles,
            Population::Fragment => &mut self.fragments,
        }
    }

    /// Live bodies of the given populations, in population order
    pub fn live_targets(&self, populations: &[Population]) -> Vec<(Target, &Body)> {
        let mut out = Vec::new();
        for &population in populations {
            for (index, body) in self.population(population).iter().enumerate() {
                if body.alive {
                    out.push((
                        Target {
                            population,
                            index,
                            id: body.id,
                        },
                        body,
                    ));
                }
            }
        }
        out
    }

    /// Resolve a handle; `None` if the body died or moved
    pub fn body(&self, target: Target) -> Option<&Body> {
        self.population(target.population)
            .get(target.index)
            .filter(|b| b.alive && b.id == target.id)
    }

    pub fn body_mut(&mut self, target: Target) -> Option<&mut Body> {
        self.population_mut(target.population)
            .get_mut(target.index)
            .filter(|b| b.alive && b.id == target.id)
    }

    /// Look a body up by its stable key (linear scan)
    pub fn find(&self, key: BodyKey) -> Option<Target> {
        self.population(key.population)
            .iter()
            .position(|b| b.alive && b.id == key.id)
            .map(|index| Target {
                population: key.population,
                index,
                id: key.id,
            })
    }

    /// Bodies whose centers lie strictly within `radius` of `center`
    pub fn within(&self, center: Vec2, radius: f32, populations: &[Population]) -> Vec<Hit> {
        self.within_ring(center, 0.0, radius, populations)
    }

    /// Bodies with `inner <= distance < outer`
    pub fn within_ring(
        &self,
        center: Vec2,
        inner: f32,
        outer: f32,
        populations: &[Population],
    ) -> Vec<Hit> {
        let mut hits = Vec::new();
        if outer <= inner {
            return hits;
        }
        for (target, body) in self.live_targets(populations) {
            let offset = body.pos - center;
            let distance = offset.length();
            if distance >= inner && distance < outer {
                hits.push(Hit {
                    target,
                    distance,
                    offset,
                });
            }
        }
        hits
    }

    /// Bodies whose disc touches a segment of the given half-width
    pub fn near_segment(
        &self,
        a: Vec2,
        b: Vec2,
        half_width: f32,
        populations: &[Population],
    ) -> Vec<Hit> {
        let mut hits = Vec::new();
        for (target, body) in self.live_targets(populations) {
            let distance = point_segment_distance(body.pos, a, b);
            if distance < half_width + body.radius {
                hits.push(Hit {
                    target,
                    distance,
                    offset: body.pos - a,
                });
            }
        }
        hits
    }

    /// Mark a debris body for removal. The player is never removed here.
    pub fn destroy(&mut self, target: Target) -> bool {
        if target.is_player() {
            return false;
        }
        match self.body_mut(target) {
            Some(body) => {
                body.alive = false;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world_with_rocks() -> World {
        let mut world = World::new(7);
        world.player.body.pos = Vec2::new(0.0, 0.0);
        world.spawn_asteroid(Vec2::new(10.0, 0.0), Vec2::ZERO, 5.0);
        world.spawn_asteroid(Vec2::new(50.0, 0.0), Vec2::ZERO, 5.0);
        world.spawn_missile(Vec2::new(0.0, 30.0), Vec2::ZERO);
        world
    }

    #[test]
    fn test_within_radius() {
        let world = world_with_rocks();
        let hits = world.within(Vec2::ZERO, 40.0, &Population::ALL);
        assert_eq!(hits.len(), 3); // player, near asteroid, missile
        let debris = world.within(Vec2::ZERO, 40.0, &Population::DEBRIS);
        assert_eq!(debris.len(), 2);
    }

    #[test]
    fn test_ring_is_half_open() {
        let world = world_with_rocks();
        let hits = world.within_ring(Vec2::ZERO, 10.0, 50.0, &[Population::Asteroid]);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].distance, 10.0);
    }

    #[test]
    fn test_destroyed_body_is_invisible() {
        let mut world = world_with_rocks();
        let hit = world.within(Vec2::ZERO, 20.0, &[Population::Asteroid])[0];
        assert!(world.destroy(hit.target));
        assert!(!world.destroy(hit.target));
        assert!(world.body(hit.target).is_none());
        assert!(world.within(Vec2::ZERO, 20.0, &[Population::Asteroid]).is_empty());
    }

    #[test]
    fn test_player_cannot_be_destroyed() {
        let mut world = world_with_rocks();
        let hit = world.within(Vec2::ZERO, 1.0, &[Population::Player])[0];
        assert!(!world.destroy(hit.target));
        assert!(world.body(hit.target).is_some());
    }

    #[test]
    fn test_near_segment_uses_body_radius() {
        let world = world_with_rocks();
        let hits = world.near_segment(
            Vec2::new(-100.0, 4.0),
            Vec2::new(100.0, 4.0),
            0.5,
            &[Population::Asteroid],
        );
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn test_find_by_key() {
        let world = world_with_rocks();
        let missile = world.live_targets(&[Population::Missile])[0].0;
        assert_eq!(world.find(missile.key()), Some(missile));
    }
}
