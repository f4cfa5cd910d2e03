//! Fixed timestep hazard scheduler
//!
//! Drains the warn-then-spawn queue, updates every hazard in insertion order
//! and compacts whatever finished or died during the tick.

use glam::Vec2;
use rand::Rng;

use super::hazards::{Hazard, HazardCtx, HazardId, HazardKind, HazardTag, Life, Peers};
use super::state::{Cue, World};
use super::warning::{PendingSpawn, SpawnQueue, Warning, WarningId};
use crate::ticks_to_ms;
use crate::tuning::Tuning;

/// Active hazards, their warnings and the tuning they are built from
#[derive(Debug, Clone)]
pub struct HazardField {
    pub hazards: Vec<Hazard>,
    pub warnings: Vec<Warning>,
    pub queue: SpawnQueue,
    pub tuning: Tuning,
    next_id: u32,
}

impl HazardField {
    pub fn new(tuning: Tuning) -> Self {
        Self {
            hazards: Vec::new(),
            warnings: Vec::new(),
            queue: SpawnQueue::new(),
            tuning,
            next_id: 1,
        }
    }

    fn allocate_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Insert a hazard built by `build` from a fresh id
    pub fn add(&mut self, build: impl FnOnce(HazardId) -> Hazard) -> HazardId {
        let id = self.allocate_id();
        self.hazards.push(build(id));
        id
    }

    pub fn get(&self, id: HazardId) -> Option<&Hazard> {
        self.hazards.iter().find(|h| h.id == id && !h.is_done())
    }

    fn get_mut(&mut self, id: HazardId) -> Option<&mut Hazard> {
        self.hazards.iter_mut().find(|h| h.id == id && !h.is_done())
    }

    pub fn len(&self) -> usize {
        self.hazards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hazards.is_empty()
    }

    /// Number of active hazards of one kind
    pub fn count(&self, tag: HazardTag) -> usize {
        self.hazards.iter().filter(|h| h.tag() == tag).count()
    }

    /// Create a hazard right away from the tuning tables
    pub fn spawn(
        &mut self,
        tag: HazardTag,
        pos: Vec2,
        dir: Option<f32>,
        world: &mut World,
    ) -> HazardId {
        let id = self.allocate_id();
        let hazard = Hazard::from_tag(tag, id, pos, dir, &self.tuning, &mut world.rng);
        self.hazards.push(hazard);

        if tag == HazardTag::VoidRift
            && world.rng.random::<f32>() < self.tuning.void_rift.pair_chance
        {
            let oldest_unpaired = self
                .hazards
                .iter()
                .filter(|h| h.id != id && !h.is_done())
                .find(|h| matches!(&h.kind, HazardKind::VoidRift(r) if r.partner.is_none()))
                .map(|h| h.id);
            if let Some(other) = oldest_unpaired {
                self.link_rifts(id, other);
            }
        }

        log::info!("Spawned {} {} at ({:.0}, {:.0})", tag.as_str(), id, pos.x, pos.y);
        world.play_cue(Cue::HazardSpawn, 0.5);
        id
    }

    /// Link two rifts both ways, dropping any previous partners
    pub fn link_rifts(&mut self, a: HazardId, b: HazardId) -> bool {
        if a == b {
            return false;
        }
        let is_rift = |field: &Self, id| {
            matches!(field.get(id).map(|h| &h.kind), Some(HazardKind::VoidRift(_)))
        };
        if !is_rift(self, a) || !is_rift(self, b) {
            return false;
        }
        for (own, partner) in [(a, b), (b, a)] {
            let previous = match self.get_mut(own).map(|h| &mut h.kind) {
                Some(HazardKind::VoidRift(rift)) => rift.partner.replace(partner),
                _ => None,
            };
            // Whoever was linked to us before is now alone
            if let Some(previous) = previous.filter(|p| *p != partner) {
                if let Some(HazardKind::VoidRift(old)) =
                    self.get_mut(previous).map(|h| &mut h.kind)
                {
                    old.partner = None;
                }
            }
        }
        log::debug!("Linked void rifts {} and {}", a, b);
        true
    }

    /// Show a warning now and queue the hazard behind it
    pub fn warn(
        &mut self,
        tag: HazardTag,
        pos: Vec2,
        dir: Option<f32>,
        world: &mut World,
    ) -> WarningId {
        let duration = self.tuning.field.warning_ticks;
        self.warn_for(tag, pos, dir, duration, world)
    }

    pub fn warn_for(
        &mut self,
        tag: HazardTag,
        pos: Vec2,
        dir: Option<f32>,
        duration: u32,
        world: &mut World,
    ) -> WarningId {
        let id = self.allocate_id();
        self.warnings.push(Warning {
            id,
            tag,
            pos,
            dir,
            age: 0,
            duration,
        });
        self.queue.schedule(PendingSpawn {
            warning: id,
            due_ms: ticks_to_ms(world.ticks + duration as u64),
            tag,
            pos,
            dir,
        });
        world.play_cue(Cue::Warning, 0.4);
        log::debug!("Warning {} for {} ({} ticks)", id, tag.as_str(), duration);
        id
    }

    /// Take back a warning before its hazard appears
    pub fn cancel_warning(&mut self, id: WarningId) -> bool {
        self.warnings.retain(|w| w.id != id);
        self.queue.cancel(id)
    }

    /// Drop every hazard, warning and pending spawn, running each hazard's
    /// removal hooks first so nothing it holds in `world` is left behind
    pub fn clear(&mut self, world: &mut World) {
        let cancelled = self.queue.clear();
        if cancelled > 0 {
            log::debug!("Cancelled {} pending spawns", cancelled);
        }
        self.warnings.clear();

        let HazardField { hazards, tuning, .. } = self;
        for hazard in hazards.iter_mut() {
            let mut ctx = HazardCtx {
                world: &mut *world,
                peers: Peers::empty(),
                score: &tuning.score,
            };
            hazard.finish(&mut ctx);
        }
        hazards.clear();
    }
}

/// Advance every hazard by one tick
pub fn advance_hazards(world: &mut World, field: &mut HazardField) {
    world.ticks += 1;

    let now_ms = ticks_to_ms(world.ticks);
    for due in field.queue.drain_due(now_ms) {
        field.warnings.retain(|w| w.id != due.warning);
        if !world.is_running() {
            log::debug!("Dropped {} spawn: run is over", due.tag.as_str());
            continue;
        }
        field.spawn(due.tag, due.pos, due.dir, world);
    }

    if !world.is_running() {
        return;
    }

    // Freezes applied last tick have now held their bodies through one move
    world.advance_freezes();

    let HazardField { hazards, tuning, .. } = &mut *field;
    for i in 0..hazards.len() {
        let (before, rest) = hazards.split_at_mut(i);
        let Some((hazard, after)) = rest.split_first_mut() else {
            break;
        };
        if hazard.is_done() {
            continue;
        }
        let mut ctx = HazardCtx {
            world: &mut *world,
            peers: Peers::new(before, after),
            score: &tuning.score,
        };
        if hazard.update(&mut ctx) == Life::Finished {
            hazard.finish(&mut ctx);
        }
    }
    hazards.retain(|h| !h.is_done());

    world.compact();
    world.advance_storm_buff();
    for warning in &mut field.warnings {
        warning.age = warning.age.saturating_add(1);
    }
}

/// Advance hazards, then move every body
pub fn tick(world: &mut World, field: &mut HazardField) {
    advance_hazards(world, field);
    if world.is_running() {
        world.integrate();
    }
}

/// World plus hazard field, stepped together
#[derive(Debug, Clone)]
pub struct Simulation {
    pub world: World,
    pub field: HazardField,
}

impl Simulation {
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        let bounds = Vec2::new(tuning.field.width, tuning.field.height);
        Self {
            world: World::with_bounds(seed, bounds),
            field: HazardField::new(tuning),
        }
    }

    pub fn tick(&mut self) {
        tick(&mut self.world, &mut self.field);
    }

    /// Start over with a fresh world, cancelling anything still pending
    pub fn reset(&mut self, seed: u64) {
        self.field.clear(&mut self.world);
        self.world = World::with_bounds(seed, self.world.bounds);
    }
}
