//! World state shared by every hazard
//!
//! Owns the body populations, run phase, score, host-facing events and the
//! speed modifier stack. Hazards never own bodies: they look them up fresh
//! each tick through the query helpers and mark them dead instead of
//! removing them, so indices stay stable until the end-of-tick compaction.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::hazards::HazardId;
use crate::consts::{FIELD_HEIGHT, FIELD_WIDTH, PLAYER_RADIUS};

/// Whether the run is still going
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPhase {
    Running,
    GameOver { cause: String },
}

/// Player protection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Shield {
    #[default]
    None,
    /// Ordinary power-up shield: absorbs lethal contact
    Basic,
    /// Lightning storm shield: absorbs, and counters some hazards outright
    Thunder,
}

/// A body held still by a freeze zone
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Freeze {
    pub remaining: u32,
    /// Velocity to restore on thaw
    pub stored_vel: Vec2,
}

/// Velocity snapshot owned by the time distortion field currently scaling a body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeAnchor {
    pub field: HazardId,
    pub original_vel: Vec2,
}

/// Anything hazards can push, slow, freeze, teleport or destroy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Cleared to mark for removal at end of tick
    pub alive: bool,
    /// Remaining ticks for short-lived bodies (shrapnel)
    #[serde(default)]
    pub ttl: Option<u32>,
    #[serde(default)]
    pub freeze: Option<Freeze>,
    #[serde(default)]
    pub time_anchor: Option<TimeAnchor>,
}

impl Body {
    pub fn new(id: u32, pos: Vec2, vel: Vec2, radius: f32) -> Self {
        Self {
            id,
            pos,
            vel,
            radius,
            alive: true,
            ttl: None,
            freeze: None,
            time_anchor: None,
        }
    }

    pub fn is_frozen(&self) -> bool {
        self.freeze.is_some()
    }

    /// Add a velocity change; frozen bodies bank it for when they thaw
    pub fn apply_impulse(&mut self, dv: Vec2) {
        match self.freeze.as_mut() {
            Some(freeze) => freeze.stored_vel += dv,
            None => self.vel += dv,
        }
        // Keep the unscaled velocity in step so a release does not drop the push
        if let Some(anchor) = self.time_anchor.as_mut() {
            anchor.original_vel += dv;
        }
    }

    /// Set the velocity the body moves with once any freeze is over
    pub fn restore_velocity(&mut self, vel: Vec2) {
        match self.freeze.as_mut() {
            Some(freeze) => freeze.stored_vel = vel,
            None => self.vel = vel,
        }
    }

    /// Freeze in place, or refresh an existing freeze
    pub fn freeze_for(&mut self, ticks: u32) {
        match self.freeze.as_mut() {
            Some(freeze) => freeze.remaining = freeze.remaining.max(ticks),
            None => {
                self.freeze = Some(Freeze {
                    remaining: ticks,
                    stored_vel: self.vel,
                });
                self.vel = Vec2::ZERO;
            }
        }
    }

    /// Count down a freeze, restoring velocity when it runs out
    pub fn advance_freeze(&mut self) {
        if let Some(freeze) = self.freeze.as_mut() {
            freeze.remaining = freeze.remaining.saturating_sub(1);
            if freeze.remaining == 0 {
                self.vel = freeze.stored_vel;
                self.freeze = None;
            }
        }
    }
}

/// The player's craft
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub body: Body,
    pub shield: Shield,
    /// Hits absorbed by shields this run
    pub shield_hits: u32,
}

impl Player {
    pub fn new(id: u32, pos: Vec2) -> Self {
        Self {
            body: Body::new(id, pos, Vec2::ZERO, PLAYER_RADIUS),
            shield: Shield::None,
            shield_hits: 0,
        }
    }

    pub fn is_shielded(&self) -> bool {
        self.shield != Shield::None
    }
}

/// Identifies one entry in the speed modifier stack
pub type ModifierId = u32;

/// Multiplicative speed modifiers combined on read
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeedModifiers {
    pub base: f32,
    entries: Vec<(ModifierId, f32)>,
    next_id: ModifierId,
}

impl Default for SpeedModifiers {
    fn default() -> Self {
        Self {
            base: 1.0,
            entries: Vec::new(),
            next_id: 1,
        }
    }
}

impl SpeedModifiers {
    /// Apply a factor until removed
    pub fn push(&mut self, factor: f32) -> ModifierId {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push((id, factor));
        id
    }

    /// Revert one modifier; false if it was already gone
    pub fn remove(&mut self, id: ModifierId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|&(entry, _)| entry != id);
        self.entries.len() != before
    }

    /// Combined multiplier
    pub fn multiplier(&self) -> f32 {
        self.entries.iter().fold(self.base, |acc, &(_, f)| acc * f)
    }

    pub fn active(&self) -> usize {
        self.entries.len()
    }
}

/// Shield/speed buff granted by a fresh lightning storm bolt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StormBuff {
    pub remaining: u32,
    pub modifier: ModifierId,
    /// Shield to put back when the buff ends
    pub previous_shield: Shield,
}

/// Sound cues the host may play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cue {
    /// A warning marker appeared
    Warning,
    /// A hazard materialized
    HazardSpawn,
    ShieldHit,
    ThunderShield,
    RiftTeleport,
    RiftCollapse,
    LightningStrike,
    StormDischarge,
    LaserFire,
    MineArmed,
    MineExplosion,
    SupernovaExplosion,
    PortalWarp,
    WormholeCollapse,
}

impl Cue {
    pub fn as_str(&self) -> &'static str {
        match self {
            Cue::Warning => "warning",
            Cue::HazardSpawn => "hazard_spawn",
            Cue::ShieldHit => "shield_hit",
            Cue::ThunderShield => "thunder_shield",
            Cue::RiftTeleport => "rift_teleport",
            Cue::RiftCollapse => "rift_collapse",
            Cue::LightningStrike => "lightning_strike",
            Cue::StormDischarge => "storm_discharge",
            Cue::LaserFire => "laser_fire",
            Cue::MineArmed => "mine_armed",
            Cue::MineExplosion => "mine_explosion",
            Cue::SupernovaExplosion => "supernova_explosion",
            Cue::PortalWarp => "portal_warp",
            Cue::WormholeCollapse => "wormhole_collapse",
        }
    }
}

/// Notifications for the host (audio, camera, UI)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Cue { cue: Cue, volume: f32 },
    ScreenShake { intensity: f32 },
    ShieldHit { pos: Vec2 },
    GameOver { cause: String },
}

/// Shared simulation world
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    /// Play-field size; positions live in `[0, bounds]`
    pub bounds: Vec2,
    pub player: Player,
    pub asteroids: Vec<Body>,
    pub missiles: Vec<Body>,
    pub fragments: Vec<Body>,
    pub score: u64,
    pub phase: RunPhase,
    /// Simulation tick counter
    pub ticks: u64,
    pub speed: SpeedModifiers,
    pub storm_buff: Option<StormBuff>,
    /// Accumulated camera shake (decays in `integrate`)
    pub shake: f32,
    pub events: Vec<GameEvent>,
    pub rng: Pcg32,
    next_id: u32,
}

impl World {
    /// Create a world with the player at the center of a default-size field
    pub fn new(seed: u64) -> Self {
        Self::with_bounds(seed, Vec2::new(FIELD_WIDTH, FIELD_HEIGHT))
    }

    pub fn with_bounds(seed: u64, bounds: Vec2) -> Self {
        Self {
            bounds,
            player: Player::new(0, bounds * 0.5),
            asteroids: Vec::new(),
            missiles: Vec::new(),
            fragments: Vec::new(),
            score: 0,
            phase: RunPhase::Running,
            ticks: 0,
            speed: SpeedModifiers::default(),
            storm_buff: None,
            shake: 0.0,
            events: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        }
    }

    /// Allocate a new body ID
    pub fn next_body_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn spawn_asteroid(&mut self, pos: Vec2, vel: Vec2, radius: f32) -> u32 {
        let id = self.next_body_id();
        self.asteroids.push(Body::new(id, pos, vel, radius));
        id
    }

    pub fn spawn_missile(&mut self, pos: Vec2, vel: Vec2) -> u32 {
        let id = self.next_body_id();
        self.missiles.push(Body::new(id, pos, vel, 6.0));
        id
    }

    pub fn spawn_fragment(&mut self, pos: Vec2, vel: Vec2, ttl: u32) -> u32 {
        let id = self.next_body_id();
        let mut body = Body::new(id, pos, vel, 3.0);
        body.ttl = Some(ttl);
        self.fragments.push(body);
        id
    }

    pub fn is_running(&self) -> bool {
        self.phase == RunPhase::Running
    }

    /// End the run. Only the first call has any effect.
    pub fn end_game(&mut self, cause: &str) -> bool {
        if !self.is_running() {
            return false;
        }
        log::info!("Game over at tick {}: {}", self.ticks, cause);
        self.phase = RunPhase::GameOver {
            cause: cause.to_string(),
        };
        self.events.push(GameEvent::GameOver {
            cause: cause.to_string(),
        });
        true
    }

    pub fn add_score(&mut self, amount: u64) {
        self.score += amount;
    }

    pub fn play_cue(&mut self, cue: Cue, volume: f32) {
        self.events.push(GameEvent::Cue { cue, volume });
    }

    pub fn screen_shake(&mut self, intensity: f32) {
        self.shake = (self.shake + intensity).min(1.0);
        self.events.push(GameEvent::ScreenShake { intensity });
    }

    /// Record a hit the player's shield absorbed
    pub fn shield_hit(&mut self) {
        self.player.shield_hits += 1;
        let pos = self.player.body.pos;
        self.events.push(GameEvent::ShieldHit { pos });
        self.play_cue(Cue::ShieldHit, 0.6);
    }

    /// Lethal contact: absorbed by any shield, otherwise ends the run.
    /// Returns true if the hit was absorbed.
    pub fn hit_player(&mut self, cause: &str) -> bool {
        if self.player.is_shielded() {
            self.shield_hit();
            true
        } else {
            self.end_game(cause);
            false
        }
    }

    /// Hand queued events to the host
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Grant the storm buff unless one is already running
    pub fn grant_storm_buff(&mut self, ticks: u32, speed: f32) -> bool {
        if self.storm_buff.is_some() || ticks == 0 {
            return false;
        }
        let modifier = self.speed.push(speed);
        let previous_shield = self.player.shield;
        self.player.shield = Shield::Thunder;
        self.storm_buff = Some(StormBuff {
            remaining: ticks,
            modifier,
            previous_shield,
        });
        log::debug!("Storm buff granted for {} ticks", ticks);
        self.play_cue(Cue::ThunderShield, 0.8);
        true
    }

    /// Count down the storm buff and revert it on expiry
    pub fn advance_storm_buff(&mut self) {
        let Some(buff) = self.storm_buff.as_mut() else {
            return;
        };
        buff.remaining = buff.remaining.saturating_sub(1);
        if buff.remaining > 0 {
            return;
        }
        if let Some(buff) = self.storm_buff.take() {
            self.speed.remove(buff.modifier);
            if self.player.shield == Shield::Thunder {
                self.player.shield = buff.previous_shield;
            }
            log::debug!("Storm buff expired");
        }
    }

    /// Drop bodies marked dead this tick
    pub fn compact(&mut self) {
        self.asteroids.retain(|b| b.alive);
        self.missiles.retain(|b| b.alive);
        self.fragments.retain(|b| b.alive);
    }

    /// Every body, player first
    pub fn all_bodies_mut(&mut self) -> impl Iterator<Item = &mut Body> {
        std::iter::once(&mut self.player.body)
            .chain(self.asteroids.iter_mut())
            .chain(self.missiles.iter_mut())
            .chain(self.fragments.iter_mut())
    }

    /// Advance freeze timers on every body
    pub fn advance_freezes(&mut self) {
        for body in self.all_bodies_mut() {
            body.advance_freeze();
        }
    }

    /// Move bodies one tick, age shrapnel and decay shake
    pub fn integrate(&mut self) {
        let speed = self.speed.multiplier();
        self.player.body.pos += self.player.body.vel * speed;
        for body in self
            .asteroids
            .iter_mut()
            .chain(self.missiles.iter_mut())
            .chain(self.fragments.iter_mut())
        {
            body.pos += body.vel * speed;
            if let Some(ttl) = body.ttl.as_mut() {
                *ttl = ttl.saturating_sub(1);
                if *ttl == 0 {
                    body.alive = false;
                }
            }
        }
        self.compact();

        self.shake *= 0.9;
        if self.shake < 0.01 {
            self.shake = 0.0;
        }
    }
}
