//! Hazard variants and the shared update contract
//!
//! Each hazard kind keeps its own state in its own struct; `Hazard` wraps
//! the common position/age/lifetime and dispatches to the variant. The
//! scheduler calls `Hazard::update` once per tick and removes the hazard in
//! the same tick it reports `Life::Finished`.

pub mod chain_lightning;
pub mod cosmic_mine;
pub mod freeze_zone;
pub mod gravity_wave;
pub mod laser_turret;
pub mod lightning_storm;
pub mod plasma_field;
pub mod quantum_portal;
pub mod supernova;
pub mod time_distortion;
pub mod void_rift;
pub mod wormhole;

use glam::Vec2;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

pub use chain_lightning::ChainLightning;
pub use cosmic_mine::{CosmicMine, MineState};
pub use freeze_zone::FreezeZone;
pub use gravity_wave::GravityWave;
pub use laser_turret::LaserTurret;
pub use lightning_storm::LightningStorm;
pub use plasma_field::PlasmaField;
pub use quantum_portal::QuantumPortal;
pub use supernova::Supernova;
pub use time_distortion::TimeDistortion;
pub use void_rift::VoidRift;
pub use wormhole::Wormhole;

use super::query::{Population, Target};
use super::state::World;
use crate::tuning::{
    ChainLightningConfig, CosmicMineConfig, FreezeZoneConfig, GravityWaveConfig, LaserTurretConfig,
    LightningStormConfig, PlasmaFieldConfig, QuantumPortalConfig, ScoreConfig, SupernovaConfig,
    TimeDistortionConfig, Tuning, VoidRiftConfig, WormholeConfig,
};

/// Unique hazard identifier (never reused within a field)
pub type HazardId = u32;

/// Result of one hazard update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Life {
    Alive,
    Finished,
}

/// Hazard kind tag, used by warnings and the spawn queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HazardTag {
    GravityWave,
    VoidRift,
    TimeDistortion,
    ChainLightning,
    LightningStorm,
    PlasmaField,
    LaserTurret,
    CosmicMine,
    FreezeZone,
    Supernova,
    QuantumPortal,
    Wormhole,
}

impl HazardTag {
    pub const ALL: [HazardTag; 12] = [
        HazardTag::GravityWave,
        HazardTag::VoidRift,
        HazardTag::TimeDistortion,
        HazardTag::ChainLightning,
        HazardTag::LightningStorm,
        HazardTag::PlasmaField,
        HazardTag::LaserTurret,
        HazardTag::CosmicMine,
        HazardTag::FreezeZone,
        HazardTag::Supernova,
        HazardTag::QuantumPortal,
        HazardTag::Wormhole,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HazardTag::GravityWave => "gravity wave",
            HazardTag::VoidRift => "void rift",
            HazardTag::TimeDistortion => "time distortion",
            HazardTag::ChainLightning => "chain lightning",
            HazardTag::LightningStorm => "lightning storm",
            HazardTag::PlasmaField => "plasma field",
            HazardTag::LaserTurret => "laser turret",
            HazardTag::CosmicMine => "cosmic mine",
            HazardTag::FreezeZone => "freeze zone",
            HazardTag::Supernova => "supernova",
            HazardTag::QuantumPortal => "quantum portal",
            HazardTag::Wormhole => "wormhole",
        }
    }
}

/// Per-kind hazard state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum HazardKind {
    GravityWave(GravityWave),
    VoidRift(VoidRift),
    TimeDistortion(TimeDistortion),
    ChainLightning(ChainLightning),
    LightningStorm(LightningStorm),
    PlasmaField(PlasmaField),
    LaserTurret(LaserTurret),
    CosmicMine(CosmicMine),
    FreezeZone(FreezeZone),
    Supernova(Supernova),
    QuantumPortal(QuantumPortal),
    Wormhole(Wormhole),
}

impl HazardKind {
    pub fn tag(&self) -> HazardTag {
        match self {
            HazardKind::GravityWave(_) => HazardTag::GravityWave,
            HazardKind::VoidRift(_) => HazardTag::VoidRift,
            HazardKind::TimeDistortion(_) => HazardTag::TimeDistortion,
            HazardKind::ChainLightning(_) => HazardTag::ChainLightning,
            HazardKind::LightningStorm(_) => HazardTag::LightningStorm,
            HazardKind::PlasmaField(_) => HazardTag::PlasmaField,
            HazardKind::LaserTurret(_) => HazardTag::LaserTurret,
            HazardKind::CosmicMine(_) => HazardTag::CosmicMine,
            HazardKind::FreezeZone(_) => HazardTag::FreezeZone,
            HazardKind::Supernova(_) => HazardTag::Supernova,
            HazardKind::QuantumPortal(_) => HazardTag::QuantumPortal,
            HazardKind::Wormhole(_) => HazardTag::Wormhole,
        }
    }
}

/// Read-only view of the common hazard fields handed to a variant update
#[derive(Debug, Clone, Copy)]
pub struct HazardInfo {
    pub id: HazardId,
    pub pos: Vec2,
    /// Ticks elapsed, including the current one (1 on the first update)
    pub age: u32,
}

/// The other hazards in the field during one hazard's update
pub struct Peers<'a> {
    before: &'a mut [Hazard],
    after: &'a mut [Hazard],
}

impl<'a> Peers<'a> {
    pub fn new(before: &'a mut [Hazard], after: &'a mut [Hazard]) -> Self {
        Self { before, after }
    }

    pub fn empty() -> Self {
        Self {
            before: &mut [],
            after: &mut [],
        }
    }

    /// A live peer by id (hazards finished this tick are skipped)
    pub fn get_mut(&mut self, id: HazardId) -> Option<&mut Hazard> {
        self.before
            .iter_mut()
            .chain(self.after.iter_mut())
            .find(|h| h.id == id && !h.done)
    }
}

/// Everything a hazard may touch during its update
pub struct HazardCtx<'a> {
    pub world: &'a mut World,
    pub peers: Peers<'a>,
    pub score: &'a ScoreConfig,
}

impl HazardCtx<'_> {
    /// Destroy a debris body and award its score. False if it was already gone.
    pub fn destroy_scored(&mut self, target: Target) -> bool {
        let points = match target.population {
            Population::Player => return false,
            Population::Asteroid => self.score.asteroid,
            Population::Missile => self.score.missile,
            Population::Fragment => self.score.fragment,
        };
        if self.world.destroy(target) {
            self.world.add_score(points);
            true
        } else {
            false
        }
    }
}

/// An active hazard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hazard {
    pub id: HazardId,
    pub pos: Vec2,
    pub age: u32,
    /// `None` never expires
    pub lifetime: Option<u32>,
    pub kind: HazardKind,
    #[serde(default)]
    done: bool,
}

impl Hazard {
    pub fn new(id: HazardId, pos: Vec2, lifetime: Option<u32>, kind: HazardKind) -> Self {
        Self {
            id,
            pos,
            age: 0,
            lifetime,
            kind,
            done: false,
        }
    }

    pub fn gravity_wave(id: HazardId, pos: Vec2, cfg: &GravityWaveConfig) -> Self {
        Self::new(id, pos, cfg.lifetime, HazardKind::GravityWave(GravityWave::new(cfg)))
    }

    pub fn void_rift(id: HazardId, pos: Vec2, cfg: &VoidRiftConfig) -> Self {
        Self::new(id, pos, cfg.lifetime, HazardKind::VoidRift(VoidRift::new(cfg)))
    }

    pub fn time_distortion(id: HazardId, pos: Vec2, cfg: &TimeDistortionConfig) -> Self {
        Self::new(id, pos, cfg.lifetime, HazardKind::TimeDistortion(TimeDistortion::new(cfg)))
    }

    pub fn chain_lightning(id: HazardId, pos: Vec2, cfg: &ChainLightningConfig) -> Self {
        Self::new(id, pos, cfg.lifetime, HazardKind::ChainLightning(ChainLightning::new(cfg)))
    }

    pub fn lightning_storm(
        id: HazardId,
        pos: Vec2,
        dir: Option<f32>,
        cfg: &LightningStormConfig,
        rng: &mut Pcg32,
    ) -> Self {
        let storm = LightningStorm::new(pos, dir, cfg, rng);
        Self::new(id, pos, cfg.lifetime, HazardKind::LightningStorm(storm))
    }

    pub fn plasma_field(id: HazardId, pos: Vec2, cfg: &PlasmaFieldConfig) -> Self {
        Self::new(id, pos, cfg.lifetime, HazardKind::PlasmaField(PlasmaField::new(cfg)))
    }

    pub fn laser_turret(
        id: HazardId,
        pos: Vec2,
        dir: Option<f32>,
        cfg: &LaserTurretConfig,
    ) -> Self {
        Self::new(id, pos, cfg.lifetime, HazardKind::LaserTurret(LaserTurret::new(dir, cfg)))
    }

    pub fn cosmic_mine(id: HazardId, pos: Vec2, cfg: &CosmicMineConfig) -> Self {
        Self::new(id, pos, cfg.lifetime, HazardKind::CosmicMine(CosmicMine::new(cfg)))
    }

    pub fn freeze_zone(id: HazardId, pos: Vec2, cfg: &FreezeZoneConfig) -> Self {
        Self::new(id, pos, cfg.lifetime, HazardKind::FreezeZone(FreezeZone::new(cfg)))
    }

    pub fn supernova(id: HazardId, pos: Vec2, cfg: &SupernovaConfig) -> Self {
        Self::new(id, pos, cfg.lifetime, HazardKind::Supernova(Supernova::new(cfg)))
    }

    pub fn quantum_portal(
        id: HazardId,
        pos: Vec2,
        dir: Option<f32>,
        cfg: &QuantumPortalConfig,
    ) -> Self {
        let portal = QuantumPortal::new(pos, dir, cfg);
        Self::new(id, pos, cfg.lifetime, HazardKind::QuantumPortal(portal))
    }

    pub fn wormhole(id: HazardId, pos: Vec2, cfg: &WormholeConfig) -> Self {
        Self::new(id, pos, cfg.lifetime, HazardKind::Wormhole(Wormhole::new(cfg)))
    }

    /// Build a hazard of the given kind from the tuning tables
    pub fn from_tag(
        tag: HazardTag,
        id: HazardId,
        pos: Vec2,
        dir: Option<f32>,
        tuning: &Tuning,
        rng: &mut Pcg32,
    ) -> Self {
        match tag {
            HazardTag::GravityWave => Self::gravity_wave(id, pos, &tuning.gravity_wave),
            HazardTag::VoidRift => Self::void_rift(id, pos, &tuning.void_rift),
            HazardTag::TimeDistortion => Self::time_distortion(id, pos, &tuning.time_distortion),
            HazardTag::ChainLightning => Self::chain_lightning(id, pos, &tuning.chain_lightning),
            HazardTag::LightningStorm => {
                Self::lightning_storm(id, pos, dir, &tuning.lightning_storm, rng)
            }
            HazardTag::PlasmaField => Self::plasma_field(id, pos, &tuning.plasma_field),
            HazardTag::LaserTurret => Self::laser_turret(id, pos, dir, &tuning.laser_turret),
            HazardTag::CosmicMine => Self::cosmic_mine(id, pos, &tuning.cosmic_mine),
            HazardTag::FreezeZone => Self::freeze_zone(id, pos, &tuning.freeze_zone),
            HazardTag::Supernova => Self::supernova(id, pos, &tuning.supernova),
            HazardTag::QuantumPortal => Self::quantum_portal(id, pos, dir, &tuning.quantum_portal),
            HazardTag::Wormhole => Self::wormhole(id, pos, &tuning.wormhole),
        }
    }

    pub fn tag(&self) -> HazardTag {
        self.kind.tag()
    }

    /// True once the hazard has reported `Finished`
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Advance one tick. Returns `Finished` on a terminal event or when the
    /// lifetime has run out; a zero lifetime still gets this one update.
    pub fn update(&mut self, ctx: &mut HazardCtx) -> Life {
        if self.done {
            return Life::Finished;
        }
        self.age = self.age.saturating_add(1);
        let info = HazardInfo {
            id: self.id,
            pos: self.pos,
            age: self.age,
        };

        let life = match &mut self.kind {
            HazardKind::GravityWave(h) => h.update(&info, ctx),
            HazardKind::VoidRift(h) => h.update(&info, ctx),
            HazardKind::TimeDistortion(h) => h.update(&info, ctx),
            HazardKind::ChainLightning(h) => h.update(&info, ctx),
            HazardKind::LightningStorm(h) => h.update(&info, ctx),
            HazardKind::PlasmaField(h) => h.update(&info, ctx),
            HazardKind::LaserTurret(h) => h.update(&info, ctx),
            HazardKind::CosmicMine(h) => h.update(&info, ctx),
            HazardKind::FreezeZone(h) => h.update(&info, ctx),
            HazardKind::Supernova(h) => h.update(&info, ctx),
            HazardKind::QuantumPortal(h) => h.update(&info, ctx),
            HazardKind::Wormhole(h) => h.update(&info, ctx),
        };

        let expired = self.lifetime.is_some_and(|lifetime| self.age >= lifetime);
        if life == Life::Finished || expired {
            Life::Finished
        } else {
            Life::Alive
        }
    }

    /// Mark finished and undo anything the hazard holds on other objects
    pub fn finish(&mut self, ctx: &mut HazardCtx) {
        if self.done {
            return;
        }
        self.done = true;
        match &mut self.kind {
            HazardKind::TimeDistortion(h) => h.release_all(self.id, ctx.world),
            HazardKind::VoidRift(h) => h.unlink(self.id, &mut ctx.peers),
            _ => {}
        }
        log::debug!("Hazard {} ({}) finished at age {}", self.id, self.tag().as_str(), self.age);
    }
}

/// Update a hazard with no peers, finishing it if it reports done
#[cfg(test)]
pub(crate) fn step_alone(hazard: &mut Hazard, world: &mut World) -> Life {
    let score = ScoreConfig::default();
    let mut ctx = HazardCtx {
        world,
        peers: Peers::empty(),
        score: &score,
    };
    let life = hazard.update(&mut ctx);
    if life == Life::Finished {
        hazard.finish(&mut ctx);
    }
    life
}
