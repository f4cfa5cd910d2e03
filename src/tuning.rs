//! Hazard balance tuning
//!
//! Every hazard factory takes its numbers from here. Values are unitless
//! ticks and pixels. Partial JSON files are accepted; missing fields keep
//! their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{DEFAULT_WARNING_TICKS, FIELD_HEIGHT, FIELD_WIDTH};

/// Errors raised while loading a tuning file
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse tuning file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

fn positive(field: &'static str, value: f32) -> Result<(), TuningError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(TuningError::Invalid {
            field,
            reason: format!("must be > 0 (got {value})"),
        })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), TuningError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(TuningError::Invalid {
            field,
            reason: format!("must be >= 0 (got {value})"),
        })
    }
}

fn probability(field: &'static str, value: f32) -> Result<(), TuningError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(TuningError::Invalid {
            field,
            reason: format!("must be within [0, 1] (got {value})"),
        })
    }
}

fn nonzero(field: &'static str, value: u32) -> Result<(), TuningError> {
    if value > 0 {
        Ok(())
    } else {
        Err(TuningError::Invalid {
            field,
            reason: "must be at least 1".to_string(),
        })
    }
}

/// Expanding push ring
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GravityWaveConfig {
    /// Ring growth per tick
    pub speed: f32,
    pub max_radius: f32,
    pub force: f32,
    /// Half-width of the pushing band around the ring front
    pub band: f32,
    pub lifetime: Option<u32>,
}

impl Default for GravityWaveConfig {
    fn default() -> Self {
        Self {
            speed: 4.0,
            max_radius: 400.0,
            force: 6.0,
            band: 30.0,
            lifetime: None,
        }
    }
}

/// Pulling, teleporting rift
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VoidRiftConfig {
    pub core_radius: f32,
    pub pull_radius: f32,
    pub pull_force: f32,
    /// Per-tick chance a body inside the core is teleported
    pub teleport_chance: f32,
    /// Chance a teleported player dies (shields do not help)
    pub player_death_chance: f32,
    /// Gap between the partner's core and the exit point
    pub exit_margin: f32,
    pub kick_min: f32,
    pub kick_max: f32,
    /// Chance a queued rift links to an unpaired one
    pub pair_chance: f32,
    pub lifetime: Option<u32>,
}

impl Default for VoidRiftConfig {
    fn default() -> Self {
        Self {
            core_radius: 40.0,
            pull_radius: 220.0,
            pull_force: 0.6,
            teleport_chance: 0.1,
            player_death_chance: 0.3,
            exit_margin: 20.0,
            kick_min: 1.0,
            kick_max: 3.0,
            pair_chance: 0.5,
            lifetime: Some(900),
        }
    }
}

/// Slow/fast time bubble
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeDistortionConfig {
    pub radius: f32,
    /// Velocity factor at the center (< 1 slows, > 1 speeds up)
    pub factor: f32,
    pub lifetime: Option<u32>,
}

impl Default for TimeDistortionConfig {
    fn default() -> Self {
        Self {
            radius: 150.0,
            factor: 0.5,
            lifetime: Some(600),
        }
    }
}

/// Periodic jumping lightning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainLightningConfig {
    /// Ticks between chains
    pub interval: u32,
    pub chain_range: f32,
    pub max_jumps: u32,
    /// Chance a player caught in the chain dies
    pub damage_chance: f32,
    pub lifetime: Option<u32>,
}

impl Default for ChainLightningConfig {
    fn default() -> Self {
        Self {
            interval: 45,
            chain_range: 160.0,
            max_jumps: 5,
            damage_chance: 0.25,
            lifetime: Some(300),
        }
    }
}

/// Two charging gates that arc between each other
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LightningStormConfig {
    pub gate_spacing: f32,
    pub max_charge: f32,
    pub charge_rate: f32,
    /// Fractional spread between the two gates' charge rates
    pub rate_jitter: f32,
    pub bolt_segments: u32,
    pub bolt_jitter: f32,
    pub bolt_width: f32,
    pub buff_ticks: u32,
    pub buff_speed: f32,
    pub lifetime: Option<u32>,
}

impl Default for LightningStormConfig {
    fn default() -> Self {
        Self {
            gate_spacing: 300.0,
            max_charge: 100.0,
            charge_rate: 1.0,
            rate_jitter: 0.3,
            bolt_segments: 10,
            bolt_jitter: 18.0,
            bolt_width: 10.0,
            buff_ticks: 300,
            buff_speed: 1.25,
            lifetime: Some(900),
        }
    }
}

/// Pulsing repulsion field
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlasmaFieldConfig {
    pub radius: f32,
    pub force: f32,
    /// Debris inside this radius burns up
    pub burn_radius: f32,
    pub pulse_period: u32,
    pub lifetime: Option<u32>,
}

impl Default for PlasmaFieldConfig {
    fn default() -> Self {
        Self {
            radius: 140.0,
            force: 1.2,
            burn_radius: 35.0,
            pulse_period: 90,
            lifetime: Some(600),
        }
    }
}

/// Tracking beam turret
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LaserTurretConfig {
    pub tracking_range: f32,
    /// Max rotation per tick (radians)
    pub turn_rate: f32,
    /// Ticks between shots at the player (others wait 1.5x)
    pub fire_interval: u32,
    pub beam_length: f32,
    pub beam_width: f32,
    pub lifetime: Option<u32>,
}

impl Default for LaserTurretConfig {
    fn default() -> Self {
        Self {
            tracking_range: 450.0,
            turn_rate: 0.05,
            fire_interval: 90,
            beam_length: 600.0,
            beam_width: 6.0,
            lifetime: Some(1200),
        }
    }
}

/// Proximity mine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CosmicMineConfig {
    pub arm_time: u32,
    pub trigger_radius: f32,
    pub explosion_radius: f32,
    pub explosion_force: f32,
    pub shrapnel_count: u32,
    pub shrapnel_speed: f32,
    pub shrapnel_lifetime: u32,
    pub lifetime: Option<u32>,
}

impl Default for CosmicMineConfig {
    fn default() -> Self {
        Self {
            arm_time: 90,
            trigger_radius: 60.0,
            explosion_radius: 160.0,
            explosion_force: 8.0,
            shrapnel_count: 12,
            shrapnel_speed: 5.0,
            shrapnel_lifetime: 60,
            lifetime: None,
        }
    }
}

/// Area that freezes debris in place
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FreezeZoneConfig {
    pub radius: f32,
    pub freeze_ticks: u32,
    /// Per-tick velocity factor for the player inside the zone
    pub player_drag: f32,
    pub lifetime: Option<u32>,
}

impl Default for FreezeZoneConfig {
    fn default() -> Self {
        Self {
            radius: 130.0,
            freeze_ticks: 90,
            player_drag: 0.9,
            lifetime: Some(480),
        }
    }
}

/// Expanding clearing ring
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SupernovaConfig {
    pub start_radius: f32,
    pub expansion_speed: f32,
    pub max_radius: f32,
    /// Ticks the spent shell lingers after the final explosion
    pub fade_ticks: u32,
    pub lifetime: Option<u32>,
}

impl Default for SupernovaConfig {
    fn default() -> Self {
        Self {
            start_radius: 10.0,
            expansion_speed: 11.0,
            max_radius: 300.0,
            fade_ticks: 30,
            lifetime: None,
        }
    }
}

/// Two-mouth deterministic portal
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuantumPortalConfig {
    pub radius: f32,
    /// Distance between the two mouths
    pub span: f32,
    pub cooldown_ticks: u32,
    pub lifetime: Option<u32>,
}

impl Default for QuantumPortalConfig {
    fn default() -> Self {
        Self {
            radius: 30.0,
            span: 400.0,
            cooldown_ticks: 45,
            lifetime: Some(900),
        }
    }
}

/// Consuming sink that collapses when full
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WormholeConfig {
    pub horizon_radius: f32,
    pub pull_radius: f32,
    pub pull_force: f32,
    pub growth_per_body: f32,
    /// Bodies consumed before collapse
    pub capacity: u32,
    pub lifetime: Option<u32>,
}

impl Default for WormholeConfig {
    fn default() -> Self {
        Self {
            horizon_radius: 30.0,
            pull_radius: 260.0,
            pull_force: 0.8,
            growth_per_body: 1.5,
            capacity: 25,
            lifetime: Some(1200),
        }
    }
}

/// Points awarded when hazards clear debris
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreConfig {
    pub asteroid: u64,
    pub missile: u64,
    pub fragment: u64,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            asteroid: 10,
            missile: 25,
            fragment: 1,
        }
    }
}

/// Complete hazard tuning
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub field: FieldConfig,
    pub score: ScoreConfig,
    pub gravity_wave: GravityWaveConfig,
    pub void_rift: VoidRiftConfig,
    pub time_distortion: TimeDistortionConfig,
    pub chain_lightning: ChainLightningConfig,
    pub lightning_storm: LightningStormConfig,
    pub plasma_field: PlasmaFieldConfig,
    pub laser_turret: LaserTurretConfig,
    pub cosmic_mine: CosmicMineConfig,
    pub freeze_zone: FreezeZoneConfig,
    pub supernova: SupernovaConfig,
    pub quantum_portal: QuantumPortalConfig,
    pub wormhole: WormholeConfig,
}

/// Play-field and warning settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    pub width: f32,
    pub height: f32,
    /// Ticks a warning is shown before its hazard appears
    pub warning_ticks: u32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            width: FIELD_WIDTH,
            height: FIELD_HEIGHT,
            warning_ticks: DEFAULT_WARNING_TICKS,
        }
    }
}

impl Tuning {
    /// Parse and validate tuning from a JSON document
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load tuning from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.as_ref().display());
        Ok(tuning)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, TuningError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the hazards cannot run with
    pub fn validate(&self) -> Result<(), TuningError> {
        positive("field.width", self.field.width)?;
        positive("field.height", self.field.height)?;

        let g = &self.gravity_wave;
        positive("gravity_wave.speed", g.speed)?;
        positive("gravity_wave.max_radius", g.max_radius)?;
        non_negative("gravity_wave.band", g.band)?;

        let r = &self.void_rift;
        positive("void_rift.core_radius", r.core_radius)?;
        non_negative("void_rift.pull_radius", r.pull_radius)?;
        probability("void_rift.teleport_chance", r.teleport_chance)?;
        probability("void_rift.player_death_chance", r.player_death_chance)?;
        probability("void_rift.pair_chance", r.pair_chance)?;
        non_negative("void_rift.kick_min", r.kick_min)?;
        if r.kick_max < r.kick_min {
            return Err(TuningError::Invalid {
                field: "void_rift.kick_max",
                reason: "must be >= kick_min".to_string(),
            });
        }

        let t = &self.time_distortion;
        positive("time_distortion.radius", t.radius)?;
        non_negative("time_distortion.factor", t.factor)?;

        let c = &self.chain_lightning;
        nonzero("chain_lightning.interval", c.interval)?;
        positive("chain_lightning.chain_range", c.chain_range)?;
        probability("chain_lightning.damage_chance", c.damage_chance)?;

        let s = &self.lightning_storm;
        positive("lightning_storm.max_charge", s.max_charge)?;
        positive("lightning_storm.charge_rate", s.charge_rate)?;
        probability("lightning_storm.rate_jitter", s.rate_jitter)?;
        nonzero("lightning_storm.bolt_segments", s.bolt_segments)?;
        positive("lightning_storm.buff_speed", s.buff_speed)?;

        let p = &self.plasma_field;
        positive("plasma_field.radius", p.radius)?;
        nonzero("plasma_field.pulse_period", p.pulse_period)?;

        let l = &self.laser_turret;
        positive("laser_turret.tracking_range", l.tracking_range)?;
        nonzero("laser_turret.fire_interval", l.fire_interval)?;
        positive("laser_turret.beam_length", l.beam_length)?;

        let m = &self.cosmic_mine;
        positive("cosmic_mine.trigger_radius", m.trigger_radius)?;
        positive("cosmic_mine.explosion_radius", m.explosion_radius)?;

        let f = &self.freeze_zone;
        positive("freeze_zone.radius", f.radius)?;
        probability("freeze_zone.player_drag", f.player_drag)?;

        let n = &self.supernova;
        non_negative("supernova.start_radius", n.start_radius)?;
        positive("supernova.expansion_speed", n.expansion_speed)?;
        if n.max_radius < n.start_radius {
            return Err(TuningError::Invalid {
                field: "supernova.max_radius",
                reason: "must be >= start_radius".to_string(),
            });
        }

        let q = &self.quantum_portal;
        positive("quantum_portal.radius", q.radius)?;
        if q.span <= q.radius * 2.0 {
            return Err(TuningError::Invalid {
                field: "quantum_portal.span",
                reason: "mouths must not overlap".to_string(),
            });
        }

        let w = &self.wormhole;
        positive("wormhole.horizon_radius", w.horizon_radius)?;
        nonzero("wormhole.capacity", w.capacity)?;

        Ok(())
    }
}
