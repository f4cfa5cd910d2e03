//! Deterministic hazard simulation
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (hazard insertion order, then population order)
//! - No rendering or platform dependencies

pub mod geom;
pub mod hazards;
pub mod query;
pub mod state;
pub mod tick;
pub mod warning;

pub use geom::{ForceMode, distance, point_polyline_distance, point_segment_distance, radial_force};
pub use hazards::{Hazard, HazardCtx, HazardId, HazardKind, HazardTag, Life, MineState, Peers};
pub use query::{BodyKey, Hit, Population, Target};
pub use state::{
    Body, Cue, Freeze, GameEvent, ModifierId, Player, RunPhase, Shield, SpeedModifiers, StormBuff,
    TimeAnchor, World,
};
pub use tick::{HazardField, Simulation, advance_hazards, tick};
pub use warning::{PendingSpawn, SpawnQueue, Warning, WarningId};
