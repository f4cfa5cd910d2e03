//! Hazard Field - environmental hazard simulation for an arcade survival game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (world state, hazards, scheduler)
//! - `tuning`: Data-driven hazard balance

pub mod sim;
pub mod tuning;

pub use sim::{HazardField, Simulation, World, advance_hazards, tick};
pub use tuning::{Tuning, TuningError};

use glam::Vec2;

/// Simulation configuration constants
pub mod consts {
    /// Nominal tick rate (host animation frame rate)
    pub const TICKS_PER_SECOND: u64 = 60;

    /// Default play-field dimensions (pixels)
    pub const FIELD_WIDTH: f32 = 1280.0;
    pub const FIELD_HEIGHT: f32 = 720.0;

    /// Player defaults
    pub const PLAYER_RADIUS: f32 = 12.0;

    /// Distances below this are treated as coincident (no direction)
    pub const MIN_FORCE_DISTANCE: f32 = 1e-3;

    /// Bolts and beams younger than this are "fresh" (still dangerous/bright)
    pub const FRESH_BOLT_TICKS: u32 = 15;

    /// Void rifts forget recently teleported bodies at this period
    pub const RIFT_MEMORY_TICKS: u32 = 60;

    /// Default warn-then-spawn delay (2 seconds)
    pub const DEFAULT_WARNING_TICKS: u32 = 120;
}

/// Convert a tick count to simulation wall-clock milliseconds
#[inline]
pub fn ticks_to_ms(ticks: u64) -> u64 {
    ticks * 1000 / consts::TICKS_PER_SECOND
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Convert cartesian (x, y) to polar (r, theta)
#[inline]
pub fn cartesian_to_polar(pos: Vec2) -> (f32, f32) {
    (pos.length(), pos.y.atan2(pos.x))
}
