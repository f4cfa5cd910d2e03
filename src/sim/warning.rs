//! Warn-then-spawn
//!
//! A hazard is announced by a warning marker and materializes once its delay
//! has passed. Pending spawns sit in an explicit queue keyed by simulation
//! time and are drained once per tick, so a reset or game over can cancel
//! them outright instead of racing a timer.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::hazards::HazardTag;

/// Identifies a warning and the spawn it announces
pub type WarningId = u32;

/// On-field marker shown before a hazard appears
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Warning {
    pub id: WarningId,
    pub tag: HazardTag,
    pub pos: Vec2,
    pub dir: Option<f32>,
    pub age: u32,
    pub duration: u32,
}

impl Warning {
    /// Fraction of the countdown elapsed, for the pulsing marker
    pub fn progress(&self) -> f32 {
        if self.duration == 0 {
            return 1.0;
        }
        (self.age as f32 / self.duration as f32).min(1.0)
    }
}

/// A hazard waiting for its warning to run out
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingSpawn {
    pub warning: WarningId,
    /// Simulation time (ms) at which it spawns
    pub due_ms: u64,
    pub tag: HazardTag,
    pub pos: Vec2,
    pub dir: Option<f32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpawnQueue {
    pending: Vec<PendingSpawn>,
}

impl SpawnQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, spawn: PendingSpawn) {
        self.pending.push(spawn);
    }

    /// Drop a pending spawn. False if it already fired or never existed.
    pub fn cancel(&mut self, warning: WarningId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.warning != warning);
        self.pending.len() != before
    }

    /// Drop everything; returns how many spawns were cancelled
    pub fn clear(&mut self) -> usize {
        let n = self.pending.len();
        self.pending.clear();
        n
    }

    /// Remove and return every spawn due at `now_ms`, in scheduling order
    pub fn drain_due(&mut self, now_ms: u64) -> Vec<PendingSpawn> {
        let (due, rest): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|p| p.due_ms <= now_ms);
        self.pending = rest;
        due
    }

    /// Earliest due time, if anything is queued
    pub fn next_due(&self) -> Option<u64> {
        self.pending.iter().map(|p| p.due_ms).min()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
