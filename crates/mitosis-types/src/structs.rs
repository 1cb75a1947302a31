//! Plain data structs shared between the simulation core and the render layer.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{LifecycleState, Phase, SimulationMode};
use crate::ids::CellId;

/// A point in scene space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Position {
    /// Horizontal axis.
    pub x: f64,
    /// Vertical axis (generations stack along it).
    pub y: f64,
    /// Depth axis.
    pub z: f64,
}

impl Position {
    /// The scene origin.
    pub const ORIGIN: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    /// Create a position from its components.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Return this position shifted by the given offset.
    pub const fn translated(self, offset: Self) -> Self {
        Self {
            x: self.x + offset.x,
            y: self.y + offset.y,
            z: self.z + offset.z,
        }
    }

    /// Euclidean distance to another position.
    pub fn distance_to(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dz.mul_add(dz, dx.mul_add(dx, dy * dy)).sqrt()
    }
}

/// Render-data row for one cell, produced once per tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CellSnapshot {
    /// The cell.
    pub cell_id: CellId,
    /// Division steps from a founder (0 = founder).
    pub generation: u32,
    /// Spatial anchor assigned at spawn.
    pub position: Position,
    /// Phase derived from the cell's timer on this tick.
    pub phase: Phase,
    /// Lifecycle state after this tick's evaluation.
    pub state: LifecycleState,
    /// Fraction of the current phase already elapsed, in `[0, 1)`.
    pub phase_progress: f64,
    /// Total running time in seconds.
    pub age_seconds: f64,
}

/// Everything the render layer needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct FrameSnapshot {
    /// Tick counter (advances every frame, playing or not).
    pub tick: u64,
    /// Active preset.
    pub mode: SimulationMode,
    /// Whether timers advanced on this frame.
    pub playing: bool,
    /// Simulated seconds elapsed while playing.
    pub sim_time_seconds: f64,
    /// One row per cell present during the render pass.
    pub cells: Vec<CellSnapshot>,
}
