//! Headless render sink.
//!
//! Without a 3D front end attached, the engine forwards render events to
//! the log and keeps a few counters for the shutdown summary.

use mitosis_core::RenderSink;
use mitosis_types::{CellId, Phase, Position, RenderHandle, SimulationMode};
use tracing::{debug, info};

/// Render sink that logs every event instead of drawing it.
#[derive(Debug, Default)]
pub struct LoggingSink {
    /// Child meshes that would have been created.
    children_drawn: u64,
    /// Meshes that would have been retired.
    cells_retired: u64,
    /// Render handles currently linked.
    linked_handles: usize,
}

impl LoggingSink {
    /// Child meshes created so far.
    pub const fn children_drawn(&self) -> u64 {
        self.children_drawn
    }

    /// Meshes retired so far.
    pub const fn cells_retired(&self) -> u64 {
        self.cells_retired
    }

    /// Handles still linked.
    pub const fn linked_handles(&self) -> usize {
        self.linked_handles
    }
}

impl RenderSink for LoggingSink {
    fn on_divide(&mut self, parent_position: Position, new_generation: u32) {
        self.children_drawn = self.children_drawn.saturating_add(1);
        debug!(
            x = parent_position.x,
            y = parent_position.y,
            z = parent_position.z,
            generation = new_generation,
            "child mesh spawned"
        );
    }

    fn on_death(&mut self, cell_id: CellId) {
        self.cells_retired = self.cells_retired.saturating_add(1);
        debug!(cell_id = %cell_id, "cell mesh retired");
    }

    fn on_register(&mut self, cell_id: CellId, handle: RenderHandle) {
        self.linked_handles = self.linked_handles.saturating_add(1);
        debug!(cell_id = %cell_id, %handle, "render handle linked");
    }

    fn on_unregister(&mut self, cell_id: CellId) {
        self.linked_handles = self.linked_handles.saturating_sub(1);
        debug!(cell_id = %cell_id, "render handle disposed");
    }

    fn on_cell_selected(&mut self, cell_id: CellId, phase: Phase) {
        info!(cell_id = %cell_id, phase = %phase, "cell selected");
    }

    fn on_mode_changed(&mut self, mode: SimulationMode) {
        info!(mode = %mode, "render mode switched");
    }
}
