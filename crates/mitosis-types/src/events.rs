//! Events emitted by the simulation core for the render and UI layers.
//!
//! Events are queued during a tick and handed out in the tick summary; the
//! core never calls into the render layer directly.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{Phase, SimulationMode};
use crate::ids::{CellId, RenderHandle};
use crate::structs::Position;

/// An observable change in the simulated population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum SimulationEvent {
    /// A cell completed a cycle and new cells were spawned from it.
    Divided {
        /// The dividing cell (it keeps living).
        parent_id: CellId,
        /// Where the parent sat when it divided.
        parent_position: Position,
        /// Generation assigned to the children.
        new_generation: u32,
        /// Ids of the spawned children, in spawn order.
        children: Vec<CellId>,
    },
    /// A cell exceeded its lifespan and was removed from the population.
    Died {
        /// The removed cell.
        cell_id: CellId,
        /// Its generation.
        generation: u32,
        /// Total running time at death, in seconds.
        age_seconds: f64,
    },
    /// The render layer linked a render object to a cell.
    Registered {
        /// The cell.
        cell_id: CellId,
        /// The render object.
        handle: RenderHandle,
    },
    /// A render object link was dropped; the render layer should dispose it.
    Unregistered {
        /// The cell whose handle was dropped.
        cell_id: CellId,
        /// The handle that was linked, if any.
        handle: Option<RenderHandle>,
    },
    /// A cell was picked in the UI (tooltip content is external).
    CellSelected {
        /// The selected cell.
        cell_id: CellId,
        /// Its phase at selection time.
        phase: Phase,
    },
    /// The simulation switched presets and every clock was reset.
    ModeChanged {
        /// The new preset.
        mode: SimulationMode,
    },
}

impl SimulationEvent {
    /// The cell this event concerns, if any.
    pub const fn cell_id(&self) -> Option<CellId> {
        match self {
            Self::Divided { parent_id, .. } => Some(*parent_id),
            Self::Died { cell_id, .. }
            | Self::Registered { cell_id, .. }
            | Self::Unregistered { cell_id, .. }
            | Self::CellSelected { cell_id, .. } => Some(*cell_id),
            Self::ModeChanged { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_kind_tag() {
        let event = SimulationEvent::CellSelected {
            cell_id: CellId::new(),
            phase: Phase::Metaphase,
        };
        let json = serde_json::to_value(&event).unwrap_or_default();
        assert_eq!(json.get("kind").and_then(|v| v.as_str()), Some("cell_selected"));
        assert_eq!(json.get("phase").and_then(|v| v.as_str()), Some("metaphase"));
    }

    #[test]
    fn mode_change_has_no_cell() {
        let event = SimulationEvent::ModeChanged {
            mode: SimulationMode::Meiosis,
        };
        assert!(event.cell_id().is_none());
    }
}
