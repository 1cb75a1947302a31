//! Shared type definitions for the Mitosis Lab simulation.
//!
//! This crate is the single source of truth for the types that cross the
//! boundary between the simulation core and the render layer. Types flow
//! downstream to `TypeScript` via `ts-rs`.
//!
//! # Modules
//!
//! - [`ids`] -- [`CellId`] and the opaque [`RenderHandle`]
//! - [`enums`] -- phases, simulation modes, lifecycle states
//! - [`structs`] -- positions and per-frame render snapshots
//! - [`events`] -- [`SimulationEvent`], the core's output queue

pub mod enums;
pub mod events;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{DeathBoundary, LifecycleState, ParseModeError, Phase, SimulationMode};
pub use events::SimulationEvent;
pub use ids::{CellId, RenderHandle};
pub use structs::{CellSnapshot, FrameSnapshot, Position};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation.

    #[test]
    fn export_bindings() {
        // Files are written to `bindings/` relative to the crate root.
        use ts_rs::TS;

        let _ = crate::ids::CellId::export_all();
        let _ = crate::ids::RenderHandle::export_all();

        let _ = crate::enums::Phase::export_all();
        let _ = crate::enums::SimulationMode::export_all();
        let _ = crate::enums::LifecycleState::export_all();
        let _ = crate::enums::DeathBoundary::export_all();

        let _ = crate::structs::Position::export_all();
        let _ = crate::structs::CellSnapshot::export_all();
        let _ = crate::structs::FrameSnapshot::export_all();

        let _ = crate::events::SimulationEvent::export_all();
    }
}
