//! Tick callback that feeds the headless presentation layer.
//!
//! After each frame this callback forwards the drained events to the
//! logging render sink, steps the background swarm, and (at trace level)
//! dumps the frame snapshot as JSON for offline inspection.

use mitosis_core::{RenderDispatch, SimulationState, TickCallback, TickSummary};
use tracing::{Level, trace, warn};

use crate::sink::LoggingSink;
use crate::swarm::BackgroundSwarm;

/// Callback that bridges the frame loop to the render sink and swarm.
pub struct EngineCallback {
    /// Render event forwarding.
    render: RenderDispatch<LoggingSink>,
    /// Decorative background cells, if any were configured.
    swarm: Option<BackgroundSwarm>,
}

impl EngineCallback {
    /// Create a callback. An empty swarm is dropped.
    pub fn new(sink: LoggingSink, swarm: BackgroundSwarm) -> Self {
        Self {
            render: RenderDispatch::new(sink),
            swarm: (!swarm.is_empty()).then_some(swarm),
        }
    }

    /// The render sink, for the shutdown summary.
    pub const fn sink(&self) -> &LoggingSink {
        self.render.sink()
    }
}

impl TickCallback for EngineCallback {
    fn on_tick(&mut self, summary: &TickSummary, state: &SimulationState) {
        self.render.on_tick(summary, state);

        if let Some(swarm) = self.swarm.as_mut() {
            swarm.on_frame(summary, state.clock());
        }

        if tracing::enabled!(Level::TRACE) {
            match serde_json::to_string(&summary.frame) {
                Ok(json) => trace!(tick = summary.tick, frame = %json, "frame snapshot"),
                Err(e) => warn!(tick = summary.tick, error = %e, "failed to serialize frame snapshot"),
            }
        }
    }
}
