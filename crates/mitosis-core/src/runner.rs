//! Frame loop runner with playback controls.
//!
//! This module provides [`run_simulation`], the top-level async function
//! that drives [`run_tick`] once per frame with support for:
//!
//! - **Bounded runs**: stop after `max_ticks` frames or `max_real_time_seconds`
//! - **Play/pause**: paused frames still run, with timers frozen
//! - **Manual scrubbing**: a pinned phase is applied on paused frames
//! - **Mode switches**: a pending mode is applied at the top of the next frame
//! - **Extinction**: optionally stop once the last cell has died
//! - **Clean stop**: a stop request interrupts the inter-frame sleep
//!
//! [`run_tick`]: crate::tick::run_tick

use std::sync::Arc;

use tokio::time::{Duration, Instant};
use tracing::{info, warn};

use crate::config::RunnerSection;
use crate::playback::{PlaybackControls, SimulationEndReason};
use crate::tick::{self, SimulationError, SimulationState, TickInput, TickSummary};

/// Errors that can occur during the run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A frame failed.
    #[error("tick error: {source}")]
    Tick {
        /// The underlying simulation error.
        #[from]
        source: SimulationError,
    },
}

/// Result of a run.
#[derive(Debug)]
pub struct SimulationResult {
    /// The reason the run ended.
    pub end_reason: SimulationEndReason,
    /// The last frame summary, if any frame completed.
    pub final_summary: Option<TickSummary>,
    /// Total number of frames executed.
    pub total_ticks: u64,
    /// Children spawned by divisions over the whole run.
    pub offspring_spawned: u64,
    /// Cells removed by death over the whole run.
    pub deaths: u64,
}

/// Callback invoked after each frame completes.
///
/// Hosts use this to forward events to the render layer or to sample the
/// background swarm. The callback receives the frame summary and the
/// current simulation state.
pub trait TickCallback: Send {
    /// Called after a frame completes successfully.
    fn on_tick(&mut self, summary: &TickSummary, state: &SimulationState);
}

/// A no-op tick callback for testing.
pub struct NoOpCallback;

impl TickCallback for NoOpCallback {
    fn on_tick(&mut self, _summary: &TickSummary, _state: &SimulationState) {}
}

/// Run the frame loop until a termination condition is met.
///
/// Each frame reads `controls`, builds a [`TickInput`] with the measured
/// wall-clock delta (or `runner.fixed_delta_seconds` when set), runs one
/// tick, and hands the summary to `callback`.
///
/// # Errors
///
/// Returns [`RunnerError`] if a frame fails unrecoverably.
pub async fn run_simulation(
    state: &mut SimulationState,
    controls: &Arc<PlaybackControls>,
    runner: &RunnerSection,
    callback: &mut dyn TickCallback,
) -> Result<SimulationResult, RunnerError> {
    let mut last_summary: Option<TickSummary> = None;
    let mut total_ticks: u64 = 0;
    let mut last_frame = Instant::now();

    info!(
        mode = %state.mode(),
        cells = state.population().len(),
        max_ticks = controls.max_ticks(),
        tick_interval_ms = controls.tick_interval_ms(),
        fixed_delta = runner.fixed_delta_seconds,
        "Simulation starting"
    );

    let end_reason = loop {
        // --- Check stop request (before frame) ---
        if controls.is_stop_requested() {
            info!("Stop requested");
            break SimulationEndReason::StopRequested;
        }

        // --- Check time limit (before frame) ---
        if controls.time_limit_reached() {
            info!(elapsed = controls.elapsed_seconds(), "Real-time limit reached");
            break SimulationEndReason::MaxRealTimeReached;
        }

        // --- Build input ---
        let now = Instant::now();
        let measured = now.duration_since(last_frame).as_secs_f64();
        last_frame = now;
        let input = TickInput {
            delta_seconds: runner.fixed_delta_seconds.unwrap_or(measured),
            playing: controls.is_playing(),
            manual_phase: controls.manual_phase().await,
            mode_change: controls.take_pending_mode().await,
        };

        // --- Execute frame ---
        let summary = tick::run_tick(state, &input)?;
        total_ticks = total_ticks.saturating_add(1);

        // --- Notify callback ---
        callback.on_tick(&summary, state);

        // --- Check extinction ---
        if runner.stop_on_extinction && summary.alive == 0 {
            info!(tick = summary.tick, "All cells dead -- extinction");
            last_summary = Some(summary);
            break SimulationEndReason::Extinction;
        }

        // --- Check tick limit (after frame) ---
        if controls.tick_limit_reached(total_ticks) {
            info!(tick = summary.tick, max_ticks = controls.max_ticks(), "Tick limit reached");
            last_summary = Some(summary);
            break SimulationEndReason::MaxTicksReached;
        }

        last_summary = Some(summary);

        // --- Sleep for frame interval, waking early on stop ---
        let interval = Duration::from_millis(controls.tick_interval_ms());
        tokio::select! {
            () = tokio::time::sleep(interval) => {}
            () = controls.stopped() => {}
        }
    };

    controls.set_end_reason(end_reason).await;
    Ok(SimulationResult {
        end_reason,
        final_summary: last_summary,
        total_ticks,
        offspring_spawned: state.population().offspring_spawned(),
        deaths: state.population().deaths(),
    })
}

/// Log the end of a run.
pub fn log_simulation_end(result: &SimulationResult) {
    info!(
        reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        offspring = result.offspring_spawned,
        deaths = result.deaths,
        final_alive = result.final_summary.as_ref().map(|s| s.alive),
        "Simulation ended"
    );

    if let Some(ref summary) = result.final_summary {
        info!(
            tick = summary.tick,
            alive = summary.alive,
            mode = %summary.frame.mode,
            sim_time = summary.frame.sim_time_seconds,
            "Final frame summary"
        );
    } else {
        warn!("Simulation ended with no frames executed");
    }
}
