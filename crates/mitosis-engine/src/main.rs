//! Headless engine binary for Mitosis Lab.
//!
//! This is the entry point that wires together configuration, the tick
//! cycle, playback controls, a logging render sink, and the decorative
//! background swarm. It runs the frame loop until a termination condition
//! is met, then reports the run to the experiment ledger.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `MITOSIS_CONFIG` or `mitosis-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Build the simulation state and seed founders
//! 4. Scatter the background swarm
//! 5. Create playback controls and install the Ctrl-C stop hook
//! 6. Run the frame loop
//! 7. Log the result and record the experiment

mod callback;
mod error;
mod recorder;
mod sink;
mod swarm;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use mitosis_core::config::LoggingConfig;
use mitosis_core::{
    PlaybackControls, SimulationConfig, SimulationState, log_simulation_end, report_experiment, run_simulation,
};
use mitosis_types::{CellId, RenderHandle};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::callback::EngineCallback;
use crate::error::EngineError;
use crate::recorder::LoggingRecorder;
use crate::sink::LoggingSink;
use crate::swarm::BackgroundSwarm;

/// Config file used when `MITOSIS_CONFIG` is unset.
const DEFAULT_CONFIG_PATH: &str = "mitosis-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if any initialization step or the run itself fails.
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    run().await.context("mitosis-engine failed")?;
    Ok(())
}

/// Startup, frame loop, and shutdown reporting.
async fn run() -> Result<(), EngineError> {
    // 1. Load configuration. Logging is not up yet, so report afterwards.
    let config_path = config_path();
    let loaded = load_config(&config_path)?;
    let found = loaded.is_some();
    let config = loaded.unwrap_or_default();

    // 2. Initialize structured logging.
    init_logging(&config.logging)?;
    info!("mitosis-engine starting");
    if found {
        info!(path = %config_path.display(), "Configuration loaded");
    } else {
        info!(path = %config_path.display(), "Config file not found, using defaults");
    }
    info!(
        mode = %config.simulation.mode,
        cycle_duration = config.simulation.cycle_duration_seconds,
        founders = config.simulation.founders,
        max_cells = config.simulation.max_cells,
        seed = config.simulation.seed,
        "Simulation parameters"
    );

    // 3. Build state and seed founders, each linked to a render handle.
    let mut state = SimulationState::new(&config)?;
    let founders = state.seed_founders(config.simulation.founders);
    let linked = link_render_handles(&mut state, &founders);
    info!(founders = founders.len(), linked, "Founders seeded");

    // 4. Scatter the background swarm.
    let mut rng = config
        .simulation
        .seed
        .map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
    let swarm = BackgroundSwarm::new(
        state.clock().clone(),
        &config.background,
        state.max_delta_seconds(),
        &mut rng,
    );
    info!(
        swarm = swarm.len(),
        report_interval_ticks = config.background.report_interval_ticks,
        "Background swarm initialized"
    );

    // 5. Playback controls, stoppable from Ctrl-C.
    let controls = Arc::new(PlaybackControls::new(&config.runner));
    {
        let controls = Arc::clone(&controls);
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Ctrl-C received, stopping");
                    controls.request_stop();
                }
                Err(e) => warn!(error = %e, "failed to listen for Ctrl-C"),
            }
        });
    }
    info!(
        max_ticks = controls.max_ticks(),
        tick_interval_ms = controls.tick_interval_ms(),
        playing = controls.is_playing(),
        started_at = %controls.started_at(),
        "Playback controls initialized"
    );

    // 6. Run the frame loop.
    let mut callback = EngineCallback::new(LoggingSink::default(), swarm);
    let result = run_simulation(&mut state, &controls, &config.runner, &mut callback).await?;

    // 7. Log results and record the experiment.
    log_simulation_end(&result);
    let mut recorder = LoggingRecorder::default();
    report_experiment(&mut recorder, state.mode(), result.offspring_spawned);
    info!(
        experiments = recorder.experiments(),
        mendelian_ratios = recorder.mendelian_ratios(),
        "Experiment ledger updated"
    );

    let sink = callback.sink();
    info!(
        end_reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        generations = state.population().generation_count(),
        children_drawn = sink.children_drawn(),
        cells_retired = sink.cells_retired(),
        linked_handles = sink.linked_handles(),
        "mitosis-engine shutdown complete"
    );
    Ok(())
}

/// Link each cell to a fresh render handle, numbered from 1.
/// Returns how many links took.
fn link_render_handles(state: &mut SimulationState, ids: &[CellId]) -> usize {
    let mut linked: usize = 0;
    for (handle, &id) in (1_u64..).zip(ids) {
        let handle = RenderHandle(handle);
        if state.population_mut().register(id, handle) {
            linked = linked.saturating_add(1);
        } else {
            warn!(cell_id = %id, %handle, "render handle not linked: unknown cell");
        }
    }
    linked
}

/// Config path from `MITOSIS_CONFIG`, falling back to the working directory.
fn config_path() -> PathBuf {
    std::env::var_os("MITOSIS_CONFIG").map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from)
}

/// Load the configuration file. Returns `None` when it does not exist.
fn load_config(path: &Path) -> Result<Option<SimulationConfig>, EngineError> {
    if path.exists() {
        let config = SimulationConfig::from_file(path)?;
        config.validate()?;
        Ok(Some(config))
    } else {
        Ok(None)
    }
}

/// Install the tracing subscriber. `RUST_LOG` overrides the configured level.
fn init_logging(logging: &LoggingConfig) -> Result<(), EngineError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .map_err(|e| EngineError::Logging {
            message: format!("invalid log level {:?}: {e}", logging.level),
        })?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    let installed = if logging.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| EngineError::Logging {
        message: format!("failed to install subscriber: {e}"),
    })
}
