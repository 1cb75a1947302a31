//! Simulation orchestration for Mitosis Lab.
//!
//! This crate ties the phase math, cell lifecycles, and population together
//! into a frame-driven simulation:
//!
//! - [`config`] -- typed `mitosis-config.yaml` loading and validation
//! - [`playback`] -- [`PlaybackControls`] shared with the host UI
//! - [`tick`] -- [`SimulationState`] and the per-frame [`run_tick`]
//! - [`runner`] -- the async frame loop [`run_simulation`]
//! - [`collaborator`] -- render-sink and experiment-recorder seams

pub mod collaborator;
pub mod config;
pub mod playback;
pub mod runner;
pub mod tick;

pub use collaborator::{ExperimentRecorder, RenderDispatch, RenderSink, dispatch_events, report_experiment};
pub use config::{ConfigError, SimulationConfig};
pub use playback::{PlaybackControls, SimulationEndReason};
pub use runner::{NoOpCallback, RunnerError, SimulationResult, TickCallback, log_simulation_end, run_simulation};
pub use tick::{SimulationError, SimulationState, TickInput, TickSummary, run_tick};
