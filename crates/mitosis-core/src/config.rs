//! Configuration loading and typed config structures for Mitosis Lab.
//!
//! The canonical configuration lives in `mitosis-config.yaml` at the project
//! root (the engine honours `MITOSIS_CONFIG` to point elsewhere). This module
//! defines strongly-typed structs that mirror the YAML structure, a loader,
//! and [`SimulationConfig::validate`], which rejects every configuration
//! error before the first cell is spawned.

use std::path::Path;

use mitosis_cells::LifecycleConfig;
use mitosis_population::RingLayout;
use mitosis_types::DeathBoundary;
use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configuration parsed but cannot drive a simulation.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// What is wrong.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `mitosis-config.yaml`. Every field has a
/// default, so an empty file is a valid configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// Mode, cycle timing, founders, and seeding.
    #[serde(default)]
    pub simulation: SimulationSection,

    /// Lifespan and division parameters.
    #[serde(default)]
    pub lifecycle: LifecycleSection,

    /// Ring placement for each generation.
    #[serde(default)]
    pub layout: RingLayout,

    /// Decorative background swarm.
    #[serde(default)]
    pub background: BackgroundSection,

    /// Frame loop pacing and run bounds.
    #[serde(default)]
    pub runner: RunnerSection,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Check every cross-field constraint.
    ///
    /// The mode name is resolved later, when the timeline is built, so that
    /// an unknown mode surfaces as the cycle crate's `InvalidMode` error.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let sim = &self.simulation;
        if !sim.cycle_duration_seconds.is_finite() || sim.cycle_duration_seconds <= 0.0 {
            return Err(invalid(format!(
                "simulation.cycle_duration_seconds must be finite and positive, got {}",
                sim.cycle_duration_seconds
            )));
        }
        if !sim.max_delta_seconds.is_finite() || sim.max_delta_seconds <= 0.0 {
            return Err(invalid(format!(
                "simulation.max_delta_seconds must be finite and positive, got {}",
                sim.max_delta_seconds
            )));
        }
        // One tick may cross at most one cycle boundary.
        if sim.max_delta_seconds >= sim.cycle_duration_seconds {
            return Err(invalid(format!(
                "simulation.max_delta_seconds ({}) must be below cycle_duration_seconds ({})",
                sim.max_delta_seconds, sim.cycle_duration_seconds
            )));
        }
        if sim.max_cells == Some(0) {
            return Err(invalid("simulation.max_cells must be at least 1 when set".to_owned()));
        }

        self.lifecycle
            .to_lifecycle_config()
            .validate()
            .map_err(|e| invalid(format!("lifecycle: {e}")))?;
        self.layout
            .validate()
            .map_err(|e| invalid(format!("layout: {e}")))?;

        if self.runner.tick_interval_ms == 0 {
            return Err(invalid("runner.tick_interval_ms must be at least 1".to_owned()));
        }
        if let Some(fixed) = self.runner.fixed_delta_seconds {
            if !fixed.is_finite() || fixed <= 0.0 {
                return Err(invalid(format!(
                    "runner.fixed_delta_seconds must be finite and positive, got {fixed}"
                )));
            }
        }
        Ok(())
    }
}

/// Build an [`ConfigError::Invalid`].
const fn invalid(reason: String) -> ConfigError {
    ConfigError::Invalid { reason }
}

/// Mode, timing, and population seeding.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SimulationSection {
    /// Preset name (`simple_mitosis`, `detailed_mitosis`, `meiosis`; short
    /// aliases accepted).
    #[serde(default = "default_mode")]
    pub mode: String,

    /// Seconds for one full traversal of the timeline.
    #[serde(default = "default_cycle_duration_seconds")]
    pub cycle_duration_seconds: f64,

    /// Upper clamp on a single frame delta.
    #[serde(default = "default_max_delta_seconds")]
    pub max_delta_seconds: f64,

    /// Generation-0 cells spawned at start.
    #[serde(default = "default_founders")]
    pub founders: u32,

    /// Optional population cap.
    #[serde(default)]
    pub max_cells: Option<usize>,

    /// Seed for lifespans and swarm scatter (absent = OS entropy).
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for SimulationSection {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            cycle_duration_seconds: default_cycle_duration_seconds(),
            max_delta_seconds: default_max_delta_seconds(),
            founders: default_founders(),
            max_cells: None,
            seed: None,
        }
    }
}

/// Lifespan and division parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LifecycleSection {
    /// Shortest lifespan a cell can draw, in seconds.
    #[serde(default = "default_lifespan_min_seconds")]
    pub lifespan_min_seconds: f64,

    /// Longest lifespan a cell can draw, in seconds.
    #[serde(default = "default_lifespan_max_seconds")]
    pub lifespan_max_seconds: f64,

    /// `exclusive` (age > lifespan) or `inclusive` (age >= lifespan).
    #[serde(default)]
    pub death_boundary: DeathBoundary,

    /// Spawn requests per division edge.
    #[serde(default = "default_children_per_division")]
    pub children_per_division: u32,
}

impl Default for LifecycleSection {
    fn default() -> Self {
        Self {
            lifespan_min_seconds: default_lifespan_min_seconds(),
            lifespan_max_seconds: default_lifespan_max_seconds(),
            death_boundary: DeathBoundary::default(),
            children_per_division: default_children_per_division(),
        }
    }
}

impl LifecycleSection {
    /// Convert to the cells crate's config.
    pub const fn to_lifecycle_config(&self) -> LifecycleConfig {
        LifecycleConfig {
            lifespan_min_seconds: self.lifespan_min_seconds,
            lifespan_max_seconds: self.lifespan_max_seconds,
            death_boundary: self.death_boundary,
            children_per_division: self.children_per_division,
        }
    }
}

/// Decorative background swarm.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BackgroundSection {
    /// Number of background timers the host keeps.
    #[serde(default = "default_swarm_size")]
    pub swarm_size: usize,

    /// Log a phase histogram of the swarm every N ticks (0 = never).
    #[serde(default = "default_report_interval_ticks")]
    pub report_interval_ticks: u64,
}

impl Default for BackgroundSection {
    fn default() -> Self {
        Self {
            swarm_size: default_swarm_size(),
            report_interval_ticks: default_report_interval_ticks(),
        }
    }
}

/// Frame loop pacing and run bounds.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RunnerSection {
    /// Real-time milliseconds between frames.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Use this delta every frame instead of measured wall time.
    #[serde(default)]
    pub fixed_delta_seconds: Option<f64>,

    /// Maximum number of frames before the run ends (0 = unlimited).
    #[serde(default)]
    pub max_ticks: u64,

    /// Maximum wall-clock seconds before the run ends (0 = unlimited).
    #[serde(default)]
    pub max_real_time_seconds: u64,

    /// End the run when the last cell dies.
    #[serde(default = "default_true")]
    pub stop_on_extinction: bool,

    /// Whether timers advance from the first frame.
    #[serde(default = "default_true")]
    pub start_playing: bool,
}

impl Default for RunnerSection {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            fixed_delta_seconds: None,
            max_ticks: 0,
            max_real_time_seconds: 0,
            stop_on_extinction: true,
            start_playing: true,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions for serde
// ---------------------------------------------------------------------------

fn default_mode() -> String {
    "simple_mitosis".to_owned()
}

const fn default_cycle_duration_seconds() -> f64 {
    12.0
}

const fn default_max_delta_seconds() -> f64 {
    1.0
}

const fn default_founders() -> u32 {
    1
}

const fn default_lifespan_min_seconds() -> f64 {
    60.0
}

const fn default_lifespan_max_seconds() -> f64 {
    90.0
}

const fn default_children_per_division() -> u32 {
    1
}

const fn default_swarm_size() -> usize {
    200
}

const fn default_report_interval_ticks() -> u64 {
    300
}

const fn default_tick_interval_ms() -> u64 {
    16
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_true() -> bool {
    true
}
