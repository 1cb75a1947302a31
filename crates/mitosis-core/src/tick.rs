//! Tick cycle: one frame of the Mitosis Lab simulation.
//!
//! [`run_tick`] is the explicit `(state, input) -> summary` step. Each call
//! runs these stages in order:
//!
//! 1. **Mode** -- apply a requested mode switch (reset every clock).
//! 2. **Advance** -- clamp the frame delta and, while playing, advance every
//!    cell's timer, recompute its phase, and collect its lifecycle edges.
//!    While paused, pin every cell to the manual phase instead, if one is set.
//! 3. **Render** -- build the [`FrameSnapshot`] from the population as it
//!    stood during the pass (dying cells are still present, marked dead).
//! 4. **Apply** -- spawn children and remove dead cells.
//! 5. **Drain** -- move the population's queued events into the summary.
//!
//! Population mutations are always deferred until after the render pass.

use mitosis_cells::{CellError, LifecycleConfig, LifecycleEvent};
use mitosis_cycle::{CycleError, PhaseClock, PhaseTimeline, sanitize_delta};
use mitosis_population::{GenerationTree, PopulationError};
use mitosis_types::{CellId, FrameSnapshot, Phase, Position, SimulationEvent, SimulationMode};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};

use crate::config::{ConfigError, SimulationConfig};

/// Errors raised while building or reconfiguring a simulation.
///
/// A running tick never fails on cell data; only construction and mode
/// switches can.
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    /// The configuration was rejected.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },

    /// The phase timeline or clock could not be built.
    #[error("cycle error: {source}")]
    Cycle {
        /// The underlying cycle error.
        #[from]
        source: CycleError,
    },

    /// The lifecycle parameters were rejected.
    #[error("cell error: {source}")]
    Cell {
        /// The underlying cell error.
        #[from]
        source: CellError,
    },

    /// The population parameters were rejected.
    #[error("population error: {source}")]
    Population {
        /// The underlying population error.
        #[from]
        source: PopulationError,
    },
}

/// Host input for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickInput {
    /// Wall time since the previous frame, before clamping.
    pub delta_seconds: f64,
    /// Whether timers advance on this frame.
    pub playing: bool,
    /// Phase to pin every cell to while paused.
    pub manual_phase: Option<Phase>,
    /// Mode switch to apply before advancing.
    pub mode_change: Option<SimulationMode>,
}

impl TickInput {
    /// A playing frame with no pin and no mode switch.
    pub const fn playing(delta_seconds: f64) -> Self {
        Self {
            delta_seconds,
            playing: true,
            manual_phase: None,
            mode_change: None,
        }
    }

    /// A paused frame, optionally pinned to `phase`.
    pub const fn paused(manual_phase: Option<Phase>) -> Self {
        Self {
            delta_seconds: 0.0,
            playing: false,
            manual_phase,
            mode_change: None,
        }
    }
}

/// Summary of a single frame.
#[derive(Debug, Clone)]
pub struct TickSummary {
    /// The frame number that was executed.
    pub tick: u64,
    /// Delta actually applied after clamping (0 while paused).
    pub applied_delta_seconds: f64,
    /// Phase every cell was pinned to on a paused frame.
    pub pinned_phase: Option<Phase>,
    /// Render data for this frame.
    pub frame: FrameSnapshot,
    /// Events emitted this frame, oldest first.
    pub events: Vec<SimulationEvent>,
    /// Cells spawned by divisions this frame.
    pub spawned: usize,
    /// Cells removed by death this frame.
    pub died: usize,
    /// Live cells after the frame.
    pub alive: usize,
}

/// Everything the engine needs to run a frame.
#[derive(Debug)]
pub struct SimulationState {
    /// Active preset.
    mode: SimulationMode,
    /// Phase math for the active preset.
    clock: PhaseClock,
    /// The live population.
    population: GenerationTree,
    /// Lifespan and division parameters.
    lifecycle: LifecycleConfig,
    /// Upper clamp on a frame delta.
    max_delta_seconds: f64,
    /// Randomness for lifespans.
    rng: StdRng,
    /// Frames executed so far.
    tick: u64,
    /// Simulated seconds accumulated while playing.
    sim_time_seconds: f64,
}

impl SimulationState {
    /// Build an empty simulation from a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::Config`] for a config that fails
    /// validation and [`SimulationError::Cycle`] for an unknown mode name.
    pub fn new(config: &SimulationConfig) -> Result<Self, SimulationError> {
        config.validate()?;
        let sim = &config.simulation;
        let timeline = PhaseTimeline::for_mode_name(&sim.mode)?;
        let mode = timeline.mode().unwrap_or_default();
        let clock = PhaseClock::new(timeline, sim.cycle_duration_seconds)?;

        let lifecycle = config.lifecycle.to_lifecycle_config();
        lifecycle.validate()?;
        config.layout.validate()?;

        let population =
            GenerationTree::new(config.layout, Position::ORIGIN).with_max_cells(sim.max_cells);
        let rng = sim.seed.map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);

        info!(
            mode = %mode,
            phases = clock.timeline().len(),
            cycle_duration = clock.cycle_duration(),
            max_delta = sim.max_delta_seconds,
            "simulation state initialized"
        );

        Ok(Self {
            mode,
            clock,
            population,
            lifecycle,
            max_delta_seconds: sim.max_delta_seconds,
            rng,
            tick: 0,
            sim_time_seconds: 0.0,
        })
    }

    /// Spawn `count` generation-0 cells.
    pub fn seed_founders(&mut self, count: u32) -> Vec<CellId> {
        self.population
            .seed_founders(count, &self.lifecycle, &self.clock, &mut self.rng)
    }

    /// Switch preset: rebuild the clock and restart every cell's cycle.
    ///
    /// Queues a `ModeChanged` event for the next drain.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::Cycle`] if the clock cannot be rebuilt.
    pub fn set_mode(&mut self, mode: SimulationMode) -> Result<(), SimulationError> {
        let clock = PhaseClock::for_mode(mode, self.clock.cycle_duration())?;
        self.population.reset_all(&clock);
        info!(from = %self.mode, to = %mode, cells = self.population.len(), "mode changed");
        self.clock = clock;
        self.mode = mode;
        self.population.queue_event(SimulationEvent::ModeChanged { mode });
        Ok(())
    }

    /// Report a UI pick. Returns the cell's phase and queues
    /// `CellSelected`, or `None` for an unknown id.
    pub fn select_cell(&mut self, id: CellId) -> Option<Phase> {
        self.population.select(id)
    }

    /// Active preset.
    pub const fn mode(&self) -> SimulationMode {
        self.mode
    }

    /// Active clock.
    pub const fn clock(&self) -> &PhaseClock {
        &self.clock
    }

    /// The live population.
    pub const fn population(&self) -> &GenerationTree {
        &self.population
    }

    /// The live population, for render-handle registration.
    pub const fn population_mut(&mut self) -> &mut GenerationTree {
        &mut self.population
    }

    /// Lifecycle parameters.
    pub const fn lifecycle(&self) -> &LifecycleConfig {
        &self.lifecycle
    }

    /// Upper clamp on a frame delta.
    pub const fn max_delta_seconds(&self) -> f64 {
        self.max_delta_seconds
    }

    /// Frames executed so far.
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Simulated seconds accumulated while playing.
    pub const fn sim_time_seconds(&self) -> f64 {
        self.sim_time_seconds
    }
}

/// Execute one frame.
///
/// # Errors
///
/// Returns [`SimulationError::Cycle`] if a requested mode switch fails.
/// Nothing has been advanced in that case.
pub fn run_tick(state: &mut SimulationState, input: &TickInput) -> Result<TickSummary, SimulationError> {
    if let Some(mode) = input.mode_change {
        state.set_mode(mode)?;
    }

    state.tick = state.tick.saturating_add(1);
    let delta = if input.playing {
        sanitize_delta(input.delta_seconds, state.max_delta_seconds)
    } else {
        0.0
    };

    let pinned_phase = if input.playing {
        None
    } else {
        input.manual_phase
    };
    let edges: Vec<LifecycleEvent> = if input.playing {
        state.sim_time_seconds += delta;
        state
            .population
            .advance_all(delta, &state.clock, &state.lifecycle)
    } else {
        if let Some(phase) = pinned_phase {
            let pinned = state.population.pin_all(&state.clock, phase);
            debug!(tick = state.tick, phase = %phase, pinned, "manual phase pinned");
        }
        Vec::new()
    };

    let frame = FrameSnapshot {
        tick: state.tick,
        mode: state.mode,
        playing: input.playing,
        sim_time_seconds: state.sim_time_seconds,
        cells: state.population.snapshots(&state.clock),
    };

    let mut spawned: usize = 0;
    let mut died: usize = 0;
    for edge in &edges {
        let children = state
            .population
            .apply(edge, &state.lifecycle, &state.clock, &mut state.rng);
        match edge {
            LifecycleEvent::Divided { .. } => spawned = spawned.saturating_add(children.len()),
            LifecycleEvent::Died { .. } => died = died.saturating_add(1),
        }
    }

    let events = state.population.drain_events();
    if spawned > 0 || died > 0 {
        debug!(
            tick = state.tick,
            spawned,
            died,
            alive = state.population.len(),
            generations = state.population.generation_count(),
            "population changed"
        );
    }

    Ok(TickSummary {
        tick: state.tick,
        applied_delta_seconds: delta,
        pinned_phase,
        frame,
        events,
        spawned,
        died,
        alive: state.population.len(),
    })
}
