//! Phase sampling for decorative background cells.
//!
//! Background swarms are rendered in bulk and never divide or die, so they
//! skip lifecycle tracking entirely. The host owns one timer per decorative
//! cell; this module only reads (and optionally advances) that array with the
//! same phase math the tracked cells use, so the swarm stays in step with the
//! main simulation's cadence.

use mitosis_types::{Phase, SimulationMode};
use rand::Rng;

use crate::clock::{PhaseClock, sanitize_delta};
use crate::error::CycleError;

/// Phase of a single background timer under a preset mode.
///
/// # Errors
///
/// Returns [`CycleError::InvalidCycleDuration`] for a bad cycle duration.
pub fn phase_at(timer: f64, mode: SimulationMode, cycle_duration: f64) -> Result<Phase, CycleError> {
    let clock = PhaseClock::for_mode(mode, cycle_duration)?;
    Ok(clock.current_phase(timer))
}

/// Stateless sampler bound to one mode's clock.
///
/// Holds no timers of its own; every method takes the externally owned
/// timer slice.
#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundPhaseSampler {
    /// Shared phase math.
    clock: PhaseClock,
}

impl BackgroundPhaseSampler {
    /// Create a sampler for a preset mode.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError::InvalidCycleDuration`] for a bad cycle duration.
    pub fn new(mode: SimulationMode, cycle_duration: f64) -> Result<Self, CycleError> {
        Ok(Self {
            clock: PhaseClock::for_mode(mode, cycle_duration)?,
        })
    }

    /// Create a sampler that shares an existing clock's timeline and duration.
    pub const fn from_clock(clock: PhaseClock) -> Self {
        Self { clock }
    }

    /// The underlying clock.
    pub const fn clock(&self) -> &PhaseClock {
        &self.clock
    }

    /// Phase for one timer value.
    pub fn phase_at(&self, timer: f64) -> Phase {
        self.clock.current_phase(timer)
    }

    /// Phase for every timer, in order.
    pub fn sample(&self, timers: &[f64]) -> Vec<Phase> {
        timers.iter().map(|&t| self.clock.current_phase(t)).collect()
    }

    /// Advance every timer by a clamped frame delta.
    pub fn advance(timers: &mut [f64], delta_seconds: f64, max_delta: f64) {
        let delta = sanitize_delta(delta_seconds, max_delta);
        if delta <= 0.0 {
            return;
        }
        for timer in timers.iter_mut() {
            *timer += delta;
        }
    }

    /// Fold every timer back into `[0, cycle_duration)`. Phases read the
    /// same before and after.
    pub fn wrap(&self, timers: &mut [f64]) {
        let cycle = self.clock.cycle_duration();
        for timer in timers.iter_mut() {
            *timer = timer.rem_euclid(cycle);
        }
    }

    /// Set every timer so it reads as `phase`. Returns `false` (and leaves the
    /// timers untouched) if `phase` is not in this sampler's timeline.
    pub fn pin(&self, timers: &mut [f64], phase: Phase) -> bool {
        let Some(elapsed) = self.clock.pinned_elapsed(phase) else {
            return false;
        };
        timers.fill(elapsed);
        true
    }

    /// Draw `count` initial timers spread uniformly over one cycle so a new
    /// swarm is not phase-locked.
    pub fn scatter_timers(&self, count: usize, rng: &mut impl Rng) -> Vec<f64> {
        let cycle = self.clock.cycle_duration();
        (0..count).map(|_| rng.random_range(0.0..cycle)).collect()
    }
}
