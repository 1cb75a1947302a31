//! Phase clock: maps elapsed time on a cell's timer to the active phase.
//!
//! The clock holds no per-cell state. Given the same timeline, cycle
//! duration, and elapsed time it always returns the same phase, however many
//! cycles the elapsed value spans.
//!
//! # Pinning
//!
//! While playback is paused, a manual phase can be pinned by *setting* a
//! timer to [`PhaseClock::pinned_elapsed`]: the start of the target phase
//! plus a small epsilon ([`PIN_EPSILON_FRACTION`] of one phase duration), so
//! the next lookup lands inside the target and never spills into its
//! successor.

use mitosis_types::{Phase, SimulationMode};

use crate::error::CycleError;
use crate::timeline::PhaseTimeline;

/// Offset into a phase used when pinning, as a fraction of one phase duration.
pub const PIN_EPSILON_FRACTION: f64 = 0.01;

/// Clamp a frame delta to `[0, max_delta]`.
///
/// Negative, NaN, and infinite deltas become `0.0`, which turns the tick into
/// a no-op for timers. A non-positive or non-finite `max_delta` disables the
/// upper clamp.
pub fn sanitize_delta(delta_seconds: f64, max_delta: f64) -> f64 {
    if !delta_seconds.is_finite() || delta_seconds <= 0.0 {
        return 0.0;
    }
    if max_delta.is_finite() && max_delta > 0.0 {
        delta_seconds.min(max_delta)
    } else {
        delta_seconds
    }
}

/// Treat negative and non-finite elapsed values as the start of the cycle.
fn sanitize_elapsed(elapsed: f64) -> f64 {
    if elapsed.is_finite() && elapsed > 0.0 {
        elapsed
    } else {
        0.0
    }
}

/// Floor a non-negative float into an index, saturating on overflow.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn floor_to_u64(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        // `as` saturates for out-of-range floats.
        value.floor() as u64
    } else {
        0
    }
}

/// Convert a phase count to `f64` for duration math.
#[allow(clippy::cast_precision_loss)]
const fn count_as_f64(count: usize) -> f64 {
    count as f64
}

/// Compute the index of the active phase.
///
/// `floor((elapsed mod cycle) / (cycle / len)) mod len`. Returns 0 for an
/// invalid cycle duration.
fn phase_index_for(len: usize, elapsed: f64, cycle_duration: f64) -> usize {
    if len == 0 || !cycle_duration.is_finite() || cycle_duration <= 0.0 {
        return 0;
    }
    let per_phase = cycle_duration / count_as_f64(len);
    let wrapped = sanitize_elapsed(elapsed).rem_euclid(cycle_duration);
    let raw = usize::try_from(floor_to_u64(wrapped / per_phase)).unwrap_or(usize::MAX);
    raw.checked_rem(len).unwrap_or(0)
}

/// Return the phase active at `elapsed` seconds into a timer.
///
/// Stateless and periodic in `cycle_duration`. An invalid cycle duration
/// pins the result to the first phase.
pub fn current_phase(timeline: &PhaseTimeline, elapsed: f64, cycle_duration: f64) -> Phase {
    let index = phase_index_for(timeline.len(), elapsed, cycle_duration);
    timeline.get(index).unwrap_or_else(|| timeline.first())
}

/// A timeline bound to a validated cycle duration.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseClock {
    /// The phase sequence for the active mode.
    timeline: PhaseTimeline,
    /// Seconds for one full traversal of the timeline.
    cycle_duration: f64,
}

impl PhaseClock {
    /// Create a clock from a timeline and cycle duration.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError::InvalidCycleDuration`] unless `cycle_duration`
    /// is finite and positive, and [`CycleError::EmptyTimeline`] if the
    /// timeline has no phases.
    pub fn new(timeline: PhaseTimeline, cycle_duration: f64) -> Result<Self, CycleError> {
        if !cycle_duration.is_finite() || cycle_duration <= 0.0 {
            return Err(CycleError::InvalidCycleDuration {
                value: cycle_duration,
            });
        }
        if timeline.is_empty() {
            return Err(CycleError::EmptyTimeline);
        }
        Ok(Self {
            timeline,
            cycle_duration,
        })
    }

    /// Create a clock for a preset mode.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError::InvalidCycleDuration`] for a bad duration.
    pub fn for_mode(mode: SimulationMode, cycle_duration: f64) -> Result<Self, CycleError> {
        Self::new(PhaseTimeline::for_mode(mode), cycle_duration)
    }

    /// The timeline this clock walks.
    pub const fn timeline(&self) -> &PhaseTimeline {
        &self.timeline
    }

    /// Seconds per full cycle.
    pub const fn cycle_duration(&self) -> f64 {
        self.cycle_duration
    }

    /// Seconds spent in each phase (`cycle_duration / len`).
    pub fn per_phase_duration(&self) -> f64 {
        self.cycle_duration / count_as_f64(self.timeline.len())
    }

    /// Index into the timeline of the phase active at `elapsed`.
    pub fn phase_index(&self, elapsed: f64) -> usize {
        phase_index_for(self.timeline.len(), elapsed, self.cycle_duration)
    }

    /// The phase active at `elapsed`.
    pub fn current_phase(&self, elapsed: f64) -> Phase {
        current_phase(&self.timeline, elapsed, self.cycle_duration)
    }

    /// Number of full cycles completed by `elapsed`.
    pub fn cycle_index(&self, elapsed: f64) -> u64 {
        floor_to_u64(sanitize_elapsed(elapsed) / self.cycle_duration)
    }

    /// Fraction of the active phase already elapsed, in `[0, 1)`.
    pub fn progress_in_phase(&self, elapsed: f64) -> f64 {
        let per_phase = self.per_phase_duration();
        let within = sanitize_elapsed(elapsed).rem_euclid(per_phase) / per_phase;
        within.clamp(0.0, 1.0 - f64::EPSILON)
    }

    /// Timer value that pins the clock to `phase`.
    ///
    /// Returns `None` if `phase` is not part of this clock's timeline.
    pub fn pinned_elapsed(&self, phase: Phase) -> Option<f64> {
        let index = self.timeline.position(phase)?;
        let per_phase = self.per_phase_duration();
        Some(count_as_f64(index).mul_add(per_phase, per_phase * PIN_EPSILON_FRACTION))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn simple_clock() -> PhaseClock {
        PhaseClock::for_mode(SimulationMode::SimpleMitosis, 12.0).unwrap()
    }

    #[test]
    fn rejects_bad_cycle_durations() {
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let result = PhaseClock::for_mode(SimulationMode::Meiosis, bad);
            assert!(matches!(result, Err(CycleError::InvalidCycleDuration { .. })));
        }
    }

    #[test]
    fn phase_advances_every_two_seconds() {
        let clock = simple_clock();
        let phases = clock.timeline().phases().to_vec();
        assert_eq!(clock.current_phase(0.0), phases[0]);
        assert_eq!(clock.current_phase(1.9), phases[0]);
        assert_eq!(clock.current_phase(2.0), phases[1]);
        assert_eq!(clock.current_phase(6.0), phases[3]);
        assert_eq!(clock.current_phase(11.9), phases[5]);
        assert_eq!(clock.current_phase(12.0), phases[0]);
    }

    #[test]
    fn periodic_in_cycle_duration() {
        let clock = simple_clock();
        let mut t = 0.0_f64;
        while t < 36.0 {
            assert_eq!(clock.current_phase(t), clock.current_phase(t + 12.0), "t = {t}");
            t += 0.37;
        }
    }

    #[test]
    fn long_running_timers_stay_in_range() {
        for mode in SimulationMode::ALL {
            let clock = PhaseClock::for_mode(mode, 9.5).unwrap();
            for elapsed in [1.0e6, 123_456.789, 9.5 * 10_000.0, 1.0e12 + 0.3] {
                assert!(clock.phase_index(elapsed) < clock.timeline().len());
            }
        }
    }

    #[test]
    fn exactly_len_distinct_phases_are_reachable() {
        for mode in SimulationMode::ALL {
            let clock = PhaseClock::for_mode(mode, 12.0).unwrap();
            let mut seen = BTreeSet::new();
            let mut t = 0.0_f64;
            while t < 24.0 {
                seen.insert(clock.current_phase(t));
                t += 0.05;
            }
            assert_eq!(seen.len(), clock.timeline().len(), "mode {mode}");
        }
    }

    #[test]
    fn lookup_is_idempotent() {
        let clock = simple_clock();
        let first = clock.current_phase(7.3);
        for _ in 0..10 {
            assert_eq!(clock.current_phase(7.3), first);
        }
    }

    #[test]
    fn negative_and_nan_elapsed_read_as_start() {
        let clock = simple_clock();
        assert_eq!(clock.current_phase(-3.0), Phase::Interphase);
        assert_eq!(clock.current_phase(f64::NAN), Phase::Interphase);
        assert_eq!(clock.cycle_index(-3.0), 0);
    }

    #[test]
    fn cycle_index_counts_completed_cycles() {
        let clock = simple_clock();
        assert_eq!(clock.cycle_index(0.0), 0);
        assert_eq!(clock.cycle_index(11.99), 0);
        assert_eq!(clock.cycle_index(12.0), 1);
        assert_eq!(clock.cycle_index(36.5), 3);
    }

    #[test]
    fn pinned_elapsed_reproduces_target_phase() {
        for mode in SimulationMode::ALL {
            let clock = PhaseClock::for_mode(mode, 12.0).unwrap();
            for &phase in clock.timeline().phases() {
                let elapsed = clock.pinned_elapsed(phase).unwrap();
                assert_eq!(clock.current_phase(elapsed), phase);
                assert!(elapsed - count_as_f64(clock.timeline().position(phase).unwrap())
                    * clock.per_phase_duration()
                    < clock.per_phase_duration());
            }
        }
    }

    #[test]
    fn pinning_a_foreign_phase_is_refused() {
        let clock = simple_clock();
        assert!(clock.pinned_elapsed(Phase::MetaphaseII).is_none());
    }

    #[test]
    fn progress_within_phase() {
        let clock = simple_clock();
        assert!((clock.progress_in_phase(3.0) - 0.5).abs() < 1e-9);
        assert!(clock.progress_in_phase(4.0) < 1e-9);
    }

    #[test]
    fn delta_sanitization() {
        assert!(sanitize_delta(-0.5, 1.0).abs() < f64::EPSILON);
        assert!(sanitize_delta(f64::NAN, 1.0).abs() < f64::EPSILON);
        assert!((sanitize_delta(5.0, 1.0) - 1.0).abs() < f64::EPSILON);
        assert!((sanitize_delta(0.25, 1.0) - 0.25).abs() < f64::EPSILON);
        assert!((sanitize_delta(5.0, 0.0) - 5.0).abs() < f64::EPSILON);
    }
}
