//! Decorative background swarm.
//!
//! The swarm is a flat array of timers that share the tracked population's
//! phase math but never divide or die. It follows the frame loop: timers
//! advance (folded back into one cycle) on playing frames, snap to the
//! manual phase on paused frames, and rescatter over the new timeline when
//! the mode changes. Every
//! `report_interval_ticks` frames the phase histogram is logged.

use mitosis_core::TickSummary;
use mitosis_core::config::BackgroundSection;
use mitosis_cycle::{BackgroundPhaseSampler, PhaseClock};
use mitosis_types::{Phase, SimulationEvent};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

/// Background timers plus the sampler that reads them.
#[derive(Debug, Clone)]
pub struct BackgroundSwarm {
    /// Phase math for the active mode.
    sampler: BackgroundPhaseSampler,
    /// One timer per decorative cell.
    timers: Vec<f64>,
    /// Clamp applied to every frame delta.
    max_delta_seconds: f64,
    /// Frames between histogram reports (0 disables).
    report_interval_ticks: u64,
    /// Source for rescattering after a mode change.
    rng: StdRng,
}

impl BackgroundSwarm {
    /// Build a swarm with timers scattered across one cycle of `clock`.
    pub fn new(
        clock: PhaseClock,
        section: &BackgroundSection,
        max_delta_seconds: f64,
        rng: &mut impl Rng,
    ) -> Self {
        let sampler = BackgroundPhaseSampler::from_clock(clock);
        let timers = sampler.scatter_timers(section.swarm_size, rng);
        debug!(swarm = timers.len(), "background swarm scattered");
        Self {
            sampler,
            timers,
            max_delta_seconds,
            report_interval_ticks: section.report_interval_ticks,
            rng: StdRng::from_rng(rng),
        }
    }

    /// Number of decorative cells.
    pub fn len(&self) -> usize {
        self.timers.len()
    }

    /// Whether the swarm is empty.
    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Count of decorative cells per phase, in timeline order.
    pub fn histogram(&self) -> Vec<(Phase, usize)> {
        let phases = self.sampler.sample(&self.timers);
        self.sampler
            .clock()
            .timeline()
            .phases()
            .iter()
            .map(|&phase| (phase, phases.iter().filter(|&&p| p == phase).count()))
            .collect()
    }

    /// Follow one completed frame.
    pub fn on_frame(&mut self, summary: &TickSummary, clock: &PhaseClock) {
        if summary
            .events
            .iter()
            .any(|e| matches!(e, SimulationEvent::ModeChanged { .. }))
        {
            self.sampler = BackgroundPhaseSampler::from_clock(clock.clone());
            self.timers = self.sampler.scatter_timers(self.timers.len(), &mut self.rng);
            debug!(phases = clock.timeline().len(), "background swarm rescattered");
        }

        if summary.frame.playing {
            BackgroundPhaseSampler::advance(
                &mut self.timers,
                summary.applied_delta_seconds,
                self.max_delta_seconds,
            );
            self.sampler.wrap(&mut self.timers);
        } else if let Some(phase) = summary.pinned_phase {
            if !self.sampler.pin(&mut self.timers, phase) {
                debug!(phase = %phase, "manual phase not in background timeline");
            }
        }

        if summary.tick.checked_rem(self.report_interval_ticks) == Some(0) {
            self.report(summary.tick);
        }
    }

    /// Log the phase histogram.
    fn report(&self, tick: u64) {
        let histogram = self
            .histogram()
            .iter()
            .map(|(phase, count)| format!("{phase}={count}"))
            .collect::<Vec<_>>()
            .join(" ");
        info!(tick, swarm = self.timers.len(), histogram = %histogram, "background swarm phases");
    }
}
