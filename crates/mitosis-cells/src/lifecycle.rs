//! Per-cell lifecycle state machine.
//!
//! States: [`LifecycleState::Alive`], [`LifecycleState::Dividing`] (held for
//! exactly the tick on which the division edge fired), and
//! [`LifecycleState::Dead`] (terminal).
//!
//! # Order of operations per tick
//!
//! 1. Settle a `Dividing` cell back to `Alive`
//! 2. Advance the cycle timer and total age
//! 3. Recompute the phase from the advanced timer
//! 4. Check death (age against lifespan); death wins over division
//! 5. Check the division edge
//!
//! # Division edge
//!
//! Division fires on the falling edge of the timeline's terminal phase,
//! which is the tick on which the timer wraps into a new cycle. A tick
//! large enough to jump over the terminal phase still wraps, so it still
//! counts. The `divided_this_cycle` flag blocks a second firing until the
//! cell enters the terminal phase again.

use mitosis_cycle::PhaseClock;
use mitosis_types::{LifecycleState, Phase};
use rand::Rng;

use crate::config::LifecycleConfig;

/// A lifecycle transition produced by one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The cell left its terminal phase; the population should spawn
    /// `children` new cells from it.
    Divided {
        /// Number of spawn requests for this edge.
        children: u32,
    },
    /// The cell exceeded its lifespan.
    Died,
}

/// Timer, lifespan, and edge-detection state for one cell.
#[derive(Debug, Clone, PartialEq)]
pub struct CellLifecycle {
    /// Seconds into the current cycle, kept in `[0, cycle_duration)`.
    timer: f64,
    /// Total running seconds since creation. Never wraps.
    age: f64,
    /// Age past which the cell dies. Fixed at creation.
    lifespan: f64,
    /// Phase observed on the most recent tick (or pin).
    phase: Phase,
    /// Set when a division fires; cleared on re-entering the terminal phase.
    divided_this_cycle: bool,
    /// Current state.
    state: LifecycleState,
    /// Number of division edges fired so far.
    divisions: u32,
}

impl CellLifecycle {
    /// Create a lifecycle at the start of a cycle with a fixed lifespan.
    pub fn new(lifespan: f64, clock: &PhaseClock) -> Self {
        Self {
            timer: 0.0,
            age: 0.0,
            lifespan,
            phase: clock.current_phase(0.0),
            divided_this_cycle: false,
            state: LifecycleState::Alive,
            divisions: 0,
        }
    }

    /// Create a lifecycle with a lifespan drawn from `config`.
    pub fn spawn(config: &LifecycleConfig, clock: &PhaseClock, rng: &mut impl Rng) -> Self {
        Self::new(config.sample_lifespan(rng), clock)
    }

    /// Seconds into the current cycle.
    pub const fn timer(&self) -> f64 {
        self.timer
    }

    /// Total running seconds.
    pub const fn age(&self) -> f64 {
        self.age
    }

    /// Lifespan in seconds.
    pub const fn lifespan(&self) -> f64 {
        self.lifespan
    }

    /// Phase as of the last tick or pin.
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Current lifecycle state.
    pub const fn state(&self) -> LifecycleState {
        self.state
    }

    /// Whether the cell is dead.
    pub fn is_dead(&self) -> bool {
        self.state == LifecycleState::Dead
    }

    /// Whether a division already fired in the current terminal window.
    pub const fn has_divided_this_cycle(&self) -> bool {
        self.divided_this_cycle
    }

    /// Number of divisions fired so far.
    pub const fn divisions(&self) -> u32 {
        self.divisions
    }

    /// Run one tick. `delta` must already be clamped by the caller; a
    /// non-positive delta leaves timers untouched and emits nothing.
    pub fn advance(
        &mut self,
        delta: f64,
        clock: &PhaseClock,
        config: &LifecycleConfig,
    ) -> Option<Transition> {
        if self.state == LifecycleState::Dead {
            return None;
        }
        self.state = LifecycleState::Alive;
        if !delta.is_finite() || delta <= 0.0 {
            return None;
        }

        let previous_timer = self.timer;
        let previous_phase = self.phase;
        self.timer += delta;
        self.age += delta;
        self.phase = clock.current_phase(self.timer);

        let wrapped = clock.cycle_index(self.timer) > clock.cycle_index(previous_timer);
        if wrapped {
            self.timer = self.timer.rem_euclid(clock.cycle_duration());
        }

        if config.death_boundary.is_exceeded(self.age, self.lifespan) {
            self.state = LifecycleState::Dead;
            return Some(Transition::Died);
        }

        let terminal = clock.timeline().terminal();
        if previous_phase != terminal && (self.phase == terminal || wrapped) {
            self.divided_this_cycle = false;
        }

        if wrapped && !self.divided_this_cycle {
            // Landing inside the next terminal window already opens a fresh one.
            self.divided_this_cycle = self.phase != terminal;
            self.state = LifecycleState::Dividing;
            self.divisions = self.divisions.saturating_add(1);
            return Some(Transition::Divided {
                children: config.children_per_division,
            });
        }

        None
    }

    /// Set the timer so the cell reads as `phase` (manual scrubbing while
    /// paused). Age is not touched. Returns `false` if `phase` is not in the
    /// clock's timeline or the cell is dead.
    pub fn pin(&mut self, clock: &PhaseClock, phase: Phase) -> bool {
        if self.is_dead() {
            return false;
        }
        let Some(elapsed) = clock.pinned_elapsed(phase) else {
            return false;
        };
        let terminal = clock.timeline().terminal();
        if phase == terminal && self.phase != terminal {
            self.divided_this_cycle = false;
        }
        self.timer = elapsed;
        self.phase = phase;
        true
    }

    /// Restart the cycle under a (possibly new) clock. Age, lifespan, and the
    /// division count are kept; a dead cell stays dead.
    pub fn reset(&mut self, clock: &PhaseClock) {
        self.timer = 0.0;
        self.phase = clock.current_phase(0.0);
        self.divided_this_cycle = false;
        if self.state == LifecycleState::Dividing {
            self.state = LifecycleState::Alive;
        }
    }
}
