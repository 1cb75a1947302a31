//! A tracked cell: identity, lineage, spatial anchor, and lifecycle.
//!
//! [`CellRecord::advance`] wraps [`CellLifecycle::advance`] and turns its
//! bare [`Transition`] into a [`LifecycleEvent`] carrying everything the
//! population needs to act on the edge later in the tick (parent position
//! and generation for spawning, age for the death notice).

use mitosis_cycle::PhaseClock;
use mitosis_types::{CellId, CellSnapshot, Position};
use rand::Rng;
use tracing::{debug, trace};

use crate::config::LifecycleConfig;
use crate::lifecycle::{CellLifecycle, Transition};

/// An edge raised by one cell during a tick.
///
/// Collected during the advance pass and applied to the population only
/// after every cell has been advanced.
#[derive(Debug, Clone, PartialEq)]
pub enum LifecycleEvent {
    /// The cell divided; spawn `children` new cells one generation down.
    Divided {
        /// The dividing cell.
        cell_id: CellId,
        /// The dividing cell's anchor.
        position: Position,
        /// The dividing cell's generation.
        generation: u32,
        /// Spawn requests issued for this edge.
        children: u32,
    },
    /// The cell exceeded its lifespan and must be removed.
    Died {
        /// The dying cell.
        cell_id: CellId,
        /// Its generation.
        generation: u32,
        /// Total running time at death.
        age_seconds: f64,
    },
}

impl LifecycleEvent {
    /// The cell that raised this event.
    pub const fn cell_id(&self) -> CellId {
        match self {
            Self::Divided { cell_id, .. } | Self::Died { cell_id, .. } => *cell_id,
        }
    }
}

/// One cell tracked by the generation tree.
#[derive(Debug, Clone, PartialEq)]
pub struct CellRecord {
    /// Unique identifier.
    pub id: CellId,
    /// Division steps from a founder.
    pub generation: u32,
    /// Spatial anchor, re-spread as its generation grows.
    pub position: Position,
    /// The cell this one was spawned from (`None` for founders).
    pub parent: Option<CellId>,
    /// Timer and lifespan state.
    pub lifecycle: CellLifecycle,
}

impl CellRecord {
    /// Create a record with a freshly drawn lifespan.
    pub fn spawn(
        generation: u32,
        position: Position,
        parent: Option<CellId>,
        config: &LifecycleConfig,
        clock: &PhaseClock,
        rng: &mut impl Rng,
    ) -> Self {
        Self {
            id: CellId::new(),
            generation,
            position,
            parent,
            lifecycle: CellLifecycle::spawn(config, clock, rng),
        }
    }

    /// Advance this cell by one tick and describe any edge it crossed.
    pub fn advance(
        &mut self,
        delta: f64,
        clock: &PhaseClock,
        config: &LifecycleConfig,
    ) -> Option<LifecycleEvent> {
        let transition = self.lifecycle.advance(delta, clock, config)?;
        match transition {
            Transition::Divided { children } => {
                trace!(
                    cell_id = %self.id,
                    generation = self.generation,
                    divisions = self.lifecycle.divisions(),
                    "cell division edge"
                );
                Some(LifecycleEvent::Divided {
                    cell_id: self.id,
                    position: self.position,
                    generation: self.generation,
                    children,
                })
            }
            Transition::Died => {
                debug!(
                    cell_id = %self.id,
                    generation = self.generation,
                    age = self.lifecycle.age(),
                    lifespan = self.lifecycle.lifespan(),
                    "cell exceeded lifespan"
                );
                Some(LifecycleEvent::Died {
                    cell_id: self.id,
                    generation: self.generation,
                    age_seconds: self.lifecycle.age(),
                })
            }
        }
    }

    /// Render row for the current tick.
    pub fn snapshot(&self, clock: &PhaseClock) -> CellSnapshot {
        CellSnapshot {
            cell_id: self.id,
            generation: self.generation,
            position: self.position,
            phase: self.lifecycle.phase(),
            state: self.lifecycle.state(),
            phase_progress: clock.progress_in_phase(self.lifecycle.timer()),
            age_seconds: self.lifecycle.age(),
        }
    }
}
