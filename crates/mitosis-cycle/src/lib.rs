//! Phase timelines and phase clock math for the Mitosis Lab simulation.
//!
//! Everything in this crate is pure: no per-cell state, no events. Cells,
//! the population, and the background swarm all derive their phase from the
//! functions here.
//!
//! # Modules
//!
//! - [`timeline`] -- [`PhaseTimeline`]: the ordered phase sequence per mode.
//! - [`clock`] -- [`PhaseClock`]: elapsed time to phase, pinning, delta clamping.
//! - [`background`] -- [`BackgroundPhaseSampler`] for decorative swarms.
//! - [`error`] -- [`CycleError`] configuration errors.

pub mod background;
pub mod clock;
pub mod error;
pub mod timeline;

pub use background::{BackgroundPhaseSampler, phase_at};
pub use clock::{PIN_EPSILON_FRACTION, PhaseClock, current_phase, sanitize_delta};
pub use error::CycleError;
pub use timeline::{PhaseTimeline, phases_for_mode};
