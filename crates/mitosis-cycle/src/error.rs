//! Error types for the mitosis-cycle crate.
//!
//! Every variant is a configuration error: it is raised when a mode or
//! timeline is selected, never from inside the per-tick phase math.

use mitosis_types::ParseModeError;

/// Errors raised while building a phase timeline or clock.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CycleError {
    /// The mode name does not match any preset.
    #[error("invalid mode: {source}")]
    InvalidMode {
        /// The underlying parse error.
        #[from]
        source: ParseModeError,
    },

    /// A timeline was built from an empty phase list.
    #[error("phase timeline is empty: at least one phase is required")]
    EmptyTimeline,

    /// The cycle duration is zero, negative, or not finite.
    #[error("invalid cycle duration {value}: must be finite and greater than zero")]
    InvalidCycleDuration {
        /// The rejected duration, in seconds.
        value: f64,
    },
}
