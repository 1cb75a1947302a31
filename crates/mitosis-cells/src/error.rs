//! Error types for the mitosis-cells crate.
//!
//! Lifecycle ticks never fail; these errors come from validating
//! configuration before the first tick.

use mitosis_cycle::CycleError;

/// Errors raised while configuring cell lifecycles.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CellError {
    /// Lifespan bounds are not finite, not positive, or out of order.
    #[error("invalid lifespan range [{min}, {max}]: bounds must be finite, positive, and min <= max")]
    InvalidLifespan {
        /// Lower bound in seconds.
        min: f64,
        /// Upper bound in seconds.
        max: f64,
    },

    /// A division must request at least one child.
    #[error("children_per_division must be at least 1")]
    NoChildrenPerDivision,

    /// The phase clock could not be built.
    #[error("cycle error: {source}")]
    Cycle {
        /// The underlying cycle error.
        #[from]
        source: CycleError,
    },
}
