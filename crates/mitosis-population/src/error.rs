//! Error types for the mitosis-population crate.

/// Errors raised while configuring the population.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PopulationError {
    /// The ring layout cannot place cells.
    #[error("invalid layout: {reason}")]
    InvalidLayout {
        /// What is wrong with the layout.
        reason: String,
    },

    /// A population cap of zero would reject every cell.
    #[error("max_cells must be at least 1 when set")]
    ZeroCapacity,
}
