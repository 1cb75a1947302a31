//! Population ownership for the Mitosis Lab simulation.
//!
//! The [`GenerationTree`] holds every live cell, indexes cells by
//! generation, places new cells on concentric rings ([`RingLayout`]), and
//! keeps the lookup-only table of render handles. It turns division and
//! death edges into inserts and removals and reports each change as a
//! `SimulationEvent` in its outbox.
//!
//! # Modules
//!
//! - [`tree`] -- [`GenerationTree`]
//! - [`layout`] -- [`RingLayout`] placement rule
//! - [`error`] -- [`PopulationError`]

pub mod error;
pub mod layout;
pub mod tree;

pub use error::PopulationError;
pub use layout::RingLayout;
pub use tree::GenerationTree;
