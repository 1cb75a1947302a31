//! Per-cell lifecycle tracking for the Mitosis Lab simulation.
//!
//! Each tracked cell owns a cycle timer, a total age, and a lifespan drawn
//! at creation. Advancing a cell yields at most one edge per tick: a
//! division (the cell left its timeline's terminal phase) or a death (its
//! age passed its lifespan). The population crate applies those edges.
//!
//! # Modules
//!
//! - [`config`] -- [`LifecycleConfig`] tunables
//! - [`lifecycle`] -- [`CellLifecycle`] state machine and [`Transition`]
//! - [`record`] -- [`CellRecord`] and the [`LifecycleEvent`] it emits
//! - [`error`] -- [`CellError`]

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod record;

pub use config::LifecycleConfig;
pub use error::CellError;
pub use lifecycle::{CellLifecycle, Transition};
pub use record::{CellRecord, LifecycleEvent};
