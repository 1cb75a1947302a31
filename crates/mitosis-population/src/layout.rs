//! Concentric-ring placement for cells within a generation.
//!
//! Sibling `i` of `n` in generation `g` sits on ring
//! `floor(i / ring_capacity)` at angle `(i / max(n, min_spread)) * 2pi`,
//! lifted `g * layer_height` above the origin. The result depends only on
//! `(g, i, n)` and the layout parameters, so repeated calls are bit-identical.

use std::f64::consts::TAU;

use mitosis_types::Position;
use serde::{Deserialize, Serialize};

use crate::error::PopulationError;

/// Convert a count to `f64` for layout math.
#[allow(clippy::cast_precision_loss)]
const fn count_as_f64(count: usize) -> f64 {
    count as f64
}

/// Ring layout parameters.
///
/// Deserializes from the `layout` section of the config file; missing
/// fields take their [`Default`] values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RingLayout {
    /// Radius of the innermost ring.
    pub base_radius: f64,
    /// Radial gap between consecutive rings.
    pub ring_spacing: f64,
    /// Siblings per ring before spilling outward.
    pub ring_capacity: usize,
    /// Lower bound on the angular divisor so small generations spread out.
    pub min_spread: usize,
    /// Vertical distance between generations.
    pub layer_height: f64,
}

impl Default for RingLayout {
    fn default() -> Self {
        Self {
            base_radius: 2.0,
            ring_spacing: 1.5,
            ring_capacity: 8,
            min_spread: 6,
            layer_height: 1.25,
        }
    }
}

impl RingLayout {
    /// Reject layouts that cannot place cells.
    ///
    /// # Errors
    ///
    /// Returns [`PopulationError::InvalidLayout`] for a zero ring capacity,
    /// zero spread, or a negative / non-finite distance.
    pub fn validate(&self) -> Result<(), PopulationError> {
        if self.ring_capacity == 0 {
            return Err(PopulationError::InvalidLayout {
                reason: "ring_capacity must be at least 1".to_owned(),
            });
        }
        if self.min_spread == 0 {
            return Err(PopulationError::InvalidLayout {
                reason: "min_spread must be at least 1".to_owned(),
            });
        }
        for (name, value) in [
            ("base_radius", self.base_radius),
            ("ring_spacing", self.ring_spacing),
            ("layer_height", self.layer_height),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(PopulationError::InvalidLayout {
                    reason: format!("{name} must be finite and non-negative, got {value}"),
                });
            }
        }
        Ok(())
    }

    /// Ring bucket for sibling index `i`.
    pub fn ring(&self, index: usize) -> usize {
        index.checked_div(self.ring_capacity).unwrap_or(0)
    }

    /// Radius of the ring holding sibling index `i`.
    pub fn radius(&self, index: usize) -> f64 {
        count_as_f64(self.ring(index)).mul_add(self.ring_spacing, self.base_radius)
    }

    /// Angle in radians for sibling `i` of `n`.
    pub fn angle(&self, index: usize, siblings: usize) -> f64 {
        let divisor = siblings.max(self.min_spread).max(1);
        count_as_f64(index) / count_as_f64(divisor) * TAU
    }

    /// Offset from the generation origin for sibling `i` of `n` in
    /// generation `g`.
    pub fn offset(&self, generation: u32, index: usize, siblings: usize) -> Position {
        let radius = self.radius(index);
        let angle = self.angle(index, siblings);
        Position::new(
            radius * angle.cos(),
            f64::from(generation) * self.layer_height,
            radius * angle.sin(),
        )
    }

    /// Absolute anchor: `origin` translated by [`RingLayout::offset`].
    pub fn position(&self, origin: Position, generation: u32, index: usize, siblings: usize) -> Position {
        origin.translated(self.offset(generation, index, siblings))
    }
}
