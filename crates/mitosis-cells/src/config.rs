//! Tunable parameters for cell lifecycles.
//!
//! The [`LifecycleConfig`] struct bundles every lifecycle tunable so that
//! callers (tick cycle, tests) can override defaults. The core crate builds
//! it from the `lifecycle` section of `mitosis-config.yaml`.

use mitosis_types::DeathBoundary;
use rand::Rng;

use crate::error::CellError;

/// Configuration for per-cell lifecycle evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct LifecycleConfig {
    /// Shortest lifespan a new cell can draw, in seconds (default: 60).
    pub lifespan_min_seconds: f64,

    /// Longest lifespan a new cell can draw, in seconds (default: 90).
    pub lifespan_max_seconds: f64,

    /// Whether reaching the lifespan exactly is fatal (default: exclusive).
    pub death_boundary: DeathBoundary,

    /// Spawn requests issued per division edge (default: 1).
    pub children_per_division: u32,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            lifespan_min_seconds: 60.0,
            lifespan_max_seconds: 90.0,
            death_boundary: DeathBoundary::Exclusive,
            children_per_division: 1,
        }
    }
}

impl LifecycleConfig {
    /// Check the bounds and counts before any cell is created.
    ///
    /// # Errors
    ///
    /// Returns [`CellError::InvalidLifespan`] for bad lifespan bounds and
    /// [`CellError::NoChildrenPerDivision`] for a zero child count.
    pub fn validate(&self) -> Result<(), CellError> {
        let (min, max) = (self.lifespan_min_seconds, self.lifespan_max_seconds);
        if !min.is_finite() || !max.is_finite() || min <= 0.0 || min > max {
            return Err(CellError::InvalidLifespan { min, max });
        }
        if self.children_per_division == 0 {
            return Err(CellError::NoChildrenPerDivision);
        }
        Ok(())
    }

    /// Draw a lifespan uniformly from `[min, max]`.
    ///
    /// Assumes the config has been validated; a degenerate range returns
    /// the lower bound.
    pub fn sample_lifespan(&self, rng: &mut impl Rng) -> f64 {
        let (min, max) = (self.lifespan_min_seconds, self.lifespan_max_seconds);
        if max > min {
            rng.random_range(min..=max)
        } else {
            min
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = LifecycleConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.children_per_division, 1);
        assert_eq!(config.death_boundary, DeathBoundary::Exclusive);
    }

    #[test]
    fn rejects_inverted_or_non_positive_lifespans() {
        let inverted = LifecycleConfig {
            lifespan_min_seconds: 90.0,
            lifespan_max_seconds: 60.0,
            ..LifecycleConfig::default()
        };
        assert!(matches!(inverted.validate(), Err(CellError::InvalidLifespan { .. })));

        let zero = LifecycleConfig {
            lifespan_min_seconds: 0.0,
            ..LifecycleConfig::default()
        };
        assert!(zero.validate().is_err());

        let nan = LifecycleConfig {
            lifespan_max_seconds: f64::NAN,
            ..LifecycleConfig::default()
        };
        assert!(nan.validate().is_err());
    }

    #[test]
    fn rejects_zero_children() {
        let config = LifecycleConfig {
            children_per_division: 0,
            ..LifecycleConfig::default()
        };
        assert_eq!(config.validate(), Err(CellError::NoChildrenPerDivision));
    }

    #[test]
    fn sampled_lifespans_stay_in_bounds() {
        let config = LifecycleConfig::default();
        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..1_000 {
            let lifespan = config.sample_lifespan(&mut rng);
            assert!((60.0..=90.0).contains(&lifespan));
        }
    }

    #[test]
    fn fixed_lifespan_when_bounds_match() {
        let config = LifecycleConfig {
            lifespan_min_seconds: 65.0,
            lifespan_max_seconds: 65.0,
            ..LifecycleConfig::default()
        };
        let mut rng = SmallRng::seed_from_u64(1);
        assert_eq!(config.sample_lifespan(&mut rng).to_bits(), 65.0_f64.to_bits());
    }
}
