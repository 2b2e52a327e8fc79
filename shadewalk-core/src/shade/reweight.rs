use serde::{Deserialize, Serialize};

use super::index::ShadowLookup;
use crate::{Error, WalkGraph, WeightedView};

/// Multipliers applied to base edge lengths when routing for shade
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadePolicy {
    /// Applied to edges touching or crossing a shadow
    pub shaded_factor: f64,
    /// Applied to every other edge
    pub sunny_factor: f64,
}

impl Default for ShadePolicy {
    fn default() -> Self {
        Self {
            shaded_factor: 0.5,
            sunny_factor: 2.0,
        }
    }
}

impl ShadePolicy {
    /// # Errors
    ///
    /// Both factors must be positive and finite.
    pub fn new(shaded_factor: f64, sunny_factor: f64) -> Result<Self, Error> {
        let policy = Self {
            shaded_factor,
            sunny_factor,
        };
        policy.validate()?;
        Ok(policy)
    }

    pub fn validate(&self) -> Result<(), Error> {
        for (name, value) in [
            ("shaded_factor", self.shaded_factor),
            ("sunny_factor", self.sunny_factor),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::InvalidInput(format!(
                    "{name} must be positive and finite, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Weighting of `graph` biased towards shadowed edges.
///
/// With no shadows at all the base weights are returned unchanged.
pub fn shade_weighted_view<'g, L>(
    graph: &'g WalkGraph,
    shadows: &L,
    policy: &ShadePolicy,
) -> WeightedView<'g>
where
    L: ShadowLookup + ?Sized,
{
    if shadows.is_empty() {
        return graph.base_view();
    }

    graph.weighted_view(|edge| {
        let factor = if shadows.is_shaded(&edge.segment) {
            policy.shaded_factor
        } else {
            policy.sunny_factor
        };
        edge.edge.length * factor
    })
}
