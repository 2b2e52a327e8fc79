//! Node identity for coordinates coming out of ingest.
//!
//! Two segment endpoints become the same graph node iff their keys are equal.

use geo::Coord;
use serde::{Deserialize, Serialize};

use crate::Error;

/// Hashable identity of a graph node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKey {
    /// Raw IEEE-754 bit patterns of x and y
    Exact(u64, u64),
    /// Grid cell of a quantised coordinate
    Cell(i64, i64),
}

/// How coordinates are turned into node keys
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum NodeKeyPolicy {
    /// Bit-exact coordinate match. Values differing in the last bit are
    /// different nodes.
    #[default]
    Exact,
    /// Coordinates are rounded to the nearest multiple of `precision`.
    Snapped { precision: f64 },
}

impl NodeKeyPolicy {
    pub fn snapped(precision: f64) -> Result<Self, Error> {
        if precision.is_finite() && precision > 0.0 {
            Ok(Self::Snapped { precision })
        } else {
            Err(Error::InvalidInput(format!(
                "node key precision must be positive, got {precision}"
            )))
        }
    }

    pub fn key(&self, coord: Coord<f64>) -> NodeKey {
        match *self {
            // Adding 0.0 folds -0.0 into 0.0 so both signs share a node
            Self::Exact => NodeKey::Exact((coord.x + 0.0).to_bits(), (coord.y + 0.0).to_bits()),
            #[allow(clippy::cast_possible_truncation)]
            Self::Snapped { precision } => NodeKey::Cell(
                (coord.x / precision).round() as i64,
                (coord.y / precision).round() as i64,
            ),
        }
    }
}
