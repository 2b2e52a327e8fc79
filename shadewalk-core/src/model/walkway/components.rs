//! Walkway network components - nodes and edges

use geo::Point;

use crate::Meters;

/// Walkway graph node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WalkNode {
    /// Node coordinates, as first seen during ingest
    pub geometry: Point<f64>,
}

/// Walkway graph edge (one straight segment of a path)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WalkEdge {
    /// Euclidean length of the segment
    pub length: Meters,
}

impl WalkEdge {
    pub fn base_weight(&self) -> Meters {
        self.length
    }
}
