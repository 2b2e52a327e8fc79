//! Nearest-node lookup for snapping query coordinates onto the graph.

use geo::Point;
use petgraph::graph::NodeIndex;
use rstar::{RTree, primitives::GeomWithData};
use serde::{Deserialize, Serialize};

/// Node coordinate tagged with its graph index
pub type IndexedPoint = GeomWithData<[f64; 2], NodeIndex>;

/// Finds the graph node closest (squared Euclidean distance) to a query point.
///
/// Implementations must be deterministic: the same query against the same
/// node set always yields the same node.
pub trait NearestNode: Send + Sync + std::fmt::Debug {
    fn nearest(&self, query: &Point<f64>) -> Option<NodeIndex>;
}

/// Which [`NearestNode`] implementation a graph is built with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpatialIndexKind {
    #[default]
    RTree,
    LinearScan,
}

impl SpatialIndexKind {
    pub(crate) fn build(self, points: Vec<IndexedPoint>) -> Box<dyn NearestNode> {
        match self {
            Self::RTree => Box::new(RTreeLocator::new(points)),
            Self::LinearScan => Box::new(LinearScanLocator::new(points)),
        }
    }
}

/// R-tree backed locator, O(log n) per query
#[derive(Debug)]
pub struct RTreeLocator {
    tree: RTree<IndexedPoint>,
}

impl RTreeLocator {
    pub fn new(points: Vec<IndexedPoint>) -> Self {
        Self {
            tree: RTree::bulk_load(points),
        }
    }
}

impl NearestNode for RTreeLocator {
    fn nearest(&self, query: &Point<f64>) -> Option<NodeIndex> {
        self.tree
            .nearest_neighbor(&[query.x(), query.y()])
            .map(|found| found.data)
    }
}

/// Brute-force scan over every node, O(n) per query.
/// Ties resolve to the node inserted first.
#[derive(Debug)]
pub struct LinearScanLocator {
    points: Vec<IndexedPoint>,
}

impl LinearScanLocator {
    pub fn new(points: Vec<IndexedPoint>) -> Self {
        Self { points }
    }
}

impl NearestNode for LinearScanLocator {
    fn nearest(&self, query: &Point<f64>) -> Option<NodeIndex> {
        self.points
            .iter()
            .map(|point| {
                let [x, y] = *point.geom();
                let (dx, dy) = (x - query.x(), y - query.y());
                (dx * dx + dy * dy, point.data)
            })
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, node)| node)
    }
}
