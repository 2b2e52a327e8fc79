use petgraph::graph::EdgeIndex;

use super::network::WalkGraph;
use crate::Meters;

/// Effective edge costs for one search, borrowing the base graph.
///
/// Indexed by edge index; the topology always comes from the base graph.
#[derive(Debug, Clone)]
pub struct WeightedView<'g> {
    graph: &'g WalkGraph,
    weights: Vec<Meters>,
}

impl<'g> WeightedView<'g> {
    pub(crate) fn new(graph: &'g WalkGraph, weights: Vec<Meters>) -> Self {
        debug_assert_eq!(weights.len(), graph.edge_count());
        Self { graph, weights }
    }

    pub fn graph(&self) -> &'g WalkGraph {
        self.graph
    }

    /// Effective cost of `edge`; unknown edges are impassable
    pub fn weight(&self, edge: EdgeIndex) -> Meters {
        self.weights
            .get(edge.index())
            .copied()
            .unwrap_or(f64::INFINITY)
    }

    pub fn weights(&self) -> &[Meters] {
        &self.weights
    }
}
