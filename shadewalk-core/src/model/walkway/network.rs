//! Undirected walkway graph with a nearest-node index.

use geo::{Line, Point};
use petgraph::{
    graph::{EdgeIndex, NodeIndex, UnGraph},
    visit::EdgeRef,
};
use rayon::prelude::*;

use super::{
    components::{WalkEdge, WalkNode},
    locator::{IndexedPoint, NearestNode, SpatialIndexKind},
    view::WeightedView,
};
use crate::{Error, Meters};

/// Read-only walkway network.
///
/// Built once by [`crate::build_walk_graph`]; per-request weightings are
/// expressed as [`WeightedView`]s borrowing this graph.
#[derive(Debug)]
pub struct WalkGraph {
    pub(crate) graph: UnGraph<WalkNode, WalkEdge>,
    locator: Box<dyn NearestNode>,
}

/// Borrowed edge data handed to weighting functions
#[derive(Debug, Clone, Copy)]
pub struct EdgeView<'g> {
    pub index: EdgeIndex,
    pub edge: &'g WalkEdge,
    pub segment: Line<f64>,
}

impl WalkGraph {
    pub(crate) fn new(graph: UnGraph<WalkNode, WalkEdge>, index_kind: SpatialIndexKind) -> Self {
        let points = graph
            .node_indices()
            .map(|node| {
                let geometry = graph[node].geometry;
                IndexedPoint::new([geometry.x(), geometry.y()], node)
            })
            .collect();

        Self {
            locator: index_kind.build(points),
            graph,
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn nodes(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    pub fn node_point(&self, node: NodeIndex) -> Option<Point<f64>> {
        self.graph.node_weight(node).map(|n| n.geometry)
    }

    pub fn edge(&self, edge: EdgeIndex) -> Option<&WalkEdge> {
        self.graph.edge_weight(edge)
    }

    /// Straight segment between the two endpoints of an edge
    pub fn segment(&self, edge: EdgeIndex) -> Option<Line<f64>> {
        let (a, b) = self.graph.edge_endpoints(edge)?;
        Some(Line::new(
            self.graph[a].geometry.0,
            self.graph[b].geometry.0,
        ))
    }

    /// Iterates over `(neighbour, edge)` pairs incident to `node`
    pub fn neighbours(&self, node: NodeIndex) -> impl Iterator<Item = (NodeIndex, EdgeIndex)> + '_ {
        self.graph.edges(node).map(move |edge| {
            let other = if edge.source() == node {
                edge.target()
            } else {
                edge.source()
            };
            (other, edge.id())
        })
    }

    /// Node minimising squared Euclidean distance to `query`
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyGraph`] if the graph has no nodes.
    pub fn nearest_node(&self, query: &Point<f64>) -> Result<NodeIndex, Error> {
        self.locator.nearest(query).ok_or(Error::EmptyGraph)
    }

    /// Coordinates of the node returned by [`Self::nearest_node`]
    pub fn nearest_point(&self, query: &Point<f64>) -> Result<Point<f64>, Error> {
        let node = self.nearest_node(query)?;
        Ok(self.graph[node].geometry)
    }

    /// Every edge weighted by its physical length
    pub fn base_view(&self) -> WeightedView<'_> {
        let weights = self
            .graph
            .edge_weights()
            .map(WalkEdge::base_weight)
            .collect();
        WeightedView::new(self, weights)
    }

    /// Effective weight of every edge recomputed by `adjust`.
    ///
    /// The base graph is untouched so any number of views can coexist.
    /// `adjust` should return a non-negative weight; a non-finite weight makes
    /// the edge impassable.
    pub fn weighted_view<F>(&self, adjust: F) -> WeightedView<'_>
    where
        F: Fn(EdgeView<'_>) -> Meters + Sync,
    {
        let edges: Vec<_> = self
            .graph
            .edge_references()
            .map(|edge| {
                let segment = Line::new(
                    self.graph[edge.source()].geometry.0,
                    self.graph[edge.target()].geometry.0,
                );
                EdgeView {
                    index: edge.id(),
                    edge: edge.weight(),
                    segment,
                }
            })
            .collect();
        let weights = edges.into_par_iter().map(&adjust).collect();
        WeightedView::new(self, weights)
    }
}
