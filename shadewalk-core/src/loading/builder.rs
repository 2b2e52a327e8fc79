use geo::{Coord, Geometry, LineString};
use hashbrown::HashMap;
use log::{info, warn};
use petgraph::graph::{NodeIndex, UnGraph};

use super::config::GraphConfig;
use crate::{
    Error, WalkGraph,
    model::{NodeKey, NodeKeyPolicy, WalkEdge, WalkNode, geometry_kind},
};

/// Builds the walkway graph from line and multi-line geometries.
///
/// Every consecutive coordinate pair becomes one edge weighted by its
/// Euclidean length; endpoints with equal node keys are shared. Other geometry
/// types are skipped with a warning.
///
/// # Errors
///
/// Returns [`Error::EmptyGraph`] if no edge could be built, since an engine
/// without a graph cannot serve any route.
pub fn build_walk_graph<I>(geometries: I, config: &GraphConfig) -> Result<WalkGraph, Error>
where
    I: IntoIterator<Item = Geometry<f64>>,
{
    let mut builder = GraphBuilder::new(config.node_key);
    let mut skipped = 0usize;

    for geometry in geometries {
        match geometry {
            Geometry::LineString(line) => builder.add_line(&line),
            Geometry::MultiLineString(lines) => {
                for line in &lines.0 {
                    builder.add_line(line);
                }
            }
            other => {
                skipped += 1;
                warn!("Unsupported geometry type: {}", geometry_kind(&other));
            }
        }
    }

    if builder.graph.edge_count() == 0 {
        return Err(Error::EmptyGraph);
    }

    info!(
        "Walkway graph built: {} nodes, {} edges ({} geometries skipped, {} invalid segments)",
        builder.graph.node_count(),
        builder.graph.edge_count(),
        skipped,
        builder.invalid_segments
    );

    Ok(WalkGraph::new(builder.graph, config.spatial_index))
}

struct GraphBuilder {
    graph: UnGraph<WalkNode, WalkEdge>,
    nodes: HashMap<NodeKey, NodeIndex>,
    policy: NodeKeyPolicy,
    invalid_segments: usize,
}

impl GraphBuilder {
    fn new(policy: NodeKeyPolicy) -> Self {
        Self {
            graph: UnGraph::default(),
            nodes: HashMap::new(),
            policy,
            invalid_segments: 0,
        }
    }

    fn add_line(&mut self, line: &LineString<f64>) {
        for segment in line.lines() {
            let (start, end) = (segment.start, segment.end);
            if !is_finite(start) || !is_finite(end) {
                self.invalid_segments += 1;
                continue;
            }
            let length = (end.x - start.x).hypot(end.y - start.y);
            let a = self.node(start);
            let b = self.node(end);
            self.graph.add_edge(a, b, WalkEdge { length });
        }
    }

    fn node(&mut self, coord: Coord<f64>) -> NodeIndex {
        let key = self.policy.key(coord);
        *self.nodes.entry(key).or_insert_with(|| {
            self.graph.add_node(WalkNode {
                geometry: coord.into(),
            })
        })
    }
}

fn is_finite(coord: Coord<f64>) -> bool {
    coord.x.is_finite() && coord.y.is_finite()
}
