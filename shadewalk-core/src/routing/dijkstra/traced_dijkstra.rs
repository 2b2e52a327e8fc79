use std::collections::BinaryHeap;

use hashbrown::HashMap;
use petgraph::graph::{EdgeIndex, NodeIndex};

use super::state::State;
use crate::WeightedView;

/// Nodes and edges of a shortest path, in travel order
#[derive(Debug, Clone, PartialEq)]
pub struct TracedPath {
    pub nodes: Vec<NodeIndex>,
    pub edges: Vec<EdgeIndex>,
    /// Total cost under the weighting that was searched
    pub cost: f64,
}

/// Dijkstra's algorithm over a weighted view, stopping once `target` is settled.
/// Edges with a non-finite weight are never traversed.
///
/// Returns `None` if `target` is unreachable from `start`.
pub fn dijkstra_path(
    view: &WeightedView<'_>,
    start: NodeIndex,
    target: NodeIndex,
) -> Option<TracedPath> {
    let graph = view.graph();
    let estimated_nodes = graph.node_count().min(1000);
    let mut distances: HashMap<NodeIndex, f64> = HashMap::with_capacity(estimated_nodes);
    // Predecessor node and the edge used to reach each node
    let mut predecessors: HashMap<NodeIndex, (NodeIndex, EdgeIndex)> =
        HashMap::with_capacity(estimated_nodes);
    let mut heap = BinaryHeap::with_capacity(estimated_nodes / 4);

    heap.push(State {
        cost: 0.0,
        node: start,
    });
    distances.insert(start, 0.0);

    while let Some(State { cost, node }) = heap.pop() {
        if node == target {
            break;
        }

        // Skip if we've found a better path
        if let Some(&best) = distances.get(&node)
            && cost > best
        {
            continue;
        }

        for (next, edge) in graph.neighbours(node) {
            let weight = view.weight(edge);
            if !weight.is_finite() {
                continue;
            }
            let next_cost = cost + weight;

            match distances.entry(next) {
                hashbrown::hash_map::Entry::Vacant(entry) => {
                    entry.insert(next_cost);
                    predecessors.insert(next, (node, edge));
                    heap.push(State {
                        cost: next_cost,
                        node: next,
                    });
                }
                hashbrown::hash_map::Entry::Occupied(mut entry) => {
                    if next_cost < *entry.get() {
                        *entry.get_mut() = next_cost;
                        predecessors.insert(next, (node, edge));
                        heap.push(State {
                            cost: next_cost,
                            node: next,
                        });
                    }
                }
            }
        }
    }

    let cost = *distances.get(&target)?;

    // Follow predecessors backward from target to start
    let mut nodes = vec![target];
    let mut edges = Vec::new();
    let mut current = target;
    while current != start {
        let &(prev, edge) = predecessors.get(&current)?;
        nodes.push(prev);
        edges.push(edge);
        current = prev;
    }
    nodes.reverse();
    edges.reverse();

    Some(TracedPath { nodes, edges, cost })
}
