use geo::{Geometry, LineString, Point};
use shadewalk_core::{GraphConfig, WalkGraph, build_walk_graph, shortest_route};

/// 5x5 lattice with unit spacing plus a few long diagonals
fn lattice() -> WalkGraph {
    let mut lines: Vec<Geometry<f64>> = Vec::new();
    for i in 0..5 {
        let i = f64::from(i);
        lines.push(LineString::from(vec![(0.0, i), (1.0, i), (2.0, i), (3.0, i), (4.0, i)]).into());
        lines.push(LineString::from(vec![(i, 0.0), (i, 1.0), (i, 2.0), (i, 3.0), (i, 4.0)]).into());
    }
    lines.push(LineString::from(vec![(0.0, 0.0), (2.0, 2.0), (4.0, 4.0)]).into());
    lines.push(LineString::from(vec![(4.0, 0.0), (1.0, 3.0)]).into());
    build_walk_graph(lines, &GraphConfig::default()).unwrap()
}

/// All-pairs costs by Floyd-Warshall, indexed by node index
fn floyd_warshall(graph: &WalkGraph, weights: &[f64]) -> Vec<Vec<f64>> {
    let n = graph.node_count();
    let mut dist = vec![vec![f64::INFINITY; n]; n];
    for node in graph.nodes() {
        dist[node.index()][node.index()] = 0.0;
        for (next, edge) in graph.neighbours(node) {
            let w = weights[edge.index()];
            let cell = &mut dist[node.index()][next.index()];
            *cell = cell.min(w);
        }
    }
    for k in 0..n {
        for i in 0..n {
            for j in 0..n {
                let through = dist[i][k] + dist[k][j];
                if through < dist[i][j] {
                    dist[i][j] = through;
                }
            }
        }
    }
    dist
}

#[test]
fn dijkstra_matches_floyd_warshall_under_skewed_weights() {
    let graph = lattice();
    let view = graph.weighted_view(|edge| edge.edge.length * (1.0 + (edge.index.index() % 3) as f64));
    let expected = floyd_warshall(&graph, view.weights());

    let nodes: Vec<_> = graph.nodes().collect();
    for &source in &nodes {
        for &target in &nodes {
            let route = shortest_route(&view, source, target).unwrap();
            let want = expected[source.index()][target.index()];
            assert!(
                (route.cost - want).abs() < 1e-9,
                "{source:?} -> {target:?}: got {}, want {want}",
                route.cost
            );
        }
    }
}

#[test]
fn reported_length_follows_the_returned_points() {
    let graph = lattice();
    let view = graph.weighted_view(|edge| edge.edge.length * (1.0 + (edge.index.index() % 2) as f64));
    let source = graph.nearest_node(&Point::new(0.0, 4.0)).unwrap();
    let target = graph.nearest_node(&Point::new(4.0, 0.0)).unwrap();

    let route = shortest_route(&view, source, target).unwrap();

    let walked: f64 = route
        .points
        .windows(2)
        .map(|pair| (pair[1].x() - pair[0].x()).hypot(pair[1].y() - pair[0].y()))
        .sum();
    assert!((route.length - walked).abs() < 1e-9);
    assert_eq!(route.points.first(), Some(&Point::new(0.0, 4.0)));
    assert_eq!(route.points.last(), Some(&Point::new(4.0, 0.0)));

    // Simple path: no node visited twice
    let mut seen = route.points.clone();
    seen.sort_by(|a, b| (a.x(), a.y()).partial_cmp(&(b.x(), b.y())).unwrap());
    seen.dedup();
    assert_eq!(seen.len(), route.points.len());
}
