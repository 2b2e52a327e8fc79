use geo::{Coord, LineString, Point};
use geojson::{Feature, Geometry, Value as GeoJsonValue};
use petgraph::graph::NodeIndex;
use serde_json::{Map, Value as JsonValue, json};

use super::dijkstra::dijkstra_path;
use crate::{Error, Meters, WeightedView};

/// Path through the walkway graph
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    /// Node coordinates from source to target
    pub points: Vec<Point<f64>>,
    /// Physical length: sum of base edge weights along the path
    pub length: Meters,
    /// Cost under the weighting the route was searched with
    pub cost: f64,
}

impl Route {
    /// Converts the route to a `GeoJSON` LineString feature.
    ///
    /// `extra` is merged into the feature properties next to `length` and
    /// `cost`. A single-node route is emitted as a degenerate two-position line.
    pub fn to_geojson(&self, extra: Map<String, JsonValue>) -> Result<Feature, Error> {
        let mut coords: Vec<Coord<f64>> = self.points.iter().map(|p| p.0).collect();
        if coords.len() == 1 {
            coords.push(coords[0]);
        }
        let geometry = Geometry::new(GeoJsonValue::from(&LineString::new(coords)));

        let mut properties = Map::new();
        properties.insert("length".to_string(), json!(self.length));
        properties.insert("cost".to_string(), json!(self.cost));
        properties.extend(extra);

        let value = json!({
            "type": "Feature",
            "geometry": geometry,
            "properties": properties,
        });

        serde_json::from_value::<Feature>(value).map_err(|e| Error::GeoJsonError(e.to_string()))
    }
}

/// Minimum-cost path between two graph nodes under `view`.
///
/// The reported length is physical distance from base weights, whatever
/// weighting was searched.
///
/// # Errors
///
/// Returns [`Error::NoPath`] when the nodes are in different components, and
/// [`Error::InvalidInput`] for node indices not in the graph.
pub fn shortest_route(
    view: &WeightedView<'_>,
    source: NodeIndex,
    target: NodeIndex,
) -> Result<Route, Error> {
    let graph = view.graph();
    let (Some(from), Some(to)) = (graph.node_point(source), graph.node_point(target)) else {
        return Err(Error::InvalidInput("node is not part of the graph".to_string()));
    };

    let path = dijkstra_path(view, source, target).ok_or(Error::NoPath { from, to })?;

    let length = path
        .edges
        .iter()
        .filter_map(|&edge| graph.edge(edge))
        .map(|edge| edge.length)
        .sum();
    let points = path
        .nodes
        .iter()
        .filter_map(|&node| graph.node_point(node))
        .collect();

    Ok(Route {
        points,
        length,
        cost: path.cost,
    })
}
