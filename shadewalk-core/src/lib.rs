//! Shade-aware pedestrian routing over a walkway network.
//!
//! The walkway graph is built once from line geometries, query points are
//! snapped to its nodes and routes are searched either on physical length or
//! on a per-request weighting that favours edges lying in building shadows.

pub mod error;
pub mod loading;
pub mod model;
pub mod prelude;
pub mod routing;
pub mod shade;

pub use error::Error;
pub use loading::{GraphConfig, build_walk_graph, parse_wkt_geometries};
pub use model::{
    NodeKey, NodeKeyPolicy, SpatialIndexKind, SunPosition, WalkEdge, WalkGraph, WalkNode,
    WeightedView,
};
pub use routing::{Route, RoutingEngine, ShadedRoute, Weighting, shortest_route};
pub use shade::{
    CacheMode, ShadePolicy, ShadowCache, ShadowCacheConfig, ShadowFeature, ShadowIndex,
    ShadowLookup, ShadowSnapshot, ShadowSource, shade_weighted_view,
};

/// Length in meters (or whatever linear unit the graph projection uses)
pub type Meters = f64;
