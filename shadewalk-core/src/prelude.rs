pub use crate::Meters;

// Graph construction
pub use crate::loading::{GraphConfig, build_walk_graph, parse_wkt_geometries};
pub use crate::model::{NodeKeyPolicy, SpatialIndexKind, SunPosition, WalkGraph, WeightedView};

// Shadows
pub use crate::shade::{
    CacheMode, ShadePolicy, ShadowCache, ShadowCacheConfig, ShadowFeature, ShadowSnapshot,
    ShadowSource, filter_shadow_features, parse_geojson_geometry, shade_weighted_view,
};

// Routing
pub use crate::routing::{Route, RoutingEngine, ShadedRoute, Weighting, shortest_route};
pub use crate::Error;
