//! Data model for shade-aware walkway routing

pub mod sun;
pub mod walkway;

pub use sun::SunPosition;
pub use walkway::{
    EdgeView, IndexedPoint, NodeKey, NodeKeyPolicy, SpatialIndexKind, WalkEdge, WalkGraph,
    WalkNode, WeightedView,
};

/// Name of a geometry variant, for diagnostics
pub(crate) fn geometry_kind(geometry: &geo::Geometry<f64>) -> &'static str {
    match geometry {
        geo::Geometry::Point(_) => "Point",
        geo::Geometry::Line(_) => "Line",
        geo::Geometry::LineString(_) => "LineString",
        geo::Geometry::Polygon(_) => "Polygon",
        geo::Geometry::MultiPoint(_) => "MultiPoint",
        geo::Geometry::MultiLineString(_) => "MultiLineString",
        geo::Geometry::MultiPolygon(_) => "MultiPolygon",
        geo::Geometry::GeometryCollection(_) => "GeometryCollection",
        geo::Geometry::Rect(_) => "Rect",
        geo::Geometry::Triangle(_) => "Triangle",
    }
}
