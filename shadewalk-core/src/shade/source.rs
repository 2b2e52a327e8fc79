use async_trait::async_trait;
use geo::{Geometry, HasDimensions};
use log::warn;

use crate::{Error, SunPosition, model::geometry_kind};

/// Ground shadow footprint of one building
#[derive(Debug, Clone, PartialEq)]
pub struct ShadowFeature {
    /// Id of the building the shadow belongs to
    pub id: i64,
    pub geometry: Geometry<f64>,
}

/// Producer of shadow footprints for a solar position.
///
/// Output is taken as authoritative: no reprojection, only type filtering
/// (see [`filter_shadow_features`]).
#[async_trait]
pub trait ShadowSource: Send + Sync {
    async fn fetch_shadows(&self, sun: SunPosition) -> Result<Vec<ShadowFeature>, Error>;
}

/// Keeps polygon, line and point shadows (and their multi variants) that are
/// not empty. Anything else is dropped with a warning.
pub fn filter_shadow_features(features: Vec<ShadowFeature>) -> Vec<ShadowFeature> {
    features
        .into_iter()
        .filter(|feature| {
            let supported = matches!(
                feature.geometry,
                Geometry::Polygon(_)
                    | Geometry::MultiPolygon(_)
                    | Geometry::LineString(_)
                    | Geometry::MultiLineString(_)
                    | Geometry::Point(_)
                    | Geometry::MultiPoint(_)
            );
            if !supported {
                warn!(
                    "Skipped unsupported shadow geometry {} for feature {}",
                    geometry_kind(&feature.geometry),
                    feature.id
                );
                return false;
            }
            if feature.geometry.is_empty() {
                warn!("Skipped empty shadow geometry for feature {}", feature.id);
                return false;
            }
            true
        })
        .collect()
}

/// Parses a GeoJSON geometry object (as produced by `ST_AsGeoJSON`)
///
/// # Errors
///
/// Returns [`Error::GeoJsonError`] for malformed JSON and
/// [`Error::UnsupportedGeometry`] when it cannot be expressed as a geometry.
pub fn parse_geojson_geometry(text: &str) -> Result<Geometry<f64>, Error> {
    let geometry: geojson::Geometry =
        serde_json::from_str(text).map_err(|e| Error::GeoJsonError(e.to_string()))?;
    Geometry::<f64>::try_from(geometry).map_err(|e| Error::UnsupportedGeometry(e.to_string()))
}

#[cfg(test)]
mod tests {
    use geo::{GeometryCollection, LineString, MultiPolygon, Point, polygon};

    use super::*;

    fn feature(id: i64, geometry: impl Into<Geometry<f64>>) -> ShadowFeature {
        ShadowFeature {
            id,
            geometry: geometry.into(),
        }
    }

    #[test]
    fn keeps_supported_non_empty_shapes() {
        let square = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 1.0)];
        let kept = filter_shadow_features(vec![
            feature(1, square),
            feature(2, Point::new(1.0, 2.0)),
            feature(3, LineString::from(vec![(0.0, 0.0), (1.0, 1.0)])),
            feature(4, Geometry::GeometryCollection(GeometryCollection::from(vec![Point::new(0.0, 0.0)]))),
            feature(5, MultiPolygon::<f64>::new(vec![])),
        ]);
        let ids: Vec<_> = kept.iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn parses_geojson_polygon() {
        let text = r#"{"type":"Polygon","coordinates":[[[0,0],[2,0],[2,2],[0,2],[0,0]]]}"#;
        let geometry = parse_geojson_geometry(text).unwrap();
        assert!(matches!(geometry, Geometry::Polygon(_)));
    }

    #[test]
    fn rejects_malformed_geojson() {
        assert!(matches!(
            parse_geojson_geometry("{\"type\":\"Polygon\""),
            Err(Error::GeoJsonError(_))
        ));
    }
}
