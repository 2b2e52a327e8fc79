//! SQL run against the PostGIS database. Map layers and shadows come back in
//! WGS84; shadow offsets are computed in Web Mercator so heights stay metric.

/// Walkway network as WKT in its stored CRS, the one routing works in
pub const WALKPATH_WKT: &str = "SELECT ST_AsText(geom) FROM public.peshehodna_mreja_sofia";

pub const WALKPATH_GEOJSON: &str =
    "SELECT ST_AsGeoJSON(ST_Transform(geom, 4326)) FROM public.peshehodna_mreja_sofia";

pub const CADASTRE_GEOJSON: &str = "SELECT ST_AsGeoJSON(ST_Transform(geom, 4326)), height_m::float8 \
     FROM public.sofia_kadastur";

pub const HEALTH_CENTERS_ALL: &str =
    "SELECT ST_AsGeoJSON(ST_Transform(geom, 4326)), name::text, type::text \
     FROM public.sofia_health_centers";

pub const HEALTH_CENTERS_BY_TYPE: &str =
    "SELECT ST_AsGeoJSON(ST_Transform(geom, 4326)), name::text, type::text \
     FROM public.sofia_health_centers WHERE type = $1";

/// Shadow footprint per building for a sun position (`$1` azimuth, `$2`
/// altitude, both degrees).
///
/// Each building is translated by `height / tan(altitude)` away from the sun;
/// the footprint and its translation are merged when they overlap and replaced
/// by their convex hull otherwise. Buildings without height, or a sun on the
/// horizon, produce no rows.
pub const SHADOWS_GEOJSON: &str = r#"
WITH params AS (
  SELECT radians($1::float8) AS azimuth_rad, radians($2::float8) AS altitude_rad
),
footprint AS (
  SELECT
    b.id::bigint AS id,
    ST_Transform(b.geom, 3857) AS geom,
    b.height_m::float8 AS height_m,
    p.azimuth_rad,
    p.altitude_rad
  FROM public.sofia_kadastur b
  CROSS JOIN params p
  WHERE b.height_m > 0 AND abs(p.altitude_rad) > 0.01
),
translated AS (
  SELECT
    id,
    ST_Translate(
      geom,
      height_m / tan(altitude_rad) * sin(azimuth_rad),
      height_m / tan(altitude_rad) * cos(azimuth_rad)
    ) AS geom
  FROM footprint
),
parts AS (
  SELECT id, geom FROM footprint
  UNION ALL
  SELECT id, geom FROM translated
),
grouped AS (
  SELECT id, array_agg(geom) AS geoms, count(*) AS part_count, ST_Collect(geom) AS collected
  FROM parts
  GROUP BY id
)
SELECT
  id,
  ST_AsGeoJSON((ST_Dump(
    ST_Transform(
      CASE
        WHEN part_count = 1 THEN geoms[1]
        WHEN ST_NumGeometries(ST_UnaryUnion(collected)) = 1 THEN ST_UnaryUnion(collected)
        ELSE ST_ConvexHull(collected)
      END, 4326)
  )).geom)
FROM grouped
"#;
