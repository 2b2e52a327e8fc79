use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use chrono::{DateTime, Utc};
use geo::Point;
use geojson::{Feature, Geometry, Value as GeoJsonValue};
use serde::{Deserialize, Serialize};
use serde_json::{Map, json};
use shadewalk_core::{Route, SunPosition, Weighting};
use tokio::task::spawn_blocking;

use crate::{ApiError, AppState, layers::LayerFeature};

type Payload<T> = Result<Json<T>, JsonRejection>;

/// `{"start": [x, y], "end": [x, y]}`
#[derive(Debug, Default, Deserialize)]
pub struct PathRequest {
    pub start: Option<[f64; 2]>,
    pub end: Option<[f64; 2]>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ShadedPathRequest {
    pub start: Option<[f64; 2]>,
    pub end: Option<[f64; 2]>,
    /// Degrees clockwise from north
    pub sun_azimuth: Option<f64>,
    /// Degrees above the horizon
    pub sun_altitude: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ShadeRequest {
    pub sun_azimuth: Option<f64>,
    pub sun_altitude: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct HealthCentersRequest {
    /// Facility type, `"all"` or absent for every type
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// One shadow polygon as returned by `/api/shade`
#[derive(Debug, Serialize)]
pub struct ShadeRow {
    pub id: i64,
    pub geojson: Geometry,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub nodes: usize,
    pub edges: usize,
    /// When the cached shadow set was fetched, if there is one
    pub shadows_fetched_at: Option<DateTime<Utc>>,
}

/// `missing-parameters` error naming every absent field
fn missing(fields: &[(&str, bool)]) -> ApiError {
    let names: Vec<&str> = fields
        .iter()
        .filter(|(_, present)| !present)
        .map(|(name, _)| *name)
        .collect();
    ApiError::MissingParameters(names.join(", "))
}

fn point([x, y]: [f64; 2]) -> Point<f64> {
    Point::new(x, y)
}

fn sun_position(azimuth: Option<f64>, altitude: Option<f64>) -> Result<SunPosition, ApiError> {
    let (Some(azimuth_deg), Some(altitude_deg)) = (azimuth, altitude) else {
        return Err(missing(&[
            ("sun_azimuth", azimuth.is_some()),
            ("sun_altitude", altitude.is_some()),
        ]));
    };
    Ok(SunPosition::new(azimuth_deg, altitude_deg)?)
}

fn unshaded_feature(route: &Route) -> Result<Feature, ApiError> {
    let mut extra = Map::new();
    extra.insert("shaded".to_string(), json!(false));
    Ok(route.to_geojson(extra)?)
}

pub async fn shortest_path(
    State(state): State<AppState>,
    payload: Payload<PathRequest>,
) -> Result<Json<Feature>, ApiError> {
    let Json(request) = payload?;
    let (Some(start), Some(end)) = (request.start, request.end) else {
        return Err(missing(&[
            ("start", request.start.is_some()),
            ("end", request.end.is_some()),
        ]));
    };

    let engine = Arc::clone(&state.engine);
    let route = spawn_blocking(move || engine.route(point(start), point(end), Weighting::Unshaded))
        .await
        .map_err(|e| ApiError::Internal(format!("routing task failed: {e}")))??;

    Ok(Json(unshaded_feature(&route)?))
}

/// Shade-favouring route; answers with a plain shortest route (`"shaded":
/// false`) when shadows cannot be fetched.
pub async fn shortest_shaded_path(
    State(state): State<AppState>,
    payload: Payload<ShadedPathRequest>,
) -> Result<Json<Feature>, ApiError> {
    let Json(request) = payload?;
    let (Some(start), Some(end), Some(_), Some(_)) = (
        request.start,
        request.end,
        request.sun_azimuth,
        request.sun_altitude,
    ) else {
        return Err(missing(&[
            ("start", request.start.is_some()),
            ("end", request.end.is_some()),
            ("sun_azimuth", request.sun_azimuth.is_some()),
            ("sun_altitude", request.sun_altitude.is_some()),
        ]));
    };
    let sun = sun_position(request.sun_azimuth, request.sun_altitude)?;

    let route = state
        .engine
        .shaded_route(point(start), point(end), sun)
        .await?;

    Ok(Json(route.to_geojson()?))
}

/// Current shadow polygons; unlike shaded routing there is no fallback.
pub async fn shade(
    State(state): State<AppState>,
    payload: Payload<ShadeRequest>,
) -> Result<Json<Vec<ShadeRow>>, ApiError> {
    let Json(request) = payload?;
    let sun = sun_position(request.sun_azimuth, request.sun_altitude)?;
    let snapshot = state.engine.shadows(sun).await?;

    let rows = snapshot
        .features()
        .iter()
        .map(|feature| ShadeRow {
            id: feature.id,
            geojson: Geometry::new(GeoJsonValue::from(&feature.geometry)),
        })
        .collect();
    Ok(Json(rows))
}

pub async fn cadastre(State(state): State<AppState>) -> Result<Json<Vec<LayerFeature>>, ApiError> {
    state
        .layers
        .cadastre()
        .await
        .map(Json)
        .map_err(|source| ApiError::Layer {
            layer: "cadastre",
            source,
        })
}

pub async fn walkpath(State(state): State<AppState>) -> Result<Json<Vec<LayerFeature>>, ApiError> {
    state
        .layers
        .walkpaths()
        .await
        .map(Json)
        .map_err(|source| ApiError::Layer {
            layer: "walking path",
            source,
        })
}

pub async fn health_centers(
    State(state): State<AppState>,
    payload: Payload<HealthCentersRequest>,
) -> Result<Json<Vec<LayerFeature>>, ApiError> {
    let Json(request) = payload?;
    let kind = request.kind.as_deref().filter(|kind| *kind != "all");
    state
        .layers
        .health_centers(kind)
        .await
        .map(Json)
        .map_err(|source| ApiError::Layer {
            layer: "health centers",
            source,
        })
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let graph = state.engine.graph();
    let cached = state.engine.shadow_cache().peek();
    Json(HealthResponse {
        status: "ok",
        nodes: graph.node_count(),
        edges: graph.edge_count(),
        shadows_fetched_at: cached.map(|snapshot| snapshot.fetched_at),
    })
}
