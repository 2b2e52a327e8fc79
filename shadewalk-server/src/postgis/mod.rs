//! PostGIS backing store: the walkway network at startup, shadow footprints
//! on demand and the read-through map layers.

pub mod queries;

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use shadewalk_core::{
    Error as CoreError, ShadowFeature, ShadowSource, SunPosition, prelude::parse_geojson_geometry,
};
use sqlx::{
    PgPool, Postgres,
    postgres::{PgConnectOptions, PgPoolOptions},
};
use tracing::{info, warn};

use crate::{MapLayers, ServerError, config::DatabaseConfig, layers::LayerFeature};

#[derive(Debug, Clone)]
pub struct PostGis {
    pool: PgPool,
}

impl PostGis {
    /// Opens the pool and checks the connection by reading the server encoding.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, ServerError> {
        info!(
            host = %config.host,
            port = config.port,
            dbname = %config.dbname,
            user = %config.user,
            "connecting to PostGIS"
        );

        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.dbname);

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect_with(options)
            .await
            .inspect_err(|e| warn!(error = %e, "failed to connect to PostGIS"))?;

        let encoding: String = sqlx::query_scalar("SHOW server_encoding")
            .fetch_one(&pool)
            .await?;
        info!(server_encoding = %encoding, "PostGIS connection pool ready");

        Ok(Self { pool })
    }

    /// Walkway geometries as WKT, one row per feature
    pub async fn walkpath_wkt(&self) -> Result<Vec<String>, ServerError> {
        let rows: Vec<Option<String>> = sqlx::query_scalar(queries::WALKPATH_WKT)
            .fetch_all(&self.pool)
            .await?;
        let total = rows.len();
        let rows: Vec<String> = rows.into_iter().flatten().collect();
        if rows.len() < total {
            warn!(skipped = total - rows.len(), "walkway rows without geometry");
        }
        info!(rows = rows.len(), "loaded walkway network");
        Ok(rows)
    }
}

/// GeoJSON, name and type of one health center
type HealthCenterRow = (Option<String>, Option<String>, Option<String>);

fn parse_layer_geometry(text: Option<String>) -> Result<Option<JsonValue>, ServerError> {
    text.map(|text| serde_json::from_str(&text))
        .transpose()
        .map_err(ServerError::from)
}

#[async_trait]
impl ShadowSource for PostGis {
    async fn fetch_shadows(&self, sun: SunPosition) -> Result<Vec<ShadowFeature>, CoreError> {
        let rows: Vec<(i64, Option<String>)> = sqlx::query_as(queries::SHADOWS_GEOJSON)
            .bind(sun.azimuth_deg)
            .bind(sun.altitude_deg)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| CoreError::UpstreamUnavailable(format!("shadow query failed: {e}")))?;

        let mut features = Vec::with_capacity(rows.len());
        for (id, geojson) in rows {
            let Some(geojson) = geojson else {
                warn!(id, "shadow row without geometry");
                continue;
            };
            match parse_geojson_geometry(&geojson) {
                Ok(geometry) => features.push(ShadowFeature { id, geometry }),
                Err(e) => warn!(id, error = %e, "skipped malformed shadow row"),
            }
        }
        Ok(features)
    }
}

#[async_trait]
impl MapLayers for PostGis {
    async fn cadastre(&self) -> Result<Vec<LayerFeature>, ServerError> {
        let rows: Vec<(Option<String>, Option<f64>)> = sqlx::query_as(queries::CADASTRE_GEOJSON)
            .fetch_all(&self.pool)
            .await?;
        let mut features = Vec::with_capacity(rows.len());
        for (geojson, height) in rows {
            if let Some(geojson) = parse_layer_geometry(geojson)? {
                features.push(LayerFeature::new(geojson).with("height_m", height));
            }
        }
        Ok(features)
    }

    async fn walkpaths(&self) -> Result<Vec<LayerFeature>, ServerError> {
        let rows: Vec<Option<String>> = sqlx::query_scalar(queries::WALKPATH_GEOJSON)
            .fetch_all(&self.pool)
            .await?;
        let mut features = Vec::with_capacity(rows.len());
        for geojson in rows {
            if let Some(geojson) = parse_layer_geometry(geojson)? {
                features.push(LayerFeature::new(geojson));
            }
        }
        Ok(features)
    }

    async fn health_centers(&self, kind: Option<&str>) -> Result<Vec<LayerFeature>, ServerError> {
        let query = match kind {
            Some(kind) => sqlx::query_as::<Postgres, HealthCenterRow>(
                queries::HEALTH_CENTERS_BY_TYPE,
            )
            .bind(kind.to_string()),
            None => sqlx::query_as::<Postgres, HealthCenterRow>(queries::HEALTH_CENTERS_ALL),
        };
        let rows = query.fetch_all(&self.pool).await?;

        let mut features = Vec::with_capacity(rows.len());
        for (geojson, name, kind) in rows {
            if let Some(geojson) = parse_layer_geometry(geojson)? {
                features.push(
                    LayerFeature::new(geojson)
                        .with("name", name)
                        .with("type", kind),
                );
            }
        }
        Ok(features)
    }
}
