use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

use crate::ServerError;

/// One row of a read-through map layer: a GeoJSON geometry plus whatever
/// attributes the layer carries (`height_m`, `name`, `type`, ...).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerFeature {
    pub geojson: JsonValue,
    #[serde(flatten)]
    pub attributes: Map<String, JsonValue>,
}

impl LayerFeature {
    pub fn new(geojson: JsonValue) -> Self {
        Self {
            geojson,
            attributes: Map::new(),
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<JsonValue>) -> Self {
        self.attributes.insert(key.to_string(), value.into());
        self
    }
}

/// Read-only map layers the frontend draws under the route.
#[async_trait]
pub trait MapLayers: Send + Sync {
    async fn cadastre(&self) -> Result<Vec<LayerFeature>, ServerError>;

    async fn walkpaths(&self) -> Result<Vec<LayerFeature>, ServerError>;

    /// Health centers, all of them when `kind` is `None`
    async fn health_centers(&self, kind: Option<&str>) -> Result<Vec<LayerFeature>, ServerError>;
}
