use serde::{Deserialize, Serialize};

use crate::model::{NodeKeyPolicy, SpatialIndexKind};

/// Options for building the walkway graph
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// How segment endpoints are matched into shared nodes
    pub node_key: NodeKeyPolicy,
    /// Index used for snapping query points
    pub spatial_index: SpatialIndexKind,
}
