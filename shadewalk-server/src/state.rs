use std::sync::Arc;

use shadewalk_core::RoutingEngine;

use crate::MapLayers;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<RoutingEngine>,
    pub layers: Arc<dyn MapLayers>,
}

impl AppState {
    pub fn new(engine: RoutingEngine, layers: Arc<dyn MapLayers>) -> Self {
        Self {
            engine: Arc::new(engine),
            layers,
        }
    }
}
