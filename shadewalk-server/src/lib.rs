//! HTTP layer of the shade-aware walkway router.
//!
//! Serves the routing engine and the read-through map layers as a JSON API,
//! plus the static frontend.

pub mod config;
pub mod error;
pub mod handlers;
pub mod layers;
pub mod logging;
pub mod postgis;
pub mod router;
pub mod state;

pub use config::Config;
pub use error::{ApiError, ServerError};
pub use layers::MapLayers;
pub use router::build_router;
pub use state::AppState;
