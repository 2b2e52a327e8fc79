//! Builds the walkway graph from raw path geometries.

mod builder;
mod config;
mod wkt;

pub use builder::build_walk_graph;
pub use config::GraphConfig;
pub use wkt::parse_wkt_geometries;
