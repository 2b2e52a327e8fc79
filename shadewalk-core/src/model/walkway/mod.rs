//! Pedestrian walkway network model

pub mod components;
pub mod locator;
pub mod network;
pub mod node_key;
pub mod view;

pub use components::{WalkEdge, WalkNode};
pub use locator::{IndexedPoint, LinearScanLocator, NearestNode, RTreeLocator, SpatialIndexKind};
pub use network::{EdgeView, WalkGraph};
pub use node_key::{NodeKey, NodeKeyPolicy};
pub use view::WeightedView;
