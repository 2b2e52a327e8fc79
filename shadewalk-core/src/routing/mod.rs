//! Shortest-path search over the walkway graph.

pub mod dijkstra;
mod engine;
mod route;

pub use engine::{RoutingEngine, ShadedRoute, Weighting};
pub use route::{Route, shortest_route};
