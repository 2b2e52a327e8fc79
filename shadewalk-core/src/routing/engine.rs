use std::sync::Arc;

use geo::Point;
use geojson::Feature;
use log::{info, warn};
use petgraph::graph::NodeIndex;
use serde_json::{Map, json};

use super::route::{Route, shortest_route};
use crate::{
    Error, SunPosition, WalkGraph,
    shade::{ShadePolicy, ShadowCache, ShadowSnapshot, shade_weighted_view},
};

/// Edge weighting used for one search
#[derive(Debug, Clone, Copy)]
pub enum Weighting<'a> {
    /// Physical length only
    Unshaded,
    /// Length biased by the shade policy against these shadows
    Shaded(&'a ShadowSnapshot),
}

/// Route found by [`RoutingEngine::shaded_route`]
#[derive(Debug, Clone)]
pub struct ShadedRoute {
    pub route: Route,
    /// Shadows the route was weighted with; `None` if they were unavailable
    /// and the search fell back to physical length
    pub shadows: Option<Arc<ShadowSnapshot>>,
}

impl ShadedRoute {
    /// Whether the search was actually biased by shadows. An empty shadow
    /// set routes on base weights and does not count.
    pub fn is_shaded(&self) -> bool {
        self.shadows
            .as_ref()
            .is_some_and(|snapshot| !snapshot.features().is_empty())
    }

    pub fn to_geojson(&self) -> Result<Feature, Error> {
        let mut extra = Map::new();
        extra.insert("shaded".to_string(), json!(self.is_shaded()));
        if let Some(shadows) = &self.shadows {
            extra.insert("shadows_fetched_at".to_string(), json!(shadows.fetched_at));
        }
        self.route.to_geojson(extra)
    }
}

/// Walkway graph plus the shadow cache it routes against.
///
/// The graph is immutable and shared; the cache is the only mutable state
/// and serialises its own refreshes.
#[derive(Debug)]
pub struct RoutingEngine {
    graph: WalkGraph,
    shadows: ShadowCache,
    policy: ShadePolicy,
}

impl RoutingEngine {
    /// # Errors
    ///
    /// Fails on an empty graph or an invalid shade policy.
    pub fn new(graph: WalkGraph, shadows: ShadowCache, policy: ShadePolicy) -> Result<Self, Error> {
        if graph.is_empty() {
            return Err(Error::EmptyGraph);
        }
        policy.validate()?;
        Ok(Self {
            graph,
            shadows,
            policy,
        })
    }

    pub fn graph(&self) -> &WalkGraph {
        &self.graph
    }

    pub fn shadow_cache(&self) -> &ShadowCache {
        &self.shadows
    }

    pub fn policy(&self) -> &ShadePolicy {
        &self.policy
    }

    /// Nearest graph node to an arbitrary coordinate
    pub fn snap(&self, point: Point<f64>) -> Result<NodeIndex, Error> {
        validate_point(point)?;
        self.graph.nearest_node(&point)
    }

    /// Snaps both endpoints and searches under `weighting`.
    pub fn route(
        &self,
        start: Point<f64>,
        end: Point<f64>,
        weighting: Weighting<'_>,
    ) -> Result<Route, Error> {
        let source = self.snap(start)?;
        let target = self.snap(end)?;

        let view = match weighting {
            Weighting::Unshaded => self.graph.base_view(),
            Weighting::Shaded(snapshot) => {
                shade_weighted_view(&self.graph, snapshot.index(), &self.policy)
            }
        };

        let route = shortest_route(&view, source, target)?;
        info!(
            "Found {} route with {} nodes, {:.1} long",
            match weighting {
                Weighting::Unshaded => "shortest",
                Weighting::Shaded(_) => "shaded",
            },
            route.points.len(),
            route.length
        );
        Ok(route)
    }

    /// Shadow set for `sun`, fetched through the cache
    pub async fn shadows(&self, sun: SunPosition) -> Result<Arc<ShadowSnapshot>, Error> {
        self.shadows.get(sun).await
    }

    /// Like [`Self::shadows`], but a failed fetch is logged and yields `None`
    /// so the caller can fall back to unshaded routing.
    pub async fn shadows_or_fallback(&self, sun: SunPosition) -> Option<Arc<ShadowSnapshot>> {
        match self.shadows.get(sun).await {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                warn!("No shadow data available, routing without shade: {e}");
                None
            }
        }
    }

    /// Shade-favouring route between two coordinates.
    ///
    /// Endpoints are validated before the cache is touched. The search itself
    /// runs on the blocking thread pool.
    pub async fn shaded_route(
        self: &Arc<Self>,
        start: Point<f64>,
        end: Point<f64>,
        sun: SunPosition,
    ) -> Result<ShadedRoute, Error> {
        validate_point(start)?;
        validate_point(end)?;

        let shadows = self.shadows_or_fallback(sun).await;
        let engine = Arc::clone(self);
        tokio::task::spawn_blocking(move || engine.route_with_shadows(start, end, shadows))
            .await
            .map_err(|e| Error::Internal(format!("routing task failed: {e}")))?
    }

    /// Synchronous part of [`Self::shaded_route`]: searches against
    /// `shadows`, or on physical length when there are none.
    pub fn route_with_shadows(
        &self,
        start: Point<f64>,
        end: Point<f64>,
        shadows: Option<Arc<ShadowSnapshot>>,
    ) -> Result<ShadedRoute, Error> {
        let weighting = shadows
            .as_deref()
            .map_or(Weighting::Unshaded, Weighting::Shaded);
        let route = self.route(start, end, weighting)?;
        Ok(ShadedRoute { route, shadows })
    }
}

fn validate_point(point: Point<f64>) -> Result<(), Error> {
    if point.x().is_finite() && point.y().is_finite() {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!(
            "coordinates must be finite, got ({}, {})",
            point.x(),
            point.y()
        )))
    }
}
