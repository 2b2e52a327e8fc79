use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

use async_trait::async_trait;
use geo::{Geometry, LineString, Point, polygon};
use shadewalk_core::{
    CacheMode, Error, GraphConfig, RoutingEngine, ShadePolicy, ShadowCache, ShadowCacheConfig,
    ShadowFeature, ShadowSource, SunPosition, WalkGraph, build_walk_graph,
};

pub const A: (f64, f64) = (0.0, 0.0);
pub const B: (f64, f64) = (3.0, 0.0);
pub const C: (f64, f64) = (3.0, 4.0);

pub fn point(p: (f64, f64)) -> Point<f64> {
    Point::new(p.0, p.1)
}

fn segment(a: (f64, f64), b: (f64, f64)) -> Geometry<f64> {
    LineString::from(vec![a, b]).into()
}

/// A-B (3), B-C (4) and optionally the direct A-C (5)
pub fn triangle(with_diagonal: bool) -> WalkGraph {
    let mut lines = vec![segment(A, B), segment(B, C)];
    if with_diagonal {
        lines.push(segment(A, C));
    }
    build_walk_graph(lines, &GraphConfig::default()).unwrap()
}

/// Shadow touching only the middle of A-B
pub fn shadow_over_ab() -> ShadowFeature {
    ShadowFeature {
        id: 42,
        geometry: polygon![
            (x: 1.0, y: -0.5), (x: 2.0, y: -0.5), (x: 2.0, y: 0.5), (x: 1.0, y: 0.5)
        ]
        .into(),
    }
}

pub struct FixedShadows {
    pub features: Vec<ShadowFeature>,
    pub failing: AtomicBool,
    pub calls: AtomicUsize,
}

impl FixedShadows {
    pub fn new(features: Vec<ShadowFeature>) -> Arc<Self> {
        Arc::new(Self {
            features,
            failing: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl ShadowSource for FixedShadows {
    async fn fetch_shadows(&self, _sun: SunPosition) -> Result<Vec<ShadowFeature>, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::UpstreamUnavailable("connection refused".to_string()));
        }
        Ok(self.features.clone())
    }
}

pub fn engine(graph: WalkGraph, source: Arc<FixedShadows>) -> Arc<RoutingEngine> {
    let cache = ShadowCache::new(
        source,
        ShadowCacheConfig {
            mode: CacheMode::TtlOnly,
            ..ShadowCacheConfig::default()
        },
    );
    Arc::new(RoutingEngine::new(graph, cache, ShadePolicy::default()).unwrap())
}

pub fn noon() -> SunPosition {
    SunPosition::new(180.0, 60.0).unwrap()
}
