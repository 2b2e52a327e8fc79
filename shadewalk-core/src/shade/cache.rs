//! Time-bounded cache of the most recent shadow set.
//!
//! Holds a single entry. Refresh is check-then-fetch-then-store under one
//! async mutex, so concurrent requests never fetch twice for the same stale
//! entry and a dropped request never leaves a half-written entry behind.
//! Every `get` is bounded by one deadline covering both the wait for the
//! mutex and the fetch. The last good snapshot is also published outside the
//! mutex so readers never wait on a refresh.

use std::{
    sync::{
        Arc, PoisonError, RwLock,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use tokio::{
    sync::Mutex,
    time::{Instant, timeout_at},
};

use super::{
    index::ShadowIndex,
    source::{ShadowFeature, ShadowSource, filter_shadow_features},
};
use crate::{Error, SunPosition};

/// When a cached shadow set stops being served
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheMode {
    /// Only age matters; a fresh entry is served for any requested sun
    /// position.
    #[default]
    TtlOnly,
    /// Also refetch when the requested sun position differs from the cached
    /// one.
    PositionAware,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShadowCacheConfig {
    pub ttl: Duration,
    pub fetch_timeout: Duration,
    pub mode: CacheMode,
}

impl Default for ShadowCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(600),
            fetch_timeout: Duration::from_secs(30),
            mode: CacheMode::TtlOnly,
        }
    }
}

/// One fetched and filtered shadow set
#[derive(Debug)]
pub struct ShadowSnapshot {
    pub sun: SunPosition,
    /// Monotonic time of the fetch, used for expiry
    pub computed_at: Instant,
    /// Wall clock time of the fetch, for reporting
    pub fetched_at: DateTime<Utc>,
    index: ShadowIndex,
}

impl ShadowSnapshot {
    pub fn new(sun: SunPosition, features: Vec<ShadowFeature>) -> Self {
        Self {
            sun,
            computed_at: Instant::now(),
            fetched_at: Utc::now(),
            index: ShadowIndex::new(features),
        }
    }

    pub fn features(&self) -> &[ShadowFeature] {
        self.index.features()
    }

    pub fn index(&self) -> &ShadowIndex {
        &self.index
    }

    pub fn age(&self) -> Duration {
        self.computed_at.elapsed()
    }
}

/// State guarded by the refresh mutex
#[derive(Default)]
struct CacheState {
    entry: Option<Arc<ShadowSnapshot>>,
    /// Message of the most recent unsuccessful refresh
    last_failure: Option<String>,
}

pub struct ShadowCache {
    source: Arc<dyn ShadowSource>,
    config: ShadowCacheConfig,
    state: Mutex<CacheState>,
    /// Number of failed refreshes so far, only bumped under `state`
    failures: AtomicU64,
    /// Copy of `state.entry`, written only after a successful fetch
    published: RwLock<Option<Arc<ShadowSnapshot>>>,
}

impl std::fmt::Debug for ShadowCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShadowCache")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ShadowCache {
    pub fn new(source: Arc<dyn ShadowSource>, config: ShadowCacheConfig) -> Self {
        Self {
            source,
            config,
            state: Mutex::new(CacheState::default()),
            failures: AtomicU64::new(0),
            published: RwLock::new(None),
        }
    }

    pub fn config(&self) -> &ShadowCacheConfig {
        &self.config
    }

    /// Shadows for `sun`, served from the cache while it is fresh.
    ///
    /// Returns within `fetch_timeout` of the call, however many requests are
    /// queued on the same refresh. Callers that were waiting while a refresh
    /// failed get that failure instead of fetching again.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UpstreamUnavailable`] if a refresh was needed and the
    /// source failed or the deadline passed. The previous entry is kept as it
    /// was.
    pub async fn get(&self, sun: SunPosition) -> Result<Arc<ShadowSnapshot>, Error> {
        let deadline = Instant::now() + self.config.fetch_timeout;
        let failures_seen = self.failures.load(Ordering::SeqCst);

        let mut state = timeout_at(deadline, self.state.lock())
            .await
            .map_err(|_| self.timed_out("waiting for a shadow refresh"))?;

        if let Some(snapshot) = state.entry.as_ref()
            && self.is_fresh(snapshot, sun)
        {
            debug!("Using cached shadows ({}s old)", snapshot.age().as_secs());
            return Ok(Arc::clone(snapshot));
        }

        if self.failures.load(Ordering::SeqCst) != failures_seen
            && let Some(message) = state.last_failure.as_ref()
        {
            debug!("Shadow refresh failed while waiting, not retrying");
            return Err(Error::UpstreamUnavailable(message.clone()));
        }

        info!(
            "Fetching shadows for azimuth {:.2}, altitude {:.2}",
            sun.azimuth_deg, sun.altitude_deg
        );
        let fetched = match timeout_at(deadline, self.source.fetch_shadows(sun)).await {
            Ok(Ok(features)) => Ok(features),
            Ok(Err(Error::UpstreamUnavailable(message))) => Err(message),
            Ok(Err(other)) => Err(other.to_string()),
            Err(_) => Err(self.timed_out("fetching shadows").to_string()),
        };

        let features = match fetched {
            Ok(features) => features,
            Err(message) => {
                warn!("Shadow fetch failed: {message}");
                state.last_failure = Some(message.clone());
                self.failures.fetch_add(1, Ordering::SeqCst);
                return Err(Error::UpstreamUnavailable(message));
            }
        };

        let snapshot = Arc::new(ShadowSnapshot::new(sun, filter_shadow_features(features)));
        info!("Cached {} shadow features", snapshot.features().len());
        state.entry = Some(Arc::clone(&snapshot));
        state.last_failure = None;
        *self
            .published
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&snapshot));
        Ok(snapshot)
    }

    /// Last successfully fetched snapshot regardless of freshness.
    ///
    /// Never waits on a refresh in progress.
    pub fn peek(&self) -> Option<Arc<ShadowSnapshot>> {
        self.published
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn timed_out(&self, stage: &str) -> Error {
        Error::UpstreamUnavailable(format!(
            "timed out after {}s {stage}",
            self.config.fetch_timeout.as_secs_f64()
        ))
    }

    fn is_fresh(&self, snapshot: &ShadowSnapshot, sun: SunPosition) -> bool {
        if snapshot.age() >= self.config.ttl {
            return false;
        }
        match self.config.mode {
            CacheMode::TtlOnly => true,
            CacheMode::PositionAware => snapshot.sun == sun,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

    use async_trait::async_trait;
    use geo::{Geometry, Point, polygon};

    use super::*;

    #[derive(Default)]
    struct StubSource {
        calls: AtomicUsize,
        delay_ms: AtomicU64,
        failing: AtomicBool,
    }

    #[async_trait]
    impl ShadowSource for StubSource {
        async fn fetch_shadows(&self, _sun: SunPosition) -> Result<Vec<ShadowFeature>, Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let delay = self.delay_ms.load(Ordering::SeqCst);
            if delay > 0 {
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }
            if self.failing.load(Ordering::SeqCst) {
                return Err(Error::InvalidData("database went away".to_string()));
            }
            Ok(vec![
                ShadowFeature {
                    id: 1,
                    geometry: polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0)].into(),
                },
                ShadowFeature {
                    id: 2,
                    geometry: Geometry::GeometryCollection(vec![Point::new(0.0, 0.0)].into()),
                },
            ])
        }
    }

    fn setup(mode: CacheMode) -> (Arc<StubSource>, ShadowCache) {
        let source = Arc::new(StubSource::default());
        let cache = ShadowCache::new(
            source.clone(),
            ShadowCacheConfig {
                mode,
                ..ShadowCacheConfig::default()
            },
        );
        (source, cache)
    }

    fn sun(azimuth: f64) -> SunPosition {
        SunPosition::new(azimuth, 40.0).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn fresh_entry_is_reused_within_ttl() {
        let (source, cache) = setup(CacheMode::TtlOnly);

        let first = cache.get(sun(180.0)).await.unwrap();
        tokio::time::advance(Duration::from_secs(599)).await;
        let second = cache.get(sun(180.0)).await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.computed_at, second.computed_at);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        // The geometry collection was filtered out
        assert_eq!(first.features().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stale_entry_triggers_exactly_one_fetch() {
        let (source, cache) = setup(CacheMode::TtlOnly);

        let first = cache.get(sun(180.0)).await.unwrap();
        tokio::time::advance(Duration::from_secs(600)).await;
        let second = cache.get(sun(180.0)).await.unwrap();
        let third = cache.get(sun(180.0)).await.unwrap();

        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
        assert!(second.computed_at > first.computed_at);
        assert!(Arc::ptr_eq(&second, &third));
    }

    #[tokio::test(start_paused = true)]
    async fn ttl_only_mode_ignores_sun_changes() {
        let (source, cache) = setup(CacheMode::TtlOnly);

        cache.get(sun(90.0)).await.unwrap();
        let other = cache.get(sun(270.0)).await.unwrap();

        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert_eq!(other.sun, sun(90.0));
    }

    #[tokio::test(start_paused = true)]
    async fn position_aware_mode_refetches_on_sun_change() {
        let (source, cache) = setup(CacheMode::PositionAware);

        cache.get(sun(90.0)).await.unwrap();
        cache.get(sun(90.0)).await.unwrap();
        let other = cache.get(sun(270.0)).await.unwrap();

        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
        assert_eq!(other.sun, sun(270.0));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_fetch_keeps_previous_entry() {
        let (source, cache) = setup(CacheMode::TtlOnly);

        let first = cache.get(sun(180.0)).await.unwrap();
        tokio::time::advance(Duration::from_secs(700)).await;
        source.failing.store(true, Ordering::SeqCst);

        let err = cache.get(sun(180.0)).await.unwrap_err();
        assert!(matches!(err, Error::UpstreamUnavailable(_)));

        let kept = cache.peek().unwrap();
        assert!(Arc::ptr_eq(&first, &kept));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_source_times_out() {
        let (source, cache) = setup(CacheMode::TtlOnly);
        source.delay_ms.store(60_000, Ordering::SeqCst);

        let err = cache.get(sun(180.0)).await.unwrap_err();
        assert!(matches!(err, Error::UpstreamUnavailable(_)));
        assert!(cache.peek().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_requests_share_one_fetch() {
        let (source, cache) = setup(CacheMode::TtlOnly);
        source.delay_ms.store(1_000, Ordering::SeqCst);

        let (a, b) = tokio::join!(cache.get(sun(180.0)), cache.get(sun(180.0)));

        assert!(Arc::ptr_eq(&a.unwrap(), &b.unwrap()));
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn abandoned_request_leaves_cache_empty() {
        let (source, cache) = setup(CacheMode::TtlOnly);
        source.delay_ms.store(5_000, Ordering::SeqCst);

        let abandoned = tokio::time::timeout(Duration::from_millis(10), cache.get(sun(180.0))).await;
        assert!(abandoned.is_err());
        assert!(cache.peek().is_none());

        source.delay_ms.store(0, Ordering::SeqCst);
        assert!(cache.get(sun(180.0)).await.is_ok());
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn queued_requests_share_one_deadline_against_a_hanging_source() {
        let (source, cache) = setup(CacheMode::TtlOnly);
        source.delay_ms.store(3_600_000, Ordering::SeqCst);
        let cache = Arc::new(cache);
        let started = Instant::now();

        let requests: Vec<_> = (0..3)
            .map(|_| {
                let cache = Arc::clone(&cache);
                tokio::spawn(async move {
                    let result = cache.get(sun(180.0)).await;
                    (result.is_err(), started.elapsed())
                })
            })
            .collect();

        for request in requests {
            let (failed, elapsed) = request.await.unwrap();
            assert!(failed);
            assert!(elapsed <= Duration::from_secs(30), "returned after {elapsed:?}");
        }
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn later_request_retries_after_a_failure() {
        let (source, cache) = setup(CacheMode::TtlOnly);
        source.failing.store(true, Ordering::SeqCst);
        assert!(cache.get(sun(180.0)).await.is_err());

        source.failing.store(false, Ordering::SeqCst);
        assert!(cache.get(sun(180.0)).await.is_ok());
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn peek_does_not_wait_for_a_pending_fetch() {
        let (source, cache) = setup(CacheMode::TtlOnly);
        let first = cache.get(sun(180.0)).await.unwrap();
        tokio::time::advance(Duration::from_secs(600)).await;
        source.delay_ms.store(20_000, Ordering::SeqCst);
        let cache = Arc::new(cache);

        let refresh = {
            let cache = Arc::clone(&cache);
            tokio::spawn(async move { cache.get(sun(180.0)).await })
        };
        tokio::time::sleep(Duration::from_secs(1)).await;

        let before = Instant::now();
        let seen = cache.peek().unwrap();
        assert_eq!(before.elapsed(), Duration::ZERO);
        assert!(Arc::ptr_eq(&first, &seen));

        let refreshed = refresh.await.unwrap().unwrap();
        assert!(Arc::ptr_eq(&refreshed, &cache.peek().unwrap()));
    }
}
