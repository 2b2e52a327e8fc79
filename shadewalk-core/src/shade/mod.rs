//! Building shadows: fetching, caching and turning them into edge weights.

mod cache;
mod index;
mod reweight;
mod source;

pub use cache::{CacheMode, ShadowCache, ShadowCacheConfig, ShadowSnapshot};
pub use index::{LinearShadowScan, ShadowIndex, ShadowLookup};
pub use reweight::{ShadePolicy, shade_weighted_view};
pub use source::{ShadowFeature, ShadowSource, filter_shadow_features, parse_geojson_geometry};
