//! TOML configuration with the environment overrides the service has always
//! honoured (`SERVPORT`, `DB_PASSWORD`).

use std::{
    net::{IpAddr, Ipv4Addr},
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};
use shadewalk_core::{CacheMode, GraphConfig, NodeKeyPolicy, ShadePolicy, ShadowCacheConfig};
use tracing::warn;

use crate::ServerError;

pub const DEFAULT_PORT: u16 = 8686;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub graph: GraphConfig,
    pub shade: ShadeConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    /// Directory with the static frontend
    pub frontend_dir: PathBuf,
    pub request_timeout_secs: u64,
    /// Maximum number of requests processed at once
    pub concurrency_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_PORT,
            frontend_dir: PathBuf::from("frontend"),
            request_timeout_secs: 60,
            concurrency_limit: 256,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    /// Empty means "read `DB_PASSWORD` from the environment"
    pub password: String,
    pub dbname: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            password: String::new(),
            dbname: "postgres".to_string(),
            max_connections: 8,
            acquire_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadeConfig {
    /// How long a fetched shadow set is reused
    pub ttl_secs: u64,
    pub fetch_timeout_secs: u64,
    /// Refetch when the requested sun position differs from the cached one
    pub invalidate_on_sun_change: bool,
    pub shaded_factor: f64,
    pub sunny_factor: f64,
}

impl Default for ShadeConfig {
    fn default() -> Self {
        let policy = ShadePolicy::default();
        let cache = ShadowCacheConfig::default();
        Self {
            ttl_secs: cache.ttl.as_secs(),
            fetch_timeout_secs: cache.fetch_timeout.as_secs(),
            invalidate_on_sun_change: false,
            shaded_factor: policy.shaded_factor,
            sunny_factor: policy.sunny_factor,
        }
    }
}

impl ShadeConfig {
    pub fn cache_config(&self) -> ShadowCacheConfig {
        ShadowCacheConfig {
            ttl: Duration::from_secs(self.ttl_secs),
            fetch_timeout: Duration::from_secs(self.fetch_timeout_secs),
            mode: if self.invalidate_on_sun_change {
                CacheMode::PositionAware
            } else {
                CacheMode::TtlOnly
            },
        }
    }

    pub fn policy(&self) -> Result<ShadePolicy, ServerError> {
        Ok(ShadePolicy::new(self.shaded_factor, self.sunny_factor)?)
    }
}

impl Config {
    /// Reads the configuration file; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ServerError> {
        if !path.exists() {
            warn!(path = %path.display(), "configuration file not found, using defaults");
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, ServerError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ServerError> {
        if self.server.concurrency_limit == 0 {
            return Err(ServerError::Config(
                "server.concurrency_limit must be at least 1".to_string(),
            ));
        }
        if self.server.request_timeout_secs == 0 {
            return Err(ServerError::Config(
                "server.request_timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.shade.fetch_timeout_secs == 0 {
            return Err(ServerError::Config(
                "shade.fetch_timeout_secs must be at least 1".to_string(),
            ));
        }
        if let NodeKeyPolicy::Snapped { precision } = self.graph.node_key {
            NodeKeyPolicy::snapped(precision)?;
        }
        self.shade.policy()?;
        Ok(())
    }

    /// Applies `SERVPORT` and `DB_PASSWORD` from the process environment
    pub fn apply_env(&mut self) {
        self.apply_overrides(
            std::env::var("SERVPORT").ok(),
            std::env::var("DB_PASSWORD").ok(),
        );
    }

    pub fn apply_overrides(&mut self, port: Option<String>, password: Option<String>) {
        if let Some(port) = port {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => warn!(
                    value = %port,
                    fallback = self.server.port,
                    "invalid SERVPORT, keeping configured port"
                ),
            }
        }
        if self.database.password.is_empty()
            && let Some(password) = password
        {
            self.database.password = password;
        }
    }
}
