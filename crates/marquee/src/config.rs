// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Service and catalog configuration.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

/// How freshly fetched entities are written back to the cache.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backfill {
    /// Cache writes run on a spawned task; the caller gets its result without waiting for them.
    ///
    /// Requires a Tokio runtime. Writes outlive the caller, so dropping the lookup future does
    /// not cancel them.
    #[default]
    Detached,

    /// Cache writes complete before the lookup returns. Failures are still only logged.
    Awaited,
}

impl Backfill {
    /// Returns the configuration name of this mode.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Detached => "detached",
            Self::Awaited => "awaited",
        }
    }
}

impl fmt::Display for Backfill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An unrecognized backfill mode.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown backfill mode `{0}`, expected `detached` or `awaited`")]
pub struct ParseBackfillError(String);

impl FromStr for Backfill {
    type Err = ParseBackfillError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "detached" => Ok(Self::Detached),
            "awaited" => Ok(Self::Awaited),
            _ => Err(ParseBackfillError(s.to_owned())),
        }
    }
}

/// Per-service behavior of a [`ReadThroughService`](crate::ReadThroughService).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Bound on every search backend call; `None` waits indefinitely.
    pub backend_timeout: Option<Duration>,
    /// How cache backfills are run.
    pub backfill: Backfill,
}

impl ServiceConfig {
    /// Default bound on backend calls.
    pub const DEFAULT_BACKEND_TIMEOUT: Duration = Duration::from_secs(5);

    /// Sets the backend timeout.
    #[must_use]
    pub fn backend_timeout(mut self, timeout: Duration) -> Self {
        self.backend_timeout = Some(timeout);
        self
    }

    /// Sets the backfill mode.
    #[must_use]
    pub fn backfill(mut self, backfill: Backfill) -> Self {
        self.backfill = backfill;
        self
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            backend_timeout: Some(Self::DEFAULT_BACKEND_TIMEOUT),
            backfill: Backfill::default(),
        }
    }
}

/// Deployment settings for a [`Catalog`](crate::Catalog).
///
/// Deserializes from any serde format with every field optional, or loads from the environment
/// with [`from_env`](Self::from_env).
///
/// | Field                | Variable                     | Default                 |
/// |----------------------|------------------------------|-------------------------|
/// | `cache_ttl_secs`     | `MARQUEE_CACHE_TTL_SECS`     | `300`                   |
/// | `cache_timeout_ms`   | `MARQUEE_CACHE_TIMEOUT_MS`   | `250`                   |
/// | `backend_timeout_ms` | `MARQUEE_BACKEND_TIMEOUT_MS` | `5000`                  |
/// | `backfill`           | `MARQUEE_BACKFILL`           | `detached`              |
/// | `memory_capacity`    | `MARQUEE_MEMORY_CAPACITY`    | unbounded               |
/// | `redis_url`          | `MARQUEE_REDIS_URL`          | none (in-memory cache)  |
/// | `elasticsearch_url`  | `MARQUEE_ELASTICSEARCH_URL`  | `http://localhost:9200` |
///
/// A timeout of `0` disables that timeout.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogConfig {
    /// Lifetime of cache entries, in seconds.
    pub cache_ttl_secs: u64,
    /// Bound on each cache call, in milliseconds.
    pub cache_timeout_ms: u64,
    /// Bound on each search backend call, in milliseconds.
    pub backend_timeout_ms: u64,
    /// How cache backfills are run.
    pub backfill: Backfill,
    /// Maximum entries held by the in-memory cache.
    pub memory_capacity: Option<u64>,
    /// Redis connection URL. When unset, entities are cached in process memory.
    pub redis_url: Option<String>,
    /// Base URL of the Elasticsearch cluster.
    pub elasticsearch_url: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: 300,
            cache_timeout_ms: 250,
            backend_timeout_ms: 5_000,
            backfill: Backfill::Detached,
            memory_capacity: None,
            redis_url: None,
            elasticsearch_url: "http://localhost:9200".to_owned(),
        }
    }
}

impl CatalogConfig {
    /// Loads the configuration from `MARQUEE_*` environment variables.
    ///
    /// Unset variables keep their defaults. A variable that is set but does not parse is
    /// ignored with a warning.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads the configuration from any name-to-value lookup, using the same variable names as
    /// [`from_env`](Self::from_env).
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let lookup = |name: &str| lookup(name).map(|value| value.trim().to_owned()).filter(|value| !value.is_empty());

        Self {
            cache_ttl_secs: parsed(lookup, "MARQUEE_CACHE_TTL_SECS").unwrap_or(defaults.cache_ttl_secs),
            cache_timeout_ms: parsed(lookup, "MARQUEE_CACHE_TIMEOUT_MS").unwrap_or(defaults.cache_timeout_ms),
            backend_timeout_ms: parsed(lookup, "MARQUEE_BACKEND_TIMEOUT_MS").unwrap_or(defaults.backend_timeout_ms),
            backfill: parsed(lookup, "MARQUEE_BACKFILL").unwrap_or(defaults.backfill),
            memory_capacity: parsed(lookup, "MARQUEE_MEMORY_CAPACITY").or(defaults.memory_capacity),
            redis_url: lookup("MARQUEE_REDIS_URL").or(defaults.redis_url),
            elasticsearch_url: lookup("MARQUEE_ELASTICSEARCH_URL").unwrap_or(defaults.elasticsearch_url),
        }
    }

    /// Returns the cache entry lifetime.
    #[must_use]
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Returns the bound on each cache call, or `None` if disabled.
    #[must_use]
    pub fn cache_timeout(&self) -> Option<Duration> {
        millis(self.cache_timeout_ms)
    }

    /// Returns the bound on each backend call, or `None` if disabled.
    #[must_use]
    pub fn backend_timeout(&self) -> Option<Duration> {
        millis(self.backend_timeout_ms)
    }

    /// Returns the per-service settings derived from this configuration.
    #[must_use]
    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            backend_timeout: self.backend_timeout(),
            backfill: self.backfill,
        }
    }
}

fn millis(ms: u64) -> Option<Duration> {
    (ms > 0).then(|| Duration::from_millis(ms))
}

fn parsed<T>(lookup: impl Fn(&str) -> Option<String>, name: &str) -> Option<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    let value = lookup(name)?;
    match value.parse() {
        Ok(parsed) => Some(parsed),
        Err(error) => {
            tracing::warn!(variable = name, value = %value, error = %error, "ignoring invalid configuration value");
            None
        }
    }
}
