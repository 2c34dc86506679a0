// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::Duration;

use bytes::Bytes;
use marquee_cache::{KeyValueStore, MemoryStore, Result};
#[cfg(feature = "redis")]
use marquee_cache::RedisStore;

use crate::{CatalogConfig, ConnectError};

/// The key/value store selected by a [`CatalogConfig`].
///
/// Redis when `redis_url` is set, process memory otherwise.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum CatalogStore {
    /// Entries live in this process.
    Memory(MemoryStore),
    /// Entries live in Redis.
    #[cfg(feature = "redis")]
    Redis(RedisStore),
}

impl CatalogStore {
    /// Opens the store described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if Redis cannot be reached, or if `redis_url` is set without the `redis`
    /// feature.
    pub async fn open(config: &CatalogConfig) -> std::result::Result<Self, ConnectError> {
        match config.redis_url.as_deref() {
            #[cfg(feature = "redis")]
            Some(url) => Ok(Self::Redis(RedisStore::connect(url).await?)),
            #[cfg(not(feature = "redis"))]
            Some(_) => Err(ConnectError::FeatureDisabled {
                setting: "redis_url",
                feature: "redis",
            }),
            None => Ok(Self::Memory(match config.memory_capacity {
                Some(capacity) => MemoryStore::with_capacity(capacity),
                None => MemoryStore::new(),
            })),
        }
    }

    /// Returns a short name of the store kind, for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Memory(_) => "memory",
            #[cfg(feature = "redis")]
            Self::Redis(_) => "redis",
        }
    }
}

impl KeyValueStore for CatalogStore {
    async fn get(&self, key: &str) -> Result<Option<Bytes>> {
        match self {
            Self::Memory(store) => store.get(key).await,
            #[cfg(feature = "redis")]
            Self::Redis(store) => store.get(key).await,
        }
    }

    async fn set(&self, key: &str, value: Bytes, ttl: Duration) -> Result<()> {
        match self {
            Self::Memory(store) => store.set(key, value, ttl).await,
            #[cfg(feature = "redis")]
            Self::Redis(store) => store.set(key, value, ttl).await,
        }
    }

    fn len(&self) -> Option<u64> {
        match self {
            Self::Memory(store) => store.len(),
            #[cfg(feature = "redis")]
            Self::Redis(store) => store.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_store_without_redis_url() {
        let config = CatalogConfig {
            memory_capacity: Some(10),
            ..CatalogConfig::default()
        };

        let store = CatalogStore::open(&config).await.unwrap();
        assert!(matches!(store, CatalogStore::Memory(_)));
        assert_eq!(store.name(), "memory");
    }

    #[cfg(not(feature = "redis"))]
    #[tokio::test]
    async fn redis_url_requires_feature() {
        let config = CatalogConfig {
            redis_url: Some("redis://localhost:6379".to_owned()),
            ..CatalogConfig::default()
        };

        let error = CatalogStore::open(&config).await.unwrap_err();
        assert!(matches!(error, ConnectError::FeatureDisabled { feature: "redis", .. }));
    }
}
