// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! In-process key/value store backed by moka.

mod builder;

use std::time::Duration;

use bytes::Bytes;
use moka::Expiry;
use moka::future::Cache;
use tokio::time::Instant;

pub use builder::MemoryStoreBuilder;

use crate::{KeyValueStore, Result, StoreEntry};

/// An in-memory key/value store.
///
/// Entries expire in two ways:
/// - passively, through moka's per-entry expiration, which evicts them in the background;
/// - on read, by comparing the entry's expiry against the current instant.
///
/// The read check is what guarantees an expired entry is never served; the passive eviction
/// only keeps memory bounded.
///
/// Cloning is cheap and clones share the same storage.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use bytes::Bytes;
/// use marquee_cache::{KeyValueStore, MemoryStore};
///
/// # tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap().block_on(async {
/// let store = MemoryStore::builder().max_capacity(10_000).build();
///
/// store.set("film:1", Bytes::from_static(b"{}"), Duration::from_secs(60)).await?;
/// assert!(store.get("film:1").await?.is_some());
/// # Ok::<(), marquee_cache::CacheError>(())
/// # }).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct MemoryStore {
    inner: Cache<String, StoreEntry>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Creates an unbounded in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Creates a store holding at most `max_capacity` entries.
    #[must_use]
    pub fn with_capacity(max_capacity: u64) -> Self {
        Self::builder().max_capacity(max_capacity).build()
    }

    /// Creates a new builder for configuring an in-memory store.
    #[must_use]
    pub fn builder() -> MemoryStoreBuilder {
        MemoryStoreBuilder::new()
    }

    pub(crate) fn from_builder(builder: &MemoryStoreBuilder) -> Self {
        let mut moka_builder = Cache::<String, StoreEntry>::builder().expire_after(EntryTtl);

        if let Some(capacity) = builder.max_capacity {
            moka_builder = moka_builder.max_capacity(capacity);
        }

        if let Some(capacity) = builder.initial_capacity {
            moka_builder = moka_builder.initial_capacity(capacity);
        }

        if let Some(name) = builder.name.as_deref() {
            moka_builder = moka_builder.name(name);
        }

        Self {
            inner: moka_builder.build(),
        }
    }
}

impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Bytes>> {
        let Some(entry) = self.inner.get(key).await else {
            return Ok(None);
        };

        if entry.is_expired(Instant::now()) {
            self.inner.invalidate(key).await;
            return Ok(None);
        }

        Ok(Some(entry.into_payload()))
    }

    async fn set(&self, key: &str, value: Bytes, ttl: Duration) -> Result<()> {
        let entry = StoreEntry::new(value, ttl, Instant::now());
        self.inner.insert(key.to_owned(), entry).await;
        Ok(())
    }

    fn len(&self) -> Option<u64> {
        Some(self.inner.entry_count())
    }
}

/// Tells moka to evict each entry once its own TTL has passed, restarting it on overwrite.
struct EntryTtl;

impl Expiry<String, StoreEntry> for EntryTtl {
    fn expire_after_create(&self, _key: &String, value: &StoreEntry, _created_at: std::time::Instant) -> Option<Duration> {
        Some(value.ttl())
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &StoreEntry,
        _updated_at: std::time::Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl())
    }
}
