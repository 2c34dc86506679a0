// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Typed entity cache on top of a key/value store.

use std::fmt;
use std::marker::PhantomData;
use std::time::Duration;

use bytes::Bytes;
use marquee_model::{Entity, EntityId};

use crate::telemetry::{self, CacheActivity, CacheOperation};
use crate::{CacheError, CacheLookup, CacheStore, KeyValueStore, Result};

/// Caches one entity kind in a [`KeyValueStore`].
///
/// - Keys are namespaced by kind (`film:<id>`, `person:<id>`), so one store can hold every kind.
/// - Entities are stored as their JSON document.
/// - Every entry is written with the cache's TTL.
/// - Every store call can be bounded by a timeout; a call that exceeds it counts as the store
///   being unavailable.
///
/// A payload that no longer decodes (for instance after a schema change) is reported as a miss,
/// so the next backfill overwrites it.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use marquee_cache::{EntityCache, MemoryStore};
/// use marquee_model::{EntityId, Film};
///
/// let films = EntityCache::<Film, _>::new(MemoryStore::new(), Duration::from_secs(300))
///     .with_timeout(Duration::from_millis(250));
///
/// assert_eq!(EntityCache::<Film, MemoryStore>::key(&EntityId::from("42")), "film:42");
/// ```
pub struct EntityCache<E, S> {
    store: S,
    ttl: Duration,
    timeout: Option<Duration>,
    _entity: PhantomData<fn() -> E>,
}

impl<E, S: fmt::Debug> fmt::Debug for EntityCache<E, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityCache")
            .field("store", &self.store)
            .field("ttl", &self.ttl)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl<E: Entity, S> EntityCache<E, S> {
    /// Default bound on each store call.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(250);

    /// Creates a cache writing entries with the given TTL.
    ///
    /// Store calls are bounded by [`DEFAULT_TIMEOUT`](Self::DEFAULT_TIMEOUT).
    #[must_use]
    pub fn new(store: S, ttl: Duration) -> Self {
        Self {
            store,
            ttl,
            timeout: Some(Self::DEFAULT_TIMEOUT),
            _entity: PhantomData,
        }
    }

    /// Bounds every store call by `timeout`.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Lets store calls run for as long as the store takes.
    ///
    /// A hung store then holds every pending call, including detached backfills, until it
    /// answers.
    #[must_use]
    pub fn without_timeout(mut self) -> Self {
        self.timeout = None;
        self
    }

    /// Returns the bound on each store call, if any.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Returns the store key for `id`.
    #[must_use]
    pub fn key(id: &EntityId) -> String {
        format!("{}:{id}", E::KIND.as_str())
    }

    /// Returns the TTL entries are written with.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the underlying store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    async fn bounded<T>(&self, f: impl Future<Output = Result<T>> + Send) -> Result<T> {
        match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, f)
                .await
                .unwrap_or_else(|_elapsed| Err(CacheError::Timeout(timeout))),
            None => f.await,
        }
    }
}

impl<E, S> CacheStore<E> for EntityCache<E, S>
where
    E: Entity,
    S: KeyValueStore,
{
    async fn get(&self, id: &EntityId) -> CacheLookup<E> {
        let key = Self::key(id);
        let (result, duration) = telemetry::timed(self.bounded(self.store.get(&key))).await;

        let (lookup, activity) = match result {
            Ok(Some(payload)) => match serde_json::from_slice::<E>(&payload) {
                Ok(entity) => (CacheLookup::Hit(entity), CacheActivity::Hit),
                Err(_) => (CacheLookup::Miss, CacheActivity::Undecodable),
            },
            Ok(None) => (CacheLookup::Miss, CacheActivity::Miss),
            Err(error) => (CacheLookup::Unavailable(error), CacheActivity::Unavailable),
        };

        telemetry::record(E::KIND, CacheOperation::Get, activity, duration);
        lookup
    }

    async fn set(&self, id: &EntityId, entity: &E) -> Result<()> {
        let key = Self::key(id);
        let payload = Bytes::from(serde_json::to_vec(entity)?);
        let (result, duration) = telemetry::timed(self.bounded(self.store.set(&key, payload, self.ttl))).await;

        let activity = if result.is_ok() {
            CacheActivity::Inserted
        } else {
            CacheActivity::Error
        };
        telemetry::record(E::KIND, CacheOperation::Set, activity, duration);
        result
    }
}
