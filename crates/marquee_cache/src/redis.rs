// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Distributed key/value store backed by Redis.

use std::fmt;
use std::time::Duration;

use bytes::Bytes;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;

use crate::{CacheError, KeyValueStore, Result};

/// A Redis-backed key/value store.
///
/// Values are written with `SET key value EX seconds`, so Redis expires them on its own; the store
/// never issues deletes. The connection manager reconnects transparently after connection loss;
/// commands issued while Redis is down fail with [`CacheError::Unavailable`].
///
/// Cloning is cheap and clones share the same multiplexed connection.
///
/// # Examples
///
/// ```no_run
/// use marquee_cache::{EntityCache, RedisStore};
/// use marquee_model::Film;
/// use std::time::Duration;
///
/// # async fn example() -> marquee_cache::Result<()> {
/// let store = RedisStore::connect("redis://127.0.0.1:6379").await?;
/// let films = EntityCache::<Film, _>::new(store, Duration::from_secs(300));
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct RedisStore {
    connection: ConnectionManager,
}

impl fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisStore").finish_non_exhaustive()
    }
}

impl RedisStore {
    /// Connects to the Redis server at `url`.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Unavailable`] if the URL is invalid or the server cannot be reached.
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url).map_err(CacheError::unavailable)?;
        let connection = client.get_connection_manager().await.map_err(CacheError::unavailable)?;
        Ok(Self::from_connection(connection))
    }

    /// Wraps an existing connection manager.
    #[must_use]
    pub fn from_connection(connection: ConnectionManager) -> Self {
        Self { connection }
    }
}

impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<Bytes>> {
        let mut connection = self.connection.clone();
        let value: Option<Vec<u8>> = connection.get(key).await.map_err(CacheError::unavailable)?;
        Ok(value.map(Bytes::from))
    }

    async fn set(&self, key: &str, value: Bytes, ttl: Duration) -> Result<()> {
        let mut connection = self.connection.clone();
        connection
            .set_ex::<_, _, ()>(key, value.as_ref(), expiry_seconds(ttl))
            .await
            .map_err(CacheError::unavailable)
    }
}

/// Redis expiries have whole-second resolution; round up so entries never expire early.
fn expiry_seconds(ttl: Duration) -> u64 {
    let seconds = ttl.as_secs() + u64::from(ttl.subsec_nanos() > 0);
    seconds.max(1)
}
