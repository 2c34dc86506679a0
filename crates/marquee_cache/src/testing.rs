// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Mock store implementation for testing.
//!
//! This module provides [`MockStore`], an in-memory key/value store that records all operations
//! and supports failure and latency injection for testing degraded-cache paths.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use parking_lot::Mutex;
use tokio::time::Instant;

use crate::{CacheError, KeyValueStore, Result, StoreEntry};

/// Recorded store operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp {
    /// A get was performed for the given key.
    Get(String),
    /// A set was performed for the given key.
    Set {
        /// The key that was written.
        key: String,
        /// The TTL the value was written with.
        ttl: Duration,
    },
}

impl StoreOp {
    /// Returns the key this operation touched.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::Get(key) | Self::Set { key, .. } => key,
        }
    }
}

type FailPredicate = Box<dyn Fn(&StoreOp) -> bool + Send + Sync>;

/// A configurable mock store for testing.
///
/// Values are kept in memory and honor their TTL against [`tokio::time::Instant`], so tests on a
/// paused runtime can expire entries with [`tokio::time::advance`]. Every operation is recorded,
/// including failed ones.
///
/// Clones share state, so a test can keep a handle while the code under test owns another.
///
/// # Examples
///
/// ```ignore
/// use marquee_cache::KeyValueStore;
/// use marquee_cache::testing::{MockStore, StoreOp};
///
/// # tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap().block_on(async {
/// let store = MockStore::new();
///
/// // Fail every read, as if the store were unreachable.
/// store.fail_when(|op| matches!(op, StoreOp::Get(_)));
/// assert!(store.get("film:1").await.is_err());
/// assert_eq!(store.operations(), vec![StoreOp::Get("film:1".to_string())]);
/// # });
/// ```
pub struct MockStore {
    data: Arc<Mutex<HashMap<String, StoreEntry>>>,
    operations: Arc<Mutex<Vec<StoreOp>>>,
    fail_when: Arc<Mutex<Option<FailPredicate>>>,
    latency: Arc<Mutex<Option<Duration>>>,
}

impl std::fmt::Debug for MockStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockStore")
            .field("data", &self.data)
            .field("operations", &self.operations)
            .field("fail_when", &self.fail_when.lock().is_some())
            .field("latency", &self.latency)
            .finish()
    }
}

impl Clone for MockStore {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
            operations: Arc::clone(&self.operations),
            fail_when: Arc::clone(&self.fail_when),
            latency: Arc::clone(&self.latency),
        }
    }
}

impl Default for MockStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MockStore {
    /// Creates a new empty mock store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: Arc::new(Mutex::new(HashMap::new())),
            operations: Arc::new(Mutex::new(Vec::new())),
            fail_when: Arc::new(Mutex::new(None)),
            latency: Arc::new(Mutex::new(None)),
        }
    }

    /// Sets a predicate that determines when operations should fail.
    ///
    /// Failing operations return [`CacheError::Unavailable`] and leave the data untouched.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// use marquee_cache::testing::{MockStore, StoreOp};
    ///
    /// let store = MockStore::new();
    ///
    /// // Fail everything
    /// store.fail_when(|_| true);
    ///
    /// // Fail reads of one key
    /// store.fail_when(|op| matches!(op, StoreOp::Get(k) if k == "film:bad"));
    /// ```
    pub fn fail_when<F>(&self, predicate: F)
    where
        F: Fn(&StoreOp) -> bool + Send + Sync + 'static,
    {
        *self.fail_when.lock() = Some(Box::new(predicate));
    }

    /// Clears the failure predicate, allowing all operations to succeed.
    pub fn clear_failures(&self) {
        *self.fail_when.lock() = None;
    }

    /// Delays every operation by `latency` before it runs.
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock() = Some(latency);
    }

    /// Returns a clone of all recorded operations.
    #[must_use]
    pub fn operations(&self) -> Vec<StoreOp> {
        self.operations.lock().clone()
    }

    /// Returns how many recorded operations match `predicate`.
    #[must_use]
    pub fn count(&self, predicate: impl Fn(&StoreOp) -> bool) -> usize {
        self.operations.lock().iter().filter(|op| predicate(op)).count()
    }

    /// Returns the number of recorded gets.
    #[must_use]
    pub fn get_count(&self) -> usize {
        self.count(|op| matches!(op, StoreOp::Get(_)))
    }

    /// Returns the number of recorded sets.
    #[must_use]
    pub fn set_count(&self) -> usize {
        self.count(|op| matches!(op, StoreOp::Set { .. }))
    }

    /// Clears all recorded operations.
    pub fn clear_operations(&self) {
        self.operations.lock().clear();
    }

    /// Returns the stored payload for `key`, ignoring expiry.
    #[must_use]
    pub fn payload(&self, key: &str) -> Option<Bytes> {
        self.data.lock().get(key).map(|entry| entry.payload().clone())
    }

    /// Returns true if the store holds an entry for `key`, ignoring expiry.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.lock().contains_key(key)
    }

    /// Returns the number of stored entries, ignoring expiry.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.data.lock().len()
    }

    async fn run(&self, op: StoreOp) -> Result<()> {
        let latency = *self.latency.lock();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let fail = self.fail_when.lock().as_ref().is_some_and(|predicate| predicate(&op));
        let message = match &op {
            StoreOp::Get(_) => "mock: get failed",
            StoreOp::Set { .. } => "mock: set failed",
        };
        self.operations.lock().push(op);

        if fail { Err(CacheError::unavailable(message)) } else { Ok(()) }
    }
}

impl KeyValueStore for MockStore {
    async fn get(&self, key: &str) -> Result<Option<Bytes>> {
        self.run(StoreOp::Get(key.to_owned())).await?;

        let data = self.data.lock();
        Ok(data
            .get(key)
            .filter(|entry| !entry.is_expired(Instant::now()))
            .map(|entry| entry.payload().clone()))
    }

    async fn set(&self, key: &str, value: Bytes, ttl: Duration) -> Result<()> {
        self.run(StoreOp::Set {
            key: key.to_owned(),
            ttl,
        })
        .await?;

        self.data.lock().insert(key.to_owned(), StoreEntry::new(value, ttl, Instant::now()));
        Ok(())
    }

    fn len(&self) -> Option<u64> {
        Some(self.data.lock().len() as u64)
    }
}
