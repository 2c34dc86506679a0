// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Mock backend implementation for testing.
//!
//! This module provides [`MockBackend`], a [`SearchBackend`] over an in-memory index that records
//! every call and supports failure and latency injection.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use marquee_model::{Entity, EntityId};
use parking_lot::Mutex;

use crate::{MemoryIndex, Page, Result, SearchBackend, SearchError, SearchQuery};

/// Recorded backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    /// A point lookup for the given identifier.
    GetById(EntityId),
    /// A bulk lookup for the given identifiers, in the order requested.
    BulkGet(Vec<EntityId>),
    /// A structured search.
    Search {
        /// The query that was run.
        query: SearchQuery,
        /// The requested page.
        page: Page,
    },
}

type FailPredicate = Box<dyn Fn(&BackendCall) -> bool + Send + Sync>;

/// A configurable mock backend for testing.
///
/// Documents live in a shared [`MemoryIndex`], so searches are scored the same way the
/// in-process index scores them. Clones share documents, recorded calls and injected failures.
///
/// # Examples
///
/// ```ignore
/// use marquee_model::Film;
/// use marquee_search::SearchBackend;
/// use marquee_search::testing::{BackendCall, MockBackend};
///
/// # tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap().block_on(async {
/// let backend = MockBackend::from_iter([Film::new("f1", "Alien")]);
///
/// let film: Option<Film> = backend.get_by_id(&"f1".into()).await.unwrap();
/// assert!(film.is_some());
/// assert_eq!(backend.calls(), vec![BackendCall::GetById("f1".into())]);
/// # });
/// ```
pub struct MockBackend<E> {
    index: MemoryIndex<E>,
    calls: Arc<Mutex<Vec<BackendCall>>>,
    fail_when: Arc<Mutex<Option<FailPredicate>>>,
    latency: Arc<Mutex<Option<Duration>>>,
}

impl<E> fmt::Debug for MockBackend<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockBackend")
            .field("index", &self.index)
            .field("calls", &self.calls)
            .field("fail_when", &self.fail_when.lock().is_some())
            .field("latency", &self.latency)
            .finish()
    }
}

impl<E> Clone for MockBackend<E> {
    fn clone(&self) -> Self {
        Self {
            index: self.index.clone(),
            calls: Arc::clone(&self.calls),
            fail_when: Arc::clone(&self.fail_when),
            latency: Arc::clone(&self.latency),
        }
    }
}

impl<E: Entity> Default for MockBackend<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> FromIterator<E> for MockBackend<E> {
    fn from_iter<I: IntoIterator<Item = E>>(iter: I) -> Self {
        Self::with_index(MemoryIndex::from_iter(iter))
    }
}

impl<E: Entity> MockBackend<E> {
    /// Creates a mock backend with no documents.
    #[must_use]
    pub fn new() -> Self {
        Self::with_index(MemoryIndex::new())
    }

    /// Creates a mock backend serving the documents in `index`.
    #[must_use]
    pub fn with_index(index: MemoryIndex<E>) -> Self {
        Self {
            index,
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_when: Arc::new(Mutex::new(None)),
            latency: Arc::new(Mutex::new(None)),
        }
    }

    /// Returns the index backing this mock.
    #[must_use]
    pub fn index(&self) -> &MemoryIndex<E> {
        &self.index
    }

    /// Adds or replaces a document.
    pub fn insert(&self, entity: E) {
        self.index.insert(entity);
    }

    /// Sets a predicate that determines when calls should fail.
    ///
    /// Failing calls return [`SearchError::Unavailable`].
    pub fn fail_when<F>(&self, predicate: F)
    where
        F: Fn(&BackendCall) -> bool + Send + Sync + 'static,
    {
        *self.fail_when.lock() = Some(Box::new(predicate));
    }

    /// Clears the failure predicate, allowing all calls to succeed.
    pub fn clear_failures(&self) {
        *self.fail_when.lock() = None;
    }

    /// Delays every call by `latency` before it runs.
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock() = Some(latency);
    }

    /// Returns a clone of all recorded calls.
    #[must_use]
    pub fn calls(&self) -> Vec<BackendCall> {
        self.calls.lock().clone()
    }

    /// Returns how many recorded calls match `predicate`.
    #[must_use]
    pub fn count(&self, predicate: impl Fn(&BackendCall) -> bool) -> usize {
        self.calls.lock().iter().filter(|call| predicate(call)).count()
    }

    /// Returns the number of recorded point lookups.
    #[must_use]
    pub fn get_count(&self) -> usize {
        self.count(|call| matches!(call, BackendCall::GetById(_)))
    }

    /// Returns the number of recorded bulk lookups.
    #[must_use]
    pub fn bulk_count(&self) -> usize {
        self.count(|call| matches!(call, BackendCall::BulkGet(_)))
    }

    /// Returns the number of recorded searches.
    #[must_use]
    pub fn search_count(&self) -> usize {
        self.count(|call| matches!(call, BackendCall::Search { .. }))
    }

    /// Clears all recorded calls.
    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    async fn run(&self, call: BackendCall) -> Result<()> {
        let latency = *self.latency.lock();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let fail = self.fail_when.lock().as_ref().is_some_and(|predicate| predicate(&call));
        self.calls.lock().push(call);

        if fail {
            Err(SearchError::unavailable("mock: backend unavailable"))
        } else {
            Ok(())
        }
    }
}

impl<E: Entity> SearchBackend<E> for MockBackend<E> {
    async fn get_by_id(&self, id: &EntityId) -> Result<Option<E>> {
        self.run(BackendCall::GetById(id.clone())).await?;
        Ok(self.index.get(id))
    }

    async fn bulk_get_by_ids(&self, ids: &[EntityId]) -> Result<Vec<E>> {
        self.run(BackendCall::BulkGet(ids.to_vec())).await?;
        Ok(self.index.get_many(ids))
    }

    async fn search(&self, query: &SearchQuery, page: Page) -> Result<Vec<E>> {
        self.run(BackendCall::Search {
            query: query.clone(),
            page,
        })
        .await?;
        self.index.query(query, page)
    }
}
