// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The read-through lookup service.

use std::collections::HashSet;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use futures::future::join_all;
use marquee_cache::{CacheLookup, CacheStore};
use marquee_model::{Entity, EntityId};
use marquee_search::{Page, QueryBuilder, QueryParams, SearchBackend, SearchError};
use tokio::time::Instant;
use tracing::Instrument;

use crate::telemetry::{self, BackendOperation};
use crate::{Backfill, Result, ServiceConfig};

/// Serves lookups of one entity kind from a cache in front of a search backend.
///
/// - [`fetch_by_id`](Self::fetch_by_id) and [`bulk_fetch_by_ids`](Self::bulk_fetch_by_ids) read
///   through the cache: hits are returned as they are, everything else is fetched from the
///   backend and written back.
/// - [`search`](Self::search) always goes to the backend.
///
/// The cache and backend are shared behind [`Arc`]s; cloning a service is cheap and the clone
/// uses the same clients. The service keeps no other state between calls.
///
/// # Failure handling
///
/// A cache that is unreachable or times out is logged and treated as a miss, so reads keep
/// working from the backend alone. A failed backfill is logged and never fails the read. Backend
/// failures are returned as [`ServiceError`](crate::ServiceError), never folded into an empty
/// result.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use marquee::ReadThroughService;
/// use marquee_cache::{EntityCache, MemoryStore};
/// use marquee_model::Film;
/// use marquee_search::MemoryIndex;
///
/// # tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap().block_on(async {
/// let backend = MemoryIndex::from_iter([Film::new("f1", "Alien"), Film::new("f2", "Heat")]);
/// let cache = EntityCache::<Film, _>::new(MemoryStore::new(), Duration::from_secs(300));
/// let films = ReadThroughService::new(cache, backend);
///
/// let found = films.bulk_fetch_by_ids(&["f1".into(), "f1".into(), "missing".into()]).await?;
/// assert_eq!(found.len(), 1);
/// # Ok::<(), marquee::ServiceError>(())
/// # }).unwrap();
/// ```
pub struct ReadThroughService<E, C, B> {
    cache: Arc<C>,
    backend: Arc<B>,
    queries: QueryBuilder,
    config: ServiceConfig,
    _entity: PhantomData<fn() -> E>,
}

impl<E, C: fmt::Debug, B: fmt::Debug> fmt::Debug for ReadThroughService<E, C, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadThroughService")
            .field("cache", &self.cache)
            .field("backend", &self.backend)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<E, C, B> Clone for ReadThroughService<E, C, B> {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
            backend: Arc::clone(&self.backend),
            queries: self.queries,
            config: self.config,
            _entity: PhantomData,
        }
    }
}

impl<E, C, B> ReadThroughService<E, C, B>
where
    E: Entity,
    C: CacheStore<E> + 'static,
    B: SearchBackend<E>,
{
    /// Creates a service with the default [`ServiceConfig`].
    ///
    /// Backfills are detached by default, so each one runs for as long as a single cache write
    /// may take. Give `cache` a timeout (as [`EntityCache`](marquee_cache::EntityCache) has by
    /// default) so a hung store cannot accumulate pending writes.
    #[must_use]
    pub fn new(cache: C, backend: B) -> Self {
        Self::from_shared(Arc::new(cache), Arc::new(backend))
    }

    /// Creates a service over clients that are already shared.
    #[must_use]
    pub fn from_shared(cache: Arc<C>, backend: Arc<B>) -> Self {
        Self {
            cache,
            backend,
            queries: QueryBuilder::for_kind(E::KIND),
            config: ServiceConfig::default(),
            _entity: PhantomData,
        }
    }

    /// Replaces the service configuration.
    #[must_use]
    pub fn with_config(mut self, config: ServiceConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the service configuration.
    #[must_use]
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Returns the cache.
    #[must_use]
    pub fn cache(&self) -> &Arc<C> {
        &self.cache
    }

    /// Returns the search backend.
    #[must_use]
    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    /// Looks up one entity, returning `Ok(None)` if the backend does not know it.
    ///
    /// A cache hit never reaches the backend. On a miss the backend result is written back to the
    /// cache before or after returning, depending on [`Backfill`].
    ///
    /// # Errors
    ///
    /// Returns an error if the cache misses and the backend call fails or times out.
    pub async fn fetch_by_id(&self, id: &EntityId) -> Result<Option<E>> {
        match self.cache.get(id).await {
            CacheLookup::Hit(entity) => return Ok(Some(entity)),
            CacheLookup::Miss => {}
            CacheLookup::Unavailable(error) => telemetry::cache_degraded(E::KIND, id, &error),
        }

        let found = self
            .call_backend(BackendOperation::GetById, self.backend.get_by_id(id), |found| {
                usize::from(found.is_some())
            })
            .await?;

        if let Some(entity) = &found {
            self.backfill(vec![entity.clone()]).await;
        }

        Ok(found)
    }

    /// Looks up many entities at once.
    ///
    /// Every distinct id is looked up in the cache concurrently, and all ids the cache could not
    /// answer are fetched with a single bulk backend call. The result holds one entity per id the
    /// cache or backend knows: cache hits first, then backend results. Duplicated ids are looked
    /// up once, and unknown ids are left out.
    ///
    /// An empty `ids` returns immediately without touching the cache or the backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the bulk backend call fails or times out. Cache hits are not returned
    /// on their own in that case.
    pub async fn bulk_fetch_by_ids(&self, ids: &[EntityId]) -> Result<Vec<E>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut seen = HashSet::with_capacity(ids.len());
        let distinct: Vec<&EntityId> = ids.iter().filter(|id| seen.insert(*id)).collect();

        let lookups = join_all(distinct.iter().map(|id| self.cache.get(id))).await;

        let mut found = Vec::with_capacity(distinct.len());
        let mut misses = Vec::new();
        for (id, lookup) in distinct.into_iter().zip(lookups) {
            match lookup {
                CacheLookup::Hit(entity) => found.push(entity),
                CacheLookup::Miss => misses.push(id.clone()),
                CacheLookup::Unavailable(error) => {
                    telemetry::cache_degraded(E::KIND, id, &error);
                    misses.push(id.clone());
                }
            }
        }

        if misses.is_empty() {
            return Ok(found);
        }

        let fetched = self
            .call_backend(BackendOperation::BulkGet, self.backend.bulk_get_by_ids(&misses), Vec::len)
            .await?;

        // Keep one entity per requested miss, whatever the backend sent back.
        let mut wanted: HashSet<&EntityId> = misses.iter().collect();
        let fetched: Vec<E> = fetched.into_iter().filter(|entity| wanted.remove(entity.id())).collect();

        self.backfill(fetched.clone()).await;
        found.extend(fetched);
        Ok(found)
    }

    /// Runs a structured search and returns one page of results.
    ///
    /// Searches are not cached. No matches is `Ok` with an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::InvalidQuery`](crate::ServiceError::InvalidQuery) if `params` are
    /// not valid for this kind, without calling the backend. Returns a backend error if the
    /// search fails or times out.
    pub async fn search(&self, params: &QueryParams, page: Page) -> Result<Vec<E>> {
        let query = self.queries.build(params)?;
        self.call_backend(BackendOperation::Search, self.backend.search(&query, page), Vec::len)
            .await
    }

    async fn call_backend<T>(
        &self,
        operation: BackendOperation,
        call: impl Future<Output = marquee_search::Result<T>>,
        returned: impl FnOnce(&T) -> usize,
    ) -> Result<T> {
        let start = Instant::now();
        let result = match self.config.backend_timeout {
            Some(timeout) => tokio::time::timeout(timeout, call)
                .await
                .unwrap_or_else(|_elapsed| Err(SearchError::Timeout(timeout))),
            None => call.await,
        };

        match result {
            Ok(value) => {
                telemetry::backend_completed(E::KIND, operation, returned(&value), start.elapsed());
                Ok(value)
            }
            Err(error) => {
                telemetry::backend_failed(E::KIND, operation, &error, start.elapsed());
                Err(error.into())
            }
        }
    }

    async fn backfill(&self, entities: Vec<E>) {
        if entities.is_empty() {
            return;
        }

        let cache = Arc::clone(&self.cache);
        let writes = async move {
            let results = join_all(entities.iter().map(|entity| cache.set(entity.id(), entity))).await;
            for (entity, result) in entities.iter().zip(results) {
                if let Err(error) = result {
                    telemetry::backfill_failed(E::KIND, entity.id(), &error);
                }
            }
        };

        match self.config.backfill {
            Backfill::Detached => {
                tokio::spawn(writes.in_current_span());
            }
            Backfill::Awaited => writes.await,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use marquee_cache::EntityCache;
    use marquee_cache::testing::{MockStore, StoreOp};
    use marquee_model::Person;
    use marquee_search::testing::{BackendCall, MockBackend};
    use tracing_test::traced_test;

    use super::*;
    use crate::ServiceError;

    type Service = ReadThroughService<Person, EntityCache<Person, MockStore>, MockBackend<Person>>;

    const TTL: Duration = Duration::from_secs(300);

    fn service(store: &MockStore, backend: &MockBackend<Person>) -> Service {
        ReadThroughService::new(EntityCache::new(store.clone(), TTL), backend.clone())
            .with_config(ServiceConfig::default().backfill(Backfill::Awaited))
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_by_id_reads_through_and_backfills() {
        let store = MockStore::new();
        let backend = MockBackend::from_iter([Person::new("p1", "Chris Cooper")]);
        let service = service(&store, &backend);

        let first = service.fetch_by_id(&"p1".into()).await.unwrap();
        let second = service.fetch_by_id(&"p1".into()).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.map(|p| p.full_name), Some("Chris Cooper".to_owned()));
        assert_eq!(backend.calls(), vec![BackendCall::GetById("p1".into())]);
        assert!(store.contains_key("person:p1"));
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_by_id_not_found_is_none_and_not_cached() {
        let store = MockStore::new();
        let backend = MockBackend::new();
        let service = service(&store, &backend);

        assert_eq!(service.fetch_by_id(&"nobody".into()).await.unwrap(), None);
        assert_eq!(store.set_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_by_id_backend_failure_is_an_error() {
        let store = MockStore::new();
        let backend = MockBackend::<Person>::new();
        backend.fail_when(|_| true);
        let service = service(&store, &backend);

        let error = service.fetch_by_id(&"p1".into()).await.unwrap_err();
        assert!(matches!(error, ServiceError::BackendUnavailable(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn backfill_failure_does_not_fail_the_read() {
        let store = MockStore::new();
        store.fail_when(|op| matches!(op, StoreOp::Set { .. }));
        let backend = MockBackend::from_iter([Person::new("p1", "Chris Cooper")]);
        let service = service(&store, &backend);

        let found = service.bulk_fetch_by_ids(&["p1".into()]).await.unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(store.set_count(), 1);
        assert_eq!(store.entry_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn bulk_drops_unrequested_and_duplicate_backend_results() {
        let store = MockStore::new();
        let backend = MockBackend::from_iter([Person::new("p1", "Chris Cooper"), Person::new("p2", "June Laverick")]);
        let service = service(&store, &backend);

        let found = service
            .bulk_fetch_by_ids(&["p1".into(), "p1".into(), "p1".into()])
            .await
            .unwrap();

        assert_eq!(found, [Person::new("p1", "Chris Cooper")]);
        assert_eq!(backend.calls(), vec![BackendCall::BulkGet(vec!["p1".into()])]);
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_search_never_reaches_backend() {
        let store = MockStore::new();
        let backend = MockBackend::<Person>::new();
        let service = service(&store, &backend);

        let error = service
            .search(&QueryParams::new("june").with_filter("g1"), Page::default())
            .await
            .unwrap_err();

        assert!(matches!(error, ServiceError::InvalidQuery(_)));
        assert_eq!(backend.search_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    #[traced_test]
    async fn cache_outage_is_logged_and_served_from_backend() {
        let store = MockStore::new();
        store.fail_when(|op| matches!(op, StoreOp::Get(_)));
        let backend = MockBackend::from_iter([Person::new("p7", "June Laverick")]);
        let service = service(&store, &backend);

        let found = service.fetch_by_id(&"p7".into()).await.unwrap();

        assert!(found.is_some());
        assert!(logs_contain("catalog.cache_degraded"));
        assert!(logs_contain("p7"));
    }

    #[tokio::test(start_paused = true)]
    #[traced_test]
    async fn detached_backfill_to_hung_store_gives_up() {
        let store = MockStore::new();
        store.set_latency(Duration::from_secs(3600));
        let backend = MockBackend::from_iter([Person::new("p1", "Chris Cooper")]);
        let service = ReadThroughService::new(EntityCache::new(store.clone(), TTL), backend);

        let found = service.fetch_by_id(&"p1".into()).await.unwrap();
        assert!(found.is_some());

        tokio::time::sleep(Duration::from_secs(1)).await;

        assert!(logs_contain("catalog.backfill_failed"));
        assert!(logs_contain("timed out"));
        assert_eq!(store.entry_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    #[traced_test]
    async fn backend_failure_is_logged() {
        let store = MockStore::new();
        let backend = MockBackend::<Person>::new();
        backend.fail_when(|call| matches!(call, BackendCall::BulkGet(_)));
        let service = service(&store, &backend);

        service.bulk_fetch_by_ids(&["p1".into()]).await.unwrap_err();

        assert!(logs_contain("catalog.backend_failed"));
        assert!(logs_contain("search.mget"));
    }
}
