// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::sync::Arc;
use std::time::Duration;

use marquee_cache::{EntityCache, KeyValueStore};
use marquee_model::{Entity, Film, Person};
use marquee_search::SearchBackend;

use super::Catalog;
use crate::{CatalogConfig, ReadThroughService, ServiceConfig};

/// Builder for [`Catalog`].
///
/// Obtained from [`Catalog::builder`]. The store is fixed up front; a backend for each kind must
/// be supplied before [`build`](Self::build) becomes available.
#[derive(Debug)]
pub struct CatalogBuilder<S, FB = (), PB = ()> {
    store: S,
    films: FB,
    persons: PB,
    cache_ttl: Duration,
    cache_timeout: Option<Duration>,
    service: ServiceConfig,
}

impl<S> CatalogBuilder<S> {
    pub(super) fn new(store: S) -> Self {
        let defaults = CatalogConfig::default();
        Self {
            store,
            films: (),
            persons: (),
            cache_ttl: defaults.cache_ttl(),
            cache_timeout: defaults.cache_timeout(),
            service: defaults.service_config(),
        }
    }

    /// Uses `backend` for both films and persons.
    pub fn search<B: Clone>(self, backend: B) -> CatalogBuilder<S, B, B> {
        self.films(backend.clone()).persons(backend)
    }
}

impl<S, FB, PB> CatalogBuilder<S, FB, PB> {
    /// Sets the search backend for films.
    pub fn films<B>(self, backend: B) -> CatalogBuilder<S, B, PB> {
        CatalogBuilder {
            store: self.store,
            films: backend,
            persons: self.persons,
            cache_ttl: self.cache_ttl,
            cache_timeout: self.cache_timeout,
            service: self.service,
        }
    }

    /// Sets the search backend for persons.
    pub fn persons<B>(self, backend: B) -> CatalogBuilder<S, FB, B> {
        CatalogBuilder {
            store: self.store,
            films: self.films,
            persons: backend,
            cache_ttl: self.cache_ttl,
            cache_timeout: self.cache_timeout,
            service: self.service,
        }
    }

    /// Sets how long cache entries live.
    #[must_use]
    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Bounds every cache call by `timeout`, or removes the bound with `None`.
    #[must_use]
    pub fn cache_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.cache_timeout = timeout;
        self
    }

    /// Sets the configuration of both services.
    #[must_use]
    pub fn service_config(mut self, config: ServiceConfig) -> Self {
        self.service = config;
        self
    }

    /// Applies the TTL, timeouts and backfill mode from `config`.
    #[must_use]
    pub fn config(self, config: &CatalogConfig) -> Self {
        self.cache_ttl(config.cache_ttl())
            .cache_timeout(config.cache_timeout())
            .service_config(config.service_config())
    }
}

impl<S, FB, PB> CatalogBuilder<S, FB, PB>
where
    S: KeyValueStore + 'static,
    FB: SearchBackend<Film>,
    PB: SearchBackend<Person>,
{
    /// Builds the catalog.
    #[must_use]
    pub fn build(self) -> Catalog<S, FB, PB> {
        let store = Arc::new(self.store);
        let films = entity_cache::<Film, _>(Arc::clone(&store), self.cache_ttl, self.cache_timeout);
        let persons = entity_cache::<Person, _>(store, self.cache_ttl, self.cache_timeout);

        Catalog {
            films: ReadThroughService::new(films, self.films).with_config(self.service),
            persons: ReadThroughService::new(persons, self.persons).with_config(self.service),
        }
    }
}

fn entity_cache<E: Entity, S>(store: Arc<S>, ttl: Duration, timeout: Option<Duration>) -> EntityCache<E, Arc<S>> {
    let cache = EntityCache::new(store, ttl);
    match timeout {
        Some(timeout) => cache.with_timeout(timeout),
        None => cache.without_timeout(),
    }
}

#[cfg(test)]
mod tests {
    use marquee_cache::MemoryStore;
    use marquee_model::EntityId;
    use marquee_search::{MemoryIndex, Page, SearchQuery};

    use super::*;

    /// One client serving both kinds, the way a search cluster does.
    #[derive(Clone, Debug, Default)]
    struct Cluster {
        films: MemoryIndex<Film>,
        persons: MemoryIndex<Person>,
    }

    macro_rules! serve {
        ($entity:ty, $field:ident) => {
            impl SearchBackend<$entity> for Cluster {
                async fn get_by_id(&self, id: &EntityId) -> marquee_search::Result<Option<$entity>> {
                    self.$field.get_by_id(id).await
                }

                async fn bulk_get_by_ids(&self, ids: &[EntityId]) -> marquee_search::Result<Vec<$entity>> {
                    self.$field.bulk_get_by_ids(ids).await
                }

                async fn search(&self, query: &SearchQuery, page: Page) -> marquee_search::Result<Vec<$entity>> {
                    self.$field.search(query, page).await
                }
            }
        };
    }

    serve!(Film, films);
    serve!(Person, persons);

    #[tokio::test]
    async fn one_backend_serves_both_kinds() {
        let cluster = Cluster::default();
        cluster.films.insert(Film::new("f1", "Alien"));
        cluster.persons.insert(Person::new("p1", "Ridley Scott"));

        let catalog = Catalog::builder(MemoryStore::new()).search(cluster).build();

        assert!(catalog.films().fetch_by_id(&"f1".into()).await.unwrap().is_some());
        assert!(catalog.persons().fetch_by_id(&"p1".into()).await.unwrap().is_some());
    }

    #[test]
    fn defaults_follow_catalog_config() {
        let builder = Catalog::builder(MemoryStore::new());
        let defaults = CatalogConfig::default();

        assert_eq!(builder.cache_ttl, defaults.cache_ttl());
        assert_eq!(builder.cache_timeout, defaults.cache_timeout());
        assert_eq!(builder.service, ServiceConfig::default());
    }
}
