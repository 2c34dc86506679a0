// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The catalog container.

mod builder;
mod store;

use std::sync::Arc;

pub use builder::CatalogBuilder;
use marquee_cache::{EntityCache, KeyValueStore};
use marquee_model::{EntityId, Film, Person};
use marquee_search::SearchBackend;
pub use store::CatalogStore;

#[cfg(feature = "elastic")]
use crate::{CatalogConfig, ConnectError};
use crate::{ReadThroughService, Result};

/// Film lookups over a store shared by the catalog.
pub type FilmService<S, B> = ReadThroughService<Film, EntityCache<Film, Arc<S>>, B>;

/// Person lookups over a store shared by the catalog.
pub type PersonService<S, B> = ReadThroughService<Person, EntityCache<Person, Arc<S>>, B>;

/// Owns the lookup services of every entity kind.
///
/// A catalog is built once at startup and handed to whatever serves requests; it replaces
/// process-wide lazily created clients. Both services write to the same key/value store, with
/// keys namespaced by kind. Cloning is cheap and clones share every client.
///
/// # Examples
///
/// ```
/// use marquee::Catalog;
/// use marquee_cache::MemoryStore;
/// use marquee_model::{Film, Person};
/// use marquee_search::MemoryIndex;
///
/// # tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap().block_on(async {
/// let catalog = Catalog::builder(MemoryStore::new())
///     .films(MemoryIndex::from_iter([Film::new("f1", "Alien")]))
///     .persons(MemoryIndex::from_iter([Person::new("p1", "Sigourney Weaver").with_film("f1")]))
///     .build();
///
/// let films = catalog.films_of_person(&"p1".into()).await?.unwrap_or_default();
/// assert_eq!(films[0].title, "Alien");
/// # Ok::<(), marquee::ServiceError>(())
/// # }).unwrap();
/// ```
#[derive(Debug)]
pub struct Catalog<S = (), FB = (), PB = ()> {
    films: FilmService<S, FB>,
    persons: PersonService<S, PB>,
}

impl Catalog<(), (), ()> {
    /// Creates a catalog builder over `store`.
    ///
    /// Backends for each kind are added with [`CatalogBuilder::films`] and
    /// [`CatalogBuilder::persons`], or both at once with [`CatalogBuilder::search`].
    #[must_use]
    pub fn builder<S>(store: S) -> CatalogBuilder<S> {
        CatalogBuilder::new(store)
    }
}

#[cfg(feature = "elastic")]
impl Catalog<CatalogStore, marquee_search::ElasticBackend, marquee_search::ElasticBackend> {
    /// Wires a catalog from deployment settings.
    ///
    /// Opens the store selected by `config` (see [`CatalogStore::open`]) and points both kinds at
    /// the Elasticsearch cluster at `elasticsearch_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be opened or the cluster URL is invalid.
    pub async fn connect(config: &CatalogConfig) -> std::result::Result<Self, ConnectError> {
        let store = CatalogStore::open(config).await?;
        let search = marquee_search::ElasticBackend::new(&config.elasticsearch_url)?;

        tracing::info!(
            catalog.store = store.name(),
            catalog.search = %search.base_url(),
            catalog.backfill = config.backfill.as_str(),
            "catalog.connected"
        );

        Ok(Catalog::builder(store).search(search).config(config).build())
    }
}

impl<S, FB, PB> Clone for Catalog<S, FB, PB> {
    fn clone(&self) -> Self {
        Self {
            films: self.films.clone(),
            persons: self.persons.clone(),
        }
    }
}

impl<S, FB, PB> Catalog<S, FB, PB>
where
    S: KeyValueStore + 'static,
    FB: SearchBackend<Film>,
    PB: SearchBackend<Person>,
{
    /// Returns the film lookup service.
    #[must_use]
    pub fn films(&self) -> &FilmService<S, FB> {
        &self.films
    }

    /// Returns the person lookup service.
    #[must_use]
    pub fn persons(&self) -> &PersonService<S, PB> {
        &self.persons
    }

    /// Returns the films a person is credited on, or `None` if the person is unknown.
    ///
    /// The person and the films are both read through the cache. Credited films the backend
    /// does not know are left out.
    ///
    /// # Errors
    ///
    /// Returns an error if either backend lookup fails.
    pub async fn films_of_person(&self, id: &EntityId) -> Result<Option<Vec<Film>>> {
        let Some(person) = self.persons.fetch_by_id(id).await? else {
            return Ok(None);
        };

        let films = self.films.bulk_fetch_by_ids(&person.film_ids).await?;
        Ok(Some(films))
    }
}
