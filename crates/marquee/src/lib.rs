// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(docsrs, feature(doc_cfg))]

//! Read-through cached lookups of catalog entities.
//!
//! Films and persons are stored in a search index that is the source of truth. A cache sits in
//! front of it to absorb repeated reads. A [`ReadThroughService`] ties the two together for one
//! entity kind:
//!
//! - [`fetch_by_id`](ReadThroughService::fetch_by_id) answers from the cache when it can and
//!   falls back to the index, writing what it fetched back to the cache.
//! - [`bulk_fetch_by_ids`](ReadThroughService::bulk_fetch_by_ids) looks every id up in the cache
//!   concurrently and resolves all misses with a single bulk call to the index. N ids with K
//!   hits cost K cache hits plus one backend call, never N backend calls.
//! - [`search`](ReadThroughService::search) runs validated, paged structured searches against
//!   the index.
//!
//! A [`Catalog`] owns one service per kind over a shared store, built once at startup from a
//! [`CatalogConfig`] or by hand with [`Catalog::builder`].
//!
//! # Failure model
//!
//! | Situation             | Result                                               |
//! |-----------------------|------------------------------------------------------|
//! | entity not found      | `Ok(None)`, or absent from the returned list         |
//! | cache unreachable     | logged at `warn`, served from the index              |
//! | cache write failed    | logged at `warn`, read succeeds                      |
//! | index failed or slow  | [`ServiceError::BackendUnavailable`]                 |
//! | index refused request | [`ServiceError::BackendRejected`]                    |
//! | invalid search        | [`ServiceError::InvalidQuery`], index never called   |
//!
//! # Examples
//!
//! ```
//! use marquee::{Backfill, Catalog, ServiceConfig};
//! use marquee_cache::MemoryStore;
//! use marquee_model::Film;
//! use marquee_search::{MemoryIndex, Page, QueryParams};
//!
//! # tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap().block_on(async {
//! let films = MemoryIndex::from_iter([
//!     Film::new("f1", "Alien").with_rating(8.5),
//!     Film::new("f2", "Aliens").with_rating(8.4),
//! ]);
//!
//! let catalog = Catalog::builder(MemoryStore::new())
//!     .films(films)
//!     .persons(MemoryIndex::new())
//!     .service_config(ServiceConfig::default().backfill(Backfill::Awaited))
//!     .build();
//!
//! let alien = catalog.films().fetch_by_id(&"f1".into()).await?;
//! assert_eq!(alien.map(|film| film.title), Some("Alien".to_owned()));
//!
//! let ranked = catalog
//!     .films()
//!     .search(&QueryParams::new("").with_sort("-imdb_rating".parse()?), Page::default())
//!     .await?;
//! assert_eq!(ranked.len(), 2);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! # }).unwrap();
//! ```
//!
//! # Features
//!
//! - `elastic`: `Catalog::connect` and the Elasticsearch backend.
//! - `redis`: Redis as the cache store.
//! - `test-util`: recording test doubles for the cache store and search backend.

mod catalog;
pub mod config;
pub mod error;
mod service;
mod telemetry;

#[doc(inline)]
pub use catalog::{Catalog, CatalogBuilder, CatalogStore, FilmService, PersonService};
#[doc(inline)]
pub use config::{Backfill, CatalogConfig, ServiceConfig};
#[doc(inline)]
pub use error::{ConnectError, Result, ServiceError};
#[doc(inline)]
pub use service::ReadThroughService;
