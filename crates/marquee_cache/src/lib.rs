// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(docsrs, feature(doc_cfg))]

//! TTL-bound entity caches.
//!
//! This crate separates storage from entity handling. Implement [`KeyValueStore`] for a storage
//! backend, then wrap it in an [`EntityCache`] to get a typed [`CacheStore`] for one entity kind.
//!
//! # Overview
//!
//! - [`KeyValueStore`]: `GET key -> bytes | absent`, `SET key bytes TTL`.
//! - [`MemoryStore`]: in-process store backed by moka (feature `memory`, on by default).
//! - [`RedisStore`]: distributed store backed by Redis (feature `redis`).
//! - [`EntityCache`]: key namespacing, JSON payloads, TTL, and per-call timeouts.
//! - [`CacheLookup`]: `Hit | Miss | Unavailable`, so that a store outage is never mistaken for
//!   an absent entry.
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//!
//! use marquee_cache::{CacheLookup, CacheStore, EntityCache, MemoryStore};
//! use marquee_model::Person;
//!
//! # tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap().block_on(async {
//! let cache = EntityCache::<Person, _>::new(MemoryStore::new(), Duration::from_secs(300));
//! let person = Person::new("p1", "Chris Cooper");
//!
//! cache.set(&person.id, &person).await?;
//! assert!(matches!(cache.get(&person.id).await, CacheLookup::Hit(p) if p == person));
//! # Ok::<(), marquee_cache::CacheError>(())
//! # }).unwrap();
//! ```

mod entity_cache;
mod entry;
pub mod error;
mod kv;
#[cfg(feature = "memory")]
mod memory;
#[cfg(feature = "redis")]
mod redis;
mod store;
mod telemetry;
#[cfg(any(feature = "test-util", test))]
pub mod testing;

#[doc(inline)]
pub use entity_cache::EntityCache;
#[doc(inline)]
pub use entry::StoreEntry;
#[doc(inline)]
pub use error::{CacheError, Result};
#[doc(inline)]
pub use kv::KeyValueStore;
#[cfg(feature = "memory")]
#[doc(inline)]
pub use memory::{MemoryStore, MemoryStoreBuilder};
#[cfg(feature = "redis")]
#[doc(inline)]
pub use redis::RedisStore;
#[doc(inline)]
pub use store::{CacheLookup, CacheStore};
