// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The typed cache contract consumed by the lookup services.

use std::sync::Arc;

use marquee_model::EntityId;

use crate::{CacheError, Result};

/// Outcome of a cache lookup.
///
/// A store that cannot be reached is reported as [`Unavailable`](Self::Unavailable) rather than
/// as a miss, so the caller can tell a cold cache from a broken one and pick its degradation
/// policy on purpose.
#[derive(Debug)]
pub enum CacheLookup<E> {
    /// The entity was cached and unexpired.
    Hit(E),
    /// The entity was not cached, or its entry had expired.
    Miss,
    /// The store could not answer.
    Unavailable(CacheError),
}

impl<E> CacheLookup<E> {
    /// Returns `true` for [`Hit`](Self::Hit).
    #[must_use]
    pub fn is_hit(&self) -> bool {
        matches!(self, Self::Hit(_))
    }

    /// Returns `true` for [`Unavailable`](Self::Unavailable).
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }

    /// Returns the cached entity, discarding the reason for a non-hit.
    #[must_use]
    pub fn hit(self) -> Option<E> {
        match self {
            Self::Hit(entity) => Some(entity),
            Self::Miss | Self::Unavailable(_) => None,
        }
    }
}

/// A cache of one entity kind, addressed by identifier.
///
/// `get` never consults the search backend. `set` stores the entity with a TTL starting now and
/// overwrites any previous entry; writing the same entity twice is harmless.
pub trait CacheStore<E>: Send + Sync {
    /// Looks up the entity stored under `id`.
    fn get(&self, id: &EntityId) -> impl Future<Output = CacheLookup<E>> + Send;

    /// Stores `entity` under `id`.
    fn set(&self, id: &EntityId, entity: &E) -> impl Future<Output = Result<()>> + Send;
}

impl<E, T> CacheStore<E> for Arc<T>
where
    T: CacheStore<E>,
{
    fn get(&self, id: &EntityId) -> impl Future<Output = CacheLookup<E>> + Send {
        (**self).get(id)
    }

    fn set(&self, id: &EntityId, entity: &E) -> impl Future<Output = Result<()>> + Send {
        (**self).set(id, entity)
    }
}
