// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::sync::Arc;

use marquee_model::{Entity, EntityId};

use crate::{Page, Result, SearchQuery};

/// A source-of-truth search store for one entity kind.
///
/// Implementations report a missing document as `Ok(None)` or by omitting it from bulk results;
/// errors are reserved for an unreachable or misbehaving store.
pub trait SearchBackend<E: Entity>: Send + Sync {
    /// Fetches a single document by identifier.
    fn get_by_id(&self, id: &EntityId) -> impl Future<Output = Result<Option<E>>> + Send;

    /// Fetches every document whose identifier is in `ids`, in a single round trip.
    ///
    /// Identifiers with no document are skipped. Result order is unspecified.
    fn bulk_get_by_ids(&self, ids: &[EntityId]) -> impl Future<Output = Result<Vec<E>>> + Send;

    /// Runs a structured search and returns one page of results.
    fn search(&self, query: &SearchQuery, page: Page) -> impl Future<Output = Result<Vec<E>>> + Send;
}

impl<E, T> SearchBackend<E> for Arc<T>
where
    E: Entity,
    T: SearchBackend<E>,
{
    async fn get_by_id(&self, id: &EntityId) -> Result<Option<E>> {
        self.as_ref().get_by_id(id).await
    }

    async fn bulk_get_by_ids(&self, ids: &[EntityId]) -> Result<Vec<E>> {
        self.as_ref().bulk_get_by_ids(ids).await
    }

    async fn search(&self, query: &SearchQuery, page: Page) -> Result<Vec<E>> {
        self.as_ref().search(query, page).await
    }
}
