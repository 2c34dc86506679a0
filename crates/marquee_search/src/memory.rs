// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use marquee_model::{Entity, EntityId};
use parking_lot::RwLock;

use crate::{Page, Result, SearchBackend, SearchQuery};

/// An in-process search index.
///
/// Serves the same operations as a remote index from a map of documents held in memory, scoring
/// free-text searches with [`SearchQuery::score`]. Useful for local runs and as the data behind
/// test doubles. Cloning is cheap; clones share the same documents.
///
/// # Examples
///
/// ```
/// use marquee_model::{EntityKind, Person};
/// use marquee_search::{MemoryIndex, Page, QueryBuilder, QueryParams, SearchBackend};
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let index = MemoryIndex::from_iter([Person::new("p1", "June Laverick")]);
/// let query = QueryBuilder::for_kind(EntityKind::Person).build(&QueryParams::new("june"))?;
///
/// let found = index.search(&query, Page::default()).await?;
/// assert_eq!(found[0].full_name, "June Laverick");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// # }).unwrap();
/// ```
pub struct MemoryIndex<E> {
    documents: Arc<RwLock<HashMap<EntityId, E>>>,
}

impl<E: Entity> MemoryIndex<E> {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self {
            documents: Arc::default(),
        }
    }

    /// Inserts or replaces a document.
    pub fn insert(&self, entity: E) {
        self.documents.write().insert(entity.id().clone(), entity);
    }

    /// Removes a document, returning it if it was present.
    #[must_use]
    pub fn remove(&self, id: &EntityId) -> Option<E> {
        self.documents.write().remove(id)
    }

    /// Returns the number of documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    /// Returns `true` if the index holds no documents.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }

    /// Returns a copy of the document with the given identifier.
    #[must_use]
    pub fn get(&self, id: &EntityId) -> Option<E> {
        self.documents.read().get(id).cloned()
    }

    /// Returns every document matching `ids`.
    #[must_use]
    pub fn get_many(&self, ids: &[EntityId]) -> Vec<E> {
        let documents = self.documents.read();
        ids.iter().filter_map(|id| documents.get(id).cloned()).collect()
    }

    /// Evaluates `query` over every document and returns the requested page.
    ///
    /// Ties under the query's ordering are broken by identifier so pages are stable.
    ///
    /// # Errors
    ///
    /// Returns an error if a document cannot be serialized for scoring.
    pub fn query(&self, query: &SearchQuery, page: Page) -> Result<Vec<E>> {
        let documents = self.documents.read();

        let mut scored = Vec::new();
        for entity in documents.values() {
            let value = serde_json::to_value(entity)?;
            if let Some(score) = query.score(&value) {
                scored.push((entity, value, score));
            }
        }

        scored.sort_by(|(a, a_value, a_score), (b, b_value, b_score)| {
            query
                .compare((a_value, *a_score), (b_value, *b_score))
                .then_with(|| a.id().cmp(b.id()))
        });

        Ok(scored
            .into_iter()
            .skip(page.offset())
            .take(page.size())
            .map(|(entity, _, _)| entity.clone())
            .collect())
    }
}

impl<E: Entity> Default for MemoryIndex<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for MemoryIndex<E> {
    fn clone(&self) -> Self {
        Self {
            documents: Arc::clone(&self.documents),
        }
    }
}

impl<E> fmt::Debug for MemoryIndex<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryIndex")
            .field("documents", &self.documents.read().len())
            .finish()
    }
}

impl<E: Entity> FromIterator<E> for MemoryIndex<E> {
    fn from_iter<I: IntoIterator<Item = E>>(iter: I) -> Self {
        let mut index = Self::new();
        index.extend(iter);
        index
    }
}

impl<E: Entity> Extend<E> for MemoryIndex<E> {
    fn extend<I: IntoIterator<Item = E>>(&mut self, iter: I) {
        let mut documents = self.documents.write();
        for entity in iter {
            documents.insert(entity.id().clone(), entity);
        }
    }
}

impl<E: Entity> SearchBackend<E> for MemoryIndex<E> {
    async fn get_by_id(&self, id: &EntityId) -> Result<Option<E>> {
        Ok(self.get(id))
    }

    async fn bulk_get_by_ids(&self, ids: &[EntityId]) -> Result<Vec<E>> {
        Ok(self.get_many(ids))
    }

    async fn search(&self, query: &SearchQuery, page: Page) -> Result<Vec<E>> {
        self.query(query, page)
    }
}
