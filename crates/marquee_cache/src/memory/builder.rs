// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Builder for configuring in-memory stores.

use super::MemoryStore;

/// Builder for configuring a [`MemoryStore`].
///
/// The builder keeps moka's types out of the public API. Entry lifetimes are not configured
/// here: every `set` carries its own TTL.
///
/// # Examples
///
/// ```
/// use marquee_cache::MemoryStore;
///
/// let store = MemoryStore::builder()
///     .max_capacity(10_000)
///     .initial_capacity(100)
///     .name("catalog")
///     .build();
/// ```
#[derive(Debug, Default)]
pub struct MemoryStoreBuilder {
    pub(crate) max_capacity: Option<u64>,
    pub(crate) initial_capacity: Option<usize>,
    pub(crate) name: Option<String>,
}

impl MemoryStoreBuilder {
    /// Creates a new builder for an unbounded store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum number of entries.
    ///
    /// Once reached, moka evicts entries using its `TinyLFU` policy.
    #[must_use]
    pub fn max_capacity(mut self, capacity: u64) -> Self {
        self.max_capacity = Some(capacity);
        self
    }

    /// Sets the initial capacity (pre-allocation hint).
    #[must_use]
    pub fn initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = Some(capacity);
        self
    }

    /// Sets a name that may appear in moka's debugging output.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Builds the configured store.
    #[must_use]
    pub fn build(self) -> MemoryStore {
        MemoryStore::from_builder(&self)
    }
}
