// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt::Debug;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::EntityId;

/// The kinds of catalog entities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// A film.
    Film,
    /// A person credited on films.
    Person,
}

impl EntityKind {
    /// Short name used for cache key namespaces and log fields.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Film => "film",
            Self::Person => "person",
        }
    }

    /// Name of the search index holding this kind of entity.
    #[must_use]
    pub fn index(self) -> &'static str {
        match self {
            Self::Film => "movies",
            Self::Person => "persons",
        }
    }
}

/// A catalog record with a unique identifier.
///
/// Entities are opaque to the cache: it only ever stores `identifier -> serialized entity`.
/// The serialized form is the same JSON document the search index holds.
pub trait Entity: Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// The kind of this entity.
    const KIND: EntityKind;

    /// Returns the unique identifier of this entity.
    fn id(&self) -> &EntityId;
}
