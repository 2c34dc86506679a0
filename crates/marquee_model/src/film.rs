// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use serde::{Deserialize, Serialize};

use crate::{Entity, EntityId, EntityKind};

/// A reference from a film to a related genre or person.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Related {
    /// Identifier of the related genre or person.
    pub id: EntityId,
    /// Display name of the related genre or person.
    pub name: String,
}

impl Related {
    /// Creates a reference.
    #[must_use]
    pub fn new(id: impl Into<EntityId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A film document as stored in the `movies` index.
///
/// The `*_names` lists are denormalized copies of the nested reference lists; they exist so
/// that free-text search can match on names without descending into nested documents.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[expect(missing_docs, reason = "fields mirror the index document schema")]
pub struct Film {
    pub id: EntityId,
    pub title: String,
    #[serde(default)]
    pub imdb_rating: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub genres_names: Vec<String>,
    #[serde(default)]
    pub actors_names: Vec<String>,
    #[serde(default)]
    pub writers_names: Vec<String>,
    #[serde(default)]
    pub directors_names: Vec<String>,
    #[serde(default)]
    pub genres: Vec<Related>,
    #[serde(default)]
    pub actors: Vec<Related>,
    #[serde(default)]
    pub writers: Vec<Related>,
    #[serde(default)]
    pub directors: Vec<Related>,
}

impl Film {
    /// Creates a film with only an identifier and a title.
    #[must_use]
    pub fn new(id: impl Into<EntityId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            imdb_rating: None,
            description: None,
            genres_names: Vec::new(),
            actors_names: Vec::new(),
            writers_names: Vec::new(),
            directors_names: Vec::new(),
            genres: Vec::new(),
            actors: Vec::new(),
            writers: Vec::new(),
            directors: Vec::new(),
        }
    }

    /// Sets the rating.
    #[must_use]
    pub fn with_rating(mut self, rating: f64) -> Self {
        self.imdb_rating = Some(rating);
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds a genre, keeping `genres_names` in sync.
    #[must_use]
    pub fn with_genre(mut self, genre: Related) -> Self {
        self.genres_names.push(genre.name.clone());
        self.genres.push(genre);
        self
    }

    /// Adds an actor, keeping `actors_names` in sync.
    #[must_use]
    pub fn with_actor(mut self, actor: Related) -> Self {
        self.actors_names.push(actor.name.clone());
        self.actors.push(actor);
        self
    }

    /// Adds a writer, keeping `writers_names` in sync.
    #[must_use]
    pub fn with_writer(mut self, writer: Related) -> Self {
        self.writers_names.push(writer.name.clone());
        self.writers.push(writer);
        self
    }

    /// Adds a director, keeping `directors_names` in sync.
    #[must_use]
    pub fn with_director(mut self, director: Related) -> Self {
        self.directors_names.push(director.name.clone());
        self.directors.push(director);
        self
    }
}

impl Entity for Film {
    const KIND: EntityKind = EntityKind::Film;

    fn id(&self) -> &EntityId {
        &self.id
    }
}
