// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use serde::{Deserialize, Serialize};

use crate::{Entity, EntityId, EntityKind};

/// A person document as stored in the `persons` index.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    /// Unique identifier.
    pub id: EntityId,
    /// Full display name.
    pub full_name: String,
    /// Roles held across all films, e.g. `actor` or `director`.
    #[serde(default)]
    pub roles: Vec<String>,
    /// Films this person is credited on.
    #[serde(default)]
    pub film_ids: Vec<EntityId>,
}

impl Person {
    /// Creates a person without roles or films.
    #[must_use]
    pub fn new(id: impl Into<EntityId>, full_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            full_name: full_name.into(),
            roles: Vec::new(),
            film_ids: Vec::new(),
        }
    }

    /// Adds a role.
    #[must_use]
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.push(role.into());
        self
    }

    /// Adds a credited film.
    #[must_use]
    pub fn with_film(mut self, film_id: impl Into<EntityId>) -> Self {
        self.film_ids.push(film_id.into());
        self
    }
}

impl Entity for Person {
    const KIND: EntityKind = EntityKind::Person;

    fn id(&self) -> &EntityId {
        &self.id
    }
}
