// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Static per-kind search configuration.

use marquee_model::EntityKind;

/// A searchable field and its relevance boost.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldWeight {
    /// Document field matched by free-text queries.
    pub field: &'static str,
    /// Relevance boost; `1` means unboosted.
    pub weight: u16,
}

impl FieldWeight {
    const fn new(field: &'static str, weight: u16) -> Self {
        Self { field, weight }
    }

    /// Renders the field in Elasticsearch `multi_match` syntax, e.g. `title^4`.
    #[must_use]
    pub fn to_elastic(&self) -> String {
        if self.weight == 1 {
            self.field.to_owned()
        } else {
            format!("{}^{}", self.field, self.weight)
        }
    }
}

/// An exact-match filter on a nested sub-document list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NestedFilter {
    /// Path of the nested list, e.g. `genres`.
    pub path: &'static str,
    /// Field inside each nested document compared to the filter value, e.g. `id`.
    pub field: &'static str,
}

impl NestedFilter {
    /// Returns the fully qualified field name, e.g. `genres.id`.
    #[must_use]
    pub fn qualified_field(&self) -> String {
        format!("{}.{}", self.path, self.field)
    }
}

/// How one entity kind is searched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuerySchema {
    /// The entity kind this schema describes.
    pub kind: EntityKind,
    /// Free-text fields and their boosts.
    pub fields: &'static [FieldWeight],
    /// The nested filter, if the kind supports one.
    pub filter: Option<NestedFilter>,
    /// Fields results may be sorted by.
    pub sortable: &'static [&'static str],
}

impl QuerySchema {
    /// Films: weighted title, description and credit names; filter by genre.
    pub const FILM: Self = Self {
        kind: EntityKind::Film,
        fields: &[
            FieldWeight::new("title", 4),
            FieldWeight::new("description", 3),
            FieldWeight::new("genres_names", 2),
            FieldWeight::new("actors_names", 4),
            FieldWeight::new("writers_names", 1),
            FieldWeight::new("directors_names", 3),
        ],
        filter: Some(NestedFilter {
            path: "genres",
            field: "id",
        }),
        sortable: &["imdb_rating", "title"],
    };

    /// Persons: matched by name only.
    pub const PERSON: Self = Self {
        kind: EntityKind::Person,
        fields: &[FieldWeight::new("full_name", 1)],
        filter: None,
        sortable: &["full_name"],
    };

    /// Returns the schema for `kind`.
    #[must_use]
    pub fn for_kind(kind: EntityKind) -> &'static Self {
        match kind {
            EntityKind::Film => &Self::FILM,
            EntityKind::Person => &Self::PERSON,
        }
    }

    /// Returns `true` if results may be sorted by `field`.
    #[must_use]
    pub fn is_sortable(&self, field: &str) -> bool {
        self.sortable.contains(&field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn film_fields_render_with_boosts() {
        let rendered: Vec<_> = QuerySchema::FILM.fields.iter().map(FieldWeight::to_elastic).collect();
        assert_eq!(
            rendered,
            [
                "title^4",
                "description^3",
                "genres_names^2",
                "actors_names^4",
                "writers_names",
                "directors_names^3"
            ]
        );
    }

    #[test]
    fn schemas_by_kind() {
        assert_eq!(QuerySchema::for_kind(EntityKind::Film).kind, EntityKind::Film);
        assert_eq!(QuerySchema::for_kind(EntityKind::Person).kind, EntityKind::Person);
        assert!(QuerySchema::PERSON.filter.is_none());
        assert_eq!(QuerySchema::FILM.filter.unwrap().qualified_field(), "genres.id");
    }

    #[test]
    fn sortable_fields() {
        assert!(QuerySchema::FILM.is_sortable("imdb_rating"));
        assert!(!QuerySchema::FILM.is_sortable("full_name"));
        assert!(QuerySchema::PERSON.is_sortable("full_name"));
    }
}
