// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Building and rendering structured searches.

use std::cmp::Ordering;

use marquee_model::EntityKind;
use serde_json::{Value, json};

use crate::{Page, QueryError, QueryParams, QuerySchema, SortKey, SortOrder};

/// Builds validated [`SearchQuery`] values for one entity kind.
///
/// The builder holds nothing but a reference to the kind's static [`QuerySchema`]; building a
/// query is a pure function of the parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QueryBuilder {
    schema: &'static QuerySchema,
}

impl QueryBuilder {
    /// Creates a builder over `schema`.
    #[must_use]
    pub fn new(schema: &'static QuerySchema) -> Self {
        Self { schema }
    }

    /// Creates a builder over the built-in schema for `kind`.
    #[must_use]
    pub fn for_kind(kind: EntityKind) -> Self {
        Self::new(QuerySchema::for_kind(kind))
    }

    /// Returns the schema queries are built against.
    #[must_use]
    pub fn schema(&self) -> &'static QuerySchema {
        self.schema
    }

    /// Validates `params` against the schema and returns the query.
    ///
    /// # Errors
    ///
    /// - [`QueryError::FilterUnsupported`] if a filter is given for a kind without one.
    /// - [`QueryError::UnsortableField`] if the sort field is not declared sortable.
    pub fn build(&self, params: &QueryParams) -> Result<SearchQuery, QueryError> {
        let kind = self.schema.kind.as_str();

        if params.filter().is_some() && self.schema.filter.is_none() {
            return Err(QueryError::FilterUnsupported { kind });
        }

        if let Some(sort) = params.sort()
            && !self.schema.is_sortable(sort.field())
        {
            return Err(QueryError::UnsortableField {
                kind,
                field: sort.field().to_owned(),
            });
        }

        let text = params.query().trim();
        Ok(SearchQuery {
            schema: self.schema,
            text: (!text.is_empty()).then(|| text.to_owned()),
            filter: params.filter().map(str::to_owned),
            sort: params.sort().cloned(),
        })
    }
}

/// A validated structured search over one entity kind.
///
/// Backends consume this directly: [`to_elastic`](Self::to_elastic) renders it as an
/// Elasticsearch request body, and [`score`](Self::score) evaluates it against a JSON document
/// for in-process indexes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchQuery {
    schema: &'static QuerySchema,
    text: Option<String>,
    filter: Option<String>,
    sort: Option<SortKey>,
}

impl SearchQuery {
    /// Returns the schema this query was built against.
    #[must_use]
    pub fn schema(&self) -> &'static QuerySchema {
        self.schema
    }

    /// Returns the trimmed free-text query, or `None` when matching everything.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Returns the filter value, if any.
    #[must_use]
    pub fn filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    /// Returns the sort key, if any.
    #[must_use]
    pub fn sort(&self) -> Option<&SortKey> {
        self.sort.as_ref()
    }

    /// Renders the query as an Elasticsearch `_search` request body for `page`.
    ///
    /// # Examples
    ///
    /// ```
    /// use marquee_model::EntityKind;
    /// use marquee_search::{Page, QueryBuilder, QueryParams};
    /// use serde_json::json;
    ///
    /// let query = QueryBuilder::for_kind(EntityKind::Person).build(&QueryParams::new("June"))?;
    ///
    /// assert_eq!(
    ///     query.to_elastic(Page::default()),
    ///     json!({
    ///         "query": {"bool": {"must": [
    ///             {"multi_match": {"query": "June", "fields": ["full_name"]}}
    ///         ]}},
    ///         "from": 0,
    ///         "size": 50,
    ///     })
    /// );
    /// # Ok::<(), marquee_search::QueryError>(())
    /// ```
    #[must_use]
    pub fn to_elastic(&self, page: Page) -> Value {
        let mut must = Vec::new();

        if let Some(text) = &self.text {
            let fields: Vec<_> = self.schema.fields.iter().map(crate::FieldWeight::to_elastic).collect();
            must.push(json!({"multi_match": {"query": text, "fields": fields}}));
        }

        if let (Some(value), Some(nested)) = (&self.filter, self.schema.filter) {
            must.push(json!({
                "nested": {
                    "path": nested.path,
                    "query": {"bool": {"filter": {"term": {nested.qualified_field(): value}}}}
                }
            }));
        }

        let query = if must.is_empty() {
            json!({"match_all": {}})
        } else {
            json!({"bool": {"must": must}})
        };

        let mut body = json!({
            "query": query,
            "from": page.offset(),
            "size": page.size(),
        });

        if let Some(sort) = &self.sort {
            body["sort"] = json!([{sort.field(): {"order": sort.order().as_str()}}]);
        }

        body
    }

    /// Scores a JSON document against this query.
    ///
    /// Returns `None` if the document does not match. Free-text matching compares whole,
    /// case-insensitive words: each query word found in a field adds the field's weight. A query
    /// without text matches every document with a score of zero.
    #[must_use]
    pub fn score(&self, document: &Value) -> Option<u32> {
        if let (Some(value), Some(nested)) = (&self.filter, self.schema.filter) {
            let matched = document[nested.path]
                .as_array()
                .is_some_and(|items| items.iter().any(|item| item[nested.field].as_str() == Some(value)));
            if !matched {
                return None;
            }
        }

        let Some(text) = &self.text else {
            return Some(0);
        };

        let terms = words(text);
        let score: u32 = self
            .schema
            .fields
            .iter()
            .map(|field| {
                let field_words = field_words(&document[field.field]);
                let hits = terms.iter().filter(|term| field_words.contains(term)).count();
                u32::try_from(hits).unwrap_or(u32::MAX).saturating_mul(u32::from(field.weight))
            })
            .sum();

        (score > 0).then_some(score)
    }

    /// Orders two documents by this query's sort key, or by descending score when unsorted.
    ///
    /// Documents missing the sort field come last in either direction.
    #[must_use]
    pub fn compare(&self, (a, a_score): (&Value, u32), (b, b_score): (&Value, u32)) -> Ordering {
        let Some(sort) = &self.sort else {
            return b_score.cmp(&a_score);
        };

        match (&a[sort.field()], &b[sort.field()]) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Null, _) => Ordering::Greater,
            (_, Value::Null) => Ordering::Less,
            (x, y) => {
                let ordering = compare_values(x, y);
                match sort.order() {
                    SortOrder::Ascending => ordering,
                    SortOrder::Descending => ordering.reverse(),
                }
            }
        }
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        _ => a.as_str().unwrap_or_default().cmp(b.as_str().unwrap_or_default()),
    }
}

fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn field_words(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => words(s),
        Value::Array(items) => items.iter().filter_map(Value::as_str).flat_map(words).collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn film_builder() -> QueryBuilder {
        QueryBuilder::for_kind(EntityKind::Film)
    }

    #[test]
    fn empty_params_match_all() {
        let query = film_builder().build(&QueryParams::default()).unwrap();
        assert_eq!(
            query.to_elastic(Page::default()),
            json!({"query": {"match_all": {}}, "from": 0, "size": 50})
        );
    }

    #[test]
    fn whitespace_query_is_treated_as_empty() {
        let query = film_builder().build(&QueryParams::new("   ")).unwrap();
        assert_eq!(query.text(), None);
    }

    #[test]
    fn film_query_with_filter_and_sort() {
        let params = QueryParams::new("star")
            .with_filter("g1")
            .with_sort(SortKey::descending("imdb_rating"));
        let query = film_builder().build(&params).unwrap();

        assert_eq!(
            query.to_elastic(Page::new(2, 10).unwrap()),
            json!({
                "query": {"bool": {"must": [
                    {"multi_match": {
                        "query": "star",
                        "fields": ["title^4", "description^3", "genres_names^2", "actors_names^4", "writers_names", "directors_names^3"]
                    }},
                    {"nested": {
                        "path": "genres",
                        "query": {"bool": {"filter": {"term": {"genres.id": "g1"}}}}
                    }}
                ]}},
                "from": 10,
                "size": 10,
                "sort": [{"imdb_rating": {"order": "desc"}}]
            })
        );
    }

    #[test]
    fn filter_rejected_for_person() {
        let error = QueryBuilder::for_kind(EntityKind::Person)
            .build(&QueryParams::new("june").with_filter("g1"))
            .unwrap_err();
        assert_eq!(error, QueryError::FilterUnsupported { kind: "person" });
    }

    #[test]
    fn unsortable_field_rejected() {
        let error = film_builder()
            .build(&QueryParams::new("").with_sort(SortKey::ascending("budget")))
            .unwrap_err();
        assert_eq!(
            error,
            QueryError::UnsortableField {
                kind: "film",
                field: "budget".to_owned()
            }
        );
    }

    #[test]
    fn score_weights_fields() {
        let query = film_builder().build(&QueryParams::new("Alien")).unwrap();

        let in_title = json!({"title": "Alien", "description": "A crew meets an alien"});
        let in_description = json!({"title": "Nostromo", "description": "A crew meets an alien"});
        let nowhere = json!({"title": "Heat"});

        assert_eq!(query.score(&in_title), Some(7));
        assert_eq!(query.score(&in_description), Some(3));
        assert_eq!(query.score(&nowhere), None);
    }

    #[test]
    fn score_matches_whole_words_in_lists() {
        let query = QueryBuilder::for_kind(EntityKind::Person)
            .build(&QueryParams::new("june"))
            .unwrap();

        assert!(query.score(&json!({"full_name": "June Laverick2"})).is_some());
        assert!(query.score(&json!({"full_name": "Juneau Smith"})).is_none());

        let film_query = film_builder().build(&QueryParams::new("cooper")).unwrap();
        assert_eq!(film_query.score(&json!({"actors_names": ["Chris Cooper"]})), Some(4));
    }

    #[test]
    fn filter_requires_nested_match() {
        let query = film_builder().build(&QueryParams::new("").with_filter("g1")).unwrap();

        assert_eq!(query.score(&json!({"genres": [{"id": "g1", "name": "Drama"}]})), Some(0));
        assert_eq!(query.score(&json!({"genres": [{"id": "g2", "name": "Horror"}]})), None);
        assert_eq!(query.score(&json!({"title": "No genres"})), None);
    }

    #[test]
    fn compare_by_sort_key_puts_missing_last() {
        let query = film_builder()
            .build(&QueryParams::new("").with_sort(SortKey::descending("imdb_rating")))
            .unwrap();
        let high = json!({"imdb_rating": 9.0});
        let low = json!({"imdb_rating": 5.5});
        let missing = json!({});

        assert_eq!(query.compare((&high, 0), (&low, 0)), Ordering::Less);
        assert_eq!(query.compare((&low, 0), (&high, 0)), Ordering::Greater);
        assert_eq!(query.compare((&missing, 0), (&low, 0)), Ordering::Greater);
    }

    #[test]
    fn compare_without_sort_uses_score() {
        let query = film_builder().build(&QueryParams::new("x")).unwrap();
        let doc = json!({});
        assert_eq!(query.compare((&doc, 7), (&doc, 3)), Ordering::Less);
    }
}
