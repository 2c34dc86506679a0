// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt;
use std::str::FromStr;

use crate::QueryError;

/// Caller supplied search parameters.
///
/// Constructed per call and never persisted. Validation against an entity kind happens in
/// [`QueryBuilder::build`](crate::QueryBuilder::build).
///
/// # Examples
///
/// ```
/// use marquee_search::{QueryParams, SortKey};
///
/// let params = QueryParams::new("star trek")
///     .with_filter("3d8d9bf5-0d90-4353-88ba-4ccc5d2c07ff")
///     .with_sort(SortKey::descending("imdb_rating"));
/// assert_eq!(params.query(), "star trek");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryParams {
    query: String,
    filter: Option<String>,
    sort: Option<SortKey>,
}

impl QueryParams {
    /// Creates parameters for a free-text query. An empty query matches everything.
    #[must_use]
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            filter: None,
            sort: None,
        }
    }

    /// Restricts results to entities whose nested filter path holds `value`.
    #[must_use]
    pub fn with_filter(mut self, value: impl Into<String>) -> Self {
        self.filter = Some(value.into());
        self
    }

    /// Orders results by `sort` instead of relevance.
    #[must_use]
    pub fn with_sort(mut self, sort: SortKey) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Returns the free-text query.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
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
}

/// Direction of a sort.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortOrder {
    /// Smallest first.
    Ascending,
    /// Largest first.
    Descending,
}

impl SortOrder {
    /// Name used in Elasticsearch sort clauses.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }
}

/// A field to sort by, with a direction.
///
/// Parses from `field` (ascending) or `-field` (descending).
///
/// # Examples
///
/// ```
/// use marquee_search::{SortKey, SortOrder};
///
/// let key: SortKey = "-imdb_rating".parse()?;
/// assert_eq!(key.field(), "imdb_rating");
/// assert_eq!(key.order(), SortOrder::Descending);
/// assert_eq!(key.to_string(), "-imdb_rating");
/// # Ok::<(), marquee_search::QueryError>(())
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SortKey {
    field: String,
    order: SortOrder,
}

impl SortKey {
    /// Sorts by `field`, smallest first.
    #[must_use]
    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Ascending,
        }
    }

    /// Sorts by `field`, largest first.
    #[must_use]
    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Descending,
        }
    }

    /// Returns the sort field.
    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Returns the sort direction.
    #[must_use]
    pub fn order(&self) -> SortOrder {
        self.order
    }
}

impl FromStr for SortKey {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (field, order) = match s.strip_prefix('-') {
            Some(field) => (field, SortOrder::Descending),
            None => (s, SortOrder::Ascending),
        };

        if field.is_empty() || field.starts_with('-') || field.chars().any(char::is_whitespace) {
            return Err(QueryError::InvalidSortKey(s.to_owned()));
        }

        Ok(Self {
            field: field.to_owned(),
            order,
        })
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.order {
            SortOrder::Ascending => f.write_str(&self.field),
            SortOrder::Descending => write!(f, "-{}", self.field),
        }
    }
}

/// A one-based page of search results.
///
/// # Examples
///
/// ```
/// use marquee_search::Page;
///
/// let page = Page::new(3, 20)?;
/// assert_eq!(page.offset(), 40);
/// assert!(Page::new(0, 20).is_err());
/// # Ok::<(), marquee_search::QueryError>(())
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Page {
    number: usize,
    size: usize,
}

impl Page {
    /// Largest accepted page size.
    pub const MAX_SIZE: usize = 100;

    /// Deepest result position a page may reach, matching Elasticsearch's default
    /// `index.max_result_window`.
    pub const RESULT_WINDOW: usize = 10_000;

    /// Page size used by [`Page::default`].
    pub const DEFAULT_SIZE: usize = 50;

    /// Creates a page.
    ///
    /// # Errors
    ///
    /// Returns a [`QueryError`] if `number` is zero, `size` is zero or above
    /// [`MAX_SIZE`](Self::MAX_SIZE), or the page ends beyond
    /// [`RESULT_WINDOW`](Self::RESULT_WINDOW).
    pub fn new(number: usize, size: usize) -> Result<Self, QueryError> {
        if number == 0 {
            return Err(QueryError::InvalidPageNumber);
        }

        if size == 0 || size > Self::MAX_SIZE {
            return Err(QueryError::InvalidPageSize { max: Self::MAX_SIZE });
        }

        let end = number.saturating_mul(size);
        if end > Self::RESULT_WINDOW {
            return Err(QueryError::PageOutOfRange {
                window: Self::RESULT_WINDOW,
            });
        }

        Ok(Self { number, size })
    }

    /// Returns the one-based page number.
    #[must_use]
    pub fn number(self) -> usize {
        self.number
    }

    /// Returns the page size.
    #[must_use]
    pub fn size(self) -> usize {
        self.size
    }

    /// Returns the number of results skipped before this page.
    #[must_use]
    pub fn offset(self) -> usize {
        (self.number - 1) * self.size
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            number: 1,
            size: Self::DEFAULT_SIZE,
        }
    }
}
