// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(docsrs, feature(doc_cfg))]

//! Search backends for catalog entities.
//!
//! A [`SearchBackend`] serves one entity kind with three operations: point lookup by
//! identifier, bulk lookup of a set of identifiers, and paged structured search. Structured
//! searches are described by a [`SearchQuery`], which a [`QueryBuilder`] produces from caller
//! supplied [`QueryParams`] and the kind's static [`QuerySchema`].
//!
//! Query validation happens when the query is built: a filter on a kind without a filterable
//! nested path, or a sort on a field the kind does not declare sortable, is rejected with a
//! [`QueryError`] before any backend is involved.
//!
//! # Examples
//!
//! ```
//! use marquee_model::EntityKind;
//! use marquee_search::{Page, QueryBuilder, QueryParams};
//!
//! let builder = QueryBuilder::for_kind(EntityKind::Film);
//! let query = builder
//!     .build(&QueryParams::new("star").with_filter("genre-1").with_sort("-imdb_rating".parse()?))?;
//!
//! let body = query.to_elastic(Page::new(1, 20)?);
//! assert_eq!(body["size"], 20);
//! # Ok::<(), marquee_search::QueryError>(())
//! ```

mod backend;
#[cfg(feature = "elastic")]
mod elastic;
pub mod error;
mod memory;
mod params;
mod query;
mod schema;
#[cfg(any(feature = "test-util", test))]
pub mod testing;

#[doc(inline)]
pub use backend::SearchBackend;
#[cfg(feature = "elastic")]
#[doc(inline)]
pub use elastic::ElasticBackend;
#[doc(inline)]
pub use error::{QueryError, Result, SearchError};
#[doc(inline)]
pub use memory::MemoryIndex;
#[doc(inline)]
pub use params::{Page, QueryParams, SortKey, SortOrder};
#[doc(inline)]
pub use query::{QueryBuilder, SearchQuery};
#[doc(inline)]
pub use schema::{FieldWeight, NestedFilter, QuerySchema};
