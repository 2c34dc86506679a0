// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Error types for lookup services.

use marquee_cache::CacheError;
use marquee_search::{QueryError, SearchError};

/// An error returned by a lookup service.
///
/// Only backend and query problems surface here. A missing entity is `Ok(None)` or simply absent
/// from a result list, and an unavailable cache is absorbed by reading from the backend.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ServiceError {
    /// The search backend could not be reached, failed, or timed out.
    #[error("search backend unavailable")]
    BackendUnavailable(#[source] SearchError),

    /// The search backend refused the request.
    #[error("search backend rejected the request")]
    BackendRejected(#[source] SearchError),

    /// The search parameters were invalid for the entity kind.
    #[error("invalid search parameters")]
    InvalidQuery(#[from] QueryError),
}

impl ServiceError {
    /// Returns the backend error behind this error, if any.
    #[must_use]
    pub fn backend_error(&self) -> Option<&SearchError> {
        match self {
            Self::BackendUnavailable(error) | Self::BackendRejected(error) => Some(error),
            Self::InvalidQuery(_) => None,
        }
    }
}

impl From<SearchError> for ServiceError {
    fn from(error: SearchError) -> Self {
        match error {
            SearchError::Rejected { .. } => Self::BackendRejected(error),
            _ => Self::BackendUnavailable(error),
        }
    }
}

/// A specialized [`Result`](std::result::Result) type for lookup services.
pub type Result<T> = std::result::Result<T, ServiceError>;

/// An error raised while wiring a [`Catalog`](crate::Catalog) from configuration.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConnectError {
    /// The cache store could not be opened.
    #[error("failed to open the cache store")]
    Cache(#[from] CacheError),

    /// The search backend could not be configured.
    #[error("failed to configure the search backend")]
    Search(#[from] SearchError),

    /// A setting requires a cargo feature that is not enabled.
    #[error("`{setting}` requires the `{feature}` feature")]
    FeatureDisabled {
        /// The configuration setting that was given.
        setting: &'static str,
        /// The feature it requires.
        feature: &'static str,
    },
}
