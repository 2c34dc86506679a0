// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Error types for search operations.

use std::time::Duration;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// An error from a search backend.
///
/// Backend errors are never folded into empty results: "no matches" is `Ok(vec![])`, while an
/// error means the backend could not produce an answer.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SearchError {
    /// The index could not be reached or failed while executing the request.
    #[error("search backend unavailable: {0}")]
    Unavailable(#[source] BoxError),

    /// The index refused the request, for instance because the query was malformed.
    #[error("search backend rejected the request: {reason}")]
    Rejected {
        /// HTTP status returned by the index, if any.
        status: Option<u16>,
        /// Explanation returned by the index.
        reason: String,
    },

    /// The index did not answer within the configured timeout.
    #[error("search backend timed out after {0:?}")]
    Timeout(Duration),

    /// The index answered with a document that could not be decoded.
    #[error("search backend returned an undecodable response")]
    InvalidResponse(#[from] serde_json::Error),

    /// The backend endpoint is not a usable base URL.
    #[error("invalid search endpoint `{0}`")]
    InvalidEndpoint(String),
}

impl SearchError {
    /// Creates an [`Unavailable`](Self::Unavailable) error from any underlying cause.
    pub fn unavailable(cause: impl Into<BoxError>) -> Self {
        Self::Unavailable(cause.into())
    }

    /// Creates a [`Rejected`](Self::Rejected) error.
    pub fn rejected(status: Option<u16>, reason: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            reason: reason.into(),
        }
    }

    /// Returns `true` if retrying the same request later could succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::Timeout(_))
    }
}

/// An invalid combination of search parameters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum QueryError {
    /// A filter was given for a kind without a filterable nested path.
    #[error("{kind} search does not support filters")]
    FilterUnsupported {
        /// The entity kind searched.
        kind: &'static str,
    },

    /// A sort key names a field the kind does not declare sortable.
    #[error("{kind} search cannot be sorted by `{field}`")]
    UnsortableField {
        /// The entity kind searched.
        kind: &'static str,
        /// The requested sort field.
        field: String,
    },

    /// A sort key could not be parsed.
    #[error("invalid sort key `{0}`")]
    InvalidSortKey(String),

    /// Page numbers start at 1.
    #[error("page number must be at least 1")]
    InvalidPageNumber,

    /// Page size is outside the allowed range.
    #[error("page size must be between 1 and {max}")]
    InvalidPageSize {
        /// The largest allowed page size.
        max: usize,
    },

    /// The page lies beyond the deepest result the index can return.
    #[error("page ends beyond result window of {window}")]
    PageOutOfRange {
        /// The deepest result position the index can return.
        window: usize,
    },
}

/// A specialized [`Result`] type for search operations.
pub type Result<T> = std::result::Result<T, SearchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_errors() {
        assert!(SearchError::unavailable("connection refused").is_transient());
        assert!(SearchError::Timeout(Duration::from_secs(1)).is_transient());
        assert!(!SearchError::rejected(Some(400), "parse error").is_transient());
    }

    #[test]
    fn rejected_display_contains_reason() {
        let error = SearchError::rejected(Some(400), "failed to parse query");
        assert!(error.to_string().contains("failed to parse query"));
    }

    #[test]
    fn query_error_messages() {
        assert_eq!(
            QueryError::FilterUnsupported { kind: "person" }.to_string(),
            "person search does not support filters"
        );
        assert_eq!(
            QueryError::UnsortableField {
                kind: "film",
                field: "budget".to_string()
            }
            .to_string(),
            "film search cannot be sorted by `budget`"
        );
    }
}
