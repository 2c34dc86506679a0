// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Error types for cache operations.

use std::time::Duration;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// An error from a cache operation.
///
/// None of these mean "the entry is absent": absence is reported as a
/// [`CacheLookup::Miss`](crate::CacheLookup::Miss). An error means the store could not answer.
///
/// # Example
///
/// ```
/// use marquee_cache::CacheError;
///
/// let error = CacheError::unavailable("connection refused");
/// assert!(error.to_string().contains("connection refused"));
/// ```
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CacheError {
    /// The store could not be reached or failed to execute the command.
    #[error("cache store unavailable: {0}")]
    Unavailable(#[source] BoxError),

    /// The store did not answer within the configured timeout.
    #[error("cache operation timed out after {0:?}")]
    Timeout(Duration),

    /// An entity could not be encoded into a cache payload.
    #[error("failed to encode cache payload")]
    Serialization(#[from] serde_json::Error),
}

impl CacheError {
    /// Creates an [`Unavailable`](Self::Unavailable) error from any underlying cause.
    ///
    /// This is the constructor store implementations use to report connectivity failures.
    pub fn unavailable(cause: impl Into<BoxError>) -> Self {
        Self::Unavailable(cause.into())
    }
}

/// A specialized [`Result`] type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn unavailable_display_contains_cause_message() {
        let error = CacheError::unavailable("display test");
        let display_str = format!("{error}");
        assert!(
            display_str.contains("display test"),
            "display output should contain the cause message, got: {display_str}"
        );
        assert!(error.source().is_some());
    }

    #[test]
    fn timeout_display_contains_duration() {
        let error = CacheError::Timeout(Duration::from_millis(250));
        assert!(error.to_string().contains("250ms"));
    }

    #[test]
    fn result_type_alias_propagates_errors() {
        fn returns_err() -> Result<i32> {
            Err(CacheError::unavailable("expected failure"))
        }

        let err = returns_err().expect_err("should return an error");
        assert!(format!("{err}").contains("expected failure"));
    }
}
