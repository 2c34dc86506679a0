// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Structured logging for lookup services.

use std::time::Duration;

use marquee_cache::CacheError;
use marquee_model::{EntityId, EntityKind};
use marquee_search::SearchError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BackendOperation {
    GetById,
    BulkGet,
    Search,
}

impl BackendOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GetById => "search.get",
            Self::BulkGet => "search.mget",
            Self::Search => "search.query",
        }
    }
}

/// A cache lookup failed and the id is read from the backend instead.
pub(crate) fn cache_degraded(kind: EntityKind, id: &EntityId, error: &CacheError) {
    tracing::warn!(
        catalog.kind = kind.as_str(),
        catalog.id = %id,
        error = %error,
        "catalog.cache_degraded"
    );
}

/// A backfill write failed; the next read of `id` misses again.
pub(crate) fn backfill_failed(kind: EntityKind, id: &EntityId, error: &CacheError) {
    tracing::warn!(
        catalog.kind = kind.as_str(),
        catalog.id = %id,
        error = %error,
        "catalog.backfill_failed"
    );
}

pub(crate) fn backend_completed(kind: EntityKind, operation: BackendOperation, returned: usize, duration: Duration) {
    tracing::debug!(
        catalog.kind = kind.as_str(),
        catalog.operation = operation.as_str(),
        catalog.returned = returned,
        catalog.duration_ns = duration.as_nanos(),
        "catalog.backend"
    );
}

pub(crate) fn backend_failed(kind: EntityKind, operation: BackendOperation, error: &SearchError, duration: Duration) {
    tracing::error!(
        catalog.kind = kind.as_str(),
        catalog.operation = operation.as_str(),
        catalog.duration_ns = duration.as_nanos(),
        error = %error,
        "catalog.backend_failed"
    );
}
