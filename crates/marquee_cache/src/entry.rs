// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::Duration;

use bytes::Bytes;
use tokio::time::Instant;

/// A serialized payload together with its expiry.
///
/// Stores that cannot expire entries on their own keep these and consult
/// [`is_expired`](Self::is_expired) on every read, so an expired entry is never returned even if
/// it has not been evicted yet.
///
/// Time is measured with [`tokio::time::Instant`], which makes expiry controllable from tests
/// through a paused runtime clock.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use bytes::Bytes;
/// use marquee_cache::StoreEntry;
/// use tokio::time::Instant;
///
/// let now = Instant::now();
/// let entry = StoreEntry::new(Bytes::from_static(b"{}"), Duration::from_secs(60), now);
/// assert!(!entry.is_expired(now + Duration::from_secs(60)));
/// assert!(entry.is_expired(now + Duration::from_secs(61)));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreEntry {
    payload: Bytes,
    ttl: Duration,
    expires_at: Instant,
}

impl StoreEntry {
    /// Creates an entry stored at `now` that lives for `ttl`.
    #[must_use]
    pub fn new(payload: Bytes, ttl: Duration, now: Instant) -> Self {
        Self {
            payload,
            ttl,
            expires_at: now + ttl,
        }
    }

    /// Returns the serialized payload.
    #[must_use]
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Consumes the entry and returns the payload.
    #[must_use]
    pub fn into_payload(self) -> Bytes {
        self.payload
    }

    /// Returns the time-to-live the entry was stored with.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the instant after which the entry is expired.
    #[must_use]
    pub fn expires_at(&self) -> Instant {
        self.expires_at
    }

    /// Returns `true` if the entry is past its expiry at `now`.
    ///
    /// An entry read exactly at its expiry instant is still live.
    #[must_use]
    pub fn is_expired(&self, now: Instant) -> bool {
        now > self.expires_at
    }
}
