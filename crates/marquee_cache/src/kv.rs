// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The storage contract for cache backends.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;

use crate::Result;

/// A key/value store with per-key time-to-live.
///
/// Implementations must:
/// - return `Ok(None)` for absent and expired keys,
/// - return `Err` only when the store itself failed (unreachable, command rejected),
/// - overwrite existing values on `set`, restarting their TTL.
///
/// Implement this trait for a storage backend, then wrap it in an
/// [`EntityCache`](crate::EntityCache) to cache entities in it.
pub trait KeyValueStore: Send + Sync {
    /// Gets the payload stored under `key`.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<Bytes>>> + Send;

    /// Stores `value` under `key` for `ttl`.
    fn set(&self, key: &str, value: Bytes, ttl: Duration) -> impl Future<Output = Result<()>> + Send;

    /// Returns the number of entries, if the store tracks it.
    fn len(&self) -> Option<u64> {
        None
    }

    /// Returns whether the store holds no entries, if the store tracks its size.
    fn is_empty(&self) -> Option<bool> {
        self.len().map(|len| len == 0)
    }
}

impl<T> KeyValueStore for Arc<T>
where
    T: KeyValueStore,
{
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<Bytes>>> + Send {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: Bytes, ttl: Duration) -> impl Future<Output = Result<()>> + Send {
        (**self).set(key, value, ttl)
    }

    fn len(&self) -> Option<u64> {
        (**self).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Untracked;

    impl KeyValueStore for Untracked {
        async fn get(&self, _key: &str) -> Result<Option<Bytes>> {
            Ok(None)
        }

        async fn set(&self, _key: &str, _value: Bytes, _ttl: Duration) -> Result<()> {
            Ok(())
        }
    }

    struct Counted(u64);

    impl KeyValueStore for Counted {
        async fn get(&self, _key: &str) -> Result<Option<Bytes>> {
            Ok(None)
        }

        async fn set(&self, _key: &str, _value: Bytes, _ttl: Duration) -> Result<()> {
            Ok(())
        }

        fn len(&self) -> Option<u64> {
            Some(self.0)
        }
    }

    #[test]
    fn is_empty_follows_len() {
        assert_eq!(Untracked.is_empty(), None);
        assert_eq!(Counted(0).is_empty(), Some(true));
        assert_eq!(Arc::new(Counted(3)).is_empty(), Some(false));
    }
}
