// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Structured logging for cache operations.

use std::time::Duration;

use marquee_model::EntityKind;
use tokio::time::Instant;
use tracing::Level;

#[cfg(test)]
pub(crate) mod attributes {
    pub(crate) const CACHE_KIND_NAME: &str = "cache.kind";
    pub(crate) const CACHE_OPERATION_NAME: &str = "cache.operation";
    pub(crate) const CACHE_ACTIVITY_NAME: &str = "cache.activity";
    pub(crate) const CACHE_DURATION_NAME: &str = "cache.duration_ns";
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum CacheOperation {
    Get,
    Set,
}

impl CacheOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "cache.get",
            Self::Set => "cache.set",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum CacheActivity {
    Hit,
    Miss,
    Undecodable,
    Inserted,
    Unavailable,
    Error,
}

impl CacheActivity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hit => "cache.hit",
            Self::Miss => "cache.miss",
            Self::Undecodable => "cache.undecodable",
            Self::Inserted => "cache.inserted",
            Self::Unavailable => "cache.unavailable",
            Self::Error => "cache.error",
        }
    }

    pub fn level(self) -> Level {
        match self {
            Self::Hit | Self::Miss => Level::DEBUG,
            Self::Inserted => Level::INFO,
            Self::Undecodable | Self::Unavailable | Self::Error => Level::WARN,
        }
    }
}

/// Runs `f` and returns its output along with how long it took.
pub(crate) async fn timed<F: Future>(f: F) -> (F::Output, Duration) {
    let start = Instant::now();
    let output = f.await;
    (output, start.elapsed())
}

pub(crate) fn record(kind: EntityKind, operation: CacheOperation, activity: CacheActivity, duration: Duration) {
    let kind = kind.as_str();
    let op = operation.as_str();
    let ev = activity.as_str();
    let duration_ns = duration.as_nanos();

    // Tracing level must be constant, so we use a macro to select the appropriate level.
    macro_rules! emit_event {
        ($level:ident) => {
            tracing::$level!(
                cache.kind = kind,
                cache.operation = op,
                cache.activity = ev,
                cache.duration_ns = duration_ns,
                "cache.event"
            )
        };
    }

    match activity.level() {
        Level::WARN => emit_event!(warn),
        Level::INFO => emit_event!(info),
        _ => emit_event!(debug),
    }
}

#[cfg(test)]
mod tests {
    use tracing_test::traced_test;

    use super::*;

    #[test]
    fn operation_as_str() {
        assert_eq!(CacheOperation::Get.as_str(), "cache.get");
        assert_eq!(CacheOperation::Set.as_str(), "cache.set");
    }

    #[test]
    fn activity_levels() {
        assert_eq!(CacheActivity::Hit.level(), Level::DEBUG);
        assert_eq!(CacheActivity::Miss.level(), Level::DEBUG);
        assert_eq!(CacheActivity::Inserted.level(), Level::INFO);
        assert_eq!(CacheActivity::Undecodable.level(), Level::WARN);
        assert_eq!(CacheActivity::Unavailable.level(), Level::WARN);
        assert_eq!(CacheActivity::Error.level(), Level::WARN);
    }

    #[traced_test]
    #[test]
    fn record_emits_all_fields() {
        record(
            EntityKind::Film,
            CacheOperation::Get,
            CacheActivity::Unavailable,
            Duration::from_nanos(12345),
        );

        assert!(logs_contain(attributes::CACHE_KIND_NAME));
        assert!(logs_contain(attributes::CACHE_OPERATION_NAME));
        assert!(logs_contain(attributes::CACHE_ACTIVITY_NAME));
        assert!(logs_contain(attributes::CACHE_DURATION_NAME));
        assert!(logs_contain("cache.unavailable"));
        assert!(logs_contain("12345"));
    }
}
