//! Event source counters

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters updated by the receive loop
#[derive(Debug, Default)]
pub struct StreamSourceMetrics {
    /// Tweets read from the stream
    pub tweets_received: AtomicU64,

    /// Tweets admitted and enqueued
    pub tweets_accepted: AtomicU64,

    /// Tweets rejected by the exclusion predicate
    pub tweets_filtered: AtomicU64,

    /// Stall warnings received
    pub warnings: AtomicU64,

    /// Lines that could not be decoded
    pub malformed: AtomicU64,

    /// Reconnect attempts
    pub reconnects: AtomicU64,
}

impl StreamSourceMetrics {
    pub const fn new() -> Self {
        Self {
            tweets_received: AtomicU64::new(0),
            tweets_accepted: AtomicU64::new(0),
            tweets_filtered: AtomicU64::new(0),
            warnings: AtomicU64::new(0),
            malformed: AtomicU64::new(0),
            reconnects: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn tweet_received(&self) {
        self.tweets_received.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn tweet_accepted(&self) {
        self.tweets_accepted.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn tweet_filtered(&self) {
        self.tweets_filtered.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn warning(&self) {
        self.warnings.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn malformed_line(&self) {
        self.malformed.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn reconnect(&self) {
        self.reconnects.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> SourceMetricsSnapshot {
        SourceMetricsSnapshot {
            tweets_received: self.tweets_received.load(Ordering::Relaxed),
            tweets_accepted: self.tweets_accepted.load(Ordering::Relaxed),
            tweets_filtered: self.tweets_filtered.load(Ordering::Relaxed),
            warnings: self.warnings.load(Ordering::Relaxed),
            malformed: self.malformed.load(Ordering::Relaxed),
            reconnects: self.reconnects.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of the source counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceMetricsSnapshot {
    pub tweets_received: u64,
    pub tweets_accepted: u64,
    pub tweets_filtered: u64,
    pub warnings: u64,
    pub malformed: u64,
    pub reconnects: u64,
}

/// Shareable read handle, valid after the source is consumed by `start()`
#[derive(Debug, Clone)]
pub struct SourceMetricsHandle {
    connector: &'static str,
    metrics: Arc<StreamSourceMetrics>,
}

impl SourceMetricsHandle {
    pub(crate) fn new(connector: &'static str, metrics: Arc<StreamSourceMetrics>) -> Self {
        Self { connector, metrics }
    }

    /// Name of the connector feeding this source
    pub fn connector(&self) -> &'static str {
        self.connector
    }

    pub fn snapshot(&self) -> SourceMetricsSnapshot {
        self.metrics.snapshot()
    }
}
