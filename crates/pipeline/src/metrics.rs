//! Broadcaster metrics
//!
//! Atomic counters for tracking fan-out. All counters use relaxed ordering;
//! values are eventually consistent, not real-time.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for the broadcaster
#[derive(Debug, Default)]
pub struct BroadcastMetrics {
    /// Events dequeued
    events_received: AtomicU64,

    /// Events that could not be encoded
    encode_errors: AtomicU64,

    /// Events dequeued while the group had no members
    events_unheard: AtomicU64,

    /// Frames queued to a member
    deliveries_ok: AtomicU64,

    /// Member buffer full
    deliveries_lagged: AtomicU64,

    /// Member disconnected between snapshot and delivery
    deliveries_closed: AtomicU64,
}

impl BroadcastMetrics {
    /// Create new metrics instance with all counters at zero
    #[inline]
    pub const fn new() -> Self {
        Self {
            events_received: AtomicU64::new(0),
            encode_errors: AtomicU64::new(0),
            events_unheard: AtomicU64::new(0),
            deliveries_ok: AtomicU64::new(0),
            deliveries_lagged: AtomicU64::new(0),
            deliveries_closed: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn record_received(&self) {
        self.events_received.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_encode_error(&self) {
        self.encode_errors.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_unheard(&self) {
        self.events_unheard.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_delivered(&self) {
        self.deliveries_ok.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_lagged(&self) {
        self.deliveries_lagged.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_closed(&self) {
        self.deliveries_closed.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of all metrics
    #[inline]
    pub fn snapshot(&self) -> BroadcastSnapshot {
        BroadcastSnapshot {
            events_received: self.events_received.load(Ordering::Relaxed),
            encode_errors: self.encode_errors.load(Ordering::Relaxed),
            events_unheard: self.events_unheard.load(Ordering::Relaxed),
            deliveries_ok: self.deliveries_ok.load(Ordering::Relaxed),
            deliveries_lagged: self.deliveries_lagged.load(Ordering::Relaxed),
            deliveries_closed: self.deliveries_closed.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time snapshot of broadcaster metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BroadcastSnapshot {
    pub events_received: u64,
    pub encode_errors: u64,
    pub events_unheard: u64,
    pub deliveries_ok: u64,
    pub deliveries_lagged: u64,
    pub deliveries_closed: u64,
}

impl BroadcastSnapshot {
    /// Failed member deliveries of any kind
    #[inline]
    pub fn deliveries_failed(&self) -> u64 {
        self.deliveries_lagged + self.deliveries_closed
    }

    /// Fraction of member deliveries that succeeded
    ///
    /// Returns None if no delivery has been attempted.
    pub fn delivery_success_rate(&self) -> Option<f64> {
        let total = self.deliveries_ok + self.deliveries_failed();
        if total == 0 {
            None
        } else {
            Some(self.deliveries_ok as f64 / total as f64)
        }
    }
}

// ============================================================================
// Lag Tracker - Rate-limited logging of slow subscribers
// ============================================================================

/// Log interval in milliseconds
const LOG_INTERVAL_MS: u64 = 1000;

/// Frames dropped per second that triggers ERROR level
const CRITICAL_LAG_THRESHOLD: u64 = 100;

/// Rate-limited logging of frames dropped for lagging subscribers
///
/// Aggregates drops and logs one summary per second, naming the most recent
/// lagging subscriber.
pub struct LagTracker {
    /// Drops in current interval
    interval_drops: AtomicU64,
    /// Last subscriber that lagged
    last_subscriber: AtomicU64,
    /// Last log time (epoch milliseconds)
    last_log_ms: AtomicU64,
}

impl LagTracker {
    pub fn new() -> Self {
        Self {
            interval_drops: AtomicU64::new(0),
            last_subscriber: AtomicU64::new(0),
            last_log_ms: AtomicU64::new(Self::now_ms()),
        }
    }

    /// Record a dropped frame; returns true if a summary was logged
    pub fn record(&self, subscriber_id: u64) -> bool {
        self.interval_drops.fetch_add(1, Ordering::Relaxed);
        self.last_subscriber.store(subscriber_id, Ordering::Relaxed);
        self.maybe_log()
    }

    fn maybe_log(&self) -> bool {
        let now = Self::now_ms();
        let last = self.last_log_ms.load(Ordering::Relaxed);

        if now.saturating_sub(last) < LOG_INTERVAL_MS {
            return false;
        }

        if self
            .last_log_ms
            .compare_exchange(last, now, Ordering::SeqCst, Ordering::Relaxed)
            .is_err()
        {
            return false;
        }

        let drops = self.interval_drops.swap(0, Ordering::Relaxed);
        if drops == 0 {
            return false;
        }
        let subscriber_id = self.last_subscriber.load(Ordering::Relaxed);

        if drops > CRITICAL_LAG_THRESHOLD {
            tracing::error!(
                dropped_frames = drops,
                subscriber_id,
                threshold = CRITICAL_LAG_THRESHOLD,
                "subscribers cannot keep up with the stream"
            );
        } else {
            tracing::warn!(
                dropped_frames = drops,
                subscriber_id,
                "frames dropped for lagging subscribers in last second"
            );
        }

        true
    }

    #[inline]
    fn now_ms() -> u64 {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }

    #[cfg(test)]
    pub fn current_drops(&self) -> u64 {
        self.interval_drops.load(Ordering::Relaxed)
    }
}

impl Default for LagTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for LagTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LagTracker")
            .field("interval_drops", &self.interval_drops.load(Ordering::Relaxed))
            .finish()
    }
}
