//! Delivered-event counter shared by the broadcaster and the monitor

use std::sync::atomic::{AtomicU64, Ordering};

/// Count of events delivered in the current sampling window
///
/// The broadcaster calls [`record`](Self::record); the monitor calls
/// [`take`](Self::take), which reads and resets in one atomic swap so no
/// increment is lost or double counted across a window boundary.
#[derive(Debug, Default)]
pub struct ThroughputCounter {
    count: AtomicU64,
}

impl ThroughputCounter {
    pub const fn new() -> Self {
        Self {
            count: AtomicU64::new(0),
        }
    }

    /// Count one delivered event
    #[inline]
    pub fn record(&self) {
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    /// Read the count and reset it to zero
    #[inline]
    pub fn take(&self) -> u64 {
        self.count.swap(0, Ordering::AcqRel)
    }

    /// Read the count without resetting it
    #[inline]
    pub fn current(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }
}
