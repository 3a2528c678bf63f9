//! Broadcaster: drains the bounded queue into a subscriber group
//!
//! One broadcaster per group. For every dequeued event the frame is encoded
//! once, the group's membership is snapshotted, and the frame is queued to
//! each member with a non-blocking `emit`. The connection task on the other
//! side of each member's queue performs the actual socket write, so members
//! are served concurrently and a slow one can only fall behind itself.

use std::sync::Arc;

use tracing::{debug, error, info, trace};
use tweetcast_protocol::{Event, TWEET_EVENT};
use tweetcast_tap::{SubscriberRegistry, TapError, encode_frame};

use crate::counter::ThroughputCounter;
use crate::error::{PipelineError, Result};
use crate::metrics::{BroadcastMetrics, BroadcastSnapshot, LagTracker};
use crate::EventReceiver;

/// Delivers queued events to every member of one group
pub struct Broadcaster {
    registry: Arc<SubscriberRegistry>,
    group: String,
    counter: Arc<ThroughputCounter>,
    metrics: Arc<BroadcastMetrics>,
    lag_tracker: LagTracker,
}

/// Handle for reading broadcaster metrics after `run()` consumed it
#[derive(Debug, Clone)]
pub struct BroadcastMetricsHandle {
    metrics: Arc<BroadcastMetrics>,
}

impl BroadcastMetricsHandle {
    pub fn snapshot(&self) -> BroadcastSnapshot {
        self.metrics.snapshot()
    }
}

impl Broadcaster {
    /// Create a broadcaster for `group`
    ///
    /// `counter` is incremented once per dequeued event.
    pub fn new(
        registry: Arc<SubscriberRegistry>,
        group: impl Into<String>,
        counter: Arc<ThroughputCounter>,
    ) -> Self {
        Self {
            registry,
            group: group.into(),
            counter,
            metrics: Arc::new(BroadcastMetrics::new()),
            lag_tracker: LagTracker::new(),
        }
    }

    /// Get a metrics handle that outlives `run()`
    pub fn metrics_handle(&self) -> BroadcastMetricsHandle {
        BroadcastMetricsHandle {
            metrics: Arc::clone(&self.metrics),
        }
    }

    /// Deliver one event to the current members of the group
    ///
    /// Returns the number of members the frame was queued to. Per-member
    /// failures are logged and counted, never returned.
    pub fn broadcast(&self, event: &Event) -> Result<usize> {
        let payload = event.to_payload().map_err(|e| PipelineError::Encode {
            id: event.id().to_string(),
            message: e.to_string(),
        })?;
        let frame = encode_frame(TWEET_EVENT, &payload).map_err(|e| PipelineError::Encode {
            id: event.id().to_string(),
            message: e.to_string(),
        })?;

        let members = self.registry.members_of(&self.group);
        if members.is_empty() {
            self.metrics.record_unheard();
            trace!(id = event.id(), group = %self.group, "no subscribers for event");
            return Ok(0);
        }

        let mut delivered = 0;
        for member in &members {
            match member.emit(Arc::clone(&frame)) {
                Ok(()) => {
                    self.metrics.record_delivered();
                    delivered += 1;
                }
                Err(TapError::Lagging { id }) => {
                    self.metrics.record_lagged();
                    self.lag_tracker.record(id);
                    debug!(subscriber_id = id, event_id = event.id(), "subscriber lagging, frame dropped");
                }
                Err(e) => {
                    self.metrics.record_closed();
                    debug!(subscriber_id = member.id(), error = %e, "delivery failed");
                }
            }
        }

        trace!(id = event.id(), members = members.len(), delivered, "event broadcast");
        Ok(delivered)
    }

    /// Run until the queue is closed and drained
    pub async fn run(self, mut queue: EventReceiver) -> BroadcastSnapshot {
        info!(group = %self.group, "broadcaster starting");

        while let Some(event) = queue.recv().await {
            self.metrics.record_received();

            if let Err(e) = self.broadcast(&event) {
                self.metrics.record_encode_error();
                error!(error = %e, "dropping event");
            }

            self.counter.record();
        }

        let snapshot = self.metrics.snapshot();
        info!(
            group = %self.group,
            events_received = snapshot.events_received,
            deliveries_ok = snapshot.deliveries_ok,
            deliveries_failed = snapshot.deliveries_failed(),
            delivery_success_rate = snapshot.delivery_success_rate(),
            encode_errors = snapshot.encode_errors,
            "broadcaster shutting down"
        );
        snapshot
    }
}

impl std::fmt::Debug for Broadcaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Broadcaster")
            .field("group", &self.group)
            .field("metrics", &self.metrics.snapshot())
            .finish()
    }
}
