//! Tweetcast - Pipeline
//!
//! The bounded queue and the broadcaster that drains it into the subscriber
//! registry.
//!
//! # Architecture
//!
//! ```text
//! [Source]                   [Broadcaster]                       [Subscribers]
//!                                                             ┌──→ conn task ──→ client
//! StreamSource ──→ queue(20) ──→ encode once ──→ members_of ──┼──→ conn task ──→ client
//!   (blocks when full)              │            (snapshot)   └──→ conn task ──→ client
//!                                   └──→ ThroughputCounter.record()
//! ```
//!
//! # Key Design
//!
//! - **Bounded, blocking queue**: `tokio::sync::mpsc` with a fixed capacity;
//!   the producer waits instead of dropping
//! - **Arc events**: each event is shared, never copied, across the pipeline
//! - **Encode once**: one wire frame per event, shared by every member
//! - **Non-blocking fan-out**: `Subscriber::emit` is a `try_send`, so a slow
//!   member only loses its own frames
//! - **Closure is shutdown**: `run()` returns when the queue is closed and
//!   drained
//!
//! # Example
//!
//! ```ignore
//! use tweetcast_pipeline::{Broadcaster, ThroughputCounter, queue};
//!
//! let (tx, rx) = queue(20);
//! let counter = Arc::new(ThroughputCounter::new());
//! let broadcaster = Broadcaster::new(registry, "global", Arc::clone(&counter));
//!
//! let task = tokio::spawn(broadcaster.run(rx));
//! // StreamSource sends Arc<Event> on tx
//! ```

mod broadcaster;
mod counter;
mod error;
mod metrics;

use std::sync::Arc;

use tokio::sync::mpsc;
use tweetcast_protocol::Event;

pub use broadcaster::{BroadcastMetricsHandle, Broadcaster};
pub use counter::ThroughputCounter;
pub use error::{PipelineError, Result};
pub use metrics::{BroadcastMetrics, BroadcastSnapshot, LagTracker};

/// Producer side of the bounded queue
pub type EventSender = mpsc::Sender<Arc<Event>>;

/// Consumer side of the bounded queue
pub type EventReceiver = mpsc::Receiver<Arc<Event>>;

/// Create the bounded queue between the source and the broadcaster
///
/// A zero capacity is raised to one.
pub fn queue(capacity: usize) -> (EventSender, EventReceiver) {
    mpsc::channel(capacity.max(1))
}
