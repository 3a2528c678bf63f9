//! Tweetcast - Sources
//!
//! The event source adapter: wraps a `StreamConnector`, applies the exclusion
//! predicate and feeds accepted events into the bounded queue.
//!
//! # Design Principles
//!
//! - **Backpressure, not loss**: a full queue blocks the receive loop; nothing
//!   is dropped between the stream and the broadcaster
//! - **Fail fast at startup**: the first `filter()` runs inside `start()` so
//!   bad credentials never reach steady state
//! - **Bounded recovery**: mid-run stream loss is retried under a
//!   `ReconnectPolicy`, then reported as `SourceError::StreamFailed`
//! - **Queue ownership**: the sender is dropped when the loop exits, which is
//!   what closes the queue for the broadcaster
//!
//! # Example
//!
//! ```ignore
//! use tweetcast_sources::StreamSource;
//!
//! let (tx, rx) = tokio::sync::mpsc::channel(20);
//! let source = StreamSource::new(twitter, FilterParams::track(["rust"]), tx)
//!     .with_reconnect(ReconnectPolicy::default());
//!
//! let mut handle = source.start().await?;
//! // ...
//! handle.stop();
//! handle.join().await?;
//! ```

mod error;
mod metrics;
mod stream;

pub use error::SourceError;
pub use metrics::{SourceMetricsHandle, SourceMetricsSnapshot, StreamSourceMetrics};
pub use stream::{SourceHandle, StreamSource};
