//! Tweetcast - Metrics
//!
//! Throughput sampling and reporting.
//!
//! # Overview
//!
//! The broadcaster increments a shared [`ThroughputCounter`] once per event
//! it dequeues. [`ThroughputMonitor`] owns the other side of that counter:
//! once per window it swaps the count back to zero, turns it into a rate and
//! logs it through the configured [`MetricsFormatter`].
//!
//! ```text
//! Broadcaster ──record()──► ThroughputCounter ◄──take()── ThroughputMonitor
//!                                                              │
//!                                                              └──► tracing
//! ```
//!
//! The swap is a single atomic exchange, so increments landing during a
//! sample are counted in exactly one window.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//! use tweetcast_metrics::ThroughputMonitor;
//! use tweetcast_pipeline::ThroughputCounter;
//!
//! let counter = Arc::new(ThroughputCounter::new());
//! let monitor = ThroughputMonitor::new(Arc::clone(&counter), Duration::from_secs(5));
//! tokio::spawn(monitor.run(cancel.clone()));
//! ```
//!
//! [`ThroughputCounter`]: tweetcast_pipeline::ThroughputCounter

pub mod format;
mod monitor;

pub use format::{HumanFormatter, JsonFormatter, MetricsFormatter};
pub use monitor::{ThroughputMonitor, ThroughputSample};
