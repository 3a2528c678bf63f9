//! Tweetcast Tap - live fan-out to WebSocket subscribers
//!
//! This crate owns the subscriber side of the pipeline:
//!
//! - `SubscriberRegistry` tracks connected subscribers per broadcast group
//! - `Subscriber::emit` is a non-blocking bounded send into a connection's
//!   outbound queue, so one slow client never stalls the broadcaster
//! - `TapServer` accepts WebSocket connections at `/ws`, serves the bundled
//!   browser client, and flushes queued frames on shutdown
//!
//! # Architecture
//!
//! ```text
//! Broadcaster
//!     │
//!     ├──→ encode_frame("tweet", payload)     (once per event)
//!     │         │
//!     │    members_of(group)                  (snapshot)
//!     │    ┌────┴────┐
//!     │    ▼         ▼
//!     │  emit()    emit()                     (try_send, never blocks)
//!     │    │         │
//!     │    ▼         ▼
//!     │  conn task  conn task                 (one writer per WebSocket)
//!     │    │         │
//!     └────┴─────────┴──→ browser clients
//! ```

mod error;
pub mod protocol;
pub mod server;
pub mod subscriber;

pub use error::{Result, TapError};
pub use protocol::{ClientMessage, encode_frame};
pub use server::TapServer;
pub use subscriber::{Subscriber, SubscriberRegistry};
