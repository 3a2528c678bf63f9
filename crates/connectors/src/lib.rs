//! Tweetcast - Connectors
//!
//! Push-based stream connectors that deliver raw feed messages to the event
//! source adapter.
//!
//! # Available Connectors
//!
//! - **Twitter** - OAuth 1.0a signed `statuses/filter` long-poll stream
//! - **Memory** - scripted in-process connector for tests and local wiring
//!
//! # Design Principles
//!
//! - **Push-based**: `filter()` opens a long-lived stream of `StreamMessage`s
//! - **Prompt stop**: `MessageStream::stop()` ends iteration immediately
//! - **Classified failures**: authentication errors are fatal, everything
//!   else is eligible for reconnect under a `ReconnectPolicy`
//!
//! # Example
//!
//! ```ignore
//! use tweetcast_connectors::{FilterParams, StreamConnector, TwitterStream};
//!
//! let twitter = TwitterStream::new(&credentials, &config.stream)?;
//! let mut stream = twitter.filter(&FilterParams::track(["rust"])).await?;
//!
//! while let Some(message) = stream.next().await {
//!     println!("{:?}", message?);
//! }
//! ```

mod error;
mod memory;
pub mod resilience;
mod traits;
pub mod twitter;

pub use error::ConnectorError;
pub use memory::{MemoryConnector, MemoryFeed};
pub use resilience::ReconnectPolicy;
pub use traits::{FilterParams, MessageResult, MessageStream, StreamConnector};
pub use twitter::TwitterStream;
