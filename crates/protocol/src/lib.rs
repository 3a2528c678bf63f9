//! Tweetcast Protocol - core types that flow through the pipeline
//!
//! - `Tweet` - a raw feed item as delivered by the filter stream
//! - `StreamMessage` - one decoded line of the stream (tweet, warning, ...)
//! - `TweetKind` - the exclusion predicate (original vs retweet/quote)
//! - `Event` - an accepted, immutable tweet ready for fan-out
//!
//! # Design Principles
//!
//! - **Verbatim payloads**: unknown tweet fields are kept in a flattened map so
//!   subscribers receive the full object the stream delivered
//! - **Classify once**: `Event::accept` computes the kind at ingestion
//! - **Arc-friendly**: events are immutable and shared across subscribers

mod error;
mod event;
mod message;
mod tweet;

pub use error::ProtocolError;
pub use event::{Event, TweetKind};
pub use message::{Disconnect, StallWarning, StreamMessage};
pub use tweet::{Tweet, User};

/// Result type for protocol operations
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Event name used for tweet frames sent to subscribers
pub const TWEET_EVENT: &str = "tweet";

#[cfg(test)]
mod message_test;
