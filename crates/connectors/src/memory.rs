//! In-memory connector
//!
//! Each `filter()` call consumes the next scripted outcome: either a live
//! connection fed through a `MemoryFeed`, or an error. With nothing scripted
//! the connector reports itself unavailable.

use std::collections::VecDeque;
use std::sync::Arc;

use futures::stream;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tweetcast_protocol::{StallWarning, StreamMessage, Tweet};

use crate::error::ConnectorError;
use crate::traits::{FilterParams, MessageResult, MessageStream, StreamConnector};

enum Outcome {
    Connect(mpsc::UnboundedReceiver<MessageResult>),
    Refuse(ConnectorError),
}

#[derive(Default)]
struct Inner {
    outcomes: Mutex<VecDeque<Outcome>>,
    calls: Mutex<Vec<FilterParams>>,
}

/// Scripted in-process connector
///
/// Cheap to clone; clones share the same script.
#[derive(Clone, Default)]
pub struct MemoryConnector {
    inner: Arc<Inner>,
}

impl MemoryConnector {
    /// Create a connector with an empty script
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a successful connection and return its feed
    pub fn connection(&self) -> MemoryFeed {
        let (tx, rx) = mpsc::unbounded_channel();
        self.inner.outcomes.lock().push_back(Outcome::Connect(rx));
        MemoryFeed { tx }
    }

    /// Script a failed connection attempt
    pub fn refuse(&self, error: ConnectorError) {
        self.inner.outcomes.lock().push_back(Outcome::Refuse(error));
    }

    /// Number of `filter()` calls so far
    pub fn filter_calls(&self) -> usize {
        self.inner.calls.lock().len()
    }

    /// Params passed to the most recent `filter()` call
    pub fn last_params(&self) -> Option<FilterParams> {
        self.inner.calls.lock().last().cloned()
    }
}

impl StreamConnector for MemoryConnector {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn filter(&self, params: &FilterParams) -> Result<MessageStream, ConnectorError> {
        self.inner.calls.lock().push(params.clone());

        let outcome = self.inner.outcomes.lock().pop_front();
        match outcome {
            Some(Outcome::Connect(rx)) => {
                let messages =
                    stream::unfold(rx, |mut rx| async move { rx.recv().await.map(|m| (m, rx)) });
                Ok(MessageStream::new(messages))
            }
            Some(Outcome::Refuse(error)) => Err(error),
            None => Err(ConnectorError::Unavailable(
                "no scripted connection".into(),
            )),
        }
    }
}

impl std::fmt::Debug for MemoryConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryConnector")
            .field("scripted", &self.inner.outcomes.lock().len())
            .field("filter_calls", &self.filter_calls())
            .finish()
    }
}

/// Sending side of a scripted connection
///
/// Dropping the feed ends the stream, which the reader sees as a disconnect.
#[derive(Debug, Clone)]
pub struct MemoryFeed {
    tx: mpsc::UnboundedSender<MessageResult>,
}

impl MemoryFeed {
    /// Push a raw message; returns false if the stream was dropped
    pub fn send(&self, message: StreamMessage) -> bool {
        self.tx.send(Ok(message)).is_ok()
    }

    /// Push a tweet
    pub fn tweet(&self, tweet: Tweet) -> bool {
        self.send(StreamMessage::Tweet(Box::new(tweet)))
    }

    /// Push a stall warning
    pub fn warn(&self, message: impl Into<String>) -> bool {
        self.send(StreamMessage::Warning(StallWarning {
            code: "FALLING_BEHIND".into(),
            message: message.into(),
            percent_full: None,
        }))
    }

    /// Push a stream error
    pub fn fail(&self, error: ConnectorError) -> bool {
        self.tx.send(Err(error)).is_ok()
    }

    /// Whether the reading side has gone away
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unscripted_is_unavailable() {
        let connector = MemoryConnector::new();
        let result = connector.filter(&FilterParams::track(["rust"])).await;

        assert!(matches!(result, Err(ConnectorError::Unavailable(_))));
        assert_eq!(connector.filter_calls(), 1);
    }

    #[tokio::test]
    async fn test_outcomes_consumed_in_order() {
        let connector = MemoryConnector::new();
        connector.refuse(ConnectorError::AuthFailed("401".into()));
        let feed = connector.connection();

        let params = FilterParams::track(["rust"]);
        assert!(matches!(
            connector.filter(&params).await,
            Err(ConnectorError::AuthFailed(_))
        ));

        let mut stream = connector.filter(&params).await.unwrap();
        assert!(feed.send(StreamMessage::Limit { track: 3 }));
        assert!(matches!(
            stream.next().await,
            Some(Ok(StreamMessage::Limit { track: 3 }))
        ));

        drop(feed);
        assert!(stream.next().await.is_none());
        assert_eq!(connector.last_params(), Some(params));
    }

    #[tokio::test]
    async fn test_feed_closed_after_stream_dropped() {
        let connector = MemoryConnector::new();
        let feed = connector.connection();

        let stream = connector.filter(&FilterParams::track(["x"])).await.unwrap();
        assert!(!feed.is_closed());

        drop(stream);
        assert!(feed.is_closed());
        assert!(!feed.warn("late"));
    }
}
