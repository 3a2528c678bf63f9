//! Connector trait and stream handle

use futures::stream::{self, BoxStream, Stream, StreamExt};
use tokio_util::sync::CancellationToken;
use tweetcast_protocol::StreamMessage;

use crate::error::ConnectorError;

/// One item yielded by a message stream
pub type MessageResult = Result<StreamMessage, ConnectorError>;

/// Filter criteria sent when opening a stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterParams {
    /// Track terms (comma-joined on the wire)
    pub track: Vec<String>,
    /// Request stall warnings
    pub stall_warnings: bool,
}

impl FilterParams {
    /// Params tracking the given terms, stall warnings enabled
    pub fn track<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            track: terms.into_iter().map(Into::into).collect(),
            stall_warnings: true,
        }
    }

    /// Form parameters in wire order
    pub fn form_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("track", self.track.join(","))];
        if self.stall_warnings {
            pairs.push(("stall_warnings", "true".to_string()));
        }
        pairs
    }
}

/// Trait for push-based feed connectors
///
/// A connector opens a long-lived stream of raw messages matching the filter.
/// Reconnecting after a failure is the caller's decision; the connector only
/// reports what went wrong.
pub trait StreamConnector: Send + Sync {
    /// Returns the connector name (e.g., "twitter", "memory")
    fn name(&self) -> &'static str;

    /// Open a filtered stream
    ///
    /// Startup failures (bad credentials, unreachable endpoint) are returned
    /// here rather than as the first stream item.
    fn filter(
        &self,
        params: &FilterParams,
    ) -> impl std::future::Future<Output = Result<MessageStream, ConnectorError>> + Send;
}

/// An open stream of raw messages
///
/// `stop()` may be called any number of times; after the first call `next()`
/// returns `None` and the underlying connection is released.
pub struct MessageStream {
    inner: BoxStream<'static, MessageResult>,
    stop: CancellationToken,
}

impl MessageStream {
    /// Wrap a message stream
    pub fn new<S>(inner: S) -> Self
    where
        S: Stream<Item = MessageResult> + Send + 'static,
    {
        Self {
            inner: inner.boxed(),
            stop: CancellationToken::new(),
        }
    }

    /// Stop the stream
    pub fn stop(&self) {
        self.stop.cancel();
    }

    /// Whether `stop()` has been called
    pub fn is_stopped(&self) -> bool {
        self.stop.is_cancelled()
    }

    /// Receive the next message
    ///
    /// Returns `None` when the stream ends or has been stopped.
    pub async fn next(&mut self) -> Option<MessageResult> {
        if self.stop.is_cancelled() {
            self.release();
            return None;
        }

        tokio::select! {
            biased;
            _ = self.stop.cancelled() => {
                self.release();
                None
            }
            item = self.inner.next() => item,
        }
    }

    /// Drop the underlying stream (closes the HTTP body)
    fn release(&mut self) {
        self.inner = stream::empty().boxed();
    }
}

impl std::fmt::Debug for MessageStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageStream")
            .field("stopped", &self.is_stopped())
            .finish()
    }
}
