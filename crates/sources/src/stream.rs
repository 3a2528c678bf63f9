//! Stream-backed event source
//!
//! One receive loop per source. The loop owns the queue sender, the open
//! `MessageStream` and the reconnect state; the caller only holds a
//! `SourceHandle`.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};
use tweetcast_connectors::{
    ConnectorError, FilterParams, MessageStream, ReconnectPolicy, StreamConnector,
};
use tweetcast_protocol::{Event, StreamMessage};

use crate::error::SourceError;
use crate::metrics::{SourceMetricsHandle, StreamSourceMetrics};

/// Why a connection stopped being read
enum Exit {
    /// `stop()` was called
    Stopped,
    /// The broadcaster dropped its end of the queue
    QueueClosed,
    /// The stream ended or failed
    Lost {
        error: ConnectorError,
        received: bool,
    },
}

/// Event source adapter over a push-based connector
pub struct StreamSource<C> {
    connector: C,
    params: FilterParams,
    sender: mpsc::Sender<Arc<Event>>,
    policy: ReconnectPolicy,
    metrics: Arc<StreamSourceMetrics>,
}

impl<C> StreamSource<C>
where
    C: StreamConnector + 'static,
{
    /// Create a source that enqueues accepted events on `sender`
    ///
    /// Reconnecting is disabled until [`with_reconnect`](Self::with_reconnect)
    /// is called.
    pub fn new(connector: C, params: FilterParams, sender: mpsc::Sender<Arc<Event>>) -> Self {
        Self {
            connector,
            params,
            sender,
            policy: ReconnectPolicy::none(),
            metrics: Arc::new(StreamSourceMetrics::new()),
        }
    }

    /// Set the policy applied when the stream is lost mid-run
    pub fn with_reconnect(mut self, policy: ReconnectPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Get a metrics handle that outlives the source
    pub fn metrics_handle(&self) -> SourceMetricsHandle {
        SourceMetricsHandle::new(self.connector.name(), Arc::clone(&self.metrics))
    }

    /// Open the stream and spawn the receive loop
    ///
    /// # Errors
    ///
    /// Returns `SourceError::Connect` if the initial `filter()` fails. Nothing
    /// is spawned in that case and the queue sender is dropped.
    pub async fn start(self) -> Result<SourceHandle, SourceError> {
        let stream = self
            .connector
            .filter(&self.params)
            .await
            .map_err(|source| SourceError::Connect {
                connector: self.connector.name(),
                source,
            })?;

        info!(
            connector = self.connector.name(),
            track = ?self.params.track,
            "stream source started"
        );

        let cancel = CancellationToken::new();
        let metrics = self.metrics_handle();
        let task = tokio::spawn(self.run(stream, cancel.clone()));

        Ok(SourceHandle {
            cancel,
            task: Some(task),
            metrics,
        })
    }

    /// Receive loop: read, reconnect, repeat
    async fn run(self, mut stream: MessageStream, cancel: CancellationToken) -> Result<(), SourceError> {
        let mut attempt = 0u32;

        loop {
            let exit = self.pump(&mut stream, &cancel).await;
            stream.stop();

            let (mut last_error, received) = match exit {
                Exit::Stopped => {
                    info!(connector = self.connector.name(), "stream source stopped");
                    return Ok(());
                }
                Exit::QueueClosed => {
                    warn!(connector = self.connector.name(), "event queue closed, stopping source");
                    return Ok(());
                }
                Exit::Lost { error, received } => (error, received),
            };

            if received {
                attempt = 0;
            }

            stream = loop {
                if last_error.is_fatal() || !self.policy.allows(attempt) {
                    error!(
                        connector = self.connector.name(),
                        attempts = attempt,
                        error = %last_error,
                        "stream lost, giving up"
                    );
                    return Err(SourceError::StreamFailed {
                        attempts: attempt,
                        reason: last_error.to_string(),
                    });
                }

                let delay = self.policy.delay(attempt);
                attempt += 1;
                warn!(
                    connector = self.connector.name(),
                    attempt,
                    max_retries = self.policy.max_retries,
                    delay = ?delay,
                    error = %last_error,
                    "stream lost, reconnecting"
                );

                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Ok(()),
                    _ = tokio::time::sleep(delay) => {}
                }

                self.metrics.reconnect();
                let result = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Ok(()),
                    result = self.connector.filter(&self.params) => result,
                };

                match result {
                    Ok(stream) => {
                        info!(connector = self.connector.name(), attempt, "stream reconnected");
                        break stream;
                    }
                    Err(e) => last_error = e,
                }
            };
        }
    }

    /// Read one connection until it ends, fails, or the source is stopped
    async fn pump(&self, stream: &mut MessageStream, cancel: &CancellationToken) -> Exit {
        let mut received = false;

        loop {
            let item = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Exit::Stopped,
                item = stream.next() => item,
            };

            let message = match item {
                Some(Ok(message)) => message,
                Some(Err(e)) if e.is_message_error() => {
                    self.metrics.malformed_line();
                    debug!(error = %e, "skipping undecodable stream line");
                    continue;
                }
                Some(Err(error)) => return Exit::Lost { error, received },
                None => {
                    return Exit::Lost {
                        error: ConnectorError::Disconnected("stream ended".into()),
                        received,
                    };
                }
            };
            received = true;
            trace!(kind = message.kind(), "stream message");

            match message {
                StreamMessage::Tweet(tweet) => {
                    self.metrics.tweet_received();

                    let Some(event) = Event::accept(*tweet) else {
                        self.metrics.tweet_filtered();
                        continue;
                    };
                    trace!(id = event.id(), author = event.screen_name(), "tweet accepted");

                    // Blocks while the queue is full
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => return Exit::Stopped,
                        sent = self.sender.send(Arc::new(event)) => {
                            if sent.is_err() {
                                return Exit::QueueClosed;
                            }
                        }
                    }
                    self.metrics.tweet_accepted();
                }
                StreamMessage::Warning(warning) => {
                    self.metrics.warning();
                    warn!(
                        code = %warning.code,
                        percent_full = ?warning.percent_full,
                        "stream warning: {}",
                        warning.message
                    );
                }
                StreamMessage::Limit { track } => {
                    debug!(undelivered = track, "stream limit notice");
                }
                StreamMessage::Disconnect(notice) => {
                    let reason = format!("{} (code {})", notice.reason, notice.code);
                    return Exit::Lost {
                        error: ConnectorError::Disconnected(reason),
                        received,
                    };
                }
                StreamMessage::Other(_) => {}
            }
        }
    }
}

/// Handle to a running event source
///
/// Dropping the handle does not stop the source; call [`stop`](Self::stop).
#[derive(Debug)]
pub struct SourceHandle {
    cancel: CancellationToken,
    task: Option<JoinHandle<Result<(), SourceError>>>,
    metrics: SourceMetricsHandle,
}

impl SourceHandle {
    /// Stop producing; safe to call any number of times
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Wait for the receive loop to exit
    ///
    /// Cancel-safe: dropping the future leaves the handle intact. Once the
    /// loop's result has been returned, later calls return `Ok(())`.
    pub async fn finished(&mut self) -> Result<(), SourceError> {
        let Some(task) = self.task.as_mut() else {
            return Ok(());
        };

        let result = task.await;
        self.task = None;
        result.map_err(|e| SourceError::Task(e.to_string()))?
    }

    /// Wait for the loop to exit after `stop()`
    pub async fn join(mut self) -> Result<(), SourceError> {
        self.finished().await
    }

    /// Source counters
    pub fn metrics(&self) -> &SourceMetricsHandle {
        &self.metrics
    }
}
