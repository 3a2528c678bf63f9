//! Lifecycle controller
//!
//! Owns startup order and orderly teardown of the server, broadcaster,
//! throughput monitor and event source.
//!
//! # Startup
//!
//! ```text
//! TapServer::bind ─► queue ─► Broadcaster::run ─► ThroughputMonitor::run ─► StreamSource::start
//! ```
//!
//! The source starts last so every event it produces has a running consumer.
//!
//! # Teardown
//!
//! ```text
//! source.stop + join ─► broadcaster drains queue ─► server flushes + closes ─► monitor
//! ```
//!
//! Each step is bounded by `global.shutdown_timeout`. A step that overruns is
//! logged and abandoned so shutdown always completes.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tweetcast_config::Config;
use tweetcast_connectors::{FilterParams, ReconnectPolicy, StreamConnector};
use tweetcast_metrics::ThroughputMonitor;
use tweetcast_pipeline::{BroadcastSnapshot, Broadcaster, ThroughputCounter, queue};
use tweetcast_sources::{SourceHandle, StreamSource};
use tweetcast_tap::{SubscriberRegistry, TapServer};

/// Controller state, published on a watch channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Idle,
    Starting,
    Running,
    Stopping,
    Stopped,
}

impl LifecycleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Starting => "starting",
            Self::Running => "running",
            Self::Stopping => "stopping",
            Self::Stopped => "stopped",
        }
    }
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Starts and stops the whole service
pub struct Lifecycle<C> {
    config: Config,
    connector: C,
    registry: Arc<SubscriberRegistry>,
    state: watch::Sender<LifecycleState>,
    local_addr: watch::Sender<Option<SocketAddr>>,
}

/// Tasks spawned before the source, torn down after it
struct Components {
    server_cancel: CancellationToken,
    server_task: JoinHandle<tweetcast_tap::Result<()>>,
    broadcaster_task: JoinHandle<BroadcastSnapshot>,
    monitor_cancel: CancellationToken,
    monitor_task: Option<JoinHandle<()>>,
    step_timeout: Duration,
}

impl<C> Lifecycle<C>
where
    C: StreamConnector + 'static,
{
    pub fn new(config: Config, connector: C) -> Self {
        let (state, _) = watch::channel(LifecycleState::Idle);
        let (local_addr, _) = watch::channel(None);
        Self {
            config,
            connector,
            registry: Arc::new(SubscriberRegistry::new()),
            state,
            local_addr,
        }
    }

    /// Current state
    pub fn state(&self) -> LifecycleState {
        *self.state.borrow()
    }

    /// Observe state transitions
    pub fn subscribe(&self) -> watch::Receiver<LifecycleState> {
        self.state.subscribe()
    }

    /// Observe the server address once bound
    pub fn local_addr(&self) -> watch::Receiver<Option<SocketAddr>> {
        self.local_addr.subscribe()
    }

    /// Registry shared with the server and broadcaster
    pub fn registry(&self) -> Arc<SubscriberRegistry> {
        Arc::clone(&self.registry)
    }

    /// Run until `shutdown` resolves or the event source fails
    ///
    /// # Errors
    ///
    /// Returns an error if startup fails, or if the event source fails at
    /// runtime. In the runtime case teardown has already completed.
    pub async fn run<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send,
    {
        let Self {
            config,
            connector,
            registry,
            state,
            local_addr,
        } = self;

        state.send_replace(LifecycleState::Starting);
        info!(
            connector = connector.name(),
            track = ?config.stream.track,
            group = %config.server.group,
            queue_size = config.global.queue_size,
            "starting"
        );

        let server = match TapServer::bind(&config.server, Arc::clone(&registry)).await {
            Ok(server) => server,
            Err(e) => {
                state.send_replace(LifecycleState::Stopped);
                return Err(e).context("failed to start subscriber server");
            }
        };
        local_addr.send_replace(Some(server.local_addr()));
        let server_cancel = CancellationToken::new();
        let server_task = tokio::spawn(server.serve(server_cancel.clone()));

        let (sender, receiver) = queue(config.global.queue_size);
        let counter = Arc::new(ThroughputCounter::new());
        let broadcaster = Broadcaster::new(
            Arc::clone(&registry),
            config.server.group.clone(),
            Arc::clone(&counter),
        );
        let broadcaster_task = tokio::spawn(broadcaster.run(receiver));

        let monitor_cancel = CancellationToken::new();
        let monitor_task = if config.metrics.enabled {
            let monitor = ThroughputMonitor::from_config(counter, &config.metrics);
            Some(tokio::spawn(monitor.run(monitor_cancel.clone())))
        } else {
            info!("throughput reporting disabled");
            None
        };

        let components = Components {
            server_cancel,
            server_task,
            broadcaster_task,
            monitor_cancel,
            monitor_task,
            step_timeout: config.global.shutdown_timeout,
        };

        let params = FilterParams {
            track: config.stream.track.clone(),
            stall_warnings: config.stream.stall_warnings,
        };
        let source = StreamSource::new(connector, params, sender)
            .with_reconnect(ReconnectPolicy::from(&config.stream.reconnect));

        let mut source = match source.start().await {
            Ok(handle) => handle,
            Err(e) => {
                error!(error = %e, "event source failed to start");
                state.send_replace(LifecycleState::Stopping);
                components.shutdown().await;
                state.send_replace(LifecycleState::Stopped);
                return Err(e).context("failed to start event source");
            }
        };

        state.send_replace(LifecycleState::Running);
        info!("running");

        let outcome = tokio::select! {
            _ = shutdown => {
                info!("shutdown signal received, stopping");
                Ok(())
            }
            result = source.finished() => match result {
                Ok(()) => Err(anyhow!("event source exited unexpectedly")),
                Err(e) => {
                    error!(error = %e, "event source failed, stopping");
                    Err(e).context("event source failed")
                }
            },
        };

        state.send_replace(LifecycleState::Stopping);
        stop_source(source, components.step_timeout).await;
        components.shutdown().await;
        state.send_replace(LifecycleState::Stopped);
        info!("stopped");

        outcome
    }
}

/// Stop the source and wait for it to release the queue
async fn stop_source(source: SourceHandle, step_timeout: Duration) {
    let metrics = source.metrics().clone();
    source.stop();

    match tokio::time::timeout(step_timeout, source.join()).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!(error = %e, "event source ended with error"),
        Err(_) => warn!("event source did not stop within timeout"),
    }

    let snapshot = metrics.snapshot();
    info!(
        connector = metrics.connector(),
        received = snapshot.tweets_received,
        accepted = snapshot.tweets_accepted,
        filtered = snapshot.tweets_filtered,
        reconnects = snapshot.reconnects,
        "event source stopped"
    );
}

impl Components {
    /// Drain the broadcaster, then close the server, then the monitor
    async fn shutdown(mut self) {
        match tokio::time::timeout(self.step_timeout, &mut self.broadcaster_task).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => warn!(error = %e, "broadcaster task panicked"),
            Err(_) => {
                warn!("broadcaster did not drain within timeout");
                self.broadcaster_task.abort();
            }
        }

        self.server_cancel.cancel();
        match tokio::time::timeout(self.step_timeout, &mut self.server_task).await {
            Ok(Ok(Ok(()))) => {}
            Ok(Ok(Err(e))) => warn!(error = %e, "server ended with error"),
            Ok(Err(e)) => warn!(error = %e, "server task panicked"),
            Err(_) => {
                warn!("server did not close within timeout");
                self.server_task.abort();
            }
        }

        self.monitor_cancel.cancel();
        if let Some(mut task) = self.monitor_task.take()
            && tokio::time::timeout(self.step_timeout, &mut task).await.is_err()
        {
            task.abort();
        }
    }
}

#[cfg(test)]
#[path = "lifecycle_test.rs"]
mod tests;
