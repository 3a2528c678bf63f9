//! WebSocket server for subscriber connections
//!
//! `TapServer` binds the configured address, upgrades `/ws` to a WebSocket,
//! and serves the bundled browser client for every other path.
//!
//! Each connection runs in its own task that owns the socket's write half:
//!
//! - frames queued by `Subscriber::emit` are written in order
//! - a ping goes out every `heartbeat_interval`; a client silent for two
//!   intervals is dropped
//! - client `join` / `leave` frames change group membership
//! - on disconnect the subscriber leaves every group
//! - on shutdown, frames already queued are written before the close frame

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::extract::ws::{
    CloseFrame, Message, Utf8Bytes, WebSocket, WebSocketUpgrade, close_code,
};
use axum::response::IntoResponse;
use axum::routing::get;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};
use tweetcast_config::ServerConfig;

use crate::error::{Result, TapError};
use crate::protocol::ClientMessage;
use crate::subscriber::{Subscriber, SubscriberRegistry};

/// Path WebSocket clients connect to
pub const WS_PATH: &str = "/ws";

/// Per-connection settings shared by every handler
#[derive(Clone)]
pub(crate) struct ConnectionState {
    pub(crate) registry: Arc<SubscriberRegistry>,
    pub(crate) group: Arc<str>,
    pub(crate) client_buffer: usize,
    pub(crate) heartbeat_interval: Duration,
    pub(crate) cancel: CancellationToken,
    pub(crate) tracker: TaskTracker,
}

/// Why a connection loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Close {
    Shutdown,
    ClientGone,
    Unresponsive,
    WriteFailed,
}

/// WebSocket fan-out server
pub struct TapServer {
    listener: TcpListener,
    local_addr: SocketAddr,
    static_dir: PathBuf,
    group: String,
    client_buffer: usize,
    heartbeat_interval: Duration,
    registry: Arc<SubscriberRegistry>,
}

impl TapServer {
    /// Bind the listener
    ///
    /// # Errors
    ///
    /// Returns `TapError::Bind` if the address is unavailable.
    pub async fn bind(config: &ServerConfig, registry: Arc<SubscriberRegistry>) -> Result<Self> {
        let address = config.bind_address();
        let listener = TcpListener::bind(&address)
            .await
            .map_err(|source| TapError::Bind {
                address: address.clone(),
                source,
            })?;
        let local_addr = listener.local_addr()?;

        if !config.static_dir.is_dir() {
            warn!(
                static_dir = %config.static_dir.display(),
                "static directory not found, browser client will not be served"
            );
        }

        info!(
            address = %local_addr,
            group = %config.group,
            static_dir = %config.static_dir.display(),
            "tap server listening"
        );

        Ok(Self {
            listener,
            local_addr,
            static_dir: config.static_dir.clone(),
            group: config.group.clone(),
            client_buffer: config.client_buffer,
            heartbeat_interval: config.heartbeat_interval,
            registry,
        })
    }

    /// Address actually bound (resolves port 0)
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Serve until `cancel` fires, then flush and close every connection
    pub async fn serve(self, cancel: CancellationToken) -> Result<()> {
        let tracker = TaskTracker::new();
        let state = ConnectionState {
            registry: Arc::clone(&self.registry),
            group: Arc::from(self.group.as_str()),
            client_buffer: self.client_buffer,
            heartbeat_interval: self.heartbeat_interval,
            cancel: cancel.clone(),
            tracker: tracker.clone(),
        };
        let app = build_router(state, &self.static_dir);

        axum::serve(self.listener, app)
            .with_graceful_shutdown(async move { cancel.cancelled().await })
            .await?;

        // Upgraded sockets outlive the HTTP connection; wait for their flush
        tracker.close();
        let open = tracker.len();
        if open > 0 {
            debug!(connections = open, "waiting for subscriber connections to close");
        }
        tracker.wait().await;

        info!(address = %self.local_addr, "tap server stopped");
        Ok(())
    }
}

impl std::fmt::Debug for TapServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TapServer")
            .field("local_addr", &self.local_addr)
            .field("group", &self.group)
            .finish()
    }
}

/// Build the HTTP router: `/ws` plus static files
pub(crate) fn build_router(state: ConnectionState, static_dir: &Path) -> Router {
    Router::new()
        .route(WS_PATH, get(ws_handler))
        .fallback_service(ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn ws_handler(State(state): State<ConnectionState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    let token = state.tracker.token();
    ws.on_upgrade(move |socket| async move {
        handle_socket(socket, state).await;
        drop(token);
    })
}

async fn handle_socket(socket: WebSocket, state: ConnectionState) {
    let (subscriber, mut outbound) = Subscriber::channel(state.client_buffer);
    let id = subscriber.id();
    state.registry.join(&subscriber, &state.group);
    debug!(subscriber_id = id, group = %state.group, "subscriber connected");

    let (mut sink, mut incoming) = socket.split();

    let mut heartbeat = tokio::time::interval(state.heartbeat_interval);
    heartbeat.set_missed_tick_behavior(MissedTickBehavior::Skip);
    heartbeat.tick().await;

    // Any frame from the client counts, pongs included
    let mut last_seen = Instant::now();
    let silence_limit = state.heartbeat_interval * 2;

    let close = loop {
        tokio::select! {
            biased;

            _ = state.cancel.cancelled() => break Close::Shutdown,

            _ = heartbeat.tick() => {
                if last_seen.elapsed() > silence_limit {
                    break Close::Unresponsive;
                }
                if sink.send(Message::Ping(Bytes::new())).await.is_err() {
                    break Close::WriteFailed;
                }
            }

            message = incoming.next() => match message {
                Some(Ok(Message::Text(text))) => {
                    last_seen = Instant::now();
                    handle_client_message(&state, &subscriber, text.as_str());
                }
                Some(Ok(Message::Close(_))) | None => break Close::ClientGone,
                Some(Ok(_)) => last_seen = Instant::now(),
                Some(Err(e)) => {
                    debug!(subscriber_id = id, error = %e, "socket read failed");
                    break Close::ClientGone;
                }
            },

            frame = outbound.recv() => {
                let Some(frame) = frame else { break Close::ClientGone };
                if let Err(e) = sink.send(Message::Text(Utf8Bytes::from(&*frame))).await {
                    debug!(subscriber_id = id, error = %e, "failed to write frame");
                    break Close::WriteFailed;
                }
            }
        }
    };

    // No new deliveries once out of the registry
    state.registry.leave(id);

    if close == Close::Shutdown {
        outbound.close();
        let flushed = flush(&mut sink, &mut outbound).await;
        let _ = sink
            .send(Message::Close(Some(CloseFrame {
                code: close_code::AWAY,
                reason: "server shutting down".into(),
            })))
            .await;
        debug!(subscriber_id = id, flushed, "subscriber closed for shutdown");
    } else {
        debug!(subscriber_id = id, reason = ?close, "subscriber disconnected");
    }
}

/// Write every frame still queued for this connection
async fn flush<S>(sink: &mut S, outbound: &mut mpsc::Receiver<Arc<str>>) -> usize
where
    S: futures::Sink<Message> + Unpin,
{
    let mut flushed = 0;
    while let Ok(frame) = outbound.try_recv() {
        if sink.send(Message::Text(Utf8Bytes::from(&*frame))).await.is_err() {
            break;
        }
        flushed += 1;
    }
    flushed
}

fn handle_client_message(state: &ConnectionState, subscriber: &Arc<Subscriber>, text: &str) {
    match ClientMessage::decode(text) {
        Ok(ClientMessage::Join(group)) => {
            state.registry.join(subscriber, &group);
            debug!(
                subscriber_id = subscriber.id(),
                group = %group,
                groups = ?state.registry.groups_of(subscriber.id()),
                "joined group"
            );
        }
        Ok(ClientMessage::Leave(group)) => {
            state.registry.leave_group(subscriber.id(), &group);
            debug!(
                subscriber_id = subscriber.id(),
                group = %group,
                groups = ?state.registry.groups_of(subscriber.id()),
                "left group"
            );
        }
        Err(e) => {
            debug!(subscriber_id = subscriber.id(), error = %e, "ignoring client frame");
        }
    }
}

#[cfg(test)]
#[path = "server_test.rs"]
mod tests;
