//! WebSocket client for the tail command

use anyhow::{Context, Result, anyhow};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tweetcast_protocol::TWEET_EVENT;
use tweetcast_tap::ClientMessage;

/// A decoded server frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerFrame {
    /// Serialized tweet payload
    Tweet(String),
    /// Any other event name
    Other(String),
}

#[derive(Deserialize)]
struct RawFrame {
    event: String,
    #[serde(default)]
    data: String,
}

impl ServerFrame {
    pub fn decode(text: &str) -> Result<Self> {
        let raw: RawFrame = serde_json::from_str(text).context("malformed server frame")?;
        if raw.event == TWEET_EVENT {
            Ok(Self::Tweet(raw.data))
        } else {
            Ok(Self::Other(raw.event))
        }
    }
}

/// Client for a tweetcast server
pub struct TailClient {
    socket: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl TailClient {
    /// Connect to the server's WebSocket endpoint
    pub async fn connect(url: &str) -> Result<Self> {
        let (socket, _) = connect_async(url)
            .await
            .with_context(|| format!("failed to connect to {}", url))?;
        Ok(Self { socket })
    }

    /// Join an additional broadcast group
    pub async fn join(&mut self, group: &str) -> Result<()> {
        let text = ClientMessage::Join(group.to_string())
            .encode()
            .map_err(|e| anyhow!(e))?;
        self.socket
            .send(Message::text(text))
            .await
            .context("failed to send join")
    }

    /// Receive the next application frame
    ///
    /// Returns `Ok(None)` once the server closes the connection.
    pub async fn recv(&mut self) -> Result<Option<ServerFrame>> {
        while let Some(message) = self.socket.next().await {
            match message.context("failed to read from server")? {
                Message::Text(text) => return ServerFrame::decode(&text).map(Some),
                Message::Close(_) => return Ok(None),
                // pings are answered by tungstenite
                _ => continue,
            }
        }
        Ok(None)
    }

    /// Send a close frame, ignoring errors
    pub async fn close(&mut self) {
        let _ = self.socket.close(None).await;
    }
}
