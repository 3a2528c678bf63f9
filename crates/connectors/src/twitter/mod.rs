//! Twitter filter stream connector
//!
//! Opens `POST statuses/filter` with an OAuth 1.0a signed request and reads
//! the newline-delimited body for as long as the server keeps it open.
//!
//! # Failure classification
//!
//! | Condition                 | Error                          |
//! |---------------------------|--------------------------------|
//! | HTTP 401 / 403            | `AuthFailed` (fatal)           |
//! | HTTP 420 / 429            | `RateLimited`                  |
//! | other non-2xx             | `Status`                       |
//! | no response headers in time | `Timeout`                    |
//! | no bytes for 90s          | `Stalled` (ends the stream)    |
//! | undecodable line          | `Protocol` (stream continues)  |

mod decoder;
mod oauth;

#[cfg(test)]
mod tests;

use std::collections::VecDeque;
use std::time::Duration;

use bytes::Bytes;
use futures::stream::{self, BoxStream, StreamExt};
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use tracing::debug;
use tweetcast_config::{Credentials, StreamConfig};
use tweetcast_protocol::StreamMessage;

pub use decoder::{LineDecoder, MAX_LINE_BYTES};
pub use oauth::OAuthSigner;

use crate::error::ConnectorError;
use crate::traits::{FilterParams, MessageResult, MessageStream, StreamConnector};

/// Keep-alives arrive every ~30s; three missed ones means the link is dead
pub const DEFAULT_STALL_TIMEOUT: Duration = Duration::from_secs(90);

/// Error bodies are truncated to this many bytes
const MAX_ERROR_BODY: usize = 512;

const USER_AGENT: &str = concat!("tweetcast/", env!("CARGO_PKG_VERSION"));

/// Signed filter stream client
pub struct TwitterStream {
    client: reqwest::Client,
    api_url: String,
    signer: OAuthSigner,
    timeout: Duration,
    stall_timeout: Duration,
}

impl TwitterStream {
    /// Create a stream client for the configured endpoint
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client creation fails (e.g., TLS misconfiguration)
    pub fn new(credentials: &Credentials, config: &StreamConfig) -> Result<Self, ConnectorError> {
        // No total request timeout: the body is expected to stay open indefinitely
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(config.timeout)
            .build()
            .map_err(|e| ConnectorError::Init(format!("Twitter HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            signer: OAuthSigner::new(credentials),
            timeout: config.timeout,
            stall_timeout: DEFAULT_STALL_TIMEOUT,
        })
    }

    /// Override how long the body may stay silent before the stream is dropped
    pub fn with_stall_timeout(mut self, stall_timeout: Duration) -> Self {
        self.stall_timeout = stall_timeout;
        self
    }

    /// Endpoint this client connects to
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Map a non-success response to a connector error
    async fn error_for_status(response: reqwest::Response) -> ConnectorError {
        let status = response.status();
        let mut body = response.text().await.unwrap_or_default();
        if body.len() > MAX_ERROR_BODY {
            let mut end = MAX_ERROR_BODY;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            body.truncate(end);
        }

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                ConnectorError::AuthFailed(format!("HTTP {}: {}", status.as_u16(), body.trim()))
            }
            StatusCode::TOO_MANY_REQUESTS => ConnectorError::RateLimited {
                status: status.as_u16(),
            },
            // 420 "Enhance Your Calm" is not a registered status code
            s if s.as_u16() == 420 => ConnectorError::RateLimited { status: 420 },
            s => ConnectorError::Status {
                status: s.as_u16(),
                body: body.trim().to_string(),
            },
        }
    }
}

impl StreamConnector for TwitterStream {
    fn name(&self) -> &'static str {
        "twitter"
    }

    async fn filter(&self, params: &FilterParams) -> Result<MessageStream, ConnectorError> {
        let pairs = params.form_pairs();
        let authorization = self.signer.authorization("POST", &self.api_url, &pairs);
        let body: Vec<String> = pairs
            .iter()
            .map(|(k, v)| format!("{}={}", oauth::encode(k), oauth::encode(v)))
            .collect();

        let request = self
            .client
            .post(&self.api_url)
            .header(AUTHORIZATION, authorization)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body.join("&"));

        debug!(url = %self.api_url, track = ?params.track, "opening filter stream");

        let response = tokio::time::timeout(self.timeout, request.send())
            .await
            .map_err(|_| ConnectorError::Timeout {
                secs: self.timeout.as_secs(),
            })??;

        if !response.status().is_success() {
            return Err(Self::error_for_status(response).await);
        }

        debug!(status = %response.status(), "filter stream connected");

        let body = BodyReader {
            chunks: response.bytes_stream().boxed(),
            decoder: LineDecoder::new(),
            ready: VecDeque::new(),
            stall_timeout: self.stall_timeout,
            done: false,
        };
        Ok(MessageStream::new(stream::unfold(body, BodyReader::next)))
    }
}

impl std::fmt::Debug for TwitterStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwitterStream")
            .field("api_url", &self.api_url)
            .field("timeout", &self.timeout)
            .field("stall_timeout", &self.stall_timeout)
            .finish()
    }
}

/// Reads body chunks, frames lines and decodes them one at a time
struct BodyReader {
    chunks: BoxStream<'static, reqwest::Result<Bytes>>,
    decoder: LineDecoder,
    ready: VecDeque<Bytes>,
    stall_timeout: Duration,
    done: bool,
}

impl BodyReader {
    async fn next(mut self) -> Option<(MessageResult, Self)> {
        loop {
            if let Some(line) = self.ready.pop_front() {
                let message = StreamMessage::decode(&line).map_err(ConnectorError::from);
                return Some((message, self));
            }
            if self.done {
                return None;
            }

            match tokio::time::timeout(self.stall_timeout, self.chunks.next()).await {
                Err(_) => {
                    self.done = true;
                    let secs = self.stall_timeout.as_secs();
                    return Some((Err(ConnectorError::Stalled { secs }), self));
                }
                Ok(None) => {
                    self.done = true;
                    if self.decoder.pending() > 0 {
                        debug!(bytes = self.decoder.pending(), "discarding partial line");
                    }
                }
                Ok(Some(Err(e))) => {
                    self.done = true;
                    return Some((Err(e.into()), self));
                }
                Ok(Some(Ok(chunk))) => match self.decoder.push(&chunk) {
                    Ok(lines) => self.ready.extend(lines),
                    Err(e) => {
                        self.done = true;
                        return Some((Err(e), self));
                    }
                },
            }
        }
    }
}
