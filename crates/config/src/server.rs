//! Subscriber-facing server configuration
//!
//! Browser clients connect over WebSocket at `/ws`; everything else is served
//! from `static_dir`.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Default broadcast group every connection joins
pub const DEFAULT_GROUP: &str = "global";

/// WebSocket server configuration
///
/// ```toml
/// [server]
/// host = "0.0.0.0"
/// port = 5000
/// static_dir = "client"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address
    /// Default: "0.0.0.0"
    pub host: String,

    /// Listen port (0 picks an ephemeral port)
    /// Default: 5000
    pub port: u16,

    /// Directory holding the bundled browser client
    /// Default: "client"
    pub static_dir: PathBuf,

    /// Broadcast group joined by every new connection
    /// Default: "global"
    pub group: String,

    /// Outbound frames buffered per connection before deliveries to it fail
    /// Default: 64
    pub client_buffer: usize,

    /// Interval between WebSocket pings
    /// Default: 25s
    #[serde(with = "humantime_serde")]
    pub heartbeat_interval: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 5000,
            static_dir: PathBuf::from("client"),
            group: DEFAULT_GROUP.into(),
            client_buffer: 64,
            heartbeat_interval: Duration::from_secs(25),
        }
    }
}

impl ServerConfig {
    /// `host:port` string suitable for `TcpListener::bind`
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_address(), "0.0.0.0:5000");
        assert_eq!(config.static_dir, PathBuf::from("client"));
        assert_eq!(config.group, DEFAULT_GROUP);
        assert_eq!(config.client_buffer, 64);
    }

    #[test]
    fn test_deserialize_partial() {
        let config: ServerConfig = toml::from_str("port = 0\nhost = \"127.0.0.1\"").unwrap();
        assert_eq!(config.bind_address(), "127.0.0.1:0");
        assert_eq!(config.heartbeat_interval, Duration::from_secs(25));
    }
}
