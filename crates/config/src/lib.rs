//! Tweetcast Configuration
//!
//! TOML-based configuration loading with defaults that reproduce the classic
//! single-process deployment: one track predicate, a 20-deep event queue and a
//! WebSocket server on `0.0.0.0:5000`.
//!
//! Stream credentials live in a separate JSON file (see [`Credentials`]) so the
//! TOML config can be committed without secrets.
//!
//! # Parsing
//!
//! ```
//! use tweetcast_config::Config;
//! use std::str::FromStr;
//!
//! let config = Config::from_str("[stream]\ntrack = [\"rust\"]").unwrap();
//! assert_eq!(config.stream.track, vec!["rust"]);
//! ```
//!
//! # Example Config
//!
//! ```toml
//! [global]
//! queue_size = 20
//! credentials_file = "settings.json"
//!
//! [server]
//! port = 5000
//! static_dir = "client"
//!
//! [stream]
//! track = ["rust", "tokio"]
//!
//! [metrics]
//! interval = "5s"
//! ```

mod credentials;
mod error;
mod global;
mod logging;
mod metrics;
mod server;
mod stream;
mod validation;

use std::fs;
use std::path::Path;
use std::str::FromStr;

pub use credentials::Credentials;
pub use error::{ConfigError, Result};
pub use global::GlobalConfig;
pub use logging::{DEFAULT_LOG_LEVEL, LogConfig, LogFormat, LogOutput};
pub use metrics::{MetricsConfig, MetricsFormat};
pub use server::{DEFAULT_GROUP, ServerConfig};
pub use stream::{DEFAULT_FILTER_URL, ReconnectConfig, StreamConfig};

use serde::Deserialize;

/// Main configuration structure
///
/// All sections are optional with sensible defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Global settings (queue depth, shutdown deadline, credentials path)
    pub global: GlobalConfig,

    /// Logging configuration
    pub log: LogConfig,

    /// Subscriber-facing WebSocket / static asset server
    pub server: ServerConfig,

    /// Upstream filter stream
    pub stream: StreamConfig,

    /// Throughput reporting
    pub metrics: MetricsConfig,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read, contains invalid TOML or fails
    /// validation.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::from_str(&contents)
    }

    /// Parse configuration from a TOML string
    ///
    /// Prefer using the `FromStr` trait implementation.
    fn parse(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s).map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
