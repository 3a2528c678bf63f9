//! Upstream filter stream configuration

use std::time::Duration;

use serde::Deserialize;

/// Default public filter stream endpoint
pub const DEFAULT_FILTER_URL: &str = "https://stream.twitter.com/1.1/statuses/filter.json";

/// Filter stream configuration
///
/// ```toml
/// [stream]
/// track = ["rust"]
///
/// [stream.reconnect]
/// max_retries = 5
/// base_delay = "1s"
/// max_delay = "60s"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Track terms for the filter predicate
    /// Default: ["trump"]
    pub track: Vec<String>,

    /// Filter endpoint URL
    pub api_url: String,

    /// Ask the stream to deliver stall warnings
    /// Default: true
    pub stall_warnings: bool,

    /// Connect timeout for each stream attempt
    /// Default: 30s
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,

    /// Reconnect behavior after the stream fails mid-run
    pub reconnect: ReconnectConfig,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            track: vec!["trump".into()],
            api_url: DEFAULT_FILTER_URL.into(),
            stall_warnings: true,
            timeout: Duration::from_secs(30),
            reconnect: ReconnectConfig::default(),
        }
    }
}

/// Reconnect policy settings
///
/// `max_retries = 0` stops the pipeline on the first mid-run failure.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReconnectConfig {
    /// Consecutive reconnect attempts before giving up
    /// Default: 5
    pub max_retries: u32,

    /// Delay before the first reconnect; doubles on every attempt
    /// Default: 1s
    #[serde(with = "humantime_serde")]
    pub base_delay: Duration,

    /// Upper bound on the reconnect delay
    /// Default: 60s
    #[serde(with = "humantime_serde")]
    pub max_delay: Duration,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
        }
    }
}
