//! Global configuration settings
//!
//! Settings shared by the whole pipeline rather than a single component.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Global configuration that applies to all components
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    /// Capacity of the bounded queue between the event source and the
    /// broadcaster. A full queue blocks the source.
    /// Default: 20
    pub queue_size: usize,

    /// Deadline applied to each teardown step during shutdown
    /// Default: 10s
    #[serde(with = "humantime_serde")]
    pub shutdown_timeout: Duration,

    /// Path to the JSON stream credentials file
    /// Default: "settings.json"
    pub credentials_file: PathBuf,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            queue_size: 20,
            shutdown_timeout: Duration::from_secs(10),
            credentials_file: PathBuf::from("settings.json"),
        }
    }
}
