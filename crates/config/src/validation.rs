//! Configuration validation
//!
//! Catches values that would otherwise surface as hangs or panics at runtime:
//! - Zero-capacity queues and client buffers
//! - Zero shutdown timeout
//! - Empty track predicate
//! - Zero sampling window
//! - Reconnect delays out of order

use crate::Config;
use crate::error::{ConfigError, Result};

/// Validate the entire configuration
pub fn validate_config(config: &Config) -> Result<()> {
    validate_global(config)?;
    validate_log(config)?;
    validate_server(config)?;
    validate_stream(config)?;
    validate_metrics(config)?;
    Ok(())
}

fn validate_global(config: &Config) -> Result<()> {
    if config.global.queue_size == 0 {
        return Err(ConfigError::invalid_value(
            "global",
            "global",
            "queue_size",
            "must be greater than 0",
        ));
    }

    // A zero budget would abort the broadcaster before it drains
    if config.global.shutdown_timeout.is_zero() {
        return Err(ConfigError::invalid_value(
            "global",
            "global",
            "shutdown_timeout",
            "must be greater than 0",
        ));
    }
    Ok(())
}

fn validate_log(config: &Config) -> Result<()> {
    if config.log.level.trim().is_empty() {
        return Err(ConfigError::missing_field("log", "log", "level"));
    }
    Ok(())
}

fn validate_server(config: &Config) -> Result<()> {
    let server = &config.server;

    if server.client_buffer == 0 {
        return Err(ConfigError::invalid_value(
            "server",
            server.bind_address(),
            "client_buffer",
            "must be greater than 0",
        ));
    }

    if server.group.trim().is_empty() {
        return Err(ConfigError::missing_field(
            "server",
            server.bind_address(),
            "group",
        ));
    }

    if server.heartbeat_interval.is_zero() {
        return Err(ConfigError::invalid_value(
            "server",
            server.bind_address(),
            "heartbeat_interval",
            "must be greater than 0",
        ));
    }

    Ok(())
}

fn validate_stream(config: &Config) -> Result<()> {
    let stream = &config.stream;

    if stream.track.is_empty() {
        return Err(ConfigError::missing_field("stream", "stream", "track"));
    }

    if let Some(i) = stream.track.iter().position(|t| t.trim().is_empty()) {
        return Err(ConfigError::invalid_value(
            "stream",
            "stream",
            "track",
            format!("term {} is blank", i),
        ));
    }

    if stream.api_url.trim().is_empty() {
        return Err(ConfigError::missing_field("stream", "stream", "api_url"));
    }

    let reconnect = &stream.reconnect;
    if reconnect.base_delay > reconnect.max_delay {
        return Err(ConfigError::invalid_value(
            "stream",
            "reconnect",
            "base_delay",
            format!(
                "{:?} exceeds max_delay {:?}",
                reconnect.base_delay, reconnect.max_delay
            ),
        ));
    }

    Ok(())
}

fn validate_metrics(config: &Config) -> Result<()> {
    if config.metrics.enabled && config.metrics.interval.is_zero() {
        return Err(ConfigError::invalid_value(
            "metrics",
            "metrics",
            "interval",
            "must be greater than 0",
        ));
    }
    Ok(())
}
