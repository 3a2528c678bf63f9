//! Serve command - run the tweetcast server
//!
//! Loads credentials, opens the filter stream and hands everything to the
//! lifecycle controller until SIGINT or SIGTERM.

use std::future::Future;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};

use tweetcast_config::{Config, Credentials};
use tweetcast_connectors::TwitterStream;
use tweetcast_sources::SourceError;

use crate::lifecycle::Lifecycle;

/// Config files tried in order when `--config` is not given
const DEFAULT_CONFIG_PATHS: [&str; 2] = ["configs/config.toml", "config.toml"];

/// Load configuration
///
/// An explicit path must exist. Without one, the default paths are tried and
/// built-in defaults are used if none is present. Returns the path actually
/// loaded, if any.
pub fn load_config(path: Option<&Path>) -> Result<(Config, Option<PathBuf>)> {
    if let Some(path) = path {
        if !path.exists() {
            anyhow::bail!("config file not found: {}", path.display());
        }
        let config = Config::from_file(path).context("failed to load configuration")?;
        return Ok((config, Some(path.to_path_buf())));
    }

    for candidate in DEFAULT_CONFIG_PATHS.iter().map(PathBuf::from) {
        if candidate.exists() {
            let config = Config::from_file(&candidate).context("failed to load configuration")?;
            return Ok((config, Some(candidate)));
        }
    }

    Ok((Config::default(), None))
}

/// Run the serve command with an already loaded config
pub async fn run(config: Config, config_path: Option<PathBuf>) -> Result<()> {
    info!(
        version = env!("CARGO_PKG_VERSION"),
        platform = std::env::consts::OS,
        arch = std::env::consts::ARCH,
        config = %config_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(defaults)".to_string()),
        "tweetcast starting"
    );

    let credentials_file = config.global.credentials_file.clone();
    if let Err(e) = run_server(config).await {
        error!(error = %format!("{:#}", e), "server error");
        if credentials_rejected(&e) {
            warn!(
                credentials_file = %credentials_file.display(),
                "stream rejected the credentials, check the credentials file"
            );
        }
        return Err(e);
    }

    info!("tweetcast shutdown complete");
    Ok(())
}

async fn run_server(config: Config) -> Result<()> {
    // Install handlers before startup so an early signal is not lost
    let shutdown = shutdown_signal().context("failed to install signal handlers")?;

    let credentials = Credentials::from_file(&config.global.credentials_file)
        .context("failed to load stream credentials")?;
    let stream = TwitterStream::new(&credentials, &config.stream)
        .context("failed to build stream client")?;

    info!(api_url = stream.api_url(), "stream client ready");

    Lifecycle::new(config, stream).run(shutdown).await
}

/// Whether the stream refused to open because of bad credentials
fn credentials_rejected(err: &anyhow::Error) -> bool {
    err.chain()
        .filter_map(|cause| cause.downcast_ref::<SourceError>())
        .any(SourceError::is_auth_failure)
}

/// Resolve on the first SIGINT or SIGTERM
///
/// Handlers are registered when this is called, and a signal arriving before
/// the returned future is polled is buffered.
#[cfg(unix)]
fn shutdown_signal() -> Result<impl Future<Output = ()> + Send> {
    use signal::unix::{SignalKind, signal as unix_signal};

    let mut interrupt = unix_signal(SignalKind::interrupt())?;
    let mut terminate = unix_signal(SignalKind::terminate())?;

    Ok(async move {
        tokio::select! {
            _ = interrupt.recv() => info!("received SIGINT"),
            _ = terminate.recv() => info!("received SIGTERM"),
        }
    })
}

#[cfg(not(unix))]
fn shutdown_signal() -> Result<impl Future<Output = ()> + Send> {
    Ok(async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_explicit_missing_config_is_fatal() {
        let err = load_config(Some(Path::new("/nonexistent/tweetcast.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn test_explicit_config_is_loaded() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nport = 6001").unwrap();

        let (config, path) = load_config(Some(file.path())).unwrap();
        assert_eq!(config.server.port, 6001);
        assert_eq!(path.as_deref(), Some(file.path()));
    }

    #[test]
    fn test_invalid_config_is_fatal() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[global]\nqueue_size = 0").unwrap();

        assert!(load_config(Some(file.path())).is_err());
    }

    #[test]
    fn test_credentials_rejected() {
        use tweetcast_connectors::ConnectorError;

        let refused = SourceError::Connect {
            connector: "memory",
            source: ConnectorError::AuthFailed("HTTP 401: Unauthorized".into()),
        };
        let err = anyhow::Error::new(refused).context("failed to start event source");
        assert!(credentials_rejected(&err));

        let lost = SourceError::StreamFailed {
            attempts: 3,
            reason: "connection reset".into(),
        };
        let err = anyhow::Error::new(lost).context("event source failed");
        assert!(!credentials_rejected(&err));

        assert!(!credentials_rejected(&anyhow::anyhow!("bind failed")));
    }
}
