//! Tweetcast - live tweet fan-out server
//!
//! # Usage
//!
//! ```bash
//! # Run the server (default)
//! tweetcast
//! tweetcast --config configs/config.toml
//!
//! # Print tweets from a running server
//! tweetcast tail
//! tweetcast tail --url ws://localhost:5000/ws --json
//! ```

mod cmd;
mod lifecycle;

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use tweetcast_config::{LogConfig, LogFormat, LogOutput};

/// Tweetcast - live tweet fan-out server
#[derive(Parser, Debug)]
#[command(name = "tweetcast")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to configuration file (error if specified but not found)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error). Overrides config file.
    #[arg(short, long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the server (default)
    Serve,

    /// Print tweets from a running server
    Tail(cmd::tail::TailArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Command::Tail(args)) => {
            // Tail initializes its own logging
            cmd::tail::run(args).await
        }
        Some(Command::Serve) | None => serve(cli.config, cli.log_level.as_deref()).await,
    }
}

async fn serve(config_path: Option<PathBuf>, log_level: Option<&str>) -> Result<()> {
    let (config, loaded_from) = cmd::serve::load_config(config_path.as_deref())?;
    let level = resolve_log_level(log_level, &config.log);
    init_logging(&level, &config.log)?;
    cmd::serve::run(config, loaded_from).await
}

/// Resolve the filter directive: CLI flag > config file
fn resolve_log_level(cli_level: Option<&str>, config: &LogConfig) -> String {
    match cli_level {
        Some(level) => level.to_string(),
        None => config.level.clone(),
    }
}

/// Initialize the tracing subscriber for logging
fn init_logging(level: &str, config: &LogConfig) -> Result<()> {
    let filter = EnvFilter::try_new(level)
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|e| anyhow::anyhow!("invalid log level: {}", e))?;

    let writer = match &config.output {
        LogOutput::Stdout => BoxMakeWriter::new(std::io::stdout),
        LogOutput::Stderr => BoxMakeWriter::new(std::io::stderr),
        LogOutput::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            BoxMakeWriter::new(Mutex::new(file))
        }
    };

    let registry = tracing_subscriber::registry().with(filter);
    match config.format {
        LogFormat::Console => registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_ansi(config.use_color())
                    .with_writer(writer),
            )
            .init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_target(true).with_writer(writer))
            .init(),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_level_overrides_config() {
        let config = LogConfig {
            level: "warn,tweetcast_tap=debug".into(),
            ..Default::default()
        };
        assert_eq!(resolve_log_level(Some("debug"), &config), "debug");
        assert_eq!(resolve_log_level(None, &config), "warn,tweetcast_tap=debug");
    }

    #[test]
    fn test_cli_parses_default_serve() {
        let cli = Cli::try_parse_from(["tweetcast", "--config", "x.toml"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
    }

    #[test]
    fn test_cli_parses_serve_with_global_config() {
        let cli = Cli::try_parse_from(["tweetcast", "serve", "-c", "x.toml"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Serve)));
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
    }

    #[test]
    fn test_cli_parses_tail() {
        let cli = Cli::try_parse_from(["tweetcast", "tail", "--json", "-g", "rust"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Tail(_))));
    }
}
