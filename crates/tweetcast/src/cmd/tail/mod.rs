//! Tail command - print tweets from a running server
//!
//! Connects to the server's WebSocket endpoint like a browser client would
//! and prints every `tweet` frame it receives.

mod client;
mod output;

use std::io::IsTerminal;

use anyhow::Result;
use clap::Args;
use tracing_subscriber::EnvFilter;

use client::{ServerFrame, TailClient};
use output::Formatter;

/// Tail command arguments
#[derive(Args, Debug)]
pub struct TailArgs {
    /// WebSocket endpoint of a running server
    #[arg(short, long, default_value = "ws://127.0.0.1:5000/ws")]
    url: String,

    /// Extra group to join (can be repeated)
    #[arg(short, long = "group", value_name = "NAME")]
    groups: Vec<String>,

    /// Print raw tweet payloads as JSON lines
    #[arg(long)]
    json: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Verbose output (show debug info)
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode (suppress connection messages)
    #[arg(short, long)]
    quiet: bool,
}

/// Run the tail command
pub async fn run(args: TailArgs) -> Result<()> {
    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else if args.quiet {
        EnvFilter::new("error")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();

    let use_color = std::io::stdout().is_terminal() && !args.no_color;
    let formatter = Formatter::new(args.json).with_color(use_color);

    if !args.quiet {
        tracing::info!(url = %args.url, "connecting to server");
    }

    let mut client = TailClient::connect(&args.url).await?;

    for group in &args.groups {
        client.join(group).await?;
        tracing::debug!(group = %group, "joined group");
    }

    if !args.quiet {
        tracing::info!("streaming tweets (Ctrl+C to stop)");
    }

    loop {
        tokio::select! {
            result = client.recv() => {
                match result {
                    Ok(Some(ServerFrame::Tweet(data))) => {
                        if let Some(line) = formatter.format(&data) {
                            println!("{line}");
                        }
                    }
                    Ok(Some(ServerFrame::Other(event))) => {
                        tracing::debug!(event = %event, "ignoring frame");
                    }
                    Ok(None) => {
                        if !args.quiet {
                            tracing::info!("connection closed");
                        }
                        break;
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "receive error");
                        break;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                if !args.quiet {
                    tracing::info!("interrupted, shutting down");
                }
                client.close().await;
                break;
            }
        }
    }

    Ok(())
}
