use anyhow::Result;
use clap::Parser;
use tracing::{debug, Level};

mod config;
mod git;
mod monitor;
mod notifier;
mod tmux;
mod tracker;

use config::Cli;
use git::GitCli;
use monitor::Monitor;
use notifier::{DiscordWebhook, Notifier};
use tmux::TmuxClient;

/// Exit status for unusable configuration
const EXIT_CONFIG: i32 = 2;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = match Cli::parse().into_settings() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    // Initialize logging
    let level = if settings.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    // In dry-run the URL may be absent; the sender is never called then
    let webhook = DiscordWebhook::new(settings.webhook_url.clone().unwrap_or_default());
    let notifier = Notifier::new(GitCli::new(), webhook, settings.dry_run);
    let mut monitor = Monitor::new(TmuxClient::new(), notifier, &settings);

    tokio::select! {
        _ = monitor.run() => {}
        _ = tokio::signal::ctrl_c() => {
            debug!("Interrupted, shutting down");
        }
    }

    Ok(())
}
