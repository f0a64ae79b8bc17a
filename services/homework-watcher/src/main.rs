//! Homework watcher CLI
//!
//! Command-line entry point for the homework review status watcher.

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::Parser;
use homework_watcher::{load_config, Config, Credentials};
use tracing::Level;

#[derive(Parser)]
#[command(name = "homework-watcher")]
#[command(about = "Watches homework review status and notifies via Telegram")]
#[command(version)]
#[command(
    after_help = "A sample config is installed at /etc/homework-watcher/config.json and the \
                  credential template at /etc/homework-watcher/env.example (pkg/ in the source tree)."
)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Practicum API token
    #[arg(long, env = "PRACTICUM_TOKEN", hide_env_values = true)]
    practicum_token: Option<String>,

    /// Telegram bot token
    #[arg(long, env = "TELEGRAM_TOKEN", hide_env_values = true)]
    telegram_token: Option<String>,

    /// Telegram chat to notify
    #[arg(long, env = "TELEGRAM_CHAT_ID")]
    telegram_chat_id: Option<String>,

    /// Initial cursor in unix seconds (defaults to now)
    #[arg(long)]
    from_date: Option<u64>,

    /// Poll interval in seconds (overrides config file)
    #[arg(long)]
    poll_interval_seconds: Option<u64>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: Level,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Must run before parsing so clap sees variables from .env
    let dotenv = dotenvy::dotenv();

    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .init();

    match &dotenv {
        Ok(path) => tracing::debug!("Loaded environment from {:?}", path),
        Err(e) if e.not_found() => tracing::debug!("No .env file found"),
        Err(e) => tracing::warn!("Failed to load .env file: {}", e),
    }

    tracing::debug!(
        "Parsed command line arguments: config={:?}, from_date={:?}, poll_interval_seconds={:?}, log_level={:?}",
        args.config,
        args.from_date,
        args.poll_interval_seconds,
        args.log_level
    );

    let mut config = if let Some(config_path) = &args.config {
        tracing::debug!("Loading configuration from {:?}", config_path);
        load_config(config_path)?
    } else {
        tracing::debug!("Using default configuration");
        Config::default()
    };

    if let Some(poll_interval_seconds) = args.poll_interval_seconds {
        config.poll_interval_seconds = poll_interval_seconds;
    }

    let credentials = Credentials::resolve(
        args.practicum_token,
        args.telegram_token,
        args.telegram_chat_id,
    )
    .inspect_err(|e| tracing::error!("{}. Refusing to start.", e))?;

    let start_cursor = args.from_date.unwrap_or_else(now_epoch_secs);

    tracing::info!("Starting homework watcher");
    homework_watcher::run(config, credentials, start_cursor).await?;

    Ok(())
}

fn now_epoch_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
