//! Homework watcher - homework review status notifications
//!
//! Polls the Practicum homework status API, detects status changes, and sends
//! them to a Telegram chat.

pub mod config;
pub mod error;
pub mod fetcher;
pub mod io;
pub mod notifier;
pub mod practicum;
pub mod response;
pub mod telegram;
pub mod verdict;
pub mod watcher;

pub use config::{load_config, Config, Credentials};
pub use error::{Result, WatcherError};

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::io::ReqwestHttpClient;
use crate::practicum::PracticumFetcher;
use crate::telegram::TelegramNotifier;
use crate::watcher::{WatchState, Watcher};

/// Run the watcher until Ctrl-C, starting at `start_cursor`
pub async fn run(config: Config, credentials: Credentials, start_cursor: u64) -> Result<()> {
    let http: Arc<dyn io::HttpClient> = Arc::new(ReqwestHttpClient::new());
    let cancel = CancellationToken::new();

    let fetcher = Arc::new(PracticumFetcher::new(
        &config,
        &credentials,
        Arc::clone(&http),
    ));
    let notifier = Arc::new(TelegramNotifier::new(
        &config,
        &credentials,
        Arc::clone(&http),
    ));
    let watcher = Watcher::new(fetcher, notifier, &config, cancel.clone());

    // Setup shutdown handler
    let cancel_for_signal = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Shutdown signal received");
                cancel_for_signal.cancel();
            }
            Err(e) => tracing::error!("Failed to listen for ctrl-c: {}", e),
        }
    });

    tracing::info!(
        "Homework watcher started, polling every {}s from {}",
        config.poll_interval_seconds,
        start_cursor
    );

    let state = watcher.run(WatchState::new(start_cursor)).await;

    tracing::info!("Homework watcher stopped at cursor {}", state.cursor);
    Ok(())
}
