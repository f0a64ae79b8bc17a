//! Watcher: the poll, detect, notify loop
//!
//! Each cycle fetches statuses at the current cursor, validates the response,
//! renders the most recent record and hands the message to the notifier unless
//! it repeats the previous one. Every error is classified here and nowhere
//! else; after the cycle the watcher always rests for the poll interval.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::fetcher::StatusFetcher;
use crate::notifier::Notifier;
use crate::response;
use crate::verdict::VerdictTable;
use crate::WatcherError;

/// Prefix of every failure report sent to the recipient
pub const FAILURE_PREFIX: &str = "Сбой в работе программы";

/// Loop context carried from one cycle to the next
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchState {
    /// `from_date` for the next fetch; never decreases
    pub cursor: u64,
    /// Text of the last message handed to the notifier
    pub last_message: Option<String>,
}

impl WatchState {
    pub fn new(cursor: u64) -> Self {
        Self {
            cursor,
            last_message: None,
        }
    }
}

/// How an error is surfaced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Logged only
    Silent,
    /// Logged and reported to the recipient
    Reportable,
}

/// Classify an error raised inside a cycle
pub fn classify(error: &WatcherError) -> ErrorClass {
    match error {
        WatcherError::EmptyResponse(_) => ErrorClass::Silent,
        WatcherError::Config(_)
        | WatcherError::Transport(_)
        | WatcherError::UnexpectedStatus { .. }
        | WatcherError::MalformedResponse(_)
        | WatcherError::MissingField(_)
        | WatcherError::UnknownStatus(_)
        | WatcherError::Notifier(_)
        | WatcherError::Json(_) => ErrorClass::Reportable,
    }
}

/// Text sent to the recipient for a reportable error
pub fn failure_message(error: &WatcherError) -> String {
    format!("{}: {}", FAILURE_PREFIX, error)
}

/// What a single cycle did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The response held no records
    NoNewStatus,
    /// A new status message was handed to the notifier
    StatusSent { delivered: bool },
    /// The status message matched the previous message
    StatusUnchanged,
    /// A silent error was logged
    FailureSilent,
    /// A failure report was handed to the notifier
    FailureReported { delivered: bool },
    /// The failure report matched the previous message
    FailureUnchanged,
}

/// Polls one status source and notifies on changes
pub struct Watcher {
    fetcher: Arc<dyn StatusFetcher>,
    notifier: Arc<dyn Notifier>,
    verdicts: VerdictTable,
    greeting: String,
    interval: Duration,
    cancel: CancellationToken,
}

impl std::fmt::Debug for Watcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Watcher")
            .field("fetcher", &self.fetcher)
            .field("notifier", &self.notifier)
            .field("interval", &self.interval)
            .finish()
    }
}

impl Watcher {
    pub fn new(
        fetcher: Arc<dyn StatusFetcher>,
        notifier: Arc<dyn Notifier>,
        config: &Config,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            fetcher,
            notifier,
            verdicts: VerdictTable::new(config.verdicts.clone()),
            greeting: config.greeting.clone(),
            interval: config.poll_interval(),
            cancel,
        }
    }

    /// Send the startup greeting. It does not take part in de-duplication.
    pub async fn greet(&self) -> bool {
        tracing::info!("Sending greeting");
        self.notifier.deliver(&self.greeting).await
    }

    /// Greet, then cycle until the cancellation token fires.
    ///
    /// Cancellation also abandons a cycle in flight, in which case the
    /// context from before that cycle is returned.
    pub async fn run(&self, mut state: WatchState) -> WatchState {
        self.greet().await;

        loop {
            let (next, outcome) = tokio::select! {
                result = self.run_cycle(state.clone()) => result,
                _ = self.cancel.cancelled() => {
                    tracing::debug!("Watch loop cancelled during a cycle");
                    break;
                }
            };
            state = next;
            tracing::debug!("Cycle finished: {:?}, cursor={}", outcome, state.cursor);

            if !self.rest().await {
                break;
            }
        }

        state
    }

    /// Run one cycle. Errors never escape: they are classified and reported
    /// here, so the caller can rest unconditionally afterwards.
    pub async fn run_cycle(&self, mut state: WatchState) -> (WatchState, CycleOutcome) {
        let outcome = match self.check(&mut state).await {
            Ok(outcome) => outcome,
            Err(error) => self.handle_error(&mut state, error).await,
        };
        (state, outcome)
    }

    async fn check(&self, state: &mut WatchState) -> crate::Result<CycleOutcome> {
        let raw = self.fetcher.fetch(state.cursor).await?;
        let validated = response::validate(&raw)?;

        let outcome = match validated.records.first() {
            Some(record) => {
                let message = self.verdicts.render(record)?;
                match self.notify_if_changed(state, message).await {
                    Some(delivered) => {
                        tracing::info!("Homework status changed, message handed to notifier");
                        CycleOutcome::StatusSent { delivered }
                    }
                    None => {
                        tracing::debug!("Status message unchanged, not sending");
                        CycleOutcome::StatusUnchanged
                    }
                }
            }
            None => {
                tracing::info!("No new status since {}", state.cursor);
                CycleOutcome::NoNewStatus
            }
        };

        if let Some(next_cursor) = validated.next_cursor {
            if next_cursor < state.cursor {
                tracing::warn!(
                    "Server reported current_date {} behind cursor {}, keeping cursor",
                    next_cursor,
                    state.cursor
                );
            }
            state.cursor = state.cursor.max(next_cursor);
        }

        Ok(outcome)
    }

    async fn handle_error(&self, state: &mut WatchState, error: WatcherError) -> CycleOutcome {
        match classify(&error) {
            ErrorClass::Silent => {
                tracing::warn!("{}", error);
                CycleOutcome::FailureSilent
            }
            ErrorClass::Reportable => {
                let message = failure_message(&error);
                tracing::error!("{}", message);
                match self.notify_if_changed(state, message).await {
                    Some(delivered) => CycleOutcome::FailureReported { delivered },
                    None => CycleOutcome::FailureUnchanged,
                }
            }
        }
    }

    /// Deliver `message` unless it repeats the last one. Returns `None` when
    /// suppressed, otherwise whether the notifier accepted it.
    async fn notify_if_changed(&self, state: &mut WatchState, message: String) -> Option<bool> {
        if state.last_message.as_deref() == Some(message.as_str()) {
            return None;
        }

        let delivered = self.notifier.deliver(&message).await;
        state.last_message = Some(message);
        Some(delivered)
    }

    /// Sleep for the poll interval. Returns false if cancelled meanwhile.
    async fn rest(&self) -> bool {
        tokio::select! {
            _ = tokio::time::sleep(self.interval) => true,
            _ = self.cancel.cancelled() => {
                tracing::debug!("Watch loop cancelled");
                false
            }
        }
    }
}
