//! Notifier trait for sending messages to the recipient

use async_trait::async_trait;

/// Trait for sending notifications
#[async_trait]
pub trait Notifier: Send + Sync + std::fmt::Debug {
    /// Get the notifier type name (e.g. "telegram")
    fn type_name(&self) -> &str;

    /// Send a message to the configured recipient
    async fn send(&self, text: &str) -> crate::Result<()>;

    /// Send a message, logging any failure instead of returning it.
    ///
    /// Returns whether the message was accepted by the channel.
    async fn deliver(&self, text: &str) -> bool {
        match self.send(text).await {
            Ok(()) => {
                tracing::debug!("Message sent via '{}': {}", self.type_name(), text);
                true
            }
            Err(e) => {
                tracing::error!(
                    "Failed to send message via '{}': {} ({})",
                    self.type_name(),
                    text,
                    e
                );
                false
            }
        }
    }
}
