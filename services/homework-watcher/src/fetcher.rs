//! Status fetcher trait

use async_trait::async_trait;

/// Trait for querying the remote status API
#[async_trait]
pub trait StatusFetcher: Send + Sync + std::fmt::Debug {
    /// Fetch statuses changed since `cursor` (unix seconds).
    ///
    /// Returns the decoded body verbatim; shape checks belong to
    /// [`crate::response::validate`]. No retry is attempted here.
    async fn fetch(&self, cursor: u64) -> crate::Result<serde_json::Value>;
}
