//! Yandex Practicum homework status API client

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{Config, Credentials};
use crate::fetcher::StatusFetcher;
use crate::io::HttpClient;

/// Fetches homework statuses from the Practicum API
pub struct PracticumFetcher {
    endpoint: String,
    authorization: String,
    http: Arc<dyn HttpClient>,
}

impl std::fmt::Debug for PracticumFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PracticumFetcher")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl PracticumFetcher {
    pub fn new(config: &Config, credentials: &Credentials, http: Arc<dyn HttpClient>) -> Self {
        tracing::debug!("Created PracticumFetcher for {}", config.endpoint);

        Self {
            endpoint: config.endpoint.clone(),
            authorization: format!("OAuth {}", credentials.practicum_token),
            http,
        }
    }
}

#[async_trait]
impl StatusFetcher for PracticumFetcher {
    async fn fetch(&self, cursor: u64) -> crate::Result<serde_json::Value> {
        let from_date = cursor.to_string();
        tracing::debug!("Fetching statuses from_date={}", from_date);

        let response = self
            .http
            .get(
                &self.endpoint,
                &[("Authorization", self.authorization.as_str())],
                &[("from_date", from_date.as_str())],
            )
            .await?;

        if response.status != 200 {
            tracing::debug!(
                "Non-200 response from {}: status={}",
                self.endpoint,
                response.status
            );
            return Err(crate::WatcherError::UnexpectedStatus {
                status: response.status,
            });
        }

        serde_json::from_str(&response.body).map_err(|e| {
            crate::WatcherError::MalformedResponse(format!("body is not valid JSON: {}", e))
        })
    }
}
