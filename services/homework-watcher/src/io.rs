//! HTTP client abstraction for testability

use async_trait::async_trait;

/// HTTP response from a request
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Abstraction over HTTP client for dependency injection
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait HttpClient: Send + Sync {
    /// Send a GET request with extra headers and query parameters
    async fn get(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        query: &[(&str, &str)],
    ) -> crate::Result<HttpResponse>;

    /// Send a POST request with form-encoded body
    async fn post_form(&self, url: &str, params: &[(&str, &str)]) -> crate::Result<HttpResponse>;
}

/// Production HTTP client using reqwest
#[derive(Default)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        query: &[(&str, &str)],
    ) -> crate::Result<HttpResponse> {
        tracing::debug!("GET {} {:?}", url, query);
        let mut request = self.client.get(url).query(query);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = request
            .send()
            .await
            .map_err(|e| crate::WatcherError::Transport(format!("GET {} failed: {}", url, e)))?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            crate::WatcherError::Transport(format!("Reading response body: {}", e))
        })?;

        tracing::debug!("GET {} -> {} ({} bytes)", url, status, body.len());
        Ok(HttpResponse { status, body })
    }

    async fn post_form(&self, url: &str, params: &[(&str, &str)]) -> crate::Result<HttpResponse> {
        // The messaging URL embeds the bot token, so only the status is logged
        let response = self
            .client
            .post(url)
            .form(params)
            .send()
            .await
            .map_err(|e| {
                crate::WatcherError::Transport(format!("POST failed: {}", e.without_url()))
            })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            crate::WatcherError::Transport(format!("Reading response body: {}", e.without_url()))
        })?;

        tracing::debug!("POST -> {} ({} bytes)", status, body.len());
        Ok(HttpResponse { status, body })
    }
}
