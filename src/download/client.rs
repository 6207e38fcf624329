//! HTTP client wrapper shared by the file worker and list fetching.
//!
//! This module provides the `HttpClient` struct which issues streaming GET
//! requests with timeout configuration and status checking.

use std::time::Duration;

use reqwest::Client;
use tracing::debug;
use url::Url;

use super::constants::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};
use super::error::DownloadError;

/// User-Agent sent with every request.
pub const USER_AGENT: &str = concat!("dlist/", env!("CARGO_PKG_VERSION"));

/// HTTP client for streaming downloads.
///
/// Designed to be created once and reused, taking advantage of connection
/// pooling. Cloning is cheap.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient {
    /// Creates a new HTTP client with default timeouts.
    ///
    /// Default configuration:
    /// - Connect timeout: 30 seconds
    /// - Read timeout: 5 minutes (for large files)
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        Self::with_timeouts(CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS)
            .expect("failed to build HTTP client with static configuration")
    }

    /// Creates a new HTTP client with explicit timeout values.
    ///
    /// # Errors
    ///
    /// Returns the builder error if the TLS backend cannot be initialised.
    pub fn with_timeouts(
        connect_timeout_secs: u64,
        read_timeout_secs: u64,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .read_timeout(Duration::from_secs(read_timeout_secs))
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }

    /// Sends a GET request and checks the response status.
    ///
    /// The body is not read; callers stream it.
    ///
    /// # Errors
    ///
    /// Returns `DownloadError` if:
    /// - The URL is invalid
    /// - The request fails (network error, timeout)
    /// - The server returns a non-success status
    pub async fn get(&self, url: &str) -> Result<reqwest::Response, DownloadError> {
        let parsed = Url::parse(url).map_err(|_| DownloadError::invalid_url(url))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(DownloadError::invalid_url(url));
        }

        debug!(url, "sending GET request");
        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| DownloadError::network(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::http_status(url, status.as_u16()));
        }
        Ok(response)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_rejects_invalid_url() {
        let client = HttpClient::new();
        let err = client.get("not a url").await.unwrap_err();
        assert!(matches!(err, DownloadError::InvalidUrl { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn test_get_rejects_non_http_scheme() {
        let client = HttpClient::new();
        let err = client.get("ftp://example.com/file.zip").await.unwrap_err();
        assert!(matches!(err, DownloadError::InvalidUrl { .. }), "got {err:?}");
    }

    #[test]
    fn test_user_agent_names_the_tool() {
        assert!(USER_AGENT.starts_with("dlist/"));
    }
}
