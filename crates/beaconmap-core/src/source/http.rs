//! Sessions downloaded from a web endpoint
//!
//! The endpoint takes the session name as a `filename` query parameter and
//! answers with the raw session text.

use tracing::debug;

use super::{validate_name, SessionSource};
use crate::error::FetchError;

/// Downloads `GET <endpoint>?filename=<name>`
#[derive(Debug, Clone)]
pub struct HttpSource {
    /// HTTP client for requests
    client: reqwest::Client,
    /// Download endpoint
    endpoint: String,
}

impl HttpSource {
    /// Create a source for a download endpoint
    pub fn new(endpoint: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(concat!("beaconmap/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self::with_client(client, endpoint)
    }

    /// Create a source reusing an existing client (cookies, proxies, timeouts)
    pub fn with_client(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    /// Download endpoint
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl SessionSource for HttpSource {
    async fn fetch(&self, name: &str) -> Result<String, FetchError> {
        validate_name(name)?;
        debug!(endpoint = %self.endpoint, name, "downloading session");

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("filename", name.trim())])
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_error() {
        // Port 9 (discard) on localhost is closed on CI machines
        let source = HttpSource::new("http://127.0.0.1:9/profile/download_session");
        match source.fetch("session.csv").await {
            Err(FetchError::Transport(_)) => {}
            other => panic!("Expected transport error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_invalid_name_never_hits_network() {
        let source = HttpSource::new("http://127.0.0.1:9/");
        assert!(matches!(
            source.fetch("").await,
            Err(FetchError::InvalidName(_))
        ));
    }
}
