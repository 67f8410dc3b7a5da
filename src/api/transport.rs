/// Network transport
///
/// Everything that leaves the process goes through `Transport::get`. The real
/// implementation wraps a `reqwest::Client`; tests swap in an in-memory double.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::FetchError;

/// Read-only byte retrieval keyed by URL
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch the body at `url`, failing on any non-success status
    async fn get(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// HTTP transport backed by reqwest
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a transport with a per-request timeout
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self { client })
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self { client: Client::new() }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let transport_error = |e: reqwest::Error| FetchError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        };

        let response = self.client.get(url).send().await.map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(transport_error)?;
        Ok(body.to_vec())
    }
}
