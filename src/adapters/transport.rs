//! HTTP transport for backend calls.

use std::time::Duration;

use async_trait::async_trait;

use super::BackendRequest;
use crate::error::GenerationError;

/// Longest error body echoed back in a transport error
const MAX_ERROR_BODY: usize = 512;

/// Sends a [`BackendRequest`] and returns the raw response body.
///
/// Implementations must fail with [`GenerationError::Transport`] on network
/// errors, timeouts, and non-2xx responses. No retries.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post_json(&self, request: &BackendRequest) -> Result<String, GenerationError>;
}

/// reqwest-backed transport with a bounded per-request timeout
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport whose calls fail after `timeout`
    pub fn new(timeout: Duration) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                GenerationError::Configuration(format!("Failed to build HTTP client: {}", e))
            })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_json(&self, request: &BackendRequest) -> Result<String, GenerationError> {
        let mut builder = self.client.post(&request.url).json(&request.body);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.send().await.map_err(|e| GenerationError::Transport {
            status: e.status().map(|s| s.as_u16()),
            message: if e.is_timeout() {
                format!("Request to {} timed out", request.url)
            } else {
                e.to_string()
            },
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| GenerationError::Transport {
            status: Some(status.as_u16()),
            message: format!("Failed to read response body: {}", e),
        })?;

        if !status.is_success() {
            return Err(GenerationError::Transport {
                status: Some(status.as_u16()),
                message: truncate(text.trim(), MAX_ERROR_BODY),
            });
        }

        Ok(text)
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let head: String = text.chars().take(max_chars).collect();
    format!("{}...", head)
}
