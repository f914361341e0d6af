//! HTTP client for the unreliable upstream dependency.

use axum::body::Body;
use axum::http::Request;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use serde_json::Value;
use std::time::Duration;
use url::Url;

use crate::config::UpstreamConfig;
use crate::error::TransientError;

/// Upstream bodies are small JSON documents; anything bigger is a fault.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Client for a single upstream endpoint, bounded by a per-attempt timeout.
///
/// Every call is one GET to the configured data path. A stalled upstream is
/// cut off at the deadline so no caller blocks indefinitely; status, timeout
/// and transport failures all map to the transient error class that retry
/// policies treat as retryable.
#[derive(Clone)]
pub struct UpstreamClient {
    client: Client<HttpConnector, Body>,
    data_url: Url,
    timeout: Duration,
}

impl UpstreamClient {
    pub fn new(data_url: Url, timeout: Duration) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Self {
            client,
            data_url,
            timeout,
        }
    }

    /// Build from config. The base URL is validated at config load; joining
    /// the data path onto it cannot fail afterwards.
    pub fn from_config(config: &UpstreamConfig) -> Result<Self, url::ParseError> {
        let base: Url = config.base_url.parse()?;
        let data_url = base.join(&config.data_path)?;
        Ok(Self::new(
            data_url,
            Duration::from_secs(config.request_timeout_secs),
        ))
    }

    /// Same endpoint, different per-attempt deadline. The fallback-cache
    /// path uses a shorter one than the retry paths.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        Self {
            client: self.client.clone(),
            data_url: self.data_url.clone(),
            timeout,
        }
    }

    /// Perform one upstream call and parse the JSON body.
    pub async fn fetch(&self) -> Result<Value, TransientError> {
        let request = Request::builder()
            .method("GET")
            .uri(self.data_url.as_str())
            .header("user-agent", "upstream-guard")
            .body(Body::empty())
            .map_err(|e| TransientError::Connect(e.to_string()))?;

        let response = match tokio::time::timeout(self.timeout, self.client.request(request)).await
        {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                tracing::debug!(error = %e, "upstream connection failed");
                return Err(TransientError::Connect(e.to_string()));
            }
            Err(_) => {
                tracing::debug!(timeout = ?self.timeout, "upstream call timed out");
                return Err(TransientError::Timeout(self.timeout));
            }
        };

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(status = %status, "upstream returned non-success status");
            return Err(TransientError::Status(status));
        }

        let bytes = axum::body::to_bytes(Body::new(response.into_body()), MAX_BODY_BYTES)
            .await
            .map_err(|e| TransientError::Connect(format!("failed to read upstream body: {e}")))?;

        serde_json::from_slice(&bytes)
            .map_err(|e| TransientError::Connect(format!("invalid JSON from upstream: {e}")))
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}
