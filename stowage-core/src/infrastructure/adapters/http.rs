// stowage-core/src/infrastructure/adapters/http.rs

use async_trait::async_trait;
use serde_json::Value;
use std::time::Instant;
use tracing::{debug, instrument};

use crate::error::StowageError;
use crate::infrastructure::error::InfrastructureError;
use crate::ports::record_source::RecordSource;

const USER_AGENT: &str = concat!("stowage/", env!("CARGO_PKG_VERSION"));

/// Shared HTTP client. No retry and the client's default timeouts.
pub fn build_client() -> Result<reqwest::Client, InfrastructureError> {
    Ok(reqwest::Client::builder().user_agent(USER_AGENT).build()?)
}

/// Turns any non-2xx answer into `RemoteStatus`, keeping the body for the message.
pub(crate) async fn ensure_success(
    response: reqwest::Response,
) -> Result<reqwest::Response, InfrastructureError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let url = response.url().to_string();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<unreadable body>".to_string());
    Err(InfrastructureError::RemoteStatus {
        url,
        status: status.as_u16(),
        body,
    })
}

/// Appends percent-encoded path segments to a base endpoint such as
/// `https://storage.googleapis.com`.
pub(crate) fn endpoint_url(
    base: &str,
    segments: &[&str],
) -> Result<reqwest::Url, InfrastructureError> {
    let mut url = reqwest::Url::parse(base)
        .map_err(|e| InfrastructureError::ConfigError(format!("Invalid endpoint '{}': {}", base, e)))?;
    url.path_segments_mut()
        .map_err(|_| InfrastructureError::ConfigError(format!("Endpoint '{}' cannot be a base", base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// GETs a JSON document from a remote API.
pub struct HttpRecordSource {
    client: reqwest::Client,
}

impl HttpRecordSource {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RecordSource for HttpRecordSource {
    #[instrument(skip(self))]
    async fn fetch(&self, url: &str) -> Result<Value, StowageError> {
        let start = Instant::now();
        let response = self.client.get(url).send().await?;
        let response = ensure_success(response).await?;
        let bytes = response.bytes().await?;
        debug!(bytes = bytes.len(), elapsed = ?start.elapsed(), "Fetched remote payload");
        Ok(serde_json::from_slice(&bytes)?)
    }
}
