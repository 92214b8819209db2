//! HTTP plumbing shared by both provider clients.

use std::time::Duration;

use super::config::LlmTimeouts;
use super::types::LlmError;

/// A `reqwest` client with the configured request and connect timeouts.
pub(crate) fn client(timeouts: LlmTimeouts) -> Result<reqwest::Client, LlmError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeouts.request_secs))
        .connect_timeout(Duration::from_secs(timeouts.connect_secs))
        .build()
        .map_err(|e| LlmError::HttpClientBuild(e.to_string()))
}

/// Send `request` and return the body text of a 200 response.
///
/// Any other status becomes [`LlmError::ApiResponse`] carrying the body so
/// callers can surface the provider's message.
pub(crate) async fn send(request: reqwest::RequestBuilder) -> Result<String, LlmError> {
    let response = request
        .send()
        .await
        .map_err(|e| LlmError::ApiRequest(e.to_string()))?;
    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .map_err(|e| LlmError::ApiRequest(e.to_string()))?;
    if status == 200 { Ok(body) } else { Err(LlmError::ApiResponse { status, body }) }
}
