use serde::Deserialize;
use tracing::{info, warn};
use voxdemo_core::{VoxdemoError, VoxdemoResult};

const DEFAULT_BASE_URL: &str = "https://api.retellai.com";

/// Direct client for the provider REST API (legacy demo path).
///
/// This path puts the provider secret in the calling process and is kept only
/// for demos without a deployed proxy — insecure by construction, as the
/// stored key is plaintext. The recommended path is [`crate::ProxyClient`].
pub struct ProviderClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

/// Response body of `POST /v2/create-web-call`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateWebCallResponse {
    /// Short-lived credential for the web client.
    pub access_token: String,
    /// Provider-side identifier for the call.
    pub call_id: String,
}

impl ProviderClient {
    /// Creates a client using the default provider endpoint.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Creates a client against a custom endpoint (tests, regional hosts).
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into(),
        }
    }

    /// `POST /v2/create-web-call` with `{agent_id}`.
    pub async fn create_web_call(&self, agent_id: &str) -> VoxdemoResult<CreateWebCallResponse> {
        let url = format!("{}/v2/create-web-call", self.base_url.trim_end_matches('/'));

        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({ "agent_id": agent_id }))
            .send()
            .await
            .map_err(|e| VoxdemoError::Provider(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(status = %status, "provider rejected create-web-call");
            return Err(VoxdemoError::Provider(format!(
                "Provider API error: {} - {}",
                status.as_u16(),
                body
            )));
        }

        let body: CreateWebCallResponse = resp
            .json()
            .await
            .map_err(|e| VoxdemoError::Provider(format!("malformed create-web-call body: {e}")))?;

        info!(call_id = %body.call_id, "web call created");
        Ok(body)
    }

    /// `POST /v2/stop-web-call` with `{call_id}`.
    pub async fn stop_web_call(&self, call_id: &str) -> VoxdemoResult<()> {
        let url = format!("{}/v2/stop-web-call", self.base_url.trim_end_matches('/'));

        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({ "call_id": call_id }))
            .send()
            .await
            .map_err(|e| VoxdemoError::Provider(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(VoxdemoError::Provider(format!(
                "Provider API error: {} - {}",
                status.as_u16(),
                body
            )));
        }

        Ok(())
    }
}
