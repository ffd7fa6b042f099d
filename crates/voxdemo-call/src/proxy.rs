use serde::Deserialize;
use tracing::{debug, error};
use voxdemo_core::{VoxdemoError, VoxdemoResult};

/// Token response from the backend call proxy.
#[derive(Debug, Clone)]
pub struct WebCallResponse {
    /// Provider-side identifier for the call.
    pub call_id: String,
    /// Short-lived credential authorizing this call session.
    pub access_token: String,
}

#[derive(Deserialize)]
struct RawWebCallResponse {
    #[serde(default)]
    call_id: Option<String>,
    #[serde(default)]
    access_token: Option<String>,
}

/// Client for the backend call proxy.
///
/// The proxy holds the real provider secret; this client only ever sends
/// `{action, agentId}` / `{action, callId}` bodies and never sees a key.
pub struct ProxyClient {
    http: reqwest::Client,
    base_url: String,
}

impl ProxyClient {
    /// Creates a client targeting `base_url` (no trailing slash needed).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn call_url(&self) -> String {
        format!("{}/call", self.base_url.trim_end_matches('/'))
    }

    /// Requests a new web call for `agent_id`, returning the call id and
    /// access token. Any transport failure, non-2xx status, or body missing
    /// either field is an error; no retry is attempted.
    pub async fn start_call(&self, agent_id: &str) -> VoxdemoResult<WebCallResponse> {
        debug!(agent_id = %agent_id, "requesting access token from call proxy");

        let resp = self
            .http
            .post(self.call_url())
            .json(&serde_json::json!({
                "action": "start-call",
                "agentId": agent_id,
            }))
            .send()
            .await
            .map_err(|e| VoxdemoError::Proxy(format!("Failed to start call: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            error!(status = %status, "call proxy rejected start-call");
            return Err(VoxdemoError::Proxy(format!(
                "Failed to start call: {status} {body}"
            )));
        }

        let raw: RawWebCallResponse = resp
            .json()
            .await
            .map_err(|_| VoxdemoError::Proxy("Invalid response from backend".into()))?;

        match (raw.call_id, raw.access_token) {
            (Some(call_id), Some(access_token))
                if !call_id.is_empty() && !access_token.is_empty() =>
            {
                Ok(WebCallResponse {
                    call_id,
                    access_token,
                })
            }
            _ => {
                error!("call proxy returned a body without call_id/access_token");
                Err(VoxdemoError::Proxy("Invalid response from backend".into()))
            }
        }
    }

    /// Asks the proxy to end an existing call. The coordinator does not use
    /// this in the normal teardown path (transport disconnect is the cleanup
    /// signal); it exists for callers that track the call id themselves.
    pub async fn end_call(&self, call_id: &str) -> VoxdemoResult<()> {
        let resp = self
            .http
            .post(self.call_url())
            .json(&serde_json::json!({
                "action": "end-call",
                "callId": call_id,
            }))
            .send()
            .await
            .map_err(|e| VoxdemoError::Proxy(format!("Failed to end call: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(VoxdemoError::Proxy(format!(
                "Failed to end call: {status} {body}"
            )));
        }

        debug!(call_id = %call_id, "call proxy acknowledged end-call");
        Ok(())
    }
}
