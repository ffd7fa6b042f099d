//! The backend call proxy.
//!
//! Holds the real provider secret key and forwards `start-call` / `end-call`
//! actions from the demo client to the provider REST API. The browser (or
//! CLI) never sees the key; it only ever receives the relayed
//! `{call_id, access_token}` body.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info};
use voxdemo_core::{VoxdemoError, VoxdemoResult};

const DEFAULT_PROVIDER_BASE_URL: &str = "https://api.retellai.com";

/// Configuration for the proxy service.
#[derive(Debug, Clone, Deserialize)]
pub struct ProxyConfig {
    /// The provider secret key. Comes from config or environment, never from
    /// a request.
    pub provider_api_key: String,
    /// Provider REST endpoint; overridable for tests and regional hosts.
    #[serde(default = "default_provider_base_url")]
    pub provider_base_url: String,
}

fn default_provider_base_url() -> String {
    DEFAULT_PROVIDER_BASE_URL.to_string()
}

impl ProxyConfig {
    /// Creates a config against the default provider endpoint.
    pub fn new(provider_api_key: impl Into<String>) -> Self {
        Self {
            provider_api_key: provider_api_key.into(),
            provider_base_url: default_provider_base_url(),
        }
    }
}

/// Shared application state.
pub struct AppState {
    config: ProxyConfig,
    http: reqwest::Client,
}

/// Request body of `POST /call`.
#[derive(Debug, Deserialize)]
pub struct CallRequest {
    /// `"start-call"` or `"end-call"`.
    pub action: String,
    /// Required for `start-call`.
    #[serde(default, rename = "agentId")]
    pub agent_id: Option<String>,
    /// Required for `end-call`.
    #[serde(default, rename = "callId")]
    pub call_id: Option<String>,
}

/// Builds the proxy router.
pub fn build_router(config: ProxyConfig) -> Router {
    let state = Arc::new(AppState {
        config,
        http: reqwest::Client::new(),
    });

    Router::new()
        .route("/call", post(call_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

/// Binds `addr` and serves the proxy until the task is cancelled.
pub async fn serve(addr: &str, config: ProxyConfig) -> VoxdemoResult<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %addr, "call proxy listening");
    axum::serve(listener, build_router(config)).await?;
    Ok(())
}

async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok", "service": "voxdemo-proxy"}))
}

async fn call_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CallRequest>,
) -> impl IntoResponse {
    match forward_call(&state, req).await {
        Ok(body) => (StatusCode::OK, Json(body)),
        Err(e) => {
            error!(error = %e, "call proxy request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": e.to_string() })),
            )
        }
    }
}

/// Maps the action to a provider endpoint, forwards the request with the
/// bearer key, and relays the provider's JSON body verbatim.
async fn forward_call(state: &AppState, req: CallRequest) -> VoxdemoResult<serde_json::Value> {
    if state.config.provider_api_key.is_empty() {
        return Err(VoxdemoError::Config(
            "Provider API key not configured".into(),
        ));
    }

    let base = state.config.provider_base_url.trim_end_matches('/');
    let (url, body) = match req.action.as_str() {
        "start-call" => {
            let agent_id = req
                .agent_id
                .as_deref()
                .filter(|id| !id.trim().is_empty())
                .ok_or_else(|| VoxdemoError::Proxy("Missing agentId for start-call".into()))?;
            info!(agent_id = %agent_id, "forwarding start-call to provider");
            (
                format!("{base}/v2/create-web-call"),
                serde_json::json!({ "agent_id": agent_id }),
            )
        }
        "end-call" => {
            let call_id = req
                .call_id
                .as_deref()
                .filter(|id| !id.trim().is_empty())
                .ok_or_else(|| VoxdemoError::Proxy("Missing callId for end-call".into()))?;
            info!(call_id = %call_id, "forwarding end-call to provider");
            (
                format!("{base}/v2/stop-web-call"),
                serde_json::json!({ "call_id": call_id }),
            )
        }
        other => {
            return Err(VoxdemoError::Proxy(format!("Invalid action: {other}")));
        }
    };

    let resp = state
        .http
        .post(&url)
        .bearer_auth(&state.config.provider_api_key)
        .json(&body)
        .send()
        .await
        .map_err(|e| VoxdemoError::Http(e.to_string()))?;

    let status = resp.status();
    if !status.is_success() {
        let text = resp.text().await.unwrap_or_default();
        error!(status = %status, "provider rejected the forwarded call");
        return Err(VoxdemoError::Proxy(format!(
            "Provider API error: {} {}",
            status.as_u16(),
            text
        )));
    }

    resp.json()
        .await
        .map_err(|e| VoxdemoError::Proxy(format!("malformed provider body: {e}")))
}
