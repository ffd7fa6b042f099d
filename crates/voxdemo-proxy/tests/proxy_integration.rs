//! End-to-end proxy tests: a real listener in front, a mocked provider behind.

use voxdemo_proxy::{build_router, ProxyConfig};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Bind the proxy on an ephemeral port and return its base URL.
async fn spawn_proxy(provider_url: String, api_key: &str) -> String {
    let config = ProxyConfig {
        provider_api_key: api_key.to_string(),
        provider_base_url: provider_url,
    };
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, build_router(config)).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let base = spawn_proxy("http://unused".into(), "key").await;

    let body: serde_json::Value = reqwest::get(format!("{base}/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "voxdemo-proxy");
}

#[tokio::test]
async fn start_call_forwards_bearer_key_and_relays_token_body() {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/create-web-call"))
        .and(header("authorization", "Bearer key_secret"))
        .and(body_json(serde_json::json!({ "agent_id": "agent_abc123" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "access_token": "tok",
            "call_id": "c1",
        })))
        .expect(1)
        .mount(&provider)
        .await;

    let base = spawn_proxy(provider.uri(), "key_secret").await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/call"))
        .json(&serde_json::json!({
            "action": "start-call",
            "agentId": "agent_abc123",
        }))
        .send()
        .await
        .unwrap();

    assert!(resp.status().is_success());
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["call_id"], "c1");
    assert_eq!(body["access_token"], "tok");
    provider.verify().await;
}

#[tokio::test]
async fn end_call_forwards_call_id_to_stop_endpoint() {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/stop-web-call"))
        .and(body_json(serde_json::json!({ "call_id": "c1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(1)
        .mount(&provider)
        .await;

    let base = spawn_proxy(provider.uri(), "key_secret").await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/call"))
        .json(&serde_json::json!({ "action": "end-call", "callId": "c1" }))
        .send()
        .await
        .unwrap();

    assert!(resp.status().is_success());
    provider.verify().await;
}

#[tokio::test]
async fn provider_failure_becomes_500_with_error_body() {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/create-web-call"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .mount(&provider)
        .await;

    let base = spawn_proxy(provider.uri(), "key_secret").await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/call"))
        .json(&serde_json::json!({
            "action": "start-call",
            "agentId": "agent_abc123",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 500);
    let body: serde_json::Value = resp.json().await.unwrap();
    let message = body["error"].as_str().unwrap();
    assert!(message.contains("Provider API error: 429"));
    assert!(message.contains("rate limited"));
}

#[tokio::test]
async fn invalid_action_never_reaches_the_provider() {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&provider)
        .await;

    let base = spawn_proxy(provider.uri(), "key_secret").await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/call"))
        .json(&serde_json::json!({ "action": "mute-call" }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 500);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("Invalid action"));
    provider.verify().await;
}

#[tokio::test]
async fn start_call_without_agent_id_is_rejected_locally() {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&provider)
        .await;

    let base = spawn_proxy(provider.uri(), "key_secret").await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/call"))
        .json(&serde_json::json!({ "action": "start-call" }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 500);
    provider.verify().await;
}

#[tokio::test]
async fn missing_provider_key_is_a_config_error() {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&provider)
        .await;

    let base = spawn_proxy(provider.uri(), "").await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/call"))
        .json(&serde_json::json!({
            "action": "start-call",
            "agentId": "agent_abc123",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 500);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("Provider API key not configured"));
    provider.verify().await;
}
