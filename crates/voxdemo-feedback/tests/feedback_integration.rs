use voxdemo_feedback::FeedbackSubmitter;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn submits_camel_case_body_with_timestamp() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hooks/feedback"))
        .and(body_partial_json(serde_json::json!({
            "agentId": "agent_abc123",
            "notes": "The agent interrupted twice.",
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let submitter = FeedbackSubmitter::new(format!("{}/hooks/feedback", server.uri()));
    submitter
        .submit("agent_abc123", "The agent interrupted twice.")
        .await
        .unwrap();

    // Timestamp is present and ISO-8601.
    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = requests[0].body_json().unwrap();
    let timestamp = body["timestamp"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
}

#[tokio::test]
async fn blank_notes_never_reach_the_webhook() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let submitter = FeedbackSubmitter::new(server.uri());
    let err = submitter.submit("agent_abc123", "   ").await.unwrap_err();

    assert!(err.to_string().contains("before submitting"));
    server.verify().await;
}

#[tokio::test]
async fn non_2xx_status_is_an_error_with_no_retry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let submitter = FeedbackSubmitter::new(server.uri());
    let err = submitter
        .submit("agent_abc123", "some notes")
        .await
        .unwrap_err();

    assert!(err.to_string().contains("Failed to submit feedback"));
    // Exactly one request: failures are terminal, never retried.
    server.verify().await;
}
