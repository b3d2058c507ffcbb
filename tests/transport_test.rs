//! Integration tests for [`ResilientTransport`] against a mock upstream.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use termsum::{
    ChatTransport, CompletionRequest, Message, ResilientTransport, RetryPolicy, TermsumError,
    TransportConfig,
};

fn completion_body(content: &str) -> serde_json::Value {
    json!({
        "id": "cmpl-1",
        "model": "sonar-pro",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    })
}

fn request(max_tokens: Option<u32>) -> CompletionRequest {
    CompletionRequest {
        model: "sonar-pro".into(),
        messages: vec![Message::system("sistema"), Message::user("utilizador")],
        temperature: 0.1,
        frequency_penalty: 0.5,
        max_tokens,
    }
}

fn transport(server: &MockServer) -> ResilientTransport {
    ResilientTransport::new(
        TransportConfig::new().url(format!("{}/chat/completions", server.uri())),
        RetryPolicy::new().backoff_base(Duration::from_millis(10)),
    )
    .unwrap()
}

#[tokio::test]
async fn sends_expected_headers_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer pplx-test"))
        .and(header("content-type", "application/json"))
        .and(header("user-agent", "TermosClarosBot/1.0"))
        .and(header("connection", "close"))
        .and(body_partial_json(json!({
            "model": "sonar-pro",
            "max_tokens": 1500,
            "messages": [
                { "role": "system", "content": "sistema" },
                { "role": "user", "content": "utilizador" }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("ok")))
        .expect(1)
        .mount(&server)
        .await;

    let reply = transport(&server)
        .post_completion("pplx-test", &request(Some(1500)))
        .await
        .unwrap();
    assert_eq!(reply.status, 200);
    assert!(reply.body.contains("\"ok\""));
}

#[tokio::test]
async fn omits_max_tokens_when_unset() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("ok")))
        .mount(&server)
        .await;

    transport(&server)
        .post_completion("k", &request(None))
        .await
        .unwrap();

    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
    let body: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
    assert!(body.get("max_tokens").is_none());
    assert!((body["temperature"].as_f64().unwrap() - 0.1).abs() < 1e-6);
    assert_eq!(body["frequency_penalty"].as_f64(), Some(0.5));
}

#[tokio::test]
async fn retries_503_then_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("third time")))
        .expect(1)
        .mount(&server)
        .await;

    let reply = transport(&server)
        .post_completion("k", &request(None))
        .await
        .unwrap();
    assert_eq!(reply.status, 200);
    assert!(reply.body.contains("third time"));
}

#[tokio::test]
async fn client_errors_are_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({ "error": { "message": "Invalid model" } })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let reply = transport(&server)
        .post_completion("k", &request(None))
        .await
        .unwrap();
    assert_eq!(reply.status, 400);
}

#[tokio::test]
async fn exhausted_retries_return_last_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .expect(4)
        .mount(&server)
        .await;

    let reply = transport(&server)
        .post_completion("k", &request(None))
        .await
        .unwrap();
    assert_eq!(reply.status, 502);
    assert_eq!(reply.body, "Bad Gateway");
}

#[tokio::test]
async fn retried_statuses_come_from_policy() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .expect(1)
        .mount(&server)
        .await;

    let transport = ResilientTransport::new(
        TransportConfig::new().url(format!("{}/chat/completions", server.uri())),
        RetryPolicy::new()
            .backoff_base(Duration::from_millis(10))
            .retry_statuses([503]),
    )
    .unwrap();

    let reply = transport.post_completion("k", &request(None)).await.unwrap();
    assert_eq!(reply.status, 500);
}

#[tokio::test]
async fn slow_upstream_times_out_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion_body("late"))
                .set_delay(Duration::from_secs(2)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let transport = ResilientTransport::new(
        TransportConfig::new()
            .url(format!("{}/chat/completions", server.uri()))
            .timeout(Duration::from_millis(200)),
        RetryPolicy::new().backoff_base(Duration::from_millis(10)),
    )
    .unwrap();

    let err = transport
        .post_completion("k", &request(None))
        .await
        .unwrap_err();
    assert!(matches!(err, TermsumError::Timeout(_)), "got {err:?}");
}

#[tokio::test]
async fn refused_connection_is_remote_error_without_status() {
    // Reserve a port, then free it so nothing is listening.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let transport = ResilientTransport::new(
        TransportConfig::new().url(format!("http://{addr}/chat/completions")),
        RetryPolicy::new().backoff_base(Duration::from_millis(1)),
    )
    .unwrap();

    let err = transport
        .post_completion("k", &request(None))
        .await
        .unwrap_err();
    assert!(
        matches!(err, TermsumError::Remote { status: None, .. }),
        "got {err:?}"
    );
}

#[tokio::test]
async fn connection_close_can_be_disabled() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("ok")))
        .mount(&server)
        .await;

    let transport = ResilientTransport::new(
        TransportConfig::new()
            .url(format!("{}/chat/completions", server.uri()))
            .connection_close(false),
        RetryPolicy::disabled(),
    )
    .unwrap();
    transport.post_completion("k", &request(None)).await.unwrap();

    let received = server.received_requests().await.unwrap();
    let connection = received[0]
        .headers
        .get("connection")
        .and_then(|v| v.to_str().ok());
    assert_ne!(connection, Some("close"));
}
