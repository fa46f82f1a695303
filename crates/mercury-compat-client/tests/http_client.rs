// crates/mercury-compat-client/tests/http_client.rs
// ============================================================================
// Module: HTTP Client Integration Tests
// Description: Round-trips the Mercury client against a loopback stub.
// Purpose: Verify endpoints, headers, retry policy and SSE streaming.
// Dependencies: mercury-compat-client, axum, tokio
// ============================================================================

//! ## Overview
//! Each test scripts a stub server, drives the client against it and inspects
//! both the decoded result and the recorded requests.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod common;

use common::StubReply;
use common::StubServer;
use mercury_compat_client::ChatCompletionRequest;
use mercury_compat_client::ChatMessage;
use mercury_compat_client::ClientError;
use mercury_compat_client::FimCompletionRequest;
use mercury_compat_client::MercuryClient;
use serde_json::json;
use tokio_stream::StreamExt;

fn chat_body() -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "created": 1_700_000_000,
        "model": "mercury-coder-small",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": "def hello():\n    print('hi')"},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 12, "completion_tokens": 9, "total_tokens": 21}
    })
}

fn chat_request() -> ChatCompletionRequest {
    ChatCompletionRequest::new("mercury-coder-small", vec![ChatMessage::user("Hi")])
        .with_max_tokens(10)
}

#[tokio::test]
async fn list_models_sends_bearer_and_decodes() {
    let server = StubServer::start(vec![(
        "/models",
        vec![StubReply::json(
            200,
            &json!({
                "object": "list",
                "data": [{
                    "id": "mercury-coder-small",
                    "object": "model",
                    "created": 1,
                    "owned_by": "inception"
                }]
            }),
        )],
    )])
    .await;
    let client = MercuryClient::new(server.client_config()).expect("client");
    let models = client.list_models().await.expect("models");
    assert!(models.contains("mercury-coder-small"));
    assert_eq!(models.data[0].owned_by.as_deref(), Some("inception"));

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "GET");
    assert_eq!(requests[0].authorization.as_deref(), Some("Bearer test-key"));
    server.shutdown().await;
}

#[tokio::test]
async fn chat_completion_posts_non_streaming_body() {
    let server =
        StubServer::start(vec![("/chat/completions", vec![StubReply::json(200, &chat_body())])])
            .await;
    let client = MercuryClient::new(server.client_config()).expect("client");
    let response = client.chat_completion(&chat_request()).await.expect("chat");
    assert_eq!(response.usage.as_ref().and_then(|usage| usage.total_tokens), Some(21));
    assert!(response.first_content().is_some_and(|content| content.starts_with("def hello")));

    let requests = server.requests();
    let body = requests[0].body.as_ref().expect("json body");
    assert_eq!(body["model"], "mercury-coder-small");
    assert_eq!(body["max_tokens"], 10);
    assert!(body.get("stream").is_none());
    server.shutdown().await;
}

#[tokio::test]
async fn fim_completion_hits_fim_endpoint() {
    let server = StubServer::start(vec![(
        "/fim/completions",
        vec![StubReply::json(
            200,
            &json!({
                "id": "fim-1",
                "choices": [{"index": 0, "text": "sum(numbers)", "finish_reason": "stop"}],
                "usage": {"prompt_tokens": 5, "completion_tokens": 3, "total_tokens": 8}
            }),
        )],
    )])
    .await;
    let client = MercuryClient::new(server.client_config()).expect("client");
    let request = FimCompletionRequest::new("mercury-coder-small", "total = ", "\nreturn total")
        .with_max_tokens(50);
    let response = client.fim_completion(&request).await.expect("fim");
    assert_eq!(response.text(), Some("sum(numbers)"));
    let requests = server.requests();
    assert_eq!(requests[0].body.as_ref().expect("body")["suffix"], "\nreturn total");
    server.shutdown().await;
}

#[tokio::test]
async fn authentication_failures_are_not_retried() {
    let server = StubServer::start(vec![(
        "/models",
        vec![StubReply::json(
            401,
            &json!({"error": {"message": "invalid api key", "type": "auth"}}),
        )],
    )])
    .await;
    let mut config = server.client_config();
    config.max_retries = 3;
    let client = MercuryClient::new(config).expect("client");
    let err = client.list_models().await.expect_err("auth failure");
    assert_eq!(err, ClientError::Authentication("invalid api key".to_string()));
    assert_eq!(server.requests().len(), 1);
    server.shutdown().await;
}

#[tokio::test]
async fn server_errors_are_retried_within_budget() {
    let server = StubServer::start(vec![(
        "/chat/completions",
        vec![StubReply::text(503, "busy"), StubReply::json(200, &chat_body())],
    )])
    .await;
    let mut config = server.client_config();
    config.max_retries = 1;
    let client = MercuryClient::new(config).expect("client");
    client.chat_completion(&chat_request()).await.expect("second attempt succeeds");
    assert_eq!(server.requests().len(), 2);
    server.shutdown().await;
}

#[tokio::test]
async fn retries_stop_when_budget_is_exhausted() {
    let server =
        StubServer::start(vec![("/models", vec![StubReply::text(500, "boom")])]).await;
    let mut config = server.client_config();
    config.max_retries = 2;
    let client = MercuryClient::new(config).expect("client");
    let err = client.list_models().await.expect_err("persistent failure");
    assert!(matches!(err, ClientError::Server { status: 500, .. }));
    assert_eq!(server.requests().len(), 3);
    server.shutdown().await;
}

#[tokio::test]
async fn rate_limit_retry_after_is_parsed() {
    let server = StubServer::start(vec![(
        "/models",
        vec![StubReply::text(429, "slow down").with_header("retry-after", "7")],
    )])
    .await;
    let client = MercuryClient::new(server.client_config()).expect("client");
    let err = client.list_models().await.expect_err("rate limited");
    assert_eq!(
        err,
        ClientError::RateLimited {
            message: "slow down".to_string(),
            retry_after: Some(std::time::Duration::from_secs(7)),
        }
    );
    server.shutdown().await;
}

#[tokio::test]
async fn invalid_requests_never_reach_the_network() {
    let server = StubServer::start(Vec::new()).await;
    let client = MercuryClient::new(server.client_config()).expect("client");
    let request = ChatCompletionRequest::new("mercury-coder-small", Vec::new());
    let err = client.chat_completion(&request).await.expect_err("validation");
    assert!(matches!(err, ClientError::Validation(_)));
    assert!(server.requests().is_empty());
    server.shutdown().await;
}

#[tokio::test]
async fn stream_delivers_chunks_in_order_and_ends_at_done() {
    let body = "data: {\"choices\":[{\"index\":0,\"delta\":{\"role\":\"assistant\"}}]}\n\n\
data: {\"choices\":[{\"index\":0,\"delta\":{\"content\":\"Hel\"}}]}\n\n\
data: {\"choices\":[{\"index\":0,\"delta\":{\"content\":\"lo\"}}]}\n\n\
data: [DONE]\n\n";
    let server =
        StubServer::start(vec![("/chat/completions", vec![StubReply::sse(body)])]).await;
    let client = MercuryClient::new(server.client_config()).expect("client");
    let mut stream = client.chat_completion_stream(&chat_request()).await.expect("stream");
    let mut texts = Vec::new();
    let mut total = 0;
    while let Some(item) = stream.next().await {
        let chunk = item.expect("chunk");
        total += 1;
        if let Some(content) = chunk.content() {
            texts.push(content.to_string());
        }
    }
    assert_eq!(total, 3);
    assert_eq!(texts, vec!["Hel".to_string(), "lo".to_string()]);

    let requests = server.requests();
    assert_eq!(requests[0].accept.as_deref(), Some("text/event-stream"));
    assert_eq!(requests[0].body.as_ref().expect("body")["stream"], true);
    server.shutdown().await;
}

#[tokio::test]
async fn stream_open_failure_is_classified() {
    let server =
        StubServer::start(vec![("/chat/completions", vec![StubReply::text(400, "bad model")])])
            .await;
    let client = MercuryClient::new(server.client_config()).expect("client");
    let Err(err) = client.chat_completion_stream(&chat_request()).await else {
        panic!("expected open failure");
    };
    assert!(matches!(err, ClientError::Api { status: 400, .. }));
    server.shutdown().await;
}
