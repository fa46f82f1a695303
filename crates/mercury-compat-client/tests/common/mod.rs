// crates/mercury-compat-client/tests/common/mod.rs
// ============================================================================
// Module: Common Test Utilities
// Description: Scripted HTTP stub server for client integration tests.
// Purpose: Replay canned responses per path and record incoming requests.
// Dependencies: axum, tokio
// ============================================================================

//! ## Overview
//! The stub binds a loopback port, replays a queue of scripted replies per
//! request path, and records every request so tests can assert on headers and
//! bodies. The last reply for a path repeats once its queue is drained.

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

use std::collections::HashMap;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::HeaderName;
use axum::http::HeaderValue;
use axum::http::Method;
use axum::http::StatusCode;
use axum::http::Uri;
use axum::response::IntoResponse;
use axum::response::Response;
use mercury_compat_client::ClientConfig;
use serde_json::Value;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// A scripted reply.
#[derive(Clone, Debug)]
pub struct StubReply {
    pub status: u16,
    pub headers: Vec<(&'static str, String)>,
    pub body: String,
}

impl StubReply {
    pub fn json(status: u16, body: &Value) -> Self {
        Self {
            status,
            headers: vec![("content-type", "application/json".to_string())],
            body: body.to_string(),
        }
    }

    pub fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    pub fn sse(body: &str) -> Self {
        Self {
            status: 200,
            headers: vec![("content-type", "text/event-stream".to_string())],
            body: body.to_string(),
        }
    }

    pub fn with_header(mut self, name: &'static str, value: &str) -> Self {
        self.headers.push((name, value.to_string()));
        self
    }
}

/// A recorded request.
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub method: String,
    #[allow(dead_code, reason = "Recorded for diagnostics; not every test reads it.")]
    pub path: String,
    pub authorization: Option<String>,
    pub accept: Option<String>,
    pub body: Option<Value>,
}

#[derive(Clone, Default)]
struct StubState {
    replies: Arc<Mutex<HashMap<String, VecDeque<StubReply>>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

/// Handle for a running stub server.
pub struct StubServer {
    base_url: String,
    state: StubState,
    shutdown: Option<oneshot::Sender<()>>,
    join: Option<JoinHandle<()>>,
}

impl StubServer {
    /// Starts a stub serving the given scripted replies keyed by path.
    pub async fn start(script: Vec<(&str, Vec<StubReply>)>) -> Self {
        let state = StubState::default();
        {
            let mut replies = state.replies.lock().unwrap();
            for (path, queue) in script {
                replies.insert(path.to_string(), queue.into_iter().collect());
            }
        }
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind stub");
        let addr = listener.local_addr().expect("stub addr");
        let app = Router::new().fallback(handle).with_state(state.clone());
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let join = tokio::spawn(async move {
            let server = axum::serve(listener, app).with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            });
            let _ = server.await;
        });
        Self {
            base_url: format!("http://{addr}/v1"),
            state,
            shutdown: Some(shutdown_tx),
            join: Some(join),
        }
    }

    /// Returns a client config pointed at this stub.
    pub fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::with_api_key("test-key");
        config.base_url = self.base_url.clone();
        config.timeout = Duration::from_secs(5);
        config.retry_delay = Duration::from_millis(1);
        config
    }

    /// Returns every request received so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    /// Stops the server.
    pub async fn shutdown(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(join) = self.join.take() {
            let _ = join.await;
        }
    }
}

async fn handle(
    State(state): State<StubState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().trim_start_matches("/v1").to_string();
    let header_text = |name: &str| {
        headers.get(name).and_then(|value| value.to_str().ok()).map(str::to_string)
    };
    state.requests.lock().unwrap().push(RecordedRequest {
        method: method.to_string(),
        path: path.clone(),
        authorization: header_text("authorization"),
        accept: header_text("accept"),
        body: serde_json::from_slice(&body).ok(),
    });
    let reply = {
        let mut replies = state.replies.lock().unwrap();
        replies.get_mut(&path).and_then(|queue| {
            if queue.len() > 1 { queue.pop_front() } else { queue.front().cloned() }
        })
    };
    let Some(reply) = reply else {
        return (StatusCode::NOT_FOUND, "no scripted reply").into_response();
    };
    let mut response_headers = HeaderMap::new();
    for (name, value) in &reply.headers {
        response_headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_str(value).expect("header value"),
        );
    }
    let status = StatusCode::from_u16(reply.status).expect("status");
    (status, response_headers, reply.body).into_response()
}
