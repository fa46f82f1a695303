// crates/mercury-compat-harness/tests/common/mod.rs
// ============================================================================
// Module: Common Test Utilities
// Description: In-memory collaborators and event recorders for harness tests.
// Purpose: Drive the orchestrator deterministically without a network.
// Dependencies: mercury-compat-harness, mercury-compat-client, tokio-stream
// ============================================================================

//! ## Overview
//! [`StubApi`] answers each collaborator call from a fixed script; calls are
//! counted so tests can assert which operations ran. [`StubFactory`] can also
//! refuse construction to simulate a missing credential.

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
    dead_code,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::io;
use std::io::Write;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use async_trait::async_trait;
use mercury_compat_client::ChatChunk;
use mercury_compat_client::ChatCompletionRequest;
use mercury_compat_client::ChatResponse;
use mercury_compat_client::ChunkStream;
use mercury_compat_client::ClientError;
use mercury_compat_client::FimCompletionRequest;
use mercury_compat_client::FimResponse;
use mercury_compat_client::ModelList;
use mercury_compat_harness::ClientFactory;
use mercury_compat_harness::CompletionApi;
use mercury_compat_harness::HarnessEvent;
use mercury_compat_harness::HarnessEventSink;
use serde_json::json;

// ============================================================================
// SECTION: Canned Payloads
// ============================================================================

pub fn healthy_models() -> ModelList {
    serde_json::from_value(json!({
        "object": "list",
        "data": [
            {"id": "mercury-coder-small", "object": "model", "created": 1, "owned_by": "inception"},
            {"id": "mercury-coder-large", "object": "model", "created": 1, "owned_by": "inception"}
        ]
    }))
    .expect("models")
}

pub fn healthy_chat() -> ChatResponse {
    serde_json::from_value(json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "created": 1_700_000_000,
        "model": "mercury-coder-small",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": "def hello():\n    print('Hello, world!')"},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 20, "completion_tokens": 12, "total_tokens": 32}
    }))
    .expect("chat")
}

pub fn healthy_fim() -> FimResponse {
    serde_json::from_value(json!({
        "id": "fim-1",
        "choices": [{"index": 0, "text": "sum(numbers)", "finish_reason": "stop"}],
        "usage": {"prompt_tokens": 14, "completion_tokens": 3, "total_tokens": 17}
    }))
    .expect("fim")
}

pub fn counting_chunks() -> Vec<Result<ChatChunk, ClientError>> {
    ["1", "2", "3", "4", "5"].into_iter().map(|text| Ok(ChatChunk::text(text))).collect()
}

// ============================================================================
// SECTION: Stub Collaborator
// ============================================================================

/// Scripted collaborator.
pub struct StubApi {
    pub models: Result<ModelList, ClientError>,
    pub chat: Result<ChatResponse, ClientError>,
    pub fim: Result<FimResponse, ClientError>,
    pub stream: Result<Vec<Result<ChatChunk, ClientError>>, ClientError>,
    pub calls: Mutex<Vec<&'static str>>,
}

impl StubApi {
    pub fn healthy() -> Self {
        Self {
            models: Ok(healthy_models()),
            chat: Ok(healthy_chat()),
            fim: Ok(healthy_fim()),
            stream: Ok(counting_chunks()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    fn note(&self, call: &'static str) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl CompletionApi for StubApi {
    async fn list_models(&self) -> Result<ModelList, ClientError> {
        self.note("list_models");
        self.models.clone()
    }

    async fn chat_completion(
        &self,
        _request: &ChatCompletionRequest,
    ) -> Result<ChatResponse, ClientError> {
        self.note("chat_completion");
        self.chat.clone()
    }

    async fn fim_completion(
        &self,
        _request: &FimCompletionRequest,
    ) -> Result<FimResponse, ClientError> {
        self.note("fim_completion");
        self.fim.clone()
    }

    async fn chat_completion_stream(
        &self,
        _request: &ChatCompletionRequest,
    ) -> Result<ChunkStream, ClientError> {
        self.note("chat_completion_stream");
        let items = self.stream.clone()?;
        Ok(Box::pin(tokio_stream::iter(items)))
    }
}

/// Factory handing out one shared [`StubApi`].
pub struct StubFactory {
    pub api: Arc<StubApi>,
    pub refuse: Option<ClientError>,
    pub connects: AtomicUsize,
}

impl StubFactory {
    pub fn new(api: StubApi) -> Arc<Self> {
        Arc::new(Self {
            api: Arc::new(api),
            refuse: None,
            connects: AtomicUsize::new(0),
        })
    }

    pub fn refusing(err: ClientError) -> Arc<Self> {
        Arc::new(Self {
            api: Arc::new(StubApi::healthy()),
            refuse: Some(err),
            connects: AtomicUsize::new(0),
        })
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

impl ClientFactory for StubFactory {
    fn connect(&self) -> Result<Arc<dyn CompletionApi>, ClientError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = &self.refuse {
            return Err(err.clone());
        }
        let api: Arc<dyn CompletionApi> = self.api.clone();
        Ok(api)
    }
}

// ============================================================================
// SECTION: Event Capture
// ============================================================================

/// Sink that keeps every event in memory.
#[derive(Default)]
pub struct RecordingSink {
    pub events: Mutex<Vec<HarnessEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<HarnessEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl HarnessEventSink for RecordingSink {
    fn record(&self, event: &HarnessEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// Cloneable in-memory writer.
#[derive(Clone, Default)]
pub struct SharedBuffer(pub Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).expect("utf-8 output")
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
