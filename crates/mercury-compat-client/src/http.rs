// crates/mercury-compat-client/src/http.rs
// ============================================================================
// Module: Mercury HTTP Client
// Description: Async HTTP client for the Mercury completion API.
// Purpose: Issue model, chat, FIM and streaming requests with bounded retries.
// Dependencies: reqwest, serde_json, tokio, tokio-stream, url
// ============================================================================

//! ## Overview
//! [`MercuryClient`] speaks the OpenAI-style REST surface of the Mercury API.
//! Non-streaming bodies are read with a hard byte limit. Streaming responses
//! are handed to a producer task that decodes SSE lines and forwards chunks
//! over a bounded channel; the caller pulls them one at a time through a
//! [`ChunkStream`].
//!
//! Security posture: server responses are untrusted; apply size limits and
//! never log the bearer credential.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::pin::Pin;
use std::time::Duration;

use reqwest::Client;
use reqwest::RequestBuilder;
use reqwest::Response;
use reqwest::header::ACCEPT;
use reqwest::header::AUTHORIZATION;
use reqwest::header::CONTENT_TYPE;
use reqwest::header::HeaderMap;
use reqwest::header::HeaderValue;
use reqwest::header::RETRY_AFTER;
use reqwest::redirect::Policy;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::mpsc;
use tokio_stream::Stream;
use tokio_stream::wrappers::ReceiverStream;
use url::Url;

use crate::config::ClientConfig;
use crate::config::MAX_RESPONSE_BYTES;
use crate::error::ClientError;
use crate::sse::SseDecoder;
use crate::sse::SseItem;
use crate::types::ChatChunk;
use crate::types::ChatCompletionRequest;
use crate::types::ChatResponse;
use crate::types::FimCompletionRequest;
use crate::types::FimResponse;
use crate::types::ModelList;
use crate::validation::validate_chat;
use crate::validation::validate_fim;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Chunks buffered between the SSE producer task and the consumer.
const STREAM_CHANNEL_CAPACITY: usize = 32;
/// Maximum error body read when classifying a failed response.
const MAX_ERROR_BODY_BYTES: usize = 64 * 1024;
/// Ceiling multiplier applied to the initial retry delay.
const MAX_BACKOFF_FACTOR: u32 = 10;
/// Longest server `Retry-After` hint honoured before a retry.
pub const MAX_RETRY_AFTER: Duration = Duration::from_secs(60);

// ============================================================================
// SECTION: Types
// ============================================================================

/// Pull-based stream of chat chunks in emission order.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<ChatChunk, ClientError>> + Send>>;

/// Mercury completion API client.
///
/// # Invariants
/// - `api_key` is non-blank.
/// - `base_url` is an absolute http(s) URL without a trailing slash.
#[derive(Clone)]
pub struct MercuryClient {
    /// Shared reqwest client.
    http: Client,
    /// Normalized API base URL.
    base_url: String,
    /// Bearer credential.
    api_key: String,
    /// Whole-request timeout for non-streaming calls.
    timeout: Duration,
    /// Additional attempts for retryable faults.
    max_retries: u32,
    /// Initial retry delay.
    retry_delay: Duration,
}

impl std::fmt::Debug for MercuryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MercuryClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .finish_non_exhaustive()
    }
}

impl MercuryClient {
    /// Builds a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] when the credential is missing or blank,
    /// the base URL is invalid, or the HTTP client cannot be constructed.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let api_key = config
            .api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ClientError::Config("mercury api key is required".to_string()))?;
        let base_url = normalize_base_url(&config.base_url)?;
        let http = Client::builder()
            .connect_timeout(config.timeout)
            .user_agent(config.user_agent)
            .redirect(Policy::none())
            .build()
            .map_err(|err| ClientError::Config(format!("http client build failed: {err}")))?;
        Ok(Self {
            http,
            base_url,
            api_key,
            timeout: config.timeout,
            max_retries: config.max_retries,
            retry_delay: config.retry_delay,
        })
    }

    /// Returns the normalized base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Lists the models advertised by the service.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the request or decoding fails.
    pub async fn list_models(&self) -> Result<ModelList, ClientError> {
        let url = self.endpoint("/models");
        let headers = self.headers(false)?;
        let response = self
            .send_with_retry(|| self.http.get(&url).headers(headers.clone()).timeout(self.timeout))
            .await?;
        decode_json(response).await
    }

    /// Creates a chat completion.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when validation, the request, or decoding fails.
    pub async fn chat_completion(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatResponse, ClientError> {
        validate_chat(request)?;
        let mut body = request.clone();
        body.stream = None;
        self.post_json("/chat/completions", &body).await
    }

    /// Creates a fill-in-the-middle completion.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when validation, the request, or decoding fails.
    pub async fn fim_completion(
        &self,
        request: &FimCompletionRequest,
    ) -> Result<FimResponse, ClientError> {
        validate_fim(request)?;
        self.post_json("/fim/completions", request).await
    }

    /// Starts a streaming chat completion.
    ///
    /// Connection setup honours the retry budget; once the stream has
    /// started, faults are delivered as stream items and never retried.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when validation fails or the stream cannot be opened.
    pub async fn chat_completion_stream(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChunkStream, ClientError> {
        validate_chat(request)?;
        let mut body = request.clone();
        body.stream = Some(true);
        let payload = encode_json(&body)?;
        let url = self.endpoint("/chat/completions");
        let headers = self.headers(true)?;
        let response = self
            .send_with_retry(|| self.http.post(&url).headers(headers.clone()).body(payload.clone()))
            .await?;
        let (sender, receiver) = mpsc::channel(STREAM_CHANNEL_CAPACITY);
        tokio::spawn(pump_sse(response, sender));
        Ok(Box::pin(ReceiverStream::new(receiver)))
    }

    /// Posts a JSON body and decodes a JSON response.
    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let payload = encode_json(body)?;
        let url = self.endpoint(path);
        let headers = self.headers(false)?;
        let response = self
            .send_with_retry(|| {
                self.http
                    .post(&url)
                    .headers(headers.clone())
                    .body(payload.clone())
                    .timeout(self.timeout)
            })
            .await?;
        decode_json(response).await
    }

    /// Sends a request, retrying retryable faults within the configured budget.
    async fn send_with_retry<F>(&self, build: F) -> Result<Response, ClientError>
    where
        F: Fn() -> RequestBuilder + Sync,
    {
        let mut attempt: u32 = 0;
        loop {
            match send_once(build()).await {
                Ok(response) => return Ok(response),
                Err(err) if err.is_retryable() && attempt < self.max_retries => {
                    let delay = retry_delay_for(&err, attempt, self.retry_delay);
                    attempt = attempt.saturating_add(1);
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Joins `path` onto the base URL.
    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Builds request headers.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] when the credential is not a valid header value.
    fn headers(&self, stream: bool) -> Result<HeaderMap, ClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if stream {
            headers.insert(ACCEPT, HeaderValue::from_static("text/event-stream"));
        }
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.api_key))
            .map_err(|_| ClientError::Config("invalid api key header".to_string()))?;
        headers.insert(AUTHORIZATION, bearer);
        Ok(headers)
    }
}

// ============================================================================
// SECTION: Request Helpers
// ============================================================================

/// Sends one attempt and classifies non-success statuses.
async fn send_once(request: RequestBuilder) -> Result<Response, ClientError> {
    let response = request.send().await.map_err(|err| ClientError::Transport(err.to_string()))?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let retry_after = parse_retry_after(response.headers());
    let body = read_body_with_limit(response, MAX_ERROR_BODY_BYTES).await.unwrap_or_default();
    Err(ClientError::from_status(status.as_u16(), &body, retry_after))
}

/// Returns the wait before the next attempt.
///
/// A server `Retry-After` hint wins, clamped to [`MAX_RETRY_AFTER`];
/// otherwise the delay doubles per attempt and is capped at ten times the
/// initial delay.
#[must_use]
pub fn retry_delay_for(error: &ClientError, attempt: u32, initial: Duration) -> Duration {
    if let ClientError::RateLimited {
        retry_after: Some(hint),
        ..
    } = error
    {
        return (*hint).min(MAX_RETRY_AFTER);
    }
    backoff_delay(attempt, initial)
}

/// Exponential backoff step for `attempt` (zero-based).
#[must_use]
pub fn backoff_delay(attempt: u32, initial: Duration) -> Duration {
    let factor = 1_u32.checked_shl(attempt).unwrap_or(u32::MAX);
    initial.saturating_mul(factor).min(initial.saturating_mul(MAX_BACKOFF_FACTOR))
}

/// Parses a `Retry-After` header expressed in whole seconds.
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

/// Validates and normalizes the API base URL.
fn normalize_base_url(raw: &str) -> Result<String, ClientError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let parsed = Url::parse(trimmed)
        .map_err(|err| ClientError::Config(format!("invalid base url {trimmed}: {err}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(trimmed.to_string()),
        other => Err(ClientError::Config(format!("unsupported base url scheme: {other}"))),
    }
}

/// Serializes a request body.
fn encode_json<B: Serialize>(body: &B) -> Result<Vec<u8>, ClientError> {
    serde_json::to_vec(body)
        .map_err(|err| ClientError::Decode(format!("request serialization failed: {err}")))
}

/// Reads and decodes a JSON response body.
async fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let body = read_body_with_limit(response, MAX_RESPONSE_BYTES).await?;
    serde_json::from_slice(&body)
        .map_err(|err| ClientError::Decode(format!("invalid response json: {err}")))
}

/// Reads a response body while enforcing a hard byte limit.
async fn read_body_with_limit(
    mut response: Response,
    limit: usize,
) -> Result<Vec<u8>, ClientError> {
    let mut body = Vec::new();
    while let Some(chunk) =
        response.chunk().await.map_err(|err| ClientError::Transport(err.to_string()))?
    {
        let next_total =
            body.len().checked_add(chunk.len()).ok_or(ClientError::ResponseTooLarge {
                actual: usize::MAX,
                limit,
            })?;
        if next_total > limit {
            return Err(ClientError::ResponseTooLarge {
                actual: next_total,
                limit,
            });
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

// ============================================================================
// SECTION: Stream Producer
// ============================================================================

/// Reads an SSE body and forwards decoded chunks until the stream ends.
///
/// A read failure is forwarded as a single [`ClientError::Stream`] item and
/// ends the stream. The task exits early when the consumer goes away.
async fn pump_sse(mut response: Response, sender: mpsc::Sender<Result<ChatChunk, ClientError>>) {
    let mut decoder = SseDecoder::new();
    loop {
        let items = match response.chunk().await {
            Ok(Some(bytes)) => decoder.feed(&bytes),
            Ok(None) => {
                let _ = forward_all(&sender, decoder.finish()).await;
                return;
            }
            Err(err) => {
                let _ = sender.send(Err(ClientError::Stream(err.to_string()))).await;
                return;
            }
        };
        if !forward_all(&sender, items).await || decoder.is_done() {
            return;
        }
    }
}

/// Forwards decoded items; returns false when the stream should stop.
async fn forward_all(
    sender: &mpsc::Sender<Result<ChatChunk, ClientError>>,
    items: Vec<SseItem>,
) -> bool {
    for item in items {
        match item {
            SseItem::Chunk(chunk) => {
                if sender.send(Ok(chunk)).await.is_err() {
                    return false;
                }
            }
            SseItem::Skipped(_) => {}
            SseItem::Done => return false,
        }
    }
    true
}
