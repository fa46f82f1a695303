// crates/mercury-compat-client/src/lib.rs
// ============================================================================
// Module: Mercury Compat Client Library
// Description: Typed client for the Mercury completion API.
// Purpose: Provide the collaborator exercised by the compatibility harness.
// Dependencies: reqwest, serde, thiserror, tokio, tokio-stream, url
// ============================================================================

//! ## Overview
//! This crate implements the Mercury completion API client: model listing,
//! chat completion, fill-in-the-middle completion and streamed chat
//! completion. Response types model every contract field as optional so that
//! contract drift decodes cleanly and can be inspected by the harness.
//! Invariants:
//! - Requests are validated locally before any network call.
//! - Streamed chunks are delivered in emission order.
//!
//! Security posture: server responses are untrusted; the bearer credential is
//! redacted from `Debug` output.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod error;
pub mod http;
pub mod sse;
pub mod types;
pub mod validation;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::ClientConfig;
pub use error::ClientError;
pub use http::ChunkStream;
pub use http::MercuryClient;
pub use sse::SseDecoder;
pub use sse::SseItem;
pub use types::ChatChunk;
pub use types::ChatCompletionRequest;
pub use types::ChatMessage;
pub use types::ChatResponse;
pub use types::Choice;
pub use types::ChunkChoice;
pub use types::DEFAULT_MODEL;
pub use types::Delta;
pub use types::FimChoice;
pub use types::FimCompletionRequest;
pub use types::FimResponse;
pub use types::Model;
pub use types::ModelList;
pub use types::ResponseMessage;
pub use types::Role;
pub use types::Usage;
