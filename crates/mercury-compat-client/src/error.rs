// crates/mercury-compat-client/src/error.rs
// ============================================================================
// Module: Client Errors
// Description: Error taxonomy for the Mercury completion client.
// Purpose: Classify faults so callers can report and retry deterministically.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Every fault raised by the client is a [`ClientError`]. HTTP failures are
//! classified by status code; the human-readable message is lifted from the
//! service's `{"error":{"message":..}}` envelope when present.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Error Types
// ============================================================================

/// Mercury client errors.
///
/// # Invariants
/// - Variants are stable for retry classification and tests.
/// - String payloads may include untrusted server text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// Client configuration is unusable (missing credential, bad base URL).
    #[error("client config error: {0}")]
    Config(String),
    /// Request failed local validation; one entry per offending field.
    #[error("invalid request: {}", .0.join("; "))]
    Validation(Vec<String>),
    /// The service rejected the credential.
    #[error("authentication error: {0}")]
    Authentication(String),
    /// The service is throttling requests.
    #[error("rate limit exceeded: {message}")]
    RateLimited {
        /// Message returned by the service.
        message: String,
        /// Server-provided wait hint.
        retry_after: Option<Duration>,
    },
    /// The service failed with a 5xx status.
    #[error("server error ({status}): {message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Message returned by the service.
        message: String,
    },
    /// The service rejected the request with another non-success status.
    #[error("api error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message returned by the service.
        message: String,
    },
    /// Connection-level failure.
    #[error("transport error: {0}")]
    Transport(String),
    /// Response body could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),
    /// A streamed response failed after it started.
    #[error("stream error: {0}")]
    Stream(String),
    /// Response body exceeded the configured limit.
    #[error("response exceeds size limit ({actual} > {limit})")]
    ResponseTooLarge {
        /// Observed size in bytes.
        actual: usize,
        /// Maximum size in bytes.
        limit: usize,
    },
}

impl ClientError {
    /// Returns true when repeating the request may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Server { .. } | Self::RateLimited { .. })
    }

    /// Classifies a non-success HTTP response.
    #[must_use]
    pub fn from_status(status: u16, body: &[u8], retry_after: Option<Duration>) -> Self {
        let message = error_message(body).unwrap_or_else(|| format!("http status {status}"));
        match status {
            401 => Self::Authentication(message),
            429 => Self::RateLimited {
                message,
                retry_after,
            },
            500 ..= 599 => Self::Server {
                status,
                message,
            },
            _ => Self::Api {
                status,
                message,
            },
        }
    }
}

// ============================================================================
// SECTION: Error Envelope
// ============================================================================

/// Error envelope returned by the service.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    /// Error detail.
    error: ErrorBody,
}

/// Error detail inside the envelope.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    /// Human-readable message.
    message: String,
}

/// Extracts the most useful message from an error body.
fn error_message(body: &[u8]) -> Option<String> {
    if let Ok(envelope) = serde_json::from_slice::<ErrorEnvelope>(body) {
        return Some(envelope.error.message);
    }
    let text = String::from_utf8_lossy(body);
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
