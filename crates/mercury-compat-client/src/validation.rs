// crates/mercury-compat-client/src/validation.rs
// ============================================================================
// Module: Request Validation
// Description: Local bounds checks for completion requests.
// Purpose: Reject malformed requests before any network call.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Validation collects every violation instead of stopping at the first, so a
//! caller sees the full list of offending fields in one error.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::error::ClientError;
use crate::types::ChatCompletionRequest;
use crate::types::FimCompletionRequest;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Upper bound for chat `max_tokens`.
pub const MAX_CHAT_TOKENS: u32 = 32_000;
/// Upper bound for FIM `max_tokens`.
pub const MAX_FIM_TOKENS: u32 = 4_096;
/// Upper bound for sampling temperature.
pub const MAX_TEMPERATURE: f64 = 2.0;

// ============================================================================
// SECTION: Validators
// ============================================================================

/// Validates a chat completion request.
///
/// # Errors
///
/// Returns [`ClientError::Validation`] listing every violated constraint.
pub fn validate_chat(request: &ChatCompletionRequest) -> Result<(), ClientError> {
    let mut errors = Vec::new();
    if request.model.trim().is_empty() {
        errors.push("model: must not be empty".to_string());
    }
    if request.messages.is_empty() {
        errors.push("messages: at least one message is required".to_string());
    }
    for (index, message) in request.messages.iter().enumerate() {
        if message.content.is_empty() {
            errors.push(format!("messages.{index}.content: must not be empty"));
        }
    }
    check_sampling(request.temperature, request.top_p, &mut errors);
    check_max_tokens(request.max_tokens, MAX_CHAT_TOKENS, &mut errors);
    finish(errors)
}

/// Validates a fill-in-the-middle completion request.
///
/// # Errors
///
/// Returns [`ClientError::Validation`] listing every violated constraint.
pub fn validate_fim(request: &FimCompletionRequest) -> Result<(), ClientError> {
    let mut errors = Vec::new();
    if request.model.trim().is_empty() {
        errors.push("model: must not be empty".to_string());
    }
    check_sampling(request.temperature, request.top_p, &mut errors);
    check_max_tokens(request.max_tokens, MAX_FIM_TOKENS, &mut errors);
    finish(errors)
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Checks temperature and `top_p` ranges.
fn check_sampling(temperature: Option<f64>, top_p: Option<f64>, errors: &mut Vec<String>) {
    if let Some(value) = temperature
        && !(0.0 ..= MAX_TEMPERATURE).contains(&value)
    {
        errors.push(format!("temperature: must be between 0 and {MAX_TEMPERATURE}"));
    }
    if let Some(value) = top_p
        && !(0.0 ..= 1.0).contains(&value)
    {
        errors.push("top_p: must be between 0 and 1".to_string());
    }
}

/// Checks that `max_tokens` is positive and within `limit`.
fn check_max_tokens(max_tokens: Option<u32>, limit: u32, errors: &mut Vec<String>) {
    match max_tokens {
        Some(0) => errors.push("max_tokens: must be positive".to_string()),
        Some(value) if value > limit => {
            errors.push(format!("max_tokens: must be at most {limit}"));
        }
        _ => {}
    }
}

/// Converts collected violations into a result.
fn finish(errors: Vec<String>) -> Result<(), ClientError> {
    if errors.is_empty() { Ok(()) } else { Err(ClientError::Validation(errors)) }
}
