// crates/mercury-compat-harness/src/checks.rs
// ============================================================================
// Module: Compatibility Checks
// Description: The six probes run against the completion collaborator.
// Purpose: Turn collaborator calls into pass/fail results with diagnostics.
// Dependencies: mercury-compat-client, thiserror
// ============================================================================

//! ## Overview
//! Each probe returns `Result<(), ProbeError>` and appends diagnostics as it
//! goes. [`run_check`] is the fault boundary: a probe error becomes a failing
//! [`CheckResult`] with the fault message as its last diagnostic, so nothing
//! raised by the collaborator escapes a check.

// ============================================================================
// SECTION: Imports
// ============================================================================

use mercury_compat_client::ChatCompletionRequest;
use mercury_compat_client::ChatMessage;
use mercury_compat_client::ClientError;
use mercury_compat_client::DEFAULT_MODEL;
use mercury_compat_client::FimCompletionRequest;
use thiserror::Error;

use crate::collaborator::ClientFactory;
use crate::report::CheckName;
use crate::report::CheckResult;
use crate::stream::aggregate_stream;
use crate::structure::verify_structure;

// ============================================================================
// SECTION: Probe Parameters
// ============================================================================

/// System prompt for the chat probe.
pub const CHAT_SYSTEM_PROMPT: &str = "You are a helpful coding assistant";
/// User prompt for the chat probe.
pub const CHAT_USER_PROMPT: &str = "Write a simple Python hello world function";
/// Token cap for the chat probe.
pub const CHAT_MAX_TOKENS: u32 = 100;
/// Sampling temperature for the chat probe.
pub const CHAT_TEMPERATURE: f64 = 0.3;
/// Code before the gap in the FIM probe.
pub const FIM_PROMPT: &str = "def calculate_average(numbers):\n    total = ";
/// Code after the gap in the FIM probe.
pub const FIM_SUFFIX: &str = "\n    return total / len(numbers)";
/// Token cap for the FIM probe.
pub const FIM_MAX_TOKENS: u32 = 50;
/// User prompt for the structure probe.
pub const STRUCTURE_PROMPT: &str = "Hi";
/// Token cap for the structure probe.
pub const STRUCTURE_MAX_TOKENS: u32 = 10;
/// User prompt for the streaming probe.
pub const STREAM_PROMPT: &str = "Count from 1 to 5";
/// Token cap for the streaming probe.
pub const STREAM_MAX_TOKENS: u32 = 50;
/// Characters of generated text echoed into diagnostics.
pub const PREVIEW_CHARS: usize = 100;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Models used by the probes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    /// Model requested by every completion probe.
    pub model: String,
    /// Model the listing check looks for.
    pub expected_model: String,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            expected_model: DEFAULT_MODEL.to_string(),
        }
    }
}

/// Why a probe failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    /// The collaborator raised a fault.
    #[error(transparent)]
    Collaborator(#[from] ClientError),
    /// The collaborator answered but the answer broke the contract.
    #[error("{0}")]
    Contract(String),
}

/// Everything a probe needs.
pub struct CheckContext<'a> {
    /// Source of collaborator instances.
    pub factory: &'a dyn ClientFactory,
    /// Probe models.
    pub probes: &'a ProbeConfig,
}

// ============================================================================
// SECTION: Dispatch
// ============================================================================

/// Runs one check and converts every fault into a failing result.
pub async fn run_check(name: CheckName, context: &CheckContext<'_>) -> CheckResult {
    let mut diagnostics = Vec::new();
    let outcome = match name {
        CheckName::Connectivity => connectivity(context, &mut diagnostics),
        CheckName::ModelListing => model_listing(context, &mut diagnostics).await,
        CheckName::ChatCompletion => chat_completion(context, &mut diagnostics).await,
        CheckName::FimCompletion => fim_completion(context, &mut diagnostics).await,
        CheckName::ResponseStructure => response_structure(context, &mut diagnostics).await,
        CheckName::Streaming => streaming(context, &mut diagnostics).await,
    };
    match outcome {
        Ok(()) => CheckResult::passed(name, diagnostics),
        Err(err) => {
            diagnostics.push(format!("error: {err}"));
            CheckResult::failed(name, diagnostics)
        }
    }
}

// ============================================================================
// SECTION: Probes
// ============================================================================

/// Passes when a collaborator can be constructed.
fn connectivity(
    context: &CheckContext<'_>,
    diagnostics: &mut Vec<String>,
) -> Result<(), ProbeError> {
    context.factory.connect()?;
    diagnostics.push("client initialized".to_string());
    Ok(())
}

/// Passes when the listing is non-empty; a missing expected model only warns.
async fn model_listing(
    context: &CheckContext<'_>,
    diagnostics: &mut Vec<String>,
) -> Result<(), ProbeError> {
    let client = context.factory.connect()?;
    let models = client.list_models().await?;
    if models.data.is_empty() {
        return Err(ProbeError::Contract("model list is empty".to_string()));
    }
    diagnostics.push(format!("found {} models", models.data.len()));
    for model in &models.data {
        let owner = or_missing(model.owned_by.as_deref());
        diagnostics.push(format!("- {} (owned by {owner})", model.id));
    }
    let expected = &context.probes.expected_model;
    if models.contains(expected) {
        diagnostics.push(format!("{expected} is available"));
    } else {
        diagnostics.push(format!("warning: {expected} not found in model list"));
    }
    Ok(())
}

/// Passes when the first choice carries non-empty content.
async fn chat_completion(
    context: &CheckContext<'_>,
    diagnostics: &mut Vec<String>,
) -> Result<(), ProbeError> {
    let client = context.factory.connect()?;
    let request = ChatCompletionRequest::new(
        context.probes.model.clone(),
        vec![ChatMessage::system(CHAT_SYSTEM_PROMPT), ChatMessage::user(CHAT_USER_PROMPT)],
    )
    .with_max_tokens(CHAT_MAX_TOKENS)
    .with_temperature(CHAT_TEMPERATURE);
    let response = client.chat_completion(&request).await?;
    diagnostics.push(format!("model: {}", or_missing(response.model.as_deref())));
    diagnostics.push(format!(
        "total tokens: {}",
        or_missing(response.usage.as_ref().and_then(|usage| usage.total_tokens))
    ));
    let Some(content) = response.first_content().filter(|content| !content.is_empty()) else {
        return Err(ProbeError::Contract("first choice returned no content".to_string()));
    };
    diagnostics.push(format!("response: {}", preview(content)));
    Ok(())
}

/// Passes when the first choice carries non-empty generated text.
async fn fim_completion(
    context: &CheckContext<'_>,
    diagnostics: &mut Vec<String>,
) -> Result<(), ProbeError> {
    let client = context.factory.connect()?;
    let request = FimCompletionRequest::new(context.probes.model.clone(), FIM_PROMPT, FIM_SUFFIX)
        .with_max_tokens(FIM_MAX_TOKENS);
    let response = client.fim_completion(&request).await?;
    let Some(text) = response.text().filter(|text| !text.is_empty()) else {
        return Err(ProbeError::Contract("no generated text returned".to_string()));
    };
    diagnostics.push(format!("generated: {}", preview(text)));
    diagnostics.push(format!(
        "completion tokens: {}",
        or_missing(response.usage.as_ref().and_then(|usage| usage.completion_tokens))
    ));
    Ok(())
}

/// Reports every contract field; passes only when none is missing.
async fn response_structure(
    context: &CheckContext<'_>,
    diagnostics: &mut Vec<String>,
) -> Result<(), ProbeError> {
    let client = context.factory.connect()?;
    let request = ChatCompletionRequest::new(
        context.probes.model.clone(),
        vec![ChatMessage::user(STRUCTURE_PROMPT)],
    )
    .with_max_tokens(STRUCTURE_MAX_TOKENS);
    let response = client.chat_completion(&request).await?;
    let report = verify_structure(&response);
    diagnostics.extend(report.fields.iter().map(|field| field.describe()));
    if report.is_complete() {
        return Ok(());
    }
    let missing = report
        .missing()
        .map(|field| format!("{}.{}", field.scope.as_str(), field.field))
        .collect::<Vec<_>>()
        .join(", ");
    Err(ProbeError::Contract(format!("missing required fields: {missing}")))
}

/// Passes when the stream completes without a fault, even with no content.
async fn streaming(
    context: &CheckContext<'_>,
    diagnostics: &mut Vec<String>,
) -> Result<(), ProbeError> {
    let client = context.factory.connect()?;
    let request = ChatCompletionRequest::new(
        context.probes.model.clone(),
        vec![ChatMessage::user(STREAM_PROMPT)],
    )
    .with_max_tokens(STREAM_MAX_TOKENS);
    let stream = client.chat_completion_stream(&request).await?;
    let aggregate = aggregate_stream(stream).await?;
    diagnostics.push(format!("received {} chunks", aggregate.chunk_count));
    diagnostics.push(format!("full response: {}", preview(&aggregate.full_text)));
    Ok(())
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Truncates text to [`PREVIEW_CHARS`] characters, marking the cut.
#[must_use]
pub fn preview(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() { format!("{head}...") } else { head }
}

/// Formats an optional value, naming absence explicitly.
fn or_missing<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "<missing>".to_string(), |value| value.to_string())
}
