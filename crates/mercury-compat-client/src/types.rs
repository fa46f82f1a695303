// crates/mercury-compat-client/src/types.rs
// ============================================================================
// Module: Completion API Wire Types
// Description: Request and response payloads for the Mercury completion API.
// Purpose: Model the remote contract with explicit "not populated" states.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Request types are strict: every field the client sends is typed and
//! validated before use. Response types are lenient: each contract field is an
//! [`Option`] so a payload with a missing field still decodes and the absence
//! can be reported as data rather than a decode failure.
//! Invariants:
//! - Unknown response fields are ignored.
//! - Missing response fields decode to `None` (or an empty list for chunk and
//!   model sequences).

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Model identifier used by the harness probes unless overridden.
pub const DEFAULT_MODEL: &str = "mercury-coder-small";

// ============================================================================
// SECTION: Messages
// ============================================================================

/// Conversation role for a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instruction.
    System,
    /// End-user turn.
    User,
    /// Model turn.
    Assistant,
}

/// A single chat message sent in a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Message author role.
    pub role: Role,
    /// Message text.
    pub content: String,
    /// Optional participant name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ChatMessage {
    /// Builds a system message.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
            name: None,
        }
    }

    /// Builds a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            name: None,
        }
    }

    /// Builds an assistant message.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            name: None,
        }
    }
}

// ============================================================================
// SECTION: Requests
// ============================================================================

/// Chat completion request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatCompletionRequest {
    /// Target model identifier.
    pub model: String,
    /// Conversation so far.
    pub messages: Vec<ChatMessage>,
    /// Sampling temperature in `[0, 2]`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Generation cap.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Nucleus sampling mass in `[0, 1]`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    /// Stop sequences.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub stop: Vec<String>,
    /// Streaming flag; set by the client for streaming calls.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
}

impl ChatCompletionRequest {
    /// Creates a request for `model` with the given messages and no options.
    #[must_use]
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            temperature: None,
            max_tokens: None,
            top_p: None,
            stop: Vec::new(),
            stream: None,
        }
    }

    /// Sets the generation cap.
    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Sets the sampling temperature.
    #[must_use]
    pub const fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Fill-in-the-middle completion request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FimCompletionRequest {
    /// Target model identifier.
    pub model: String,
    /// Code before the cursor.
    pub prompt: String,
    /// Code after the cursor.
    pub suffix: String,
    /// Generation cap.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Sampling temperature in `[0, 2]`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Nucleus sampling mass in `[0, 1]`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    /// Stop sequences.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub stop: Vec<String>,
}

impl FimCompletionRequest {
    /// Creates a request for `model` around the given prefix and suffix.
    #[must_use]
    pub fn new(
        model: impl Into<String>,
        prompt: impl Into<String>,
        suffix: impl Into<String>,
    ) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            suffix: suffix.into(),
            max_tokens: None,
            temperature: None,
            top_p: None,
            stop: Vec::new(),
        }
    }

    /// Sets the generation cap.
    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

// ============================================================================
// SECTION: Chat Responses
// ============================================================================

/// A generated message inside a chat completion choice.
///
/// Unlike [`ChatMessage`], every field is optional: servers send
/// `"content": null` for tool calls and some omit the role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseMessage {
    /// Message author role, when announced.
    #[serde(default)]
    pub role: Option<Role>,
    /// Message text; `null` decodes as absent.
    #[serde(default)]
    pub content: Option<String>,
}

/// Token accounting block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    /// Prompt tokens consumed.
    #[serde(default)]
    pub prompt_tokens: Option<u64>,
    /// Completion tokens produced.
    #[serde(default)]
    pub completion_tokens: Option<u64>,
    /// Sum of prompt and completion tokens.
    #[serde(default)]
    pub total_tokens: Option<u64>,
}

/// One chat completion alternative.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    /// Position in the choice list.
    #[serde(default)]
    pub index: Option<u32>,
    /// Generated message.
    #[serde(default)]
    pub message: Option<ResponseMessage>,
    /// Why generation stopped.
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Chat completion response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Response identifier.
    #[serde(default)]
    pub id: Option<String>,
    /// Object tag, `chat.completion` on conforming servers.
    #[serde(default)]
    pub object: Option<String>,
    /// Creation time in seconds since the epoch.
    #[serde(default)]
    pub created: Option<u64>,
    /// Model that served the request.
    #[serde(default)]
    pub model: Option<String>,
    /// Completion alternatives.
    #[serde(default)]
    pub choices: Option<Vec<Choice>>,
    /// Token accounting.
    #[serde(default)]
    pub usage: Option<Usage>,
}

impl ChatResponse {
    /// Returns the first choice, if any.
    #[must_use]
    pub fn first_choice(&self) -> Option<&Choice> {
        self.choices.as_deref().and_then(<[Choice]>::first)
    }

    /// Returns the first choice's message content, if any.
    #[must_use]
    pub fn first_content(&self) -> Option<&str> {
        self.first_choice()
            .and_then(|choice| choice.message.as_ref())
            .and_then(|message| message.content.as_deref())
    }
}

// ============================================================================
// SECTION: Streaming
// ============================================================================

/// Incremental message fragment inside a stream chunk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delta {
    /// Role announcement, usually only on the first chunk.
    #[serde(default)]
    pub role: Option<Role>,
    /// Partial text.
    #[serde(default)]
    pub content: Option<String>,
}

/// One choice inside a stream chunk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkChoice {
    /// Position in the choice list.
    #[serde(default)]
    pub index: Option<u32>,
    /// Incremental fragment.
    #[serde(default)]
    pub delta: Option<Delta>,
    /// Why generation stopped, on the final chunk.
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// One streamed chat completion chunk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatChunk {
    /// Stream identifier.
    #[serde(default)]
    pub id: Option<String>,
    /// Object tag, `chat.completion.chunk` on conforming servers.
    #[serde(default)]
    pub object: Option<String>,
    /// Creation time in seconds since the epoch.
    #[serde(default)]
    pub created: Option<u64>,
    /// Model that served the request.
    #[serde(default)]
    pub model: Option<String>,
    /// Per-choice fragments.
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,
}

impl ChatChunk {
    /// Builds a chunk carrying a single text fragment.
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            choices: vec![ChunkChoice {
                index: Some(0),
                delta: Some(Delta {
                    role: None,
                    content: Some(content.into()),
                }),
                finish_reason: None,
            }],
            ..Self::default()
        }
    }

    /// Returns the first choice's text fragment when it is present and non-empty.
    #[must_use]
    pub fn content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.delta.as_ref())
            .and_then(|delta| delta.content.as_deref())
            .filter(|content| !content.is_empty())
    }
}

// ============================================================================
// SECTION: Fill-in-the-Middle Responses
// ============================================================================

/// One FIM completion alternative.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FimChoice {
    /// Position in the choice list.
    #[serde(default)]
    pub index: Option<u32>,
    /// Generated middle section.
    #[serde(default)]
    pub text: Option<String>,
    /// Why generation stopped.
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// FIM completion response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FimResponse {
    /// Response identifier.
    #[serde(default)]
    pub id: Option<String>,
    /// Object tag.
    #[serde(default)]
    pub object: Option<String>,
    /// Creation time in seconds since the epoch.
    #[serde(default)]
    pub created: Option<u64>,
    /// Model that served the request.
    #[serde(default)]
    pub model: Option<String>,
    /// Completion alternatives.
    #[serde(default)]
    pub choices: Vec<FimChoice>,
    /// Token accounting.
    #[serde(default)]
    pub usage: Option<Usage>,
}

impl FimResponse {
    /// Returns the first choice's generated text, if any.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.choices.first().and_then(|choice| choice.text.as_deref())
    }
}

// ============================================================================
// SECTION: Models
// ============================================================================

/// A model advertised by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    /// Model identifier.
    pub id: String,
    /// Object tag.
    #[serde(default)]
    pub object: Option<String>,
    /// Creation time in seconds since the epoch.
    #[serde(default)]
    pub created: Option<u64>,
    /// Owning organization; `null` decodes as absent.
    #[serde(default)]
    pub owned_by: Option<String>,
}

/// Model listing response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelList {
    /// Object tag, `list` on conforming servers.
    #[serde(default)]
    pub object: Option<String>,
    /// Advertised models in server order.
    #[serde(default)]
    pub data: Vec<Model>,
}

impl ModelList {
    /// Returns true when a model with `id` is advertised.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.data.iter().any(|model| model.id == id)
    }
}
