// crates/mercury-compat-harness/src/collaborator.rs
// ============================================================================
// Module: Completion Collaborator
// Description: The API surface the checks drive, and how it is constructed.
// Purpose: Decouple checks from the HTTP client so they can run against stubs.
// Dependencies: async-trait, mercury-compat-client
// ============================================================================

//! ## Overview
//! [`CompletionApi`] is the only seam between checks and the service. Every
//! check obtains its own instance from a [`ClientFactory`]; construction
//! failures surface as [`ClientError`] like any other collaborator fault.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use async_trait::async_trait;
use mercury_compat_client::ChatCompletionRequest;
use mercury_compat_client::ChatResponse;
use mercury_compat_client::ChunkStream;
use mercury_compat_client::ClientConfig;
use mercury_compat_client::ClientError;
use mercury_compat_client::FimCompletionRequest;
use mercury_compat_client::FimResponse;
use mercury_compat_client::MercuryClient;
use mercury_compat_client::ModelList;

// ============================================================================
// SECTION: Traits
// ============================================================================

/// Completion API operations exercised by the checks.
#[async_trait]
pub trait CompletionApi: Send + Sync {
    /// Lists available models.
    async fn list_models(&self) -> Result<ModelList, ClientError>;

    /// Runs a non-streaming chat completion.
    async fn chat_completion(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatResponse, ClientError>;

    /// Runs a fill-in-the-middle completion.
    async fn fim_completion(
        &self,
        request: &FimCompletionRequest,
    ) -> Result<FimResponse, ClientError>;

    /// Opens a streamed chat completion.
    async fn chat_completion_stream(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChunkStream, ClientError>;
}

/// Builds collaborator instances.
pub trait ClientFactory: Send + Sync {
    /// Constructs a fresh collaborator.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the collaborator cannot be constructed,
    /// for example because the credential is missing.
    fn connect(&self) -> Result<Arc<dyn CompletionApi>, ClientError>;
}

// ============================================================================
// SECTION: HTTP Collaborator
// ============================================================================

#[async_trait]
impl CompletionApi for MercuryClient {
    async fn list_models(&self) -> Result<ModelList, ClientError> {
        Self::list_models(self).await
    }

    async fn chat_completion(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatResponse, ClientError> {
        Self::chat_completion(self, request).await
    }

    async fn fim_completion(
        &self,
        request: &FimCompletionRequest,
    ) -> Result<FimResponse, ClientError> {
        Self::fim_completion(self, request).await
    }

    async fn chat_completion_stream(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChunkStream, ClientError> {
        Self::chat_completion_stream(self, request).await
    }
}

/// Factory producing [`MercuryClient`] instances from a fixed config.
#[derive(Debug, Clone)]
pub struct HttpClientFactory {
    /// Config applied to every constructed client.
    config: ClientConfig,
}

impl HttpClientFactory {
    /// Creates a factory for the given config.
    #[must_use]
    pub const fn new(config: ClientConfig) -> Self {
        Self {
            config,
        }
    }

    /// Returns the config used for construction.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }
}

impl ClientFactory for HttpClientFactory {
    fn connect(&self) -> Result<Arc<dyn CompletionApi>, ClientError> {
        let client = MercuryClient::new(self.config.clone())?;
        Ok(Arc::new(client))
    }
}
