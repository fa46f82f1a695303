// crates/mercury-compat-client/src/config.rs
// ============================================================================
// Module: Client Configuration
// Description: Connection settings for the Mercury completion client.
// Purpose: Hold credential, endpoint, timeout and retry settings.
// Dependencies: std
// ============================================================================

//! ## Overview
//! [`ClientConfig`] is a plain settings bag. It does not read the environment;
//! the harness configuration layer populates it. The credential is optional
//! here so that its absence surfaces when a client is constructed rather than
//! when settings are loaded.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.inceptionlabs.ai/v1";
/// Default whole-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Default initial retry delay.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);
/// Default retry budget. Zero disables retries.
pub const DEFAULT_MAX_RETRIES: u32 = 0;
/// Maximum response body accepted for non-streaming calls.
pub const MAX_RESPONSE_BYTES: usize = 4 * 1024 * 1024;

// ============================================================================
// SECTION: Config Types
// ============================================================================

/// Mercury client configuration.
///
/// # Invariants
/// - `base_url` carries no trailing slash once normalized by the client.
/// - `retry_delay` is the first backoff step; later steps double up to `10 × retry_delay`.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Bearer credential.
    pub api_key: Option<String>,
    /// API base URL, e.g. `https://api.inceptionlabs.ai/v1`.
    pub base_url: String,
    /// Whole-request timeout. Streaming calls apply it to connection setup only.
    pub timeout: Duration,
    /// Additional attempts for retryable faults.
    pub max_retries: u32,
    /// Initial retry delay.
    pub retry_delay: Duration,
    /// User agent sent with every request.
    pub user_agent: String,
}

impl ClientConfig {
    /// Builds a default configuration with the given credential.
    #[must_use]
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Self::default()
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
            user_agent: format!("mercury-compat/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .field("retry_delay", &self.retry_delay)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}
