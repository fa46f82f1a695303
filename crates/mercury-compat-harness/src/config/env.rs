// crates/mercury-compat-harness/src/config/env.rs
// ============================================================================
// Module: Harness Environment
// Description: Environment-backed configuration for compatibility runs.
// Purpose: Centralize env parsing with strict UTF-8 validation.
// Dependencies: mercury-compat-client, thiserror
// ============================================================================

//! ## Overview
//! Environment values are parsed with strict UTF-8 enforcement to avoid silent
//! misconfiguration. Invalid values fail closed with a [`ConfigError`]. The
//! credential is the exception: an absent or empty key is carried as `None`
//! and reported by the connectivity check instead.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::ffi::OsString;
use std::time::Duration;

use mercury_compat_client::ClientConfig;
use thiserror::Error;

use crate::checks::ProbeConfig;

// ============================================================================
// SECTION: Environment Constants
// ============================================================================

/// Environment keys for harness configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarnessEnv {
    /// Bearer credential.
    ApiKey,
    /// Base URL override.
    ApiUrl,
    /// Per-request timeout in milliseconds (positive integer).
    RequestTimeout,
    /// Retry budget after the first attempt (non-negative integer).
    RetryMaxAttempts,
    /// Initial retry delay in milliseconds (positive integer).
    RetryInitialDelay,
    /// Model requested by the probes.
    Model,
    /// Model the listing check looks for.
    ExpectedModel,
}

impl HarnessEnv {
    /// Every key, in documentation order.
    pub const ALL: [Self; 7] = [
        Self::ApiKey,
        Self::ApiUrl,
        Self::RequestTimeout,
        Self::RetryMaxAttempts,
        Self::RetryInitialDelay,
        Self::Model,
        Self::ExpectedModel,
    ];

    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ApiKey => "MERCURY_API_KEY",
            Self::ApiUrl => "MERCURY_API_URL",
            Self::RequestTimeout => "REQUEST_TIMEOUT",
            Self::RetryMaxAttempts => "RETRY_MAX_ATTEMPTS",
            Self::RetryInitialDelay => "RETRY_INITIAL_DELAY",
            Self::Model => "MERCURY_COMPAT_MODEL",
            Self::ExpectedModel => "MERCURY_COMPAT_EXPECTED_MODEL",
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Value is not valid UTF-8.
    #[error("{name} must be valid UTF-8")]
    NotUtf8 {
        /// Variable name.
        name: &'static str,
    },
    /// Value is set but empty or whitespace.
    #[error("{name} must not be empty")]
    Empty {
        /// Variable name.
        name: &'static str,
    },
    /// Value failed validation.
    #[error("{name} {reason}")]
    Invalid {
        /// Variable name.
        name: &'static str,
        /// What the value must be.
        reason: &'static str,
    },
}

// ============================================================================
// SECTION: Config Types
// ============================================================================

/// Typed harness configuration derived from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HarnessConfig {
    /// Client construction settings.
    pub client: ClientConfig,
    /// Probe models.
    pub probes: ProbeConfig,
}

impl HarnessConfig {
    /// Loads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a value is not valid UTF-8, is empty, or
    /// fails validation. A missing credential is not an error.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(|name| std::env::var_os(name))
    }

    /// Loads configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] under the same conditions as [`Self::load`].
    pub fn load_with<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let mut config = Self::default();
        config.client.api_key = read_strict(&lookup, HarnessEnv::ApiKey)?
            .filter(|value| !value.trim().is_empty());
        if let Some(url) = read_nonempty(&lookup, HarnessEnv::ApiUrl)? {
            config.client.base_url = url.trim().to_string();
        }
        if let Some(raw) = read_nonempty(&lookup, HarnessEnv::RequestTimeout)? {
            config.client.timeout = parse_positive_millis(HarnessEnv::RequestTimeout, &raw)?;
        }
        if let Some(raw) = read_nonempty(&lookup, HarnessEnv::RetryMaxAttempts)? {
            config.client.max_retries = parse_count(HarnessEnv::RetryMaxAttempts, &raw)?;
        }
        if let Some(raw) = read_nonempty(&lookup, HarnessEnv::RetryInitialDelay)? {
            config.client.retry_delay = parse_positive_millis(HarnessEnv::RetryInitialDelay, &raw)?;
        }
        if let Some(model) = read_nonempty(&lookup, HarnessEnv::Model)? {
            config.probes.model = model.trim().to_string();
        }
        if let Some(model) = read_nonempty(&lookup, HarnessEnv::ExpectedModel)? {
            config.probes.expected_model = model.trim().to_string();
        }
        Ok(config)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads a variable through `lookup` and enforces UTF-8 validity.
fn read_strict<F>(lookup: &F, key: HarnessEnv) -> Result<Option<String>, ConfigError>
where
    F: Fn(&str) -> Option<OsString>,
{
    let name = key.as_str();
    lookup(name).map_or(Ok(None), |raw| {
        raw.into_string().map(Some).map_err(|_| ConfigError::NotUtf8 {
            name,
        })
    })
}

/// Reads a variable and rejects empty values.
fn read_nonempty<F>(lookup: &F, key: HarnessEnv) -> Result<Option<String>, ConfigError>
where
    F: Fn(&str) -> Option<OsString>,
{
    match read_strict(lookup, key)? {
        Some(value) if value.trim().is_empty() => Err(ConfigError::Empty {
            name: key.as_str(),
        }),
        value => Ok(value),
    }
}

/// Parses a positive millisecond duration.
fn parse_positive_millis(key: HarnessEnv, raw: &str) -> Result<Duration, ConfigError> {
    let invalid = ConfigError::Invalid {
        name: key.as_str(),
        reason: "must be a positive integer number of milliseconds",
    };
    let millis: u64 = raw.trim().parse().map_err(|_| invalid.clone())?;
    if millis == 0 {
        return Err(invalid);
    }
    Ok(Duration::from_millis(millis))
}

/// Parses a non-negative count.
fn parse_count(key: HarnessEnv, raw: &str) -> Result<u32, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::Invalid {
        name: key.as_str(),
        reason: "must be a non-negative integer",
    })
}
