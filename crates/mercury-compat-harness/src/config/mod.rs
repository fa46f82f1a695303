// crates/mercury-compat-harness/src/config/mod.rs
// ============================================================================
// Module: Harness Configuration
// Description: Environment-backed settings for a compatibility run.
// Purpose: Provide typed access to credential, endpoint, timing and models.
// Dependencies: mercury-compat-client, thiserror
// ============================================================================

//! ## Overview
//! Harness configuration is read from environment variables and mapped into a
//! [`HarnessConfig`] carrying the client config and the probe models.
//! Security posture: environment inputs are untrusted; the credential is never
//! rendered by `Debug`.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod env;

// ============================================================================
// SECTION: Tests
// ============================================================================


// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use env::ConfigError;
pub use env::HarnessConfig;
pub use env::HarnessEnv;
