// crates/mercury-compat-harness/src/lib.rs
// ============================================================================
// Module: Mercury Compat Harness Library
// Description: Compatibility checks for the Mercury completion API.
// Purpose: Run a fixed battery of checks and report pass/fail per check.
// Dependencies: mercury-compat-client, async-trait, serde, thiserror
// ============================================================================

//! ## Overview
//! The harness runs six checks in a fixed order against a completion
//! collaborator: connectivity, model listing, chat completion,
//! fill-in-the-middle completion, response structure and streaming. Each
//! check yields one [`CheckResult`]; the run yields one [`TestRunReport`].
//! Invariants:
//! - Exactly one result per check, in execution order.
//! - Collaborator faults are contained at the check boundary.
//! - The streaming check runs last.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod checks;
pub mod collaborator;
pub mod config;
pub mod events;
pub mod orchestrator;
pub mod report;
pub mod stream;
pub mod structure;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use checks::ProbeConfig;
pub use checks::ProbeError;
pub use collaborator::ClientFactory;
pub use collaborator::CompletionApi;
pub use collaborator::HttpClientFactory;
pub use config::ConfigError;
pub use config::HarnessConfig;
pub use events::ConsoleEventSink;
pub use events::FanoutEventSink;
pub use events::HarnessEvent;
pub use events::HarnessEventKind;
pub use events::HarnessEventSink;
pub use events::NoopEventSink;
pub use events::StderrEventSink;
pub use orchestrator::Harness;
pub use orchestrator::HarnessError;
pub use report::CheckMode;
pub use report::CheckName;
pub use report::CheckPhase;
pub use report::CheckResult;
pub use report::RunPhase;
pub use report::TestRunReport;
pub use stream::StreamAggregate;
pub use structure::StructureReport;
