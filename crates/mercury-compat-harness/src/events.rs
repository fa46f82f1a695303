// crates/mercury-compat-harness/src/events.rs
// ============================================================================
// Module: Harness Events
// Description: Structured run events and the sinks that record them.
// Purpose: Emit run progress as JSON lines or console sections.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! The orchestrator records a [`HarnessEvent`] when the run starts, when each
//! check starts and finishes, and when the run completes. Sinks decide where
//! events go; recording never fails the run.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

use crate::report::CheckMode;
use crate::report::CheckPhase;
use crate::report::CheckName;
use crate::report::CheckResult;
use crate::report::RunPhase;
use crate::report::render_check_body;
use crate::report::render_heading;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Event payload variants.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HarnessEventKind {
    /// The run began.
    RunStarted {
        /// Number of checks scheduled.
        total: usize,
    },
    /// A check began.
    CheckStarted {
        /// Zero-based position in the run.
        index: usize,
        /// Which check.
        check: CheckName,
        /// How the check drives the collaborator.
        mode: CheckMode,
    },
    /// A check finished.
    CheckFinished {
        /// Zero-based position in the run.
        index: usize,
        /// Terminal phase the check reached.
        phase: CheckPhase,
        /// The check's result.
        result: CheckResult,
    },
    /// The run finished.
    RunCompleted {
        /// Passing checks.
        passed: usize,
        /// Checks run.
        total: usize,
        /// Final run phase.
        phase: RunPhase,
    },
}

/// Timestamped harness event.
#[derive(Debug, Clone, Serialize)]
pub struct HarnessEvent {
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Event payload.
    #[serde(flatten)]
    pub kind: HarnessEventKind,
}

impl HarnessEvent {
    /// Stamps an event with the current time.
    #[must_use]
    pub fn now(kind: HarnessEventKind) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            timestamp_ms,
            kind,
        }
    }
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Event sink interface.
pub trait HarnessEventSink: Send + Sync {
    /// Records an event.
    fn record(&self, event: &HarnessEvent);
}

/// Sink that logs JSON lines to stderr.
pub struct StderrEventSink;

impl HarnessEventSink for StderrEventSink {
    fn record(&self, event: &HarnessEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// No-op sink.
pub struct NoopEventSink;

impl HarnessEventSink for NoopEventSink {
    fn record(&self, _event: &HarnessEvent) {}
}

/// Sink that prints human-readable check sections as the run progresses.
pub struct ConsoleEventSink {
    /// Output handle.
    out: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleEventSink {
    /// Creates a console sink on stdout.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }

    /// Creates a console sink on an arbitrary writer.
    #[must_use]
    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }
}

impl HarnessEventSink for ConsoleEventSink {
    fn record(&self, event: &HarnessEvent) {
        let text = match &event.kind {
            HarnessEventKind::CheckStarted {
                check, ..
            } => render_heading(*check),
            HarnessEventKind::CheckFinished {
                result, ..
            } => render_check_body(result),
            HarnessEventKind::RunStarted {
                ..
            }
            | HarnessEventKind::RunCompleted {
                ..
            } => return,
        };
        if let Ok(mut out) = self.out.lock() {
            let _ = writeln!(out, "{text}");
            let _ = out.flush();
        }
    }
}

/// Sink that forwards every event to several sinks in order.
pub struct FanoutEventSink {
    /// Downstream sinks.
    sinks: Vec<Arc<dyn HarnessEventSink>>,
}

impl FanoutEventSink {
    /// Creates a fanout over the given sinks.
    #[must_use]
    pub fn new(sinks: Vec<Arc<dyn HarnessEventSink>>) -> Self {
        Self {
            sinks,
        }
    }
}

impl HarnessEventSink for FanoutEventSink {
    fn record(&self, event: &HarnessEvent) {
        for sink in &self.sinks {
            sink.record(event);
        }
    }
}
