// crates/mercury-compat-harness/src/report.rs
// ============================================================================
// Module: Compatibility Report
// Description: Check names, lifecycle phases, results and run summaries.
// Purpose: Provide the data model consumed by the orchestrator and renderers.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Every check produces exactly one [`CheckResult`]; a run produces one
//! [`TestRunReport`] whose counts are derived once from its results.
//! Lifecycle enums reject illegal transitions with [`PhaseError`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write as _;

use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Check Names
// ============================================================================

/// Identity of a compatibility check.
///
/// # Invariants
/// - Labels are stable; they appear in rendered output and JSON reports.
/// - [`CheckName::ALL`] is the fixed execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CheckName {
    /// Client construction with the configured credential.
    #[serde(rename = "Basic Connection")]
    Connectivity,
    /// Model listing.
    #[serde(rename = "List Models")]
    ModelListing,
    /// Non-streaming chat completion.
    #[serde(rename = "Chat Completion")]
    ChatCompletion,
    /// Fill-in-the-middle completion.
    #[serde(rename = "FIM Completion")]
    FimCompletion,
    /// Response contract field verification.
    #[serde(rename = "API Structure")]
    ResponseStructure,
    /// Streamed chat completion.
    #[serde(rename = "Streaming")]
    Streaming,
}

impl CheckName {
    /// Checks in execution order. The streaming check always runs last.
    pub const ALL: [Self; 6] = [
        Self::Connectivity,
        Self::ModelListing,
        Self::ChatCompletion,
        Self::FimCompletion,
        Self::ResponseStructure,
        Self::Streaming,
    ];

    /// Returns the stable display label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Connectivity => "Basic Connection",
            Self::ModelListing => "List Models",
            Self::ChatCompletion => "Chat Completion",
            Self::FimCompletion => "FIM Completion",
            Self::ResponseStructure => "API Structure",
            Self::Streaming => "Streaming",
        }
    }

    /// Returns how the check talks to the collaborator.
    #[must_use]
    pub const fn mode(self) -> CheckMode {
        match self {
            Self::Streaming => CheckMode::Streaming,
            _ => CheckMode::Request,
        }
    }
}

/// Execution mode of a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckMode {
    /// One request, one response.
    Request,
    /// Incremental chunks pulled until the stream ends.
    Streaming,
}

impl CheckMode {
    /// Returns a stable label for the mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Request => "request",
            Self::Streaming => "streaming",
        }
    }
}

// ============================================================================
// SECTION: Lifecycle
// ============================================================================

/// Illegal lifecycle transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("illegal transition from {from} to {to}")]
pub struct PhaseError {
    /// Phase label before the transition.
    pub from: &'static str,
    /// Requested phase label.
    pub to: &'static str,
}

/// Lifecycle of a single check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckPhase {
    /// Not yet started.
    NotRun,
    /// Executing.
    Running,
    /// Finished and passed.
    Passed,
    /// Finished and failed.
    Failed,
}

impl CheckPhase {
    /// Returns a stable label for the phase.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotRun => "not_run",
            Self::Running => "running",
            Self::Passed => "passed",
            Self::Failed => "failed",
        }
    }

    /// Returns true for `Passed` and `Failed`.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Passed | Self::Failed)
    }

    /// Moves to `next` when the lifecycle allows it.
    ///
    /// # Errors
    ///
    /// Returns [`PhaseError`] for any transition other than
    /// `NotRun -> Running` or `Running -> Passed | Failed`.
    pub const fn transition(self, next: Self) -> Result<Self, PhaseError> {
        match (self, next) {
            (Self::NotRun, Self::Running) | (Self::Running, Self::Passed | Self::Failed) => {
                Ok(next)
            }
            _ => Err(PhaseError {
                from: self.as_str(),
                to: next.as_str(),
            }),
        }
    }
}

/// Lifecycle of a whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    /// No check has started.
    NotStarted,
    /// Checks are executing.
    InProgress,
    /// All checks have finished. Terminal.
    Complete,
}

impl RunPhase {
    /// Returns a stable label for the phase.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::Complete => "complete",
        }
    }

    /// Moves to `next` when the lifecycle allows it.
    ///
    /// # Errors
    ///
    /// Returns [`PhaseError`] for any transition other than
    /// `NotStarted -> InProgress` or `InProgress -> Complete`.
    pub const fn transition(self, next: Self) -> Result<Self, PhaseError> {
        match (self, next) {
            (Self::NotStarted, Self::InProgress) | (Self::InProgress, Self::Complete) => Ok(next),
            _ => Err(PhaseError {
                from: self.as_str(),
                to: next.as_str(),
            }),
        }
    }
}

// ============================================================================
// SECTION: Results
// ============================================================================

/// Outcome of one check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    /// Which check produced this result.
    pub name: CheckName,
    /// Whether the check passed.
    pub passed: bool,
    /// Ordered diagnostic lines.
    pub diagnostics: Vec<String>,
}

impl CheckResult {
    /// Builds a passing result.
    #[must_use]
    pub const fn passed(name: CheckName, diagnostics: Vec<String>) -> Self {
        Self {
            name,
            passed: true,
            diagnostics,
        }
    }

    /// Builds a failing result.
    #[must_use]
    pub const fn failed(name: CheckName, diagnostics: Vec<String>) -> Self {
        Self {
            name,
            passed: false,
            diagnostics,
        }
    }

    /// Returns the terminal phase matching this result.
    #[must_use]
    pub const fn phase(&self) -> CheckPhase {
        if self.passed { CheckPhase::Passed } else { CheckPhase::Failed }
    }
}

/// Aggregate outcome of a run.
///
/// # Invariants
/// - `total == results.len()` and `passed` counts results with `passed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestRunReport {
    /// Results in execution order.
    pub results: Vec<CheckResult>,
    /// Number of passing results.
    pub passed: usize,
    /// Number of results.
    pub total: usize,
}

impl TestRunReport {
    /// Builds a report and derives its counts.
    #[must_use]
    pub fn new(results: Vec<CheckResult>) -> Self {
        let passed = results.iter().filter(|result| result.passed).count();
        let total = results.len();
        Self {
            results,
            passed,
            total,
        }
    }

    /// Returns true when every check passed.
    #[must_use]
    pub const fn success(&self) -> bool {
        self.passed == self.total
    }

    /// Process exit status for this report.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        if self.success() { 0 } else { 1 }
    }

    /// Looks up the result for a check.
    #[must_use]
    pub fn result(&self, name: CheckName) -> Option<&CheckResult> {
        self.results.iter().find(|result| result.name == name)
    }
}

// ============================================================================
// SECTION: Rendering
// ============================================================================

/// Returns the PASS/FAIL marker for a result.
#[must_use]
pub const fn marker(passed: bool) -> &'static str {
    if passed { "PASS" } else { "FAIL" }
}

/// Renders the section heading printed when a check starts.
#[must_use]
pub fn render_heading(name: CheckName) -> String {
    format!("\n=== {} ===", name.as_str())
}

/// Renders the body of a finished check: diagnostics then the marker line.
#[must_use]
pub fn render_check_body(result: &CheckResult) -> String {
    let mut out = String::new();
    for line in &result.diagnostics {
        let _ = writeln!(out, "  {line}");
    }
    let _ = write!(out, "[{}] {}", marker(result.passed), result.name.as_str());
    out
}

/// Renders a full check section.
#[must_use]
pub fn render_check(result: &CheckResult) -> String {
    format!("{}\n{}", render_heading(result.name), render_check_body(result))
}

/// Renders the closing summary table.
#[must_use]
pub fn render_summary(report: &TestRunReport) -> String {
    let width = report.results.iter().map(|result| result.name.as_str().len()).max().unwrap_or(0);
    let mut out = String::from("\n=== Summary ===\n");
    for result in &report.results {
        let _ = writeln!(out, "{:<width$}  {}", result.name.as_str(), marker(result.passed));
    }
    let _ = writeln!(out, "\nTotal: {}/{} tests passed", report.passed, report.total);
    if report.success() {
        out.push_str("All tests passed. The Mercury API is compatible.");
    } else {
        out.push_str("Some tests failed. Check the diagnostics above.");
    }
    out
}
