// crates/mercury-compat-harness/src/orchestrator.rs
// ============================================================================
// Module: Harness Orchestrator
// Description: Runs every check once, in order, and builds the run report.
// Purpose: Own run and check lifecycles and emit progress events.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! A [`Harness`] runs the six checks sequentially in [`CheckName::ALL`]
//! order; the streaming check runs last. Checks never abort the run: a
//! failing check still yields a result and the next check starts. A harness
//! runs once; its run phase is terminal after completion.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use thiserror::Error;

use crate::checks::CheckContext;
use crate::checks::ProbeConfig;
use crate::checks::run_check;
use crate::collaborator::ClientFactory;
use crate::events::HarnessEvent;
use crate::events::HarnessEventKind;
use crate::events::HarnessEventSink;
use crate::events::NoopEventSink;
use crate::report::CheckName;
use crate::report::CheckPhase;
use crate::report::PhaseError;
use crate::report::RunPhase;
use crate::report::TestRunReport;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Orchestration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HarnessError {
    /// The harness was asked to move through an illegal lifecycle step.
    #[error("harness lifecycle error: {0}")]
    Phase(#[from] PhaseError),
}

// ============================================================================
// SECTION: Harness
// ============================================================================

/// Sequential check runner.
pub struct Harness {
    /// Source of collaborator instances.
    factory: Arc<dyn ClientFactory>,
    /// Probe models.
    probes: ProbeConfig,
    /// Event destination.
    sink: Arc<dyn HarnessEventSink>,
    /// Current run phase.
    phase: RunPhase,
}

impl Harness {
    /// Creates a harness that records no events.
    #[must_use]
    pub fn new(factory: Arc<dyn ClientFactory>, probes: ProbeConfig) -> Self {
        Self {
            factory,
            probes,
            sink: Arc::new(NoopEventSink),
            phase: RunPhase::NotStarted,
        }
    }

    /// Replaces the event sink.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn HarnessEventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Returns the current run phase.
    #[must_use]
    pub const fn phase(&self) -> RunPhase {
        self.phase
    }

    /// Runs every check and returns the report.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Phase`] when the harness has already run.
    pub async fn run(&mut self) -> Result<TestRunReport, HarnessError> {
        self.phase = self.phase.transition(RunPhase::InProgress)?;
        self.record(HarnessEventKind::RunStarted {
            total: CheckName::ALL.len(),
        });

        let context = CheckContext {
            factory: self.factory.as_ref(),
            probes: &self.probes,
        };
        let mut results = Vec::with_capacity(CheckName::ALL.len());
        for (index, name) in CheckName::ALL.into_iter().enumerate() {
            let running = CheckPhase::NotRun.transition(CheckPhase::Running)?;
            self.record(HarnessEventKind::CheckStarted {
                index,
                check: name,
                mode: name.mode(),
            });
            let result = run_check(name, &context).await;
            let phase = running.transition(result.phase())?;
            self.record(HarnessEventKind::CheckFinished {
                index,
                phase,
                result: result.clone(),
            });
            results.push(result);
        }

        let report = TestRunReport::new(results);
        self.phase = self.phase.transition(RunPhase::Complete)?;
        self.record(HarnessEventKind::RunCompleted {
            passed: report.passed,
            total: report.total,
            phase: self.phase,
        });
        Ok(report)
    }

    /// Stamps and records an event.
    fn record(&self, kind: HarnessEventKind) {
        self.sink.record(&HarnessEvent::now(kind));
    }
}
