//! Structured observability hooks for detection run lifecycle events.
//!
//! This module provides:
//! - Run-scoped tracing spans via `RunSpan` RAII guard
//! - Emission functions for key lifecycle events: start, per-award scoring,
//!   flagged detections, cancellation, finish, gate evaluation
//!
//! Events are emitted at `info!` level except `detection.flagged` (`error!`)
//! and `run.cancelled` (`warn!`). Verbosity follows `RUST_LOG`; see
//! [`crate::telemetry::init_tracing`] for JSON output.

use tracing::{error, info, warn};
use transition_domain::ValidationIssueKind;

/// RAII guard that enters a run-scoped tracing span for the duration of a run.
///
/// # Example
///
/// ```ignore
/// let _span = RunSpan::enter("4b0c...");
/// // Every tracing call below is associated with run_id = "4b0c..."
/// ```
pub struct RunSpan {
    _span: tracing::span::EnteredSpan,
}

impl RunSpan {
    /// Create and enter a span tagged with the run_id.
    pub fn enter(run_id: &str) -> Self {
        Self {
            _span: run_span(run_id).entered(),
        }
    }
}

/// The run-scoped span, unentered. Async code attaches it with
/// `tracing::Instrument` instead of holding a [`RunSpan`] across awaits.
pub fn run_span(run_id: &str) -> tracing::Span {
    tracing::info_span!("transition.run", run_id = %run_id)
}

/// Emit event: run started with input sizes.
pub fn emit_run_started(run_id: &str, awards: usize, contracts: usize, patents: usize) {
    info!(
        event = "run.started",
        run_id = %run_id,
        awards = awards,
        contracts = contracts,
        patents = patents,
    );
}

/// Emit event: one award finished scoring.
pub fn emit_award_scored(award_id: &str, vendor_matched: usize, detections: usize) {
    info!(
        event = "award.scored",
        award_id = %award_id,
        vendor_matched = vendor_matched,
        detections = detections,
    );
}

/// Emit event: a detection failed self-validation (error level).
pub fn emit_detection_flagged(
    detection_id: &str,
    award_id: &str,
    contract_id: &str,
    delta: f64,
    issues: &[ValidationIssueKind],
) {
    error!(
        event = "detection.flagged",
        detection_id = %detection_id,
        award_id = %award_id,
        contract_id = %contract_id,
        delta = delta,
        issues = ?issues,
    );
}

/// Emit event: run cancelled before every award was dispatched (warning level).
pub fn emit_run_cancelled(run_id: &str, processed: usize, not_dispatched: usize) {
    warn!(
        event = "run.cancelled",
        run_id = %run_id,
        processed = processed,
        not_dispatched = not_dispatched,
    );
}

/// Emit event: run finished with duration, detection count and clean status.
pub fn emit_run_finished(
    run_id: &str,
    duration_ms: u64,
    detections: usize,
    validation_failures: usize,
    clean: bool,
) {
    info!(
        event = "run.finished",
        run_id = %run_id,
        duration_ms = duration_ms,
        detections = detections,
        validation_failures = validation_failures,
        clean = clean,
    );
}

/// Emit event: quality gate evaluated against a run summary.
pub fn emit_gate_evaluated(run_id: &str, violations: usize, passed: bool) {
    info!(
        event = "gate.evaluated",
        run_id = %run_id,
        violations = violations,
        passed = passed,
    );
}
