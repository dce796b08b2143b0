//! Quality gate rules engine.
//!
//! Evaluates a [`RunSummary`] against a [`QualityGateRuleSet`] to produce a
//! [`GateVerdict`]: the pass/fail decision that decides whether a run's
//! bundles are published downstream. Supports vendor-resolution floors,
//! validation-failure ceilings, minimum detection counts and fail-fast.

use serde::{Deserialize, Serialize};
use transition_domain::GateThresholds;

use crate::obs;
use crate::summary::RunSummary;

// ---------------------------------------------------------------------------
// Gate rules
// ---------------------------------------------------------------------------

/// A single gate rule that can block publication.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GateRule {
    /// Vendor-resolution rate must meet `GateThresholds::min_vendor_resolution_rate`.
    MinVendorResolutionRate,
    /// Flagged detections must not exceed `GateThresholds::max_validation_failures`.
    MaxValidationFailures,
    /// Detection count must reach `GateThresholds::min_detections`.
    MinDetections,
}

/// A set of gate rules plus the thresholds they reference.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QualityGateRuleSet {
    pub thresholds: GateThresholds,
    pub rules: Vec<GateRule>,
}

impl QualityGateRuleSet {
    /// Default thresholds with the standard rules
    /// (`MinVendorResolutionRate` + `MaxValidationFailures`).
    pub fn standard() -> Self {
        Self::from_thresholds(GateThresholds::default())
    }

    /// Standard rules over the given thresholds, plus `MinDetections` when
    /// a minimum is configured.
    pub fn from_thresholds(thresholds: GateThresholds) -> Self {
        let mut rules = vec![GateRule::MinVendorResolutionRate, GateRule::MaxValidationFailures];
        if thresholds.min_detections > 0 {
            rules.push(GateRule::MinDetections);
        }
        Self { thresholds, rules }
    }

    /// Add a rule.
    pub fn with_rule(mut self, rule: GateRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Override thresholds.
    pub fn with_thresholds(mut self, thresholds: GateThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }
}

// ---------------------------------------------------------------------------
// Verdict
// ---------------------------------------------------------------------------

/// A single rule violation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Violation {
    /// Which rule was violated.
    pub rule: GateRule,
    /// Human-readable explanation.
    pub reason: String,
}

/// The outcome of evaluating a gate rule set against a run summary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GateVerdict {
    /// Violations found (empty when passed).
    pub violations: Vec<Violation>,
}

impl GateVerdict {
    fn pass() -> Self {
        Self {
            violations: Vec::new(),
        }
    }

    fn fail(violations: Vec<Violation>) -> Self {
        Self { violations }
    }

    /// Whether the gate passed (i.e., there are no violations).
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Evaluate a [`RunSummary`] against a [`QualityGateRuleSet`].
///
/// When `thresholds.fail_fast` is true, evaluation stops at the first violation.
pub fn evaluate_quality_gate(rule_set: &QualityGateRuleSet, summary: &RunSummary) -> GateVerdict {
    let mut violations = Vec::new();
    let fail_fast = rule_set.thresholds.fail_fast;

    for rule in &rule_set.rules {
        if let Some(v) = check_rule(rule, &rule_set.thresholds, summary) {
            violations.push(v);
            if fail_fast {
                break;
            }
        }
    }

    let verdict = if violations.is_empty() {
        GateVerdict::pass()
    } else {
        GateVerdict::fail(violations)
    };
    obs::emit_gate_evaluated(
        &summary.run_id.to_string(),
        verdict.violations.len(),
        verdict.passed(),
    );
    verdict
}

fn check_rule(
    rule: &GateRule,
    thresholds: &GateThresholds,
    summary: &RunSummary,
) -> Option<Violation> {
    match rule {
        GateRule::MinVendorResolutionRate => {
            let rate = summary.vendor_resolution_rate;
            (rate < thresholds.min_vendor_resolution_rate).then(|| Violation {
                rule: rule.clone(),
                reason: format!(
                    "vendor resolution rate {:.2}% < required {:.2}% ({} of {} awards matched)",
                    rate * 100.0,
                    thresholds.min_vendor_resolution_rate * 100.0,
                    summary.awards_with_vendor_match,
                    summary.awards_processed,
                ),
            })
        }
        GateRule::MaxValidationFailures => {
            (summary.validation_failures > thresholds.max_validation_failures).then(|| {
                let sample: Vec<&str> = summary
                    .flagged
                    .iter()
                    .take(5)
                    .map(|f| f.detection_id.as_str())
                    .collect();
                Violation {
                    rule: rule.clone(),
                    reason: format!(
                        "{} flagged detections > allowed {}: [{}]",
                        summary.validation_failures,
                        thresholds.max_validation_failures,
                        sample.join(", "),
                    ),
                }
            })
        }
        GateRule::MinDetections => {
            (summary.detections < thresholds.min_detections).then(|| Violation {
                rule: rule.clone(),
                reason: format!(
                    "{} detections < required {}",
                    summary.detections, thresholds.min_detections,
                ),
            })
        }
    }
}
