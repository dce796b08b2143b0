//! Evidence bundle assembly and self-validation.
//!
//! Every bundle carries a [`ValidationReport`] that re-derives the score from
//! the bundle's own parts. A failing report is logged at error level and the
//! bundle is still emitted, flagged, so nothing is silently dropped.

use std::collections::BTreeMap;

use transition_domain::{
    detection_id, Award, AwardSnapshot, ConfidenceBand, Contract, ContractSnapshot,
    EvidenceBundle, SignalResult, TransitionConfig, ValidationIssue, ValidationIssueKind,
    ValidationReport, VendorMatch, EVIDENCE_SCHEMA_VERSION, SCORE_TOLERANCE,
};

use crate::obs;
use crate::scoring::{enabled_contribution_sum, CompositeScore, ConfidenceClassifier};

/// The scored parts of one (award, contract) pair.
#[derive(Debug, Clone)]
pub struct ScoredPair<'a> {
    pub award: &'a Award,
    pub contract: &'a Contract,
    pub vendor_match: VendorMatch,
    pub days_after_anchor: i64,
    pub signals: Vec<SignalResult>,
    pub score: CompositeScore,
    pub confidence: ConfidenceBand,
}

/// One-line explanation: band, score and the top one or two contributing
/// enabled signals.
pub fn summary_line(confidence: ConfidenceBand, score: f64, signals: &[SignalResult]) -> String {
    let mut contributing: Vec<&SignalResult> = signals
        .iter()
        .filter(|s| s.enabled && s.score_contribution > 0.0)
        .collect();
    contributing.sort_by(|a, b| b.score_contribution.total_cmp(&a.score_contribution));

    let reasons = if contributing.is_empty() {
        "no contributing signals".to_string()
    } else {
        contributing
            .iter()
            .take(2)
            .map(|s| s.snippet.as_str())
            .collect::<Vec<_>>()
            .join("; ")
    };
    format!("{confidence} transition ({score:.3}): {reasons}")
}

/// Builds bundles and validates them against the engine configuration.
#[derive(Debug, Clone)]
pub struct EvidenceBuilder {
    base_score: f64,
    classifier: ConfidenceClassifier,
    max_window_days: i64,
    tolerance: f64,
}

impl EvidenceBuilder {
    pub fn new(config: &TransitionConfig) -> Self {
        Self {
            base_score: config.base_score,
            classifier: ConfidenceClassifier::new(&config.confidence),
            max_window_days: config.candidates.max_window_days,
            tolerance: SCORE_TOLERANCE,
        }
    }

    /// Re-derive the score and band from the parts and report every
    /// inconsistency found.
    pub fn validate(
        &self,
        base_score: f64,
        signals: &[SignalResult],
        stored_score: f64,
        confidence: ConfidenceBand,
        days_after_anchor: i64,
    ) -> ValidationReport {
        let tol = self.tolerance;
        let mut issues = Vec::new();
        let mut issue = |kind: ValidationIssueKind, message: String| {
            issues.push(ValidationIssue { kind, message });
        };

        if (base_score - self.base_score).abs() >= tol {
            issue(
                ValidationIssueKind::ScoreMismatch,
                format!(
                    "base score {base_score} differs from configured {}",
                    self.base_score
                ),
            );
        }

        for s in signals {
            if !s.enabled {
                if s.score_contribution != 0.0 {
                    issue(
                        ValidationIssueKind::DisabledSignalContributed,
                        format!("{} is disabled but contributed {}", s.signal, s.score_contribution),
                    );
                }
                continue;
            }
            if s.weight == 0.0 && s.score_contribution != 0.0 {
                issue(
                    ValidationIssueKind::ZeroWeightContributed,
                    format!("{} has weight 0 but contributed {}", s.signal, s.score_contribution),
                );
            }
            let expected = s.raw_bonus * s.weight;
            if (s.score_contribution - expected).abs() >= tol {
                issue(
                    ValidationIssueKind::ContributionMismatch,
                    format!(
                        "{} contributed {} but raw bonus {} x weight {} = {expected}",
                        s.signal, s.score_contribution, s.raw_bonus, s.weight
                    ),
                );
            }
        }

        let expected_score = base_score + enabled_contribution_sum(signals);
        let clamped = expected_score.clamp(0.0, 1.0);
        if clamped != expected_score {
            issue(
                ValidationIssueKind::ScoreClamped,
                format!("composite {expected_score} clamped to {clamped}"),
            );
        }
        if (stored_score - clamped).abs() >= tol {
            issue(
                ValidationIssueKind::ScoreMismatch,
                format!("stored score {stored_score} but parts sum to {clamped}"),
            );
        }

        if days_after_anchor < 0 || days_after_anchor > self.max_window_days {
            issue(
                ValidationIssueKind::OutOfWindowCandidate,
                format!(
                    "contract {days_after_anchor} days after anchor, window is 0..={}",
                    self.max_window_days
                ),
            );
        }

        let expected_band = self.classifier.classify(stored_score);
        if expected_band != confidence {
            issue(
                ValidationIssueKind::ConfidenceMismatch,
                format!("score {stored_score:.6} classifies as {expected_band}, stored {confidence}"),
            );
        }

        ValidationReport {
            passed: issues.is_empty(),
            expected_score,
            stored_score,
            delta: (stored_score - expected_score).abs(),
            tolerance: tol,
            issues,
        }
    }

    /// Assemble the bundle for a scored pair. Flagged bundles are logged at
    /// error level and returned like any other.
    pub fn build(&self, pair: ScoredPair<'_>) -> EvidenceBundle {
        let validation = self.validate(
            pair.score.base_score,
            &pair.signals,
            pair.score.likelihood_score,
            pair.confidence,
            pair.days_after_anchor,
        );
        let id = detection_id(&pair.award.award_id, &pair.contract.contract_id);
        if !validation.passed {
            obs::emit_detection_flagged(
                &id,
                &pair.award.award_id,
                &pair.contract.contract_id,
                validation.delta,
                &validation.issue_kinds(),
            );
        }

        let summary = summary_line(pair.confidence, pair.score.likelihood_score, &pair.signals);
        let signals: BTreeMap<_, _> = pair
            .signals
            .into_iter()
            .map(|s| (s.signal, s))
            .collect();

        EvidenceBundle {
            schema_version: EVIDENCE_SCHEMA_VERSION.to_string(),
            detection_id: id,
            award_id: pair.award.award_id.clone(),
            contract_id: pair.contract.contract_id.clone(),
            award: AwardSnapshot::from(pair.award),
            contract: ContractSnapshot::from(pair.contract),
            vendor_match: pair.vendor_match,
            signals,
            base_score: pair.score.base_score,
            likelihood_score: pair.score.likelihood_score,
            confidence: pair.confidence,
            summary,
            validation,
        }
    }

    /// Validate a persisted bundle from its own snapshots and signals.
    pub fn revalidate(&self, bundle: &EvidenceBundle) -> ValidationReport {
        let anchor = bundle
            .award
            .completion_date
            .unwrap_or(bundle.award.award_date);
        let days = (bundle.contract.action_date - anchor).num_days();
        let signals: Vec<SignalResult> = bundle.signals.values().cloned().collect();
        self.validate(
            bundle.base_score,
            &signals,
            bundle.likelihood_score,
            bundle.confidence,
            days,
        )
    }
}

#[cfg(test)]
mod tests {
    use transition_domain::SignalKind;

    use super::*;

    fn signal(kind: SignalKind, weight: f64, raw: f64, snippet: &str) -> SignalResult {
        SignalResult {
            signal: kind,
            enabled: true,
            weight,
            raw_bonus: raw,
            score_contribution: raw * weight,
            snippet: snippet.to_string(),
            details: BTreeMap::new(),
        }
    }

    fn builder() -> EvidenceBuilder {
        EvidenceBuilder::new(&TransitionConfig::default())
    }

    #[test]
    fn summary_uses_top_two_contributors() {
        let signals = vec![
            signal(SignalKind::AgencyContinuity, 0.25, 0.125, "same department"),
            signal(SignalKind::TimingProximity, 0.20, 1.0, "45 days"),
            signal(SignalKind::CompetitionType, 0.20, 0.2, "sole-source award"),
        ];
        assert_eq!(
            summary_line(ConfidenceBand::Possible, 0.42625, &signals),
            "POSSIBLE transition (0.426): 45 days; sole-source award"
        );
        assert_eq!(
            summary_line(ConfidenceBand::Possible, 0.15, &[]),
            "POSSIBLE transition (0.150): no contributing signals"
        );
    }

    #[test]
    fn consistent_parts_pass() {
        let signals = vec![signal(SignalKind::TimingProximity, 0.20, 1.0, "45 days")];
        let report = builder().validate(0.15, &signals, 0.35, ConfidenceBand::Possible, 45);
        assert!(report.passed, "{:?}", report.issues);
        assert!(report.delta < 1e-9);
    }

    #[test]
    fn tampered_score_is_flagged() {
        let signals = vec![signal(SignalKind::TimingProximity, 0.20, 1.0, "45 days")];
        let report = builder().validate(0.15, &signals, 0.70, ConfidenceBand::Possible, 45);
        assert!(!report.passed);
        assert_eq!(
            report.issue_kinds(),
            vec![
                ValidationIssueKind::ScoreMismatch,
                ValidationIssueKind::ConfidenceMismatch
            ]
        );
    }

    #[test]
    fn disabled_contribution_and_window_are_flagged() {
        let mut disabled = signal(SignalKind::Patent, 0.15, 0.1, "patents");
        disabled.enabled = false;
        let report = builder().validate(0.15, &[disabled], 0.15, ConfidenceBand::Possible, 731);
        assert_eq!(
            report.issue_kinds(),
            vec![
                ValidationIssueKind::DisabledSignalContributed,
                ValidationIssueKind::OutOfWindowCandidate
            ]
        );
    }

    #[test]
    fn clamped_composite_is_flagged() {
        let signals = vec![signal(SignalKind::Patent, 1.0, 1.0, "patents")];
        let report = builder().validate(0.15, &signals, 1.0, ConfidenceBand::High, 10);
        assert!(!report.passed);
        assert_eq!(report.issue_kinds(), vec![ValidationIssueKind::ScoreClamped]);
    }
}
