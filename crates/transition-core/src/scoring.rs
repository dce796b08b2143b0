//! Composite scoring and confidence classification.

use serde::{Deserialize, Serialize};
use transition_domain::{ConfidenceBand, ConfidenceThresholds, SignalResult};

/// Base score plus enabled contributions, clamped to `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompositeScore {
    pub base_score: f64,
    /// Unclamped `base_score + Σ enabled contributions`.
    pub raw_total: f64,
    pub likelihood_score: f64,
    /// True when clamping changed the total; such detections are flagged.
    pub clamped: bool,
}

/// Sum of enabled contributions in signal order.
pub fn enabled_contribution_sum(signals: &[SignalResult]) -> f64 {
    signals
        .iter()
        .filter(|s| s.enabled)
        .map(|s| s.score_contribution)
        .sum()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompositeScorer {
    base_score: f64,
}

impl CompositeScorer {
    pub fn new(base_score: f64) -> Self {
        Self { base_score }
    }

    pub fn score(&self, signals: &[SignalResult]) -> CompositeScore {
        let raw_total = self.base_score + enabled_contribution_sum(signals);
        let likelihood_score = raw_total.clamp(0.0, 1.0);
        CompositeScore {
            base_score: self.base_score,
            raw_total,
            likelihood_score,
            clamped: likelihood_score != raw_total,
        }
    }
}

/// Maps a score to a band; boundary values land in the higher band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceClassifier {
    likely: f64,
    high: f64,
}

impl ConfidenceClassifier {
    pub fn new(thresholds: &ConfidenceThresholds) -> Self {
        Self {
            likely: thresholds.likely,
            high: thresholds.high,
        }
    }

    pub fn classify(&self, score: f64) -> ConfidenceBand {
        if score >= self.high {
            ConfidenceBand::High
        } else if score >= self.likely {
            ConfidenceBand::Likely
        } else {
            ConfidenceBand::Possible
        }
    }
}
