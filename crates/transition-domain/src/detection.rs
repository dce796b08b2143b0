//! Detection records: vendor matches, signal results, confidence bands and
//! the self-validation report.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Tolerance for the score decomposition invariant.
pub const SCORE_TOLERANCE: f64 = 1e-6;

// ---------------------------------------------------------------------------
// Vendor match
// ---------------------------------------------------------------------------

/// Resolution method, in cascade priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VendorMatchMethod {
    Uei,
    Cage,
    Duns,
    NameFuzzy,
    NameFuzzySecondary,
}

impl VendorMatchMethod {
    pub const ALL: [VendorMatchMethod; 5] = [
        VendorMatchMethod::Uei,
        VendorMatchMethod::Cage,
        VendorMatchMethod::Duns,
        VendorMatchMethod::NameFuzzy,
        VendorMatchMethod::NameFuzzySecondary,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            VendorMatchMethod::Uei => "UEI",
            VendorMatchMethod::Cage => "CAGE",
            VendorMatchMethod::Duns => "DUNS",
            VendorMatchMethod::NameFuzzy => "NAME_FUZZY",
            VendorMatchMethod::NameFuzzySecondary => "NAME_FUZZY_SECONDARY",
        }
    }

    /// True for the identifier-based methods.
    pub fn is_identifier(self) -> bool {
        matches!(
            self,
            VendorMatchMethod::Uei | VendorMatchMethod::Cage | VendorMatchMethod::Duns
        )
    }
}

impl fmt::Display for VendorMatchMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of vendor resolution for one (award, contract) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorMatch {
    pub method: VendorMatchMethod,
    /// Confidence in [0, 1].
    pub confidence: f64,
    /// Normalized award-side value that matched.
    pub award_value: String,
    /// Normalized contract-side value that matched.
    pub contract_value: String,
    /// Token-set similarity, for name-based methods.
    pub name_similarity: Option<f64>,
}

// ---------------------------------------------------------------------------
// Signals
// ---------------------------------------------------------------------------

/// The fixed set of evidence signals, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    AgencyContinuity,
    TimingProximity,
    CompetitionType,
    Patent,
    TechnologyArea,
    TextSimilarity,
}

impl SignalKind {
    pub const ALL: [SignalKind; 6] = [
        SignalKind::AgencyContinuity,
        SignalKind::TimingProximity,
        SignalKind::CompetitionType,
        SignalKind::Patent,
        SignalKind::TechnologyArea,
        SignalKind::TextSimilarity,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SignalKind::AgencyContinuity => "agency_continuity",
            SignalKind::TimingProximity => "timing_proximity",
            SignalKind::CompetitionType => "competition_type",
            SignalKind::Patent => "patent",
            SignalKind::TechnologyArea => "technology_area",
            SignalKind::TextSimilarity => "text_similarity",
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of one signal for one candidate pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalResult {
    pub signal: SignalKind,
    pub enabled: bool,
    pub weight: f64,
    /// Unweighted bonus produced by the extractor.
    pub raw_bonus: f64,
    /// `raw_bonus * weight` when enabled, otherwise 0.
    pub score_contribution: f64,
    /// Short human-readable explanation.
    pub snippet: String,
    /// Signal-specific evidence.
    pub details: BTreeMap<String, serde_json::Value>,
}

// ---------------------------------------------------------------------------
// Confidence
// ---------------------------------------------------------------------------

/// Coarse classification of a likelihood score. Ordered low to high.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConfidenceBand {
    Possible,
    Likely,
    High,
}

impl ConfidenceBand {
    pub const ALL: [ConfidenceBand; 3] = [
        ConfidenceBand::Possible,
        ConfidenceBand::Likely,
        ConfidenceBand::High,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ConfidenceBand::Possible => "POSSIBLE",
            ConfidenceBand::Likely => "LIKELY",
            ConfidenceBand::High => "HIGH",
        }
    }
}

impl fmt::Display for ConfidenceBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Kinds of internal-consistency failure found by self-validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationIssueKind {
    /// Stored score differs from base + Σ contributions.
    ScoreMismatch,
    /// The composite fell outside [0, 1] and was clamped.
    ScoreClamped,
    /// A disabled signal reported a non-zero contribution.
    DisabledSignalContributed,
    /// An enabled zero-weight signal reported a non-zero contribution.
    ZeroWeightContributed,
    /// A contribution differs from raw_bonus × weight.
    ContributionMismatch,
    /// The candidate lies outside the configured time window.
    OutOfWindowCandidate,
    /// The stored band disagrees with the stored score.
    ConfidenceMismatch,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub kind: ValidationIssueKind,
    pub message: String,
}

/// Result of re-deriving a detection's score from its parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub passed: bool,
    /// base_score + Σ enabled contributions, unclamped.
    pub expected_score: f64,
    pub stored_score: f64,
    pub delta: f64,
    pub tolerance: f64,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn issue_kinds(&self) -> Vec<ValidationIssueKind> {
        self.issues.iter().map(|i| i.kind).collect()
    }
}

// ---------------------------------------------------------------------------
// Detection
// ---------------------------------------------------------------------------

/// One scored (award, contract) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Deterministic identifier derived from the award and contract ids.
    pub detection_id: String,
    pub award_id: String,
    pub contract_id: String,
    pub vendor_match: VendorMatch,
    /// Signal results in [`SignalKind::ALL`] order.
    pub signals: Vec<SignalResult>,
    pub base_score: f64,
    pub likelihood_score: f64,
    pub confidence: ConfidenceBand,
    pub validation: ValidationReport,
}

impl Detection {
    pub fn signal(&self, kind: SignalKind) -> Option<&SignalResult> {
        self.signals.iter().find(|s| s.signal == kind)
    }

    /// Sum of contributions over enabled signals.
    pub fn contribution_sum(&self) -> f64 {
        self.signals
            .iter()
            .filter(|s| s.enabled)
            .map(|s| s.score_contribution)
            .sum()
    }
}
