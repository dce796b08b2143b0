//! Engine configuration.
//!
//! A [`TransitionConfig`] is plain data with compiled defaults. Every section
//! is `#[serde(default)]`, so a partial JSON or TOML document only needs the
//! keys it overrides. [`TransitionConfig::validate`] checks all cross-field
//! invariants once; the engine refuses to start on any [`ConfigError`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::detection::SignalKind;
use crate::error::ConfigError;

/// Tolerance used for weight-sum comparisons.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionConfig {
    /// Prior likelihood before any signal contributes.
    pub base_score: f64,
    pub vendor_matching: VendorMatchConfig,
    pub candidates: CandidateConfig,
    pub signals: SignalWeights,
    /// Ordered, contiguous day ranges mapped to timing multipliers.
    pub timing_windows: Vec<TimingWindow>,
    pub agency: AgencyBonusConfig,
    pub competition: CompetitionBonusConfig,
    pub patent: PatentConfig,
    pub technology_area: TechnologyAreaConfig,
    pub text_similarity: TextSimilarityConfig,
    pub confidence: ConfidenceThresholds,
    pub pipeline: PipelineConfig,
    pub quality_gates: GateThresholds,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            base_score: 0.15,
            vendor_matching: VendorMatchConfig::default(),
            candidates: CandidateConfig::default(),
            signals: SignalWeights::default(),
            timing_windows: TimingWindow::defaults(),
            agency: AgencyBonusConfig::default(),
            competition: CompetitionBonusConfig::default(),
            patent: PatentConfig::default(),
            technology_area: TechnologyAreaConfig::default(),
            text_similarity: TextSimilarityConfig::default(),
            confidence: ConfidenceThresholds::default(),
            pipeline: PipelineConfig::default(),
            quality_gates: GateThresholds::default(),
        }
    }
}

/// Name-similarity thresholds for the vendor cascade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VendorMatchConfig {
    pub primary_threshold: f64,
    pub secondary_threshold: f64,
}

impl Default for VendorMatchConfig {
    fn default() -> Self {
        Self {
            primary_threshold: 0.85,
            secondary_threshold: 0.70,
        }
    }
}

/// Candidate window and fan-out cap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateConfig {
    /// Maximum days between award anchor date and contract action date.
    pub max_window_days: i64,
    /// Maximum candidates kept per award (highest vendor confidence first).
    pub max_candidates_per_award: usize,
}

impl Default for CandidateConfig {
    fn default() -> Self {
        Self {
            max_window_days: 730,
            max_candidates_per_award: 50,
        }
    }
}

/// Enable flag and weight for one signal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalToggle {
    pub enabled: bool,
    pub weight: f64,
}

impl SignalToggle {
    pub const fn on(weight: f64) -> Self {
        Self {
            enabled: true,
            weight,
        }
    }

    pub const fn off() -> Self {
        Self {
            enabled: false,
            weight: 0.0,
        }
    }
}

/// Per-signal weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalWeights {
    pub agency_continuity: SignalToggle,
    pub timing_proximity: SignalToggle,
    pub competition_type: SignalToggle,
    pub patent: SignalToggle,
    pub technology_area: SignalToggle,
    pub text_similarity: SignalToggle,
    /// Strict mode: enabled weights must sum to exactly 1.0.
    ///
    /// Off by default, in which case any sum in `(0, 1.0]` is accepted. The
    /// default weights sum to 0.90 and are rejected once this is set, so
    /// turning it on means rebalancing the weights as well.
    pub require_unit_sum: bool,
}

impl Default for SignalWeights {
    fn default() -> Self {
        Self {
            agency_continuity: SignalToggle::on(0.25),
            timing_proximity: SignalToggle::on(0.20),
            competition_type: SignalToggle::on(0.20),
            patent: SignalToggle::on(0.15),
            technology_area: SignalToggle::on(0.10),
            text_similarity: SignalToggle::off(),
            require_unit_sum: false,
        }
    }
}

impl SignalWeights {
    pub fn toggle(&self, kind: SignalKind) -> SignalToggle {
        match kind {
            SignalKind::AgencyContinuity => self.agency_continuity,
            SignalKind::TimingProximity => self.timing_proximity,
            SignalKind::CompetitionType => self.competition_type,
            SignalKind::Patent => self.patent,
            SignalKind::TechnologyArea => self.technology_area,
            SignalKind::TextSimilarity => self.text_similarity,
        }
    }

    pub fn toggle_mut(&mut self, kind: SignalKind) -> &mut SignalToggle {
        match kind {
            SignalKind::AgencyContinuity => &mut self.agency_continuity,
            SignalKind::TimingProximity => &mut self.timing_proximity,
            SignalKind::CompetitionType => &mut self.competition_type,
            SignalKind::Patent => &mut self.patent,
            SignalKind::TechnologyArea => &mut self.technology_area,
            SignalKind::TextSimilarity => &mut self.text_similarity,
        }
    }

    /// Sum of weights over enabled signals.
    pub fn enabled_sum(&self) -> f64 {
        SignalKind::ALL
            .iter()
            .map(|k| self.toggle(*k))
            .filter(|t| t.enabled)
            .map(|t| t.weight)
            .sum()
    }
}

/// Inclusive day range mapped to a timing multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimingWindow {
    /// Inclusive `[start, end]` day range.
    pub day_range: (i64, i64),
    pub multiplier: f64,
}

impl TimingWindow {
    pub const fn new(start: i64, end: i64, multiplier: f64) -> Self {
        Self {
            day_range: (start, end),
            multiplier,
        }
    }

    pub fn contains(&self, days: i64) -> bool {
        days >= self.day_range.0 && days <= self.day_range.1
    }

    pub fn defaults() -> Vec<TimingWindow> {
        vec![
            TimingWindow::new(0, 90, 1.0),
            TimingWindow::new(91, 365, 0.75),
            TimingWindow::new(366, 730, 0.50),
        ]
    }
}

/// Agency continuity bonuses and department overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgencyBonusConfig {
    pub same_agency_bonus: f64,
    pub same_department_bonus: f64,
    pub cross_department_bonus: f64,
    /// Extra agency-code → parent-department entries, consulted before the
    /// built-in hierarchy. Keys and values are normalized on lookup.
    pub parent_overrides: BTreeMap<String, String>,
}

impl Default for AgencyBonusConfig {
    fn default() -> Self {
        Self {
            same_agency_bonus: 0.25,
            same_department_bonus: 0.125,
            cross_department_bonus: 0.05,
            parent_overrides: BTreeMap::new(),
        }
    }
}

/// Competition-type bonus table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompetitionBonusConfig {
    pub sole_source: f64,
    pub limited: f64,
    pub full_and_open: f64,
    pub unknown: f64,
}

impl Default for CompetitionBonusConfig {
    fn default() -> Self {
        Self {
            sole_source: 0.20,
            limited: 0.10,
            full_and_open: 0.0,
            unknown: 0.0,
        }
    }
}

/// Patent sub-bonuses and similarity threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatentConfig {
    pub presence_bonus: f64,
    pub filed_before_contract_bonus: f64,
    pub topic_match_bonus: f64,
    pub similarity_threshold: f64,
}

impl Default for PatentConfig {
    fn default() -> Self {
        Self {
            presence_bonus: 0.05,
            filed_before_contract_bonus: 0.03,
            topic_match_bonus: 0.02,
            similarity_threshold: 0.70,
        }
    }
}

/// Technology-area alignment bonus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TechnologyAreaConfig {
    pub match_bonus: f64,
}

impl Default for TechnologyAreaConfig {
    fn default() -> Self {
        Self { match_bonus: 0.05 }
    }
}

/// Two-tier description similarity bonuses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextSimilarityConfig {
    pub high_threshold: f64,
    pub high_bonus: f64,
    pub low_threshold: f64,
    pub low_bonus: f64,
}

impl Default for TextSimilarityConfig {
    fn default() -> Self {
        Self {
            high_threshold: 0.80,
            high_bonus: 0.05,
            low_threshold: 0.60,
            low_bonus: 0.02,
        }
    }
}

/// Confidence band cut points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceThresholds {
    pub likely: f64,
    pub high: f64,
}

impl Default for ConfidenceThresholds {
    fn default() -> Self {
        Self {
            likely: 0.65,
            high: 0.85,
        }
    }
}

/// Batch runner settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Awards scored concurrently.
    pub max_concurrent_awards: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_concurrent_awards: 8,
        }
    }
}

/// Thresholds referenced by run-level quality gate rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateThresholds {
    /// Minimum share of awards with at least one vendor-matched contract.
    pub min_vendor_resolution_rate: f64,
    /// Maximum number of detections flagged by self-validation.
    pub max_validation_failures: usize,
    /// Minimum number of detections a run must produce.
    pub min_detections: usize,
    /// Stop at the first violated rule.
    pub fail_fast: bool,
}

impl Default for GateThresholds {
    fn default() -> Self {
        Self {
            min_vendor_resolution_rate: 0.50,
            max_validation_failures: 0,
            min_detections: 0,
            fail_fast: false,
        }
    }
}

impl TransitionConfig {
    /// Parse a JSON document and validate it.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: TransitionConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::ParseError {
                format: "json".to_string(),
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML document and validate it.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        let config: TransitionConfig =
            toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
                format: "toml".to_string(),
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Check every invariant. Nothing is normalized or repaired.
    pub fn validate(&self) -> Result<(), ConfigError> {
        unit_interval("base_score", self.base_score)?;

        let vm = &self.vendor_matching;
        unit_interval("vendor_matching.primary_threshold", vm.primary_threshold)?;
        unit_interval("vendor_matching.secondary_threshold", vm.secondary_threshold)?;
        if vm.secondary_threshold <= 0.0 || vm.secondary_threshold >= vm.primary_threshold {
            return Err(ConfigError::invalid(
                "vendor_matching.secondary_threshold",
                "must satisfy 0 < secondary < primary",
            ));
        }

        if self.candidates.max_window_days < 0 {
            return Err(ConfigError::invalid(
                "candidates.max_window_days",
                "must not be negative",
            ));
        }
        if self.candidates.max_candidates_per_award == 0 {
            return Err(ConfigError::invalid(
                "candidates.max_candidates_per_award",
                "must be greater than 0",
            ));
        }

        self.validate_weights()?;
        self.validate_timing_windows()?;

        let agency = &self.agency;
        unit_interval("agency.same_agency_bonus", agency.same_agency_bonus)?;
        unit_interval("agency.same_department_bonus", agency.same_department_bonus)?;
        unit_interval("agency.cross_department_bonus", agency.cross_department_bonus)?;
        for (code, parent) in &agency.parent_overrides {
            if code.trim().is_empty() || parent.trim().is_empty() {
                return Err(ConfigError::invalid(
                    "agency.parent_overrides",
                    "agency codes and departments must not be blank",
                ));
            }
        }

        let comp = &self.competition;
        unit_interval("competition.sole_source", comp.sole_source)?;
        unit_interval("competition.limited", comp.limited)?;
        unit_interval("competition.full_and_open", comp.full_and_open)?;
        unit_interval("competition.unknown", comp.unknown)?;

        let patent = &self.patent;
        unit_interval("patent.presence_bonus", patent.presence_bonus)?;
        unit_interval(
            "patent.filed_before_contract_bonus",
            patent.filed_before_contract_bonus,
        )?;
        unit_interval("patent.topic_match_bonus", patent.topic_match_bonus)?;
        unit_interval("patent.similarity_threshold", patent.similarity_threshold)?;

        unit_interval("technology_area.match_bonus", self.technology_area.match_bonus)?;

        let text = &self.text_similarity;
        unit_interval("text_similarity.high_threshold", text.high_threshold)?;
        unit_interval("text_similarity.high_bonus", text.high_bonus)?;
        unit_interval("text_similarity.low_threshold", text.low_threshold)?;
        unit_interval("text_similarity.low_bonus", text.low_bonus)?;
        if text.low_threshold > text.high_threshold {
            return Err(ConfigError::invalid(
                "text_similarity.low_threshold",
                "must not exceed high_threshold",
            ));
        }

        let conf = &self.confidence;
        if !(conf.likely > 0.0 && conf.likely < conf.high && conf.high <= 1.0) {
            return Err(ConfigError::invalid(
                "confidence",
                format!(
                    "thresholds must satisfy 0 < likely < high <= 1 (likely={}, high={})",
                    conf.likely, conf.high
                ),
            ));
        }

        if self.pipeline.max_concurrent_awards == 0 {
            return Err(ConfigError::invalid(
                "pipeline.max_concurrent_awards",
                "must be greater than 0",
            ));
        }

        unit_interval(
            "quality_gates.min_vendor_resolution_rate",
            self.quality_gates.min_vendor_resolution_rate,
        )?;

        Ok(())
    }

    fn validate_weights(&self) -> Result<(), ConfigError> {
        for kind in SignalKind::ALL {
            let toggle = self.signals.toggle(kind);
            unit_interval(&format!("signals.{}.weight", kind.as_str()), toggle.weight)?;
        }

        if !SignalKind::ALL
            .iter()
            .any(|k| self.signals.toggle(*k).enabled)
        {
            return Err(ConfigError::NoEnabledSignals);
        }

        let sum = self.signals.enabled_sum();
        if self.signals.require_unit_sum {
            if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
                return Err(ConfigError::WeightSum {
                    sum,
                    requirement: "must equal 1.0".to_string(),
                });
            }
        } else if sum <= 0.0 || sum > 1.0 + WEIGHT_SUM_TOLERANCE {
            return Err(ConfigError::WeightSum {
                sum,
                requirement: "must be in (0, 1.0]".to_string(),
            });
        }
        Ok(())
    }

    fn validate_timing_windows(&self) -> Result<(), ConfigError> {
        let windows = &self.timing_windows;
        let first = windows
            .first()
            .ok_or_else(|| ConfigError::invalid("timing_windows", "must not be empty"))?;
        if first.day_range.0 != 0 {
            return Err(ConfigError::invalid(
                "timing_windows",
                "first window must start at day 0",
            ));
        }

        for (i, window) in windows.iter().enumerate() {
            let (start, end) = window.day_range;
            if start > end {
                return Err(ConfigError::invalid(
                    "timing_windows",
                    format!("window {i} has start {start} after end {end}"),
                ));
            }
            unit_interval("timing_windows.multiplier", window.multiplier)?;
            if i > 0 {
                let prev_end = windows[i - 1].day_range.1;
                if start != prev_end + 1 {
                    return Err(ConfigError::invalid(
                        "timing_windows",
                        format!(
                            "window {i} starts at day {start}, expected {} (windows must be ascending with no gaps or overlaps)",
                            prev_end + 1
                        ),
                    ));
                }
            }
        }
        Ok(())
    }
}

fn unit_interval(field: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::invalid(
            field,
            format!("must be between 0.0 and 1.0, got {value}"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = TransitionConfig::default();
        config.validate().expect("defaults validate");
        assert!((config.signals.enabled_sum() - 0.90).abs() < 1e-9);
    }

    #[test]
    fn test_inverted_confidence_thresholds_rejected() {
        let mut config = TransitionConfig::default();
        config.confidence.likely = 0.9;
        config.confidence.high = 0.8;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::ValidationFailed { ref field, .. } if field == "confidence"));
    }

    #[test]
    fn test_equal_confidence_thresholds_rejected() {
        let mut config = TransitionConfig::default();
        config.confidence.likely = 0.85;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_secondary_must_be_below_primary() {
        let mut config = TransitionConfig::default();
        config.vendor_matching.secondary_threshold = 0.85;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_weight_sum_over_one_rejected() {
        let mut config = TransitionConfig::default();
        config.signals.text_similarity = SignalToggle::on(0.2);
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::WeightSum { .. }));
    }

    #[test]
    fn test_require_unit_sum() {
        let mut config = TransitionConfig::default();
        config.signals.require_unit_sum = true;
        assert!(matches!(
            config.validate().unwrap_err(),
            ConfigError::WeightSum { .. }
        ));

        config.signals.text_similarity = SignalToggle::on(0.10);
        config.validate().expect("weights now sum to 1.0");
    }

    #[test]
    fn test_no_enabled_signals_rejected() {
        let mut config = TransitionConfig::default();
        for kind in SignalKind::ALL {
            config.signals.toggle_mut(kind).enabled = false;
        }
        assert_eq!(config.validate().unwrap_err(), ConfigError::NoEnabledSignals);
    }

    #[test]
    fn test_gapped_timing_windows_rejected() {
        let mut config = TransitionConfig::default();
        config.timing_windows = vec![
            TimingWindow::new(0, 90, 1.0),
            TimingWindow::new(100, 365, 0.75),
        ];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_overlapping_timing_windows_rejected() {
        let mut config = TransitionConfig::default();
        config.timing_windows = vec![
            TimingWindow::new(0, 90, 1.0),
            TimingWindow::new(90, 365, 0.75),
        ];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_timing_windows_rejected() {
        let mut config = TransitionConfig::default();
        config.timing_windows.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_timing_window_must_start_at_zero() {
        let mut config = TransitionConfig::default();
        config.timing_windows = vec![TimingWindow::new(1, 90, 1.0)];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config =
            TransitionConfig::from_json_str(r#"{"base_score": 0.2, "candidates": {"max_window_days": 365}}"#)
                .expect("parse");
        assert_eq!(config.base_score, 0.2);
        assert_eq!(config.candidates.max_window_days, 365);
        assert_eq!(config.candidates.max_candidates_per_award, 50);
        assert_eq!(config.timing_windows, TimingWindow::defaults());
    }

    #[test]
    fn test_invalid_json_document_rejected_at_load() {
        let err = TransitionConfig::from_json_str(r#"{"base_score": 1.5}"#).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationFailed { ref field, .. } if field == "base_score"));

        let err = TransitionConfig::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn test_config_json_round_trip() {
        let config = TransitionConfig::default();
        let json = serde_json::to_string(&config).expect("serialize");
        let back = TransitionConfig::from_json_str(&json).expect("parse");
        assert_eq!(config, back);
    }
}
