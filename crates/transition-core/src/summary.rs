//! Run summary: the second externally consumed artifact next to the bundle
//! stream.
//!
//! Awards can finish in any order; [`SummaryBuilder`] only keeps counts and
//! sorted score lists, so the finished summary does not depend on
//! scheduling.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use transition_domain::{ConfidenceBand, ValidationIssueKind, VendorMatchMethod};
use uuid::Uuid;

use crate::candidates::CandidateStats;
use crate::engine::AwardDetections;
use crate::index::IndexStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Completed,
    Cancelled,
}

/// Distribution of likelihood scores across detections.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreStats {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
}

impl ScoreStats {
    /// `None` for an empty slice.
    pub fn from_scores(scores: &[f64]) -> Option<Self> {
        if scores.is_empty() {
            return None;
        }
        let mut sorted = scores.to_vec();
        sorted.sort_by(f64::total_cmp);
        let count = sorted.len();
        let mid = count / 2;
        let median = if count % 2 == 0 {
            (sorted[mid - 1] + sorted[mid]) / 2.0
        } else {
            sorted[mid]
        };
        Some(Self {
            count,
            min: sorted[0],
            max: sorted[count - 1],
            mean: sorted.iter().sum::<f64>() / count as f64,
            median,
        })
    }
}

/// A detection that failed self-validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlaggedDetection {
    pub detection_id: String,
    pub award_id: String,
    pub contract_id: String,
    pub delta: f64,
    pub issues: Vec<ValidationIssueKind>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub status: RunStatus,
    pub awards_total: usize,
    pub awards_processed: usize,
    /// Awards never dispatched because the run was cancelled.
    pub awards_not_dispatched: usize,
    pub awards_with_vendor_match: usize,
    /// `awards_with_vendor_match / awards_processed`, 0 when nothing ran.
    pub vendor_resolution_rate: f64,
    pub index: IndexStats,
    pub candidates: CandidateStats,
    pub detections: usize,
    pub by_confidence: BTreeMap<ConfidenceBand, usize>,
    pub by_method: BTreeMap<VendorMatchMethod, usize>,
    pub score_stats: Option<ScoreStats>,
    pub validation_failures: usize,
    pub issues_by_kind: BTreeMap<ValidationIssueKind, usize>,
    /// Flagged detections ordered by detection id.
    pub flagged: Vec<FlaggedDetection>,
}

impl RunSummary {
    /// Completed with no flagged detections.
    pub fn is_clean(&self) -> bool {
        self.status == RunStatus::Completed && self.validation_failures == 0
    }

    pub fn was_cancelled(&self) -> bool {
        self.status == RunStatus::Cancelled
    }

    pub fn duration_ms(&self) -> u64 {
        (self.finished_at - self.started_at)
            .num_milliseconds()
            .max(0) as u64
    }
}

/// Accumulates per-award results into a [`RunSummary`].
#[derive(Debug, Clone)]
pub struct SummaryBuilder {
    run_id: Uuid,
    started_at: DateTime<Utc>,
    awards_total: usize,
    index: IndexStats,
    awards_processed: usize,
    awards_with_vendor_match: usize,
    candidates: CandidateStats,
    scores: Vec<f64>,
    by_confidence: BTreeMap<ConfidenceBand, usize>,
    by_method: BTreeMap<VendorMatchMethod, usize>,
    issues_by_kind: BTreeMap<ValidationIssueKind, usize>,
    flagged: Vec<FlaggedDetection>,
}

impl SummaryBuilder {
    pub fn new(run_id: Uuid, awards_total: usize, index: IndexStats) -> Self {
        Self {
            run_id,
            started_at: Utc::now(),
            awards_total,
            index,
            awards_processed: 0,
            awards_with_vendor_match: 0,
            candidates: CandidateStats::default(),
            scores: Vec::new(),
            by_confidence: ConfidenceBand::ALL.iter().map(|b| (*b, 0)).collect(),
            by_method: VendorMatchMethod::ALL.iter().map(|m| (*m, 0)).collect(),
            issues_by_kind: BTreeMap::new(),
            flagged: Vec::new(),
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn awards_processed(&self) -> usize {
        self.awards_processed
    }

    pub fn record(&mut self, result: &AwardDetections) {
        self.awards_processed += 1;
        if result.stats.vendor_matched > 0 {
            self.awards_with_vendor_match += 1;
        }
        self.candidates.accumulate(&result.stats);

        for bundle in &result.bundles {
            self.scores.push(bundle.likelihood_score);
            *self.by_confidence.entry(bundle.confidence).or_insert(0) += 1;
            *self.by_method.entry(bundle.vendor_match.method).or_insert(0) += 1;
            if bundle.is_flagged() {
                let issues = bundle.validation.issue_kinds();
                for kind in &issues {
                    *self.issues_by_kind.entry(*kind).or_insert(0) += 1;
                }
                self.flagged.push(FlaggedDetection {
                    detection_id: bundle.detection_id.clone(),
                    award_id: bundle.award_id.clone(),
                    contract_id: bundle.contract_id.clone(),
                    delta: bundle.validation.delta,
                    issues,
                });
            }
        }
    }

    pub fn finish(mut self, status: RunStatus) -> RunSummary {
        self.flagged
            .sort_by(|a, b| a.detection_id.cmp(&b.detection_id));
        let vendor_resolution_rate = if self.awards_processed == 0 {
            0.0
        } else {
            self.awards_with_vendor_match as f64 / self.awards_processed as f64
        };

        RunSummary {
            run_id: self.run_id,
            started_at: self.started_at,
            finished_at: Utc::now(),
            status,
            awards_total: self.awards_total,
            awards_processed: self.awards_processed,
            awards_not_dispatched: self.awards_total.saturating_sub(self.awards_processed),
            awards_with_vendor_match: self.awards_with_vendor_match,
            vendor_resolution_rate,
            index: self.index,
            candidates: self.candidates,
            detections: self.scores.len(),
            by_confidence: self.by_confidence,
            by_method: self.by_method,
            score_stats: ScoreStats::from_scores(&self.scores),
            validation_failures: self.flagged.len(),
            issues_by_kind: self.issues_by_kind,
            flagged: self.flagged,
        }
    }
}
