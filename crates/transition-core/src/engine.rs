//! The transition detection engine.
//!
//! [`TransitionEngine`] is built once from a validated configuration and is
//! immutable afterwards, so one instance can be shared by every worker of a
//! run. Scoring one award is synchronous and performs no I/O:
//!
//! resolver → candidate selector → signals → scorer → classifier → bundle

use transition_domain::{
    Award, ConfigError, Contract, EvidenceBundle, Patent, TransitionConfig, VendorIdentity,
    VendorMatch,
};

use crate::candidates::{CandidateSelector, CandidateStats};
use crate::evidence::{EvidenceBuilder, ScoredPair};
use crate::index::{PatentIndex, VendorIndex};
use crate::metrics::EngineMetrics;
use crate::obs;
use crate::resolver::VendorResolver;
use crate::scoring::{CompositeScorer, ConfidenceClassifier};
use crate::signals::{evaluate_all, AgencyHierarchy, SignalContext};

/// Every bundle produced for one award, plus selection diagnostics.
#[derive(Debug, Clone)]
pub struct AwardDetections {
    pub award_id: String,
    pub bundles: Vec<EvidenceBundle>,
    pub stats: CandidateStats,
}

impl AwardDetections {
    pub fn flagged(&self) -> impl Iterator<Item = &EvidenceBundle> {
        self.bundles.iter().filter(|b| b.is_flagged())
    }
}

#[derive(Debug)]
pub struct TransitionEngine {
    config: TransitionConfig,
    resolver: VendorResolver,
    agencies: AgencyHierarchy,
    scorer: CompositeScorer,
    classifier: ConfidenceClassifier,
    evidence: EvidenceBuilder,
    metrics: EngineMetrics,
}

impl TransitionEngine {
    /// Validate `config` and build the engine. Invalid configuration is
    /// rejected here and never normalized.
    pub fn new(config: TransitionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            resolver: VendorResolver::new(&config.vendor_matching),
            agencies: AgencyHierarchy::new(&config.agency.parent_overrides),
            scorer: CompositeScorer::new(config.base_score),
            classifier: ConfidenceClassifier::new(&config.confidence),
            evidence: EvidenceBuilder::new(&config),
            metrics: EngineMetrics::new(),
            config,
        })
    }

    pub fn config(&self) -> &TransitionConfig {
        &self.config
    }

    pub fn metrics(&self) -> &EngineMetrics {
        &self.metrics
    }

    pub fn resolver(&self) -> &VendorResolver {
        &self.resolver
    }

    pub fn evidence_builder(&self) -> &EvidenceBuilder {
        &self.evidence
    }

    /// Run the vendor cascade on two identities.
    pub fn resolve_vendor(
        &self,
        award: &VendorIdentity,
        contract: &VendorIdentity,
    ) -> Option<VendorMatch> {
        self.resolver.resolve(award, contract)
    }

    /// Score a pair whose vendor match is already known.
    pub fn score_pair(
        &self,
        award: &Award,
        contract: &Contract,
        patents: &[Patent],
        vendor_match: VendorMatch,
    ) -> EvidenceBundle {
        let (anchor, anchor_kind) = award.anchor_date();
        let days_after_anchor = (contract.action_date - anchor).num_days();
        let ctx = SignalContext {
            award,
            contract,
            patents,
            days_after_anchor,
            anchor_kind,
            config: &self.config,
            agencies: &self.agencies,
        };
        let signals = evaluate_all(&ctx);
        let score = self.scorer.score(&signals);
        let confidence = self.classifier.classify(score.likelihood_score);

        self.evidence.build(ScoredPair {
            award,
            contract,
            vendor_match,
            days_after_anchor,
            signals,
            score,
            confidence,
        })
    }

    /// Select candidates for one award and score each of them.
    pub fn detect_award(
        &self,
        award: &Award,
        index: &VendorIndex,
        patents: &PatentIndex,
    ) -> AwardDetections {
        let selection = CandidateSelector::new(&self.config.candidates, &self.resolver)
            .select(award, index);
        let award_patents = patents.for_award(&award.award_id);

        let bundles: Vec<EvidenceBundle> = selection
            .candidates
            .into_iter()
            .map(|c| self.score_pair(award, c.contract, award_patents, c.vendor_match))
            .collect();

        let flagged = bundles.iter().filter(|b| b.is_flagged()).count();
        self.metrics.inc_awards_processed();
        self.metrics.add_candidates_scored(bundles.len() as u64);
        self.metrics.add_detections_emitted(bundles.len() as u64);
        for _ in 0..flagged {
            self.metrics.inc_validation_failures();
        }
        obs::emit_award_scored(&award.award_id, selection.stats.vendor_matched, bundles.len());

        AwardDetections {
            award_id: award.award_id.clone(),
            bundles,
            stats: selection.stats,
        }
    }

    /// Score every award sequentially, in input order.
    pub fn detect_all(
        &self,
        awards: &[Award],
        index: &VendorIndex,
        patents: &PatentIndex,
    ) -> Vec<AwardDetections> {
        awards
            .iter()
            .map(|award| self.detect_award(award, index, patents))
            .collect()
    }
}
