//! Signal extractors.
//!
//! Each [`SignalKind`] evaluates one (award, contract) pair into a raw bonus,
//! a snippet and a details map. [`Evaluate::evaluate`] applies the configured
//! toggle: a disabled signal is not evaluated and contributes zero, an
//! enabled one contributes `raw_bonus * weight`. Signals read only the pair
//! and run-scoped context, so disabling one never changes another.

pub mod agency;
pub mod competition;
pub mod patent;
pub mod technology;
pub mod text_similarity;
pub mod timing;

use std::collections::BTreeMap;

use serde_json::Value;
use transition_domain::{
    AnchorDate, Award, Contract, Patent, SignalKind, SignalResult, TransitionConfig,
};

pub use agency::AgencyHierarchy;

/// Everything a signal may read for one candidate pair.
#[derive(Debug, Clone, Copy)]
pub struct SignalContext<'a> {
    pub award: &'a Award,
    pub contract: &'a Contract,
    pub patents: &'a [Patent],
    pub days_after_anchor: i64,
    pub anchor_kind: AnchorDate,
    pub config: &'a TransitionConfig,
    pub agencies: &'a AgencyHierarchy,
}

/// Unweighted output of a single extractor.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalOutcome {
    pub raw_bonus: f64,
    pub snippet: String,
    pub details: BTreeMap<String, Value>,
}

impl SignalOutcome {
    pub fn new(raw_bonus: f64, snippet: impl Into<String>) -> Self {
        Self {
            raw_bonus,
            snippet: snippet.into(),
            details: BTreeMap::new(),
        }
    }

    pub fn detail(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.details.insert(key.to_string(), value.into());
        self
    }
}

/// Uniform evaluation interface over the fixed signal set.
pub trait Evaluate {
    fn evaluate(&self, ctx: &SignalContext<'_>) -> SignalResult;
}

impl Evaluate for SignalKind {
    fn evaluate(&self, ctx: &SignalContext<'_>) -> SignalResult {
        let toggle = ctx.config.signals.toggle(*self);
        if !toggle.enabled {
            return SignalResult {
                signal: *self,
                enabled: false,
                weight: toggle.weight,
                raw_bonus: 0.0,
                score_contribution: 0.0,
                snippet: format!("{self} disabled"),
                details: BTreeMap::new(),
            };
        }

        let outcome = match self {
            SignalKind::AgencyContinuity => agency::evaluate(ctx),
            SignalKind::TimingProximity => timing::evaluate(ctx),
            SignalKind::CompetitionType => competition::evaluate(ctx),
            SignalKind::Patent => patent::evaluate(ctx),
            SignalKind::TechnologyArea => technology::evaluate(ctx),
            SignalKind::TextSimilarity => text_similarity::evaluate(ctx),
        };

        SignalResult {
            signal: *self,
            enabled: true,
            weight: toggle.weight,
            raw_bonus: outcome.raw_bonus,
            score_contribution: outcome.raw_bonus * toggle.weight,
            snippet: outcome.snippet,
            details: outcome.details,
        }
    }
}

/// Evaluate every signal in declaration order.
pub fn evaluate_all(ctx: &SignalContext<'_>) -> Vec<SignalResult> {
    SignalKind::ALL.iter().map(|kind| kind.evaluate(ctx)).collect()
}
