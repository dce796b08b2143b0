//! Vendor identity resolution.
//!
//! A [`VendorResolver`] holds an ordered list of [`MatchStrategy`] objects and
//! returns the first hit. The default cascade is UEI → CAGE → DUNS →
//! primary-tier name similarity → secondary-tier name similarity.
//!
//! Identifiers are normalized once per record into a [`NormalizedIdentity`];
//! a missing or malformed identifier disqualifies only its own strategy.

use transition_domain::{
    non_blank, VendorIdentity, VendorMatch, VendorMatchConfig, VendorMatchMethod,
};

use crate::text::{normalize_name, token_set_similarity};

pub const UEI_CONFIDENCE: f64 = 0.99;
pub const CAGE_CONFIDENCE: f64 = 0.95;
pub const DUNS_CONFIDENCE: f64 = 0.90;

const DUNS_DIGITS: usize = 9;

/// Trimmed, uppercased identifier; blank becomes `None`.
pub fn normalize_identifier(raw: Option<&str>) -> Option<String> {
    non_blank(raw).map(|v| v.trim().to_uppercase())
}

/// DUNS with whitespace and hyphens removed, left-padded to nine digits.
/// Non-numeric or over-long values are treated as absent.
pub fn normalize_duns(raw: Option<&str>) -> Option<String> {
    let digits: String = raw?
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();
    if digits.is_empty() || digits.len() > DUNS_DIGITS || !digits.chars().all(|c| c.is_ascii_digit())
    {
        return None;
    }
    Some(format!("{digits:0>width$}", width = DUNS_DIGITS))
}

/// Vendor identity with every field in comparison form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedIdentity {
    pub name: Option<String>,
    pub uei: Option<String>,
    pub cage: Option<String>,
    pub duns: Option<String>,
}

impl NormalizedIdentity {
    pub fn from_vendor(vendor: &VendorIdentity) -> Self {
        let name = normalize_name(&vendor.legal_name);
        Self {
            name: (!name.is_empty()).then_some(name),
            uei: normalize_identifier(vendor.uei.as_deref()),
            cage: normalize_identifier(vendor.cage.as_deref()),
            duns: normalize_duns(vendor.duns.as_deref()),
        }
    }

    /// True when no field can drive any strategy.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.uei.is_none() && self.cage.is_none() && self.duns.is_none()
    }
}

/// Which contracts a strategy can possibly match for a given award.
///
/// Ordered narrowest first; a cascade reaches as far as its widest step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LookupScope {
    /// Only contracts sharing a normalized identifier with the award.
    Keyed,
    /// Any contract with a normalized name, when the award has one.
    Named,
    /// Any contract at all.
    Corpus,
}

/// One step of the resolution cascade.
pub trait MatchStrategy: Send + Sync {
    fn method(&self) -> VendorMatchMethod;

    /// Contracts this strategy can reach. Custom strategies default to the
    /// whole corpus.
    fn scope(&self) -> LookupScope {
        LookupScope::Corpus
    }

    /// Return a match when this strategy links the two identities.
    fn try_match(
        &self,
        award: &NormalizedIdentity,
        contract: &NormalizedIdentity,
    ) -> Option<VendorMatch>;
}

/// Exact match on one normalized identifier field.
pub struct IdentifierStrategy {
    method: VendorMatchMethod,
    confidence: f64,
    field: fn(&NormalizedIdentity) -> Option<&str>,
}

impl IdentifierStrategy {
    pub fn uei() -> Self {
        Self {
            method: VendorMatchMethod::Uei,
            confidence: UEI_CONFIDENCE,
            field: |id| id.uei.as_deref(),
        }
    }

    pub fn cage() -> Self {
        Self {
            method: VendorMatchMethod::Cage,
            confidence: CAGE_CONFIDENCE,
            field: |id| id.cage.as_deref(),
        }
    }

    pub fn duns() -> Self {
        Self {
            method: VendorMatchMethod::Duns,
            confidence: DUNS_CONFIDENCE,
            field: |id| id.duns.as_deref(),
        }
    }
}

impl MatchStrategy for IdentifierStrategy {
    fn method(&self) -> VendorMatchMethod {
        self.method
    }

    fn scope(&self) -> LookupScope {
        LookupScope::Keyed
    }

    fn try_match(
        &self,
        award: &NormalizedIdentity,
        contract: &NormalizedIdentity,
    ) -> Option<VendorMatch> {
        let a = (self.field)(award)?;
        let c = (self.field)(contract)?;
        (a == c).then(|| VendorMatch {
            method: self.method,
            confidence: self.confidence,
            award_value: a.to_string(),
            contract_value: c.to_string(),
            name_similarity: None,
        })
    }
}

/// Token-set name similarity at or above a threshold.
///
/// The primary tier reports the similarity clamped to `[threshold, 1.0]`;
/// the secondary tier reports the raw similarity.
pub struct NameSimilarityStrategy {
    method: VendorMatchMethod,
    threshold: f64,
}

impl NameSimilarityStrategy {
    pub fn primary(threshold: f64) -> Self {
        Self {
            method: VendorMatchMethod::NameFuzzy,
            threshold,
        }
    }

    pub fn secondary(threshold: f64) -> Self {
        Self {
            method: VendorMatchMethod::NameFuzzySecondary,
            threshold,
        }
    }
}

impl MatchStrategy for NameSimilarityStrategy {
    fn method(&self) -> VendorMatchMethod {
        self.method
    }

    fn scope(&self) -> LookupScope {
        LookupScope::Named
    }

    fn try_match(
        &self,
        award: &NormalizedIdentity,
        contract: &NormalizedIdentity,
    ) -> Option<VendorMatch> {
        let a = award.name.as_deref()?;
        let c = contract.name.as_deref()?;
        let similarity = token_set_similarity(a, c);
        if similarity < self.threshold {
            return None;
        }
        let confidence = match self.method {
            VendorMatchMethod::NameFuzzy => similarity.clamp(self.threshold, 1.0),
            _ => similarity,
        };
        Some(VendorMatch {
            method: self.method,
            confidence,
            award_value: a.to_string(),
            contract_value: c.to_string(),
            name_similarity: Some(similarity),
        })
    }
}

/// Ordered cascade of match strategies; the first hit wins.
pub struct VendorResolver {
    strategies: Vec<Box<dyn MatchStrategy>>,
}

impl VendorResolver {
    /// The standard five-step cascade with the configured name thresholds.
    pub fn new(config: &VendorMatchConfig) -> Self {
        Self::with_strategies(vec![
            Box::new(IdentifierStrategy::uei()),
            Box::new(IdentifierStrategy::cage()),
            Box::new(IdentifierStrategy::duns()),
            Box::new(NameSimilarityStrategy::primary(config.primary_threshold)),
            Box::new(NameSimilarityStrategy::secondary(config.secondary_threshold)),
        ])
    }

    pub fn with_strategies(strategies: Vec<Box<dyn MatchStrategy>>) -> Self {
        Self { strategies }
    }

    /// Methods in cascade order.
    pub fn methods(&self) -> Vec<VendorMatchMethod> {
        self.strategies.iter().map(|s| s.method()).collect()
    }

    /// Widest scope any strategy reaches for `award`. Name strategies reach
    /// nothing beyond the keyed contracts when the award has no name.
    pub fn scope_for(&self, award: &NormalizedIdentity) -> LookupScope {
        self.strategies
            .iter()
            .map(|strategy| match strategy.scope() {
                LookupScope::Named if award.name.is_none() => LookupScope::Keyed,
                scope => scope,
            })
            .max()
            .unwrap_or(LookupScope::Keyed)
    }

    pub fn resolve_normalized(
        &self,
        award: &NormalizedIdentity,
        contract: &NormalizedIdentity,
    ) -> Option<VendorMatch> {
        self.strategies
            .iter()
            .find_map(|strategy| strategy.try_match(award, contract))
    }

    /// Normalize both identities and run the cascade.
    pub fn resolve(&self, award: &VendorIdentity, contract: &VendorIdentity) -> Option<VendorMatch> {
        self.resolve_normalized(
            &NormalizedIdentity::from_vendor(award),
            &NormalizedIdentity::from_vendor(contract),
        )
    }
}

impl std::fmt::Debug for VendorResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VendorResolver")
            .field("methods", &self.methods())
            .finish()
    }
}
