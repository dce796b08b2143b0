//! Time-windowed candidate selection for one award.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use transition_domain::{AnchorDate, Award, CandidateConfig, Contract, VendorMatch};

use crate::index::VendorIndex;
use crate::resolver::{NormalizedIdentity, VendorResolver};

/// A vendor-matched contract inside the award's window.
#[derive(Debug, Clone)]
pub struct Candidate<'a> {
    pub contract: &'a Contract,
    pub vendor_match: VendorMatch,
    /// Days from the award anchor to the contract action date.
    pub days_after_anchor: i64,
}

/// Per-award selection diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateStats {
    /// Contracts the cascade was run against.
    pub scanned: usize,
    /// Scanned contracts the cascade resolved to the same vendor.
    pub vendor_matched: usize,
    pub before_anchor: usize,
    pub beyond_window: usize,
    /// In-window candidates dropped by the per-award cap.
    pub dropped_by_cap: usize,
}

impl CandidateStats {
    pub fn truncated(&self) -> bool {
        self.dropped_by_cap > 0
    }

    pub fn accumulate(&mut self, other: &CandidateStats) {
        self.scanned += other.scanned;
        self.vendor_matched += other.vendor_matched;
        self.before_anchor += other.before_anchor;
        self.beyond_window += other.beyond_window;
        self.dropped_by_cap += other.dropped_by_cap;
    }
}

#[derive(Debug, Clone)]
pub struct CandidateSet<'a> {
    pub anchor: NaiveDate,
    pub anchor_kind: AnchorDate,
    pub candidates: Vec<Candidate<'a>>,
    pub stats: CandidateStats,
}

/// Selects candidate contracts for an award from a [`VendorIndex`].
pub struct CandidateSelector<'e> {
    config: &'e CandidateConfig,
    resolver: &'e VendorResolver,
}

impl<'e> CandidateSelector<'e> {
    pub fn new(config: &'e CandidateConfig, resolver: &'e VendorResolver) -> Self {
        Self { config, resolver }
    }

    /// Contracts with a vendor match whose action date falls within
    /// `[anchor, anchor + max_window_days]`, ordered by vendor confidence
    /// (desc), action date (asc), contract id (asc), then capped.
    pub fn select<'a>(&self, award: &Award, index: &'a VendorIndex) -> CandidateSet<'a> {
        let (anchor, anchor_kind) = award.anchor_date();
        let identity = NormalizedIdentity::from_vendor(&award.recipient);
        let mut stats = CandidateStats::default();
        let mut candidates = Vec::new();

        let scope = self.resolver.scope_for(&identity);
        for indexed in index.lookup(&identity, scope) {
            stats.scanned += 1;
            let Some(vendor_match) = self
                .resolver
                .resolve_normalized(&identity, &indexed.identity)
            else {
                continue;
            };
            stats.vendor_matched += 1;

            let days = (indexed.contract.action_date - anchor).num_days();
            if days < 0 {
                stats.before_anchor += 1;
                continue;
            }
            if days > self.config.max_window_days {
                stats.beyond_window += 1;
                continue;
            }
            candidates.push(Candidate {
                contract: &indexed.contract,
                vendor_match,
                days_after_anchor: days,
            });
        }

        candidates.sort_by(|a, b| {
            b.vendor_match
                .confidence
                .total_cmp(&a.vendor_match.confidence)
                .then_with(|| a.contract.action_date.cmp(&b.contract.action_date))
                .then_with(|| a.contract.contract_id.cmp(&b.contract.contract_id))
        });
        if candidates.len() > self.config.max_candidates_per_award {
            stats.dropped_by_cap = candidates.len() - self.config.max_candidates_per_award;
            candidates.truncate(self.config.max_candidates_per_award);
        }

        CandidateSet {
            anchor,
            anchor_kind,
            candidates,
            stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use transition_domain::{VendorIdentity, VendorMatchConfig, VendorMatchMethod};

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn award() -> Award {
        let mut award = Award::new(
            "A-1",
            VendorIdentity::named("Acme Robotics").with_uei("U1"),
            date(2021, 1, 1),
        );
        award.completion_date = Some(date(2022, 1, 1));
        award
    }

    fn contract(id: &str, vendor: VendorIdentity, action: NaiveDate) -> Contract {
        Contract::new(id, vendor, action)
    }

    #[test]
    fn window_is_inclusive_on_both_ends() {
        let uei = || VendorIdentity::named("Acme Robotics").with_uei("U1");
        let index = VendorIndex::build(vec![
            contract("C-day0", uei(), date(2022, 1, 1)),
            contract("C-day730", uei(), date(2024, 1, 1)),
            contract("C-day731", uei(), date(2024, 1, 2)),
            contract("C-before", uei(), date(2021, 12, 31)),
        ]);
        let config = CandidateConfig::default();
        let resolver = VendorResolver::new(&VendorMatchConfig::default());
        let set = CandidateSelector::new(&config, &resolver).select(&award(), &index);

        let ids: Vec<_> = set
            .candidates
            .iter()
            .map(|c| c.contract.contract_id.as_str())
            .collect();
        assert_eq!(ids, vec!["C-day0", "C-day730"]);
        assert_eq!(set.candidates[1].days_after_anchor, 730);
        assert_eq!(set.stats.before_anchor, 1);
        assert_eq!(set.stats.beyond_window, 1);
        assert_eq!(set.anchor_kind, AnchorDate::CompletionDate);
    }

    #[test]
    fn cap_keeps_highest_confidence() {
        let index = VendorIndex::build(vec![
            contract("C-name", VendorIdentity::named("Acme Robotics Inc"), date(2022, 2, 1)),
            contract("C-uei", VendorIdentity::named("Other").with_uei("U1"), date(2022, 3, 1)),
        ]);
        let config = CandidateConfig {
            max_candidates_per_award: 1,
            ..CandidateConfig::default()
        };
        let resolver = VendorResolver::new(&VendorMatchConfig::default());
        let set = CandidateSelector::new(&config, &resolver).select(&award(), &index);

        assert_eq!(set.candidates.len(), 1);
        assert_eq!(set.candidates[0].contract.contract_id, "C-name");
        assert_eq!(set.candidates[0].vendor_match.method, VendorMatchMethod::NameFuzzy);
        assert_eq!(set.stats.dropped_by_cap, 1);
        assert!(set.stats.truncated());
    }

    #[test]
    fn unmatched_vendors_are_not_candidates() {
        let index = VendorIndex::build(vec![contract(
            "C-1",
            VendorIdentity::named("Acme Grain Milling Cooperative Holdings").with_uei("U9"),
            date(2022, 2, 1),
        )]);
        let config = CandidateConfig::default();
        let resolver = VendorResolver::new(&VendorMatchConfig::default());
        let set = CandidateSelector::new(&config, &resolver).select(&award(), &index);
        assert!(set.candidates.is_empty());
        assert_eq!(set.stats.scanned, 1);
        assert_eq!(set.stats.vendor_matched, 0);
    }
}
