//! Run-scoped lookup structures built once and shared read-only by workers.
//!
//! [`VendorIndex`] keys the contract corpus by normalized identifier so
//! identifier-only lookups skip unrelated contracts. Name strategies can
//! match any named contract, so a [`LookupScope::Named`] lookup visits every
//! one of them. [`PatentIndex`] groups patents by award id.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use transition_domain::{Contract, Patent};

use crate::resolver::{LookupScope, NormalizedIdentity};

/// A contract paired with its normalized vendor identity.
#[derive(Debug, Clone)]
pub struct IndexedContract {
    pub contract: Contract,
    pub identity: NormalizedIdentity,
}

/// Key counts reported after the index is built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    pub contracts: usize,
    pub uei_keys: usize,
    pub cage_keys: usize,
    pub duns_keys: usize,
    pub named_contracts: usize,
    /// Contracts with no usable vendor field at all.
    pub unkeyed_contracts: usize,
}

/// Contract corpus keyed by vendor identity.
#[derive(Debug, Default)]
pub struct VendorIndex {
    contracts: Vec<IndexedContract>,
    by_uei: HashMap<String, Vec<usize>>,
    by_cage: HashMap<String, Vec<usize>>,
    by_duns: HashMap<String, Vec<usize>>,
    named: Vec<usize>,
    stats: IndexStats,
}

fn insert_key(map: &mut HashMap<String, Vec<usize>>, key: &str, pos: usize) {
    map.entry(key.to_string()).or_default().push(pos);
}

impl VendorIndex {
    pub fn build(contracts: Vec<Contract>) -> Self {
        let mut index = Self::default();
        for contract in contracts {
            let pos = index.contracts.len();
            let identity = NormalizedIdentity::from_vendor(&contract.vendor);
            if identity.is_empty() {
                index.stats.unkeyed_contracts += 1;
            }
            if let Some(uei) = &identity.uei {
                insert_key(&mut index.by_uei, uei, pos);
            }
            if let Some(cage) = &identity.cage {
                insert_key(&mut index.by_cage, cage, pos);
            }
            if let Some(duns) = &identity.duns {
                insert_key(&mut index.by_duns, duns, pos);
            }
            if identity.name.is_some() {
                index.named.push(pos);
            }
            index.contracts.push(IndexedContract { contract, identity });
        }

        index.stats.contracts = index.contracts.len();
        index.stats.uei_keys = index.by_uei.len();
        index.stats.cage_keys = index.by_cage.len();
        index.stats.duns_keys = index.by_duns.len();
        index.stats.named_contracts = index.named.len();
        index
    }

    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }

    pub fn stats(&self) -> &IndexStats {
        &self.stats
    }

    pub fn get(&self, pos: usize) -> Option<&IndexedContract> {
        self.contracts.get(pos)
    }

    pub fn iter(&self) -> impl Iterator<Item = &IndexedContract> {
        self.contracts.iter()
    }

    /// Every contract a cascade with `scope` could match for `award`, in
    /// corpus order, each at most once.
    pub fn lookup(&self, award: &NormalizedIdentity, scope: LookupScope) -> Vec<&IndexedContract> {
        match scope {
            LookupScope::Corpus => return self.contracts.iter().collect(),
            LookupScope::Named if award.name.is_some() => {
                // Named positions already hold every contract with a name;
                // only unnamed identifier hits need adding.
                let mut positions: BTreeSet<usize> = self.named.iter().copied().collect();
                positions.extend(self.keyed_positions(award));
                return self.resolve_positions(positions);
            }
            LookupScope::Named | LookupScope::Keyed => {}
        }
        self.resolve_positions(self.keyed_positions(award).collect())
    }

    fn keyed_positions<'s>(
        &'s self,
        award: &'s NormalizedIdentity,
    ) -> impl Iterator<Item = usize> + 's {
        [
            (&self.by_uei, award.uei.as_deref()),
            (&self.by_cage, award.cage.as_deref()),
            (&self.by_duns, award.duns.as_deref()),
        ]
        .into_iter()
        .filter_map(|(map, key)| map.get(key?))
        .flatten()
        .copied()
    }

    fn resolve_positions(&self, positions: BTreeSet<usize>) -> Vec<&IndexedContract> {
        positions
            .into_iter()
            .filter_map(|pos| self.contracts.get(pos))
            .collect()
    }
}

/// Patents grouped by award id.
#[derive(Debug, Default)]
pub struct PatentIndex {
    by_award: HashMap<String, Vec<Patent>>,
}

impl PatentIndex {
    pub fn build(patents: Vec<Patent>) -> Self {
        let mut by_award: HashMap<String, Vec<Patent>> = HashMap::new();
        for patent in patents {
            by_award
                .entry(patent.award_id.trim().to_string())
                .or_default()
                .push(patent);
        }
        for list in by_award.values_mut() {
            list.sort_by(|a, b| a.patent_id.cmp(&b.patent_id));
        }
        Self { by_award }
    }

    /// Patents for `award_id`, ordered by patent id; empty when none.
    pub fn for_award(&self, award_id: &str) -> &[Patent] {
        self.by_award
            .get(award_id.trim())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.by_award.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_award.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use transition_domain::VendorIdentity;

    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 1, 1).unwrap()
    }

    fn contract(id: &str, vendor: VendorIdentity) -> Contract {
        Contract::new(id, vendor, date())
    }

    #[test]
    fn stats_count_keys_and_unkeyed_contracts() {
        let index = VendorIndex::build(vec![
            contract("C-1", VendorIdentity::named("Acme Robotics").with_uei("U1")),
            contract("C-2", VendorIdentity::named("Acme Robotics").with_duns("123")),
            contract("C-3", VendorIdentity::named("  ")),
        ]);
        let stats = index.stats();
        assert_eq!(stats.contracts, 3);
        assert_eq!(stats.uei_keys, 1);
        assert_eq!(stats.duns_keys, 1);
        assert_eq!(stats.named_contracts, 2);
        assert_eq!(stats.unkeyed_contracts, 1);
    }

    fn ids(hits: Vec<&IndexedContract>) -> Vec<&str> {
        hits.into_iter()
            .map(|c| c.contract.contract_id.as_str())
            .collect()
    }

    fn scoped_index() -> VendorIndex {
        VendorIndex::build(vec![
            contract("C-1", VendorIdentity::named("Acme Robotics").with_uei("U1")),
            contract("C-2", VendorIdentity::named("Zenith Optics").with_uei("U1")),
            contract("C-3", VendorIdentity::named("AcmeRobotics")),
            contract("C-4", VendorIdentity::named("").with_uei("U1")),
            contract("C-5", VendorIdentity::named("").with_cage("9Z9Z9")),
        ])
    }

    #[test]
    fn keyed_lookup_unions_identifiers_without_duplicates() {
        let index = scoped_index();
        let award = NormalizedIdentity::from_vendor(
            &VendorIdentity::named("Acme Robotics Inc")
                .with_uei("u1")
                .with_cage("9z9z9"),
        );
        assert_eq!(
            ids(index.lookup(&award, LookupScope::Keyed)),
            vec!["C-1", "C-2", "C-4", "C-5"]
        );
    }

    #[test]
    fn named_lookup_visits_every_named_contract() {
        let index = scoped_index();
        let award = NormalizedIdentity::from_vendor(&VendorIdentity::named("Acme").with_uei("U1"));
        assert_eq!(
            ids(index.lookup(&award, LookupScope::Named)),
            vec!["C-1", "C-2", "C-3", "C-4"]
        );

        let unnamed = NormalizedIdentity::from_vendor(&VendorIdentity::named("").with_uei("U1"));
        assert_eq!(
            ids(index.lookup(&unnamed, LookupScope::Named)),
            vec!["C-1", "C-2", "C-4"]
        );
        assert_eq!(index.lookup(&unnamed, LookupScope::Corpus).len(), 5);
    }

    #[test]
    fn patents_grouped_and_sorted() {
        let patent = |id: &str, award: &str| Patent {
            patent_id: id.to_string(),
            award_id: award.to_string(),
            filing_date: None,
            title: None,
            abstract_text: None,
        };
        let index = PatentIndex::build(vec![
            patent("P-2", "A-1"),
            patent("P-1", "A-1"),
            patent("P-3", "A-2"),
        ]);
        let ids: Vec<_> = index.for_award("A-1").iter().map(|p| p.patent_id.as_str()).collect();
        assert_eq!(ids, vec!["P-1", "P-2"]);
        assert!(index.for_award("A-9").is_empty());
        assert_eq!(index.len(), 3);
    }
}
