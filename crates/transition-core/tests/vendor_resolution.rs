use transition_core::resolver::{CAGE_CONFIDENCE, DUNS_CONFIDENCE, UEI_CONFIDENCE};
use transition_core::transition_domain::{
    VendorIdentity, VendorMatch, VendorMatchConfig, VendorMatchMethod,
};
use transition_core::{MatchStrategy, NormalizedIdentity, VendorResolver};

fn resolver() -> VendorResolver {
    VendorResolver::new(&VendorMatchConfig::default())
}

#[test]
fn cascade_order_is_fixed() {
    assert_eq!(
        resolver().methods(),
        vec![
            VendorMatchMethod::Uei,
            VendorMatchMethod::Cage,
            VendorMatchMethod::Duns,
            VendorMatchMethod::NameFuzzy,
            VendorMatchMethod::NameFuzzySecondary,
        ]
    );
}

#[test]
fn uei_wins_over_every_other_key() {
    let award = VendorIdentity::named("Acme Robotics")
        .with_uei("abc123")
        .with_cage("1XYZ2")
        .with_duns("123456789");
    let contract = VendorIdentity::named("Acme Robotics")
        .with_uei(" ABC123 ")
        .with_cage("1xyz2")
        .with_duns("123456789");

    let m = resolver().resolve(&award, &contract).expect("match");
    assert_eq!(m.method, VendorMatchMethod::Uei);
    assert_eq!(m.confidence, UEI_CONFIDENCE);
    assert_eq!(m.award_value, "ABC123");
    assert_eq!(m.name_similarity, None);
}

#[test]
fn differing_uei_falls_through_to_cage() {
    let award = VendorIdentity::named("Acme").with_uei("U1").with_cage("1XYZ2");
    let contract = VendorIdentity::named("Other Name")
        .with_uei("U2")
        .with_cage("1XYZ2");

    let m = resolver().resolve(&award, &contract).expect("match");
    assert_eq!(m.method, VendorMatchMethod::Cage);
    assert_eq!(m.confidence, CAGE_CONFIDENCE);
}

#[test]
fn duns_is_padded_and_stripped() {
    let award = VendorIdentity::named("Acme").with_duns("12-345-678");
    let contract = VendorIdentity::named("Unrelated Vendor").with_duns("012345678");

    let m = resolver().resolve(&award, &contract).expect("match");
    assert_eq!(m.method, VendorMatchMethod::Duns);
    assert_eq!(m.confidence, DUNS_CONFIDENCE);
    assert_eq!(m.contract_value, "012345678");
}

#[test]
fn malformed_duns_only_disables_its_own_strategy() {
    let award = VendorIdentity::named("Acme Robotics Inc").with_duns("N/A");
    let contract = VendorIdentity::named("ACME ROBOTICS, INC.").with_duns("N/A");

    let m = resolver().resolve(&award, &contract).expect("match");
    assert_eq!(m.method, VendorMatchMethod::NameFuzzy);
    assert_eq!(m.confidence, 1.0);
    assert_eq!(m.name_similarity, Some(1.0));
}

#[test]
fn secondary_tier_reports_raw_similarity() {
    let award = VendorIdentity::named("Acme Robotics");
    let contract = VendorIdentity::named("ACME ROBOTIX");

    let m = resolver().resolve(&award, &contract).expect("match");
    assert_eq!(m.method, VendorMatchMethod::NameFuzzySecondary);
    let expected = 11.0 / 13.0;
    assert!((m.confidence - expected).abs() < 1e-12);
    assert_eq!(m.name_similarity, Some(m.confidence));
}

#[test]
fn weak_name_overlap_does_not_match() {
    let award = VendorIdentity::named("Acme Robotics");
    let contract = VendorIdentity::named("Acme Drones");
    assert!(resolver().resolve(&award, &contract).is_none());
}

#[test]
fn truncated_name_falls_below_both_tiers() {
    // "ACME AERO" against "ACME AEROSPACE": five edits over fourteen chars.
    let award = VendorIdentity::named("Acme Aerospace");
    let contract = VendorIdentity::named("ACME AERO");
    assert!(resolver().resolve(&award, &contract).is_none());
}

#[test]
fn empty_identities_never_match() {
    let empty = VendorIdentity::default();
    assert!(NormalizedIdentity::from_vendor(&empty).is_empty());
    assert!(resolver().resolve(&empty, &empty).is_none());
}

struct ExactName;

impl MatchStrategy for ExactName {
    fn method(&self) -> VendorMatchMethod {
        VendorMatchMethod::NameFuzzy
    }

    fn try_match(
        &self,
        award: &NormalizedIdentity,
        contract: &NormalizedIdentity,
    ) -> Option<VendorMatch> {
        let a = award.name.as_deref()?;
        let c = contract.name.as_deref()?;
        (a == c).then(|| VendorMatch {
            method: VendorMatchMethod::NameFuzzy,
            confidence: 0.5,
            award_value: a.to_string(),
            contract_value: c.to_string(),
            name_similarity: Some(1.0),
        })
    }
}

#[test]
fn custom_strategies_replace_the_cascade() {
    let resolver = VendorResolver::with_strategies(vec![Box::new(ExactName)]);
    let award = VendorIdentity::named("Acme").with_uei("U1");
    let contract = VendorIdentity::named("acme").with_uei("U1");

    let m = resolver.resolve(&award, &contract).expect("match");
    assert_eq!(m.confidence, 0.5);
    assert!(resolver
        .resolve(&award, &VendorIdentity::named("Acme Inc").with_uei("U1"))
        .is_none());
}
