//! End-to-end scoring of one award/contract pair.

use chrono::NaiveDate;
use transition_core::transition_domain::{
    AgencyRef, Award, CompetitionType, ConfidenceBand, Contract, SignalKind, TechnologyArea,
    TransitionConfig, VendorIdentity, VendorMatchMethod,
};
use transition_core::{PatentIndex, TransitionEngine, VendorIndex};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn close(actual: f64, expected: f64) -> bool {
    (actual - expected).abs() < 1e-9
}

fn scenario() -> (Award, Contract) {
    let mut award = Award::new(
        "AWD-2021-0001",
        VendorIdentity::named("Acme Robotics Inc").with_uei("ABC123"),
        date(2021, 3, 1),
    );
    award.agency = AgencyRef::new("DOD");
    award.completion_date = Some(date(2023, 1, 15));
    award.technology_area = Some(TechnologyArea::new("AI", 0.92));

    let mut contract = Contract::new(
        "CON-FA8650-23-C-0001",
        VendorIdentity::named("ACME ROBOTICS, INC.").with_uei("abc123"),
        date(2023, 3, 1),
    );
    contract.agency = AgencyRef::new("DOD").with_sub_agency("AirForce");
    contract.competition_type = CompetitionType::SoleSource;
    contract.technology_area = Some(TechnologyArea::new("AI", 0.71));
    (award, contract)
}

#[test]
fn sole_source_follow_on_scores_possible() {
    let engine = TransitionEngine::new(TransitionConfig::default()).expect("default config");
    let (award, contract) = scenario();
    let index = VendorIndex::build(vec![contract]);

    let result = engine.detect_award(&award, &index, &PatentIndex::default());
    assert_eq!(result.bundles.len(), 1);
    let bundle = &result.bundles[0];

    assert_eq!(bundle.vendor_match.method, VendorMatchMethod::Uei);
    assert_eq!(bundle.vendor_match.confidence, 0.99);

    let contribution = |kind: SignalKind| bundle.signals[&kind].score_contribution;
    assert!(close(contribution(SignalKind::TimingProximity), 0.20));
    assert!(close(contribution(SignalKind::CompetitionType), 0.04));
    assert!(close(contribution(SignalKind::TechnologyArea), 0.005));
    assert!(close(contribution(SignalKind::AgencyContinuity), 0.03125));
    assert_eq!(contribution(SignalKind::Patent), 0.0);
    assert!(!bundle.signals[&SignalKind::TextSimilarity].enabled);

    assert_eq!(
        bundle.signals[&SignalKind::TimingProximity].details["days_after_anchor"],
        45
    );
    assert_eq!(
        bundle.signals[&SignalKind::AgencyContinuity].details["relation"],
        "same_department"
    );

    assert_eq!(bundle.base_score, 0.15);
    assert!(close(bundle.likelihood_score, 0.42625));
    assert_eq!(bundle.confidence, ConfidenceBand::Possible);
    assert!(bundle.validation.passed);
    assert!(bundle.validation.delta <= bundle.validation.tolerance);
    assert_eq!(
        bundle.summary,
        "POSSIBLE transition (0.426): contract 45 days after award completion; sole-source award"
    );
}

#[test]
fn bundle_survives_json_round_trip() {
    let engine = TransitionEngine::new(TransitionConfig::default()).expect("default config");
    let (award, contract) = scenario();
    let index = VendorIndex::build(vec![contract]);
    let bundle = engine
        .detect_award(&award, &index, &PatentIndex::default())
        .bundles
        .remove(0);

    let line = bundle.to_json_line().expect("serialize");
    let decoded: transition_core::transition_domain::EvidenceBundle =
        serde_json::from_str(&line).expect("deserialize");
    assert_eq!(decoded, bundle);
    assert_eq!(
        decoded.content_digest().expect("digest"),
        bundle.content_digest().expect("digest")
    );
    assert!(engine.evidence_builder().revalidate(&decoded).passed);
}

#[test]
fn raising_weights_can_reach_high() {
    let mut config = TransitionConfig::default();
    config.base_score = 0.40;
    config.signals.timing_proximity.weight = 0.30;
    config.signals.competition_type.weight = 0.30;
    config.competition.sole_source = 0.50;
    config.signals.agency_continuity.weight = 0.10;
    config.signals.patent.weight = 0.10;
    config.signals.technology_area.weight = 0.10;
    let engine = TransitionEngine::new(config).expect("valid config");
    let (award, contract) = scenario();
    let index = VendorIndex::build(vec![contract]);

    let bundle = engine
        .detect_award(&award, &index, &PatentIndex::default())
        .bundles
        .remove(0);
    // 0.40 + 0.30 + 0.15 + 0.0125 + 0.005
    assert!(close(bundle.likelihood_score, 0.8675));
    assert_eq!(bundle.confidence, ConfidenceBand::High);
    assert!(bundle.validation.passed);
}

#[test]
fn engine_built_from_toml_overrides() {
    let config: TransitionConfig = toml::from_str(
        r#"
        base_score = 0.20

        [competition]
        sole_source = 0.40
        "#,
    )
    .expect("parse toml");
    let engine = TransitionEngine::new(config).expect("valid config");
    let (award, contract) = scenario();
    let index = VendorIndex::build(vec![contract]);

    let bundle = engine
        .detect_award(&award, &index, &PatentIndex::default())
        .bundles
        .remove(0);
    // +0.05 base, +0.04 from the doubled sole-source bonus.
    assert!(close(bundle.likelihood_score, 0.51625));
    assert_eq!(bundle.confidence, ConfidenceBand::Possible);

    let rejected: TransitionConfig = toml::from_str(
        r#"
        [confidence]
        likely = 0.9
        high = 0.8
        "#,
    )
    .expect("parse toml");
    assert!(TransitionEngine::new(rejected).is_err());
}
