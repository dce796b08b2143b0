use proptest::prelude::*;
use transition_domain::{
    canonical_json, detection_id, CompetitionType, ConfigError, SignalKind, TimingWindow,
    TransitionConfig,
};

const FULL_TOML: &str = r#"
base_score = 0.10

[vendor_matching]
primary_threshold = 0.90
secondary_threshold = 0.75

[candidates]
max_window_days = 365
max_candidates_per_award = 20

[signals]
require_unit_sum = true
agency_continuity = { enabled = true, weight = 0.20 }
timing_proximity = { enabled = true, weight = 0.30 }
competition_type = { enabled = true, weight = 0.20 }
patent = { enabled = true, weight = 0.10 }
technology_area = { enabled = true, weight = 0.10 }
text_similarity = { enabled = true, weight = 0.10 }

[[timing_windows]]
day_range = [0, 180]
multiplier = 1.0

[[timing_windows]]
day_range = [181, 365]
multiplier = 0.5

[agency.parent_overrides]
"ARPA-I" = "DOT"

[confidence]
likely = 0.55
high = 0.80

[pipeline]
max_concurrent_awards = 4

[quality_gates]
min_vendor_resolution_rate = 0.25
min_detections = 1
"#;

#[test]
fn full_toml_document_loads() {
    let config = TransitionConfig::from_toml_str(FULL_TOML).expect("valid toml config");
    assert_eq!(config.base_score, 0.10);
    assert_eq!(config.candidates.max_window_days, 365);
    assert!(config.signals.require_unit_sum);
    assert!(config.signals.toggle(SignalKind::TextSimilarity).enabled);
    assert_eq!(
        config.timing_windows,
        vec![TimingWindow::new(0, 180, 1.0), TimingWindow::new(181, 365, 0.5)]
    );
    assert_eq!(config.agency.parent_overrides["ARPA-I"], "DOT");
    assert_eq!(config.pipeline.max_concurrent_awards, 4);
    assert_eq!(config.quality_gates.min_detections, 1);
    // Untouched sections keep their defaults.
    assert_eq!(config.competition.sole_source, 0.20);
}

#[test]
fn empty_toml_is_the_default_config() {
    let config = TransitionConfig::from_toml_str("").expect("defaults");
    assert_eq!(config, TransitionConfig::default());
}

#[test]
fn toml_and_json_agree() {
    let from_toml = TransitionConfig::from_toml_str(FULL_TOML).expect("toml");
    let json = serde_json::to_string(&from_toml).expect("json");
    let from_json = TransitionConfig::from_json_str(&json).expect("json config");
    assert_eq!(from_toml, from_json);
}

#[test]
fn unit_sum_is_enforced_when_required() {
    let doc = FULL_TOML.replace("weight = 0.30", "weight = 0.25");
    let err = TransitionConfig::from_toml_str(&doc).unwrap_err();
    assert!(matches!(err, ConfigError::WeightSum { .. }), "{err}");
}

#[test]
fn strict_mode_rejects_default_weights() {
    let lenient = TransitionConfig::default();
    assert!((lenient.signals.enabled_sum() - 0.90).abs() < 1e-9);
    assert!(lenient.validate().is_ok());

    let err = TransitionConfig::from_toml_str("[signals]\nrequire_unit_sum = true").unwrap_err();
    match err {
        ConfigError::WeightSum { sum, requirement } => {
            assert!((sum - 0.90).abs() < 1e-9);
            assert_eq!(requirement, "must equal 1.0");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let err = TransitionConfig::from_toml_str("base_score = \"high\"").unwrap_err();
    match err {
        ConfigError::ParseError { format, .. } => assert_eq!(format, "toml"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn windows_must_not_overlap() {
    let doc = FULL_TOML.replace("day_range = [181, 365]", "day_range = [170, 365]");
    let err = TransitionConfig::from_toml_str(&doc).unwrap_err();
    assert!(err.to_string().contains("timing_windows"), "{err}");
}

#[test]
fn competition_codes_from_mixed_sources() {
    for (raw, expected) in [
        ("Full and Open", CompetitionType::FullAndOpen),
        ("FSS", CompetitionType::Limited),
        ("8(a)", CompetitionType::Limited),
        ("NDO", CompetitionType::SoleSource),
        ("not-competed", CompetitionType::SoleSource),
        ("", CompetitionType::Unknown),
        ("SOMETHING ELSE", CompetitionType::Unknown),
    ] {
        assert_eq!(CompetitionType::from_code(raw), expected, "{raw:?}");
    }
}

proptest! {
    #[test]
    fn detection_ids_are_stable_and_distinct(
        a in "[A-Z0-9-]{1,12}",
        b in "[A-Z0-9-]{1,12}",
        c in "[A-Z0-9-]{1,12}",
    ) {
        prop_assert_eq!(detection_id(&a, &b), detection_id(&a, &b));
        if b != c {
            prop_assert_ne!(detection_id(&a, &b), detection_id(&a, &c));
        }
    }

    #[test]
    fn canonical_json_ignores_key_order(x in -1.0e6f64..1.0e6, y in any::<i32>()) {
        let one = serde_json::json!({ "x": x, "y": y, "nested": { "b": 1, "a": 2 } });
        let two = serde_json::json!({ "nested": { "a": 2, "b": 1 }, "y": y, "x": x });
        prop_assert_eq!(
            canonical_json(&one).expect("canonical"),
            canonical_json(&two).expect("canonical")
        );
    }
}
