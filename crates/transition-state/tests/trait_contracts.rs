//! Trait contract tests for BundleSink.
//!
//! These tests verify the behavioral contracts of the sink trait using the
//! in-memory fake and the JSONL writer. Any conforming implementation must
//! pass these.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use transition_domain::{
    detection_id, Award, AwardSnapshot, ConfidenceBand, Contract, ContractSnapshot,
    EvidenceBundle, SignalKind, SignalResult, ValidationReport, VendorIdentity, VendorMatch,
    VendorMatchMethod, EVIDENCE_SCHEMA_VERSION,
};
use transition_state::{
    read_bundles_jsonl, BundleSink, JsonlBundleSink, MemoryBundleSink, SinkError,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn bundle(award_id: &str, contract_id: &str) -> EvidenceBundle {
    let award = Award::new(
        award_id,
        VendorIdentity::named("Acme Robotics Inc").with_uei("ABC123"),
        date(2022, 1, 10),
    );
    let contract = Contract::new(
        contract_id,
        VendorIdentity::named("ACME ROBOTICS INC").with_uei("abc123"),
        date(2023, 3, 1),
    );

    let timing = SignalResult {
        signal: SignalKind::TimingProximity,
        enabled: true,
        weight: 0.2,
        raw_bonus: 0.75,
        score_contribution: 0.15000000000000002,
        snippet: "contract 415 days after award".to_string(),
        details: BTreeMap::from([("days".to_string(), serde_json::json!(415))]),
    };
    let expected = 0.15 + timing.score_contribution;

    EvidenceBundle {
        schema_version: EVIDENCE_SCHEMA_VERSION.to_string(),
        detection_id: detection_id(award_id, contract_id),
        award_id: award_id.to_string(),
        contract_id: contract_id.to_string(),
        award: AwardSnapshot::from(&award),
        contract: ContractSnapshot::from(&contract),
        vendor_match: VendorMatch {
            method: VendorMatchMethod::Uei,
            confidence: 0.99,
            award_value: "ABC123".to_string(),
            contract_value: "ABC123".to_string(),
            name_similarity: None,
        },
        signals: BTreeMap::from([(SignalKind::TimingProximity, timing)]),
        base_score: 0.15,
        likelihood_score: expected,
        confidence: ConfidenceBand::Possible,
        summary: "POSSIBLE transition (0.300): contract 415 days after award".to_string(),
        validation: ValidationReport {
            passed: true,
            expected_score: expected,
            stored_score: expected,
            delta: 0.0,
            tolerance: 1e-6,
            issues: vec![],
        },
    }
}

// ===========================================================================
// MemoryBundleSink
// ===========================================================================

#[tokio::test]
async fn memory_sink_accepts_in_arrival_order() {
    let sink = MemoryBundleSink::new();
    sink.accept(&bundle("A-2", "C-1")).await.unwrap();
    sink.accept(&bundle("A-1", "C-1")).await.unwrap();

    let ids: Vec<_> = sink.bundles().into_iter().map(|b| b.award_id).collect();
    assert_eq!(ids, vec!["A-2", "A-1"]);

    let sorted: Vec<_> = sink
        .sorted_bundles()
        .into_iter()
        .map(|b| b.award_id)
        .collect();
    assert_eq!(sorted, vec!["A-1", "A-2"]);
}

#[tokio::test]
async fn memory_sink_is_write_once() {
    let sink = MemoryBundleSink::new();
    let b = bundle("A-1", "C-1");
    sink.accept(&b).await.unwrap();

    let err = sink.accept(&b).await.unwrap_err();
    assert!(matches!(err, SinkError::AlreadyWritten { .. }));
    assert_eq!(sink.len(), 1);
}

#[tokio::test]
async fn memory_sink_counts_flushes() {
    let sink = MemoryBundleSink::new();
    assert!(sink.is_empty());
    sink.flush().await.unwrap();
    assert_eq!(sink.flush_count(), 1);
}

// ===========================================================================
// JsonlBundleSink
// ===========================================================================

#[tokio::test]
async fn jsonl_round_trip_preserves_every_field() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bundles.jsonl");

    let originals = vec![bundle("A-1", "C-1"), bundle("A-1", "C-2")];
    let sink = JsonlBundleSink::create(&path).await.unwrap();
    for b in &originals {
        sink.accept(b).await.unwrap();
    }
    sink.flush().await.unwrap();
    assert_eq!(sink.written().await, 2);

    let read = read_bundles_jsonl(&path).await.unwrap();
    assert_eq!(read, originals);
    assert_eq!(
        read[0].content_digest().unwrap(),
        originals[0].content_digest().unwrap()
    );
}

#[tokio::test]
async fn jsonl_sink_is_write_once() {
    let dir = tempfile::tempdir().unwrap();
    let sink = JsonlBundleSink::create(dir.path().join("b.jsonl"))
        .await
        .unwrap();
    let b = bundle("A-1", "C-1");
    sink.accept(&b).await.unwrap();
    assert!(matches!(
        sink.accept(&b).await.unwrap_err(),
        SinkError::AlreadyWritten { .. }
    ));
    sink.flush().await.unwrap();

    let read = read_bundles_jsonl(sink.path()).await.unwrap();
    assert_eq!(read.len(), 1);
}

#[tokio::test]
async fn jsonl_reader_reports_malformed_line() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.jsonl");
    let good = serde_json::to_string(&bundle("A-1", "C-1")).unwrap();
    tokio::fs::write(&path, format!("{good}\n\n{{not json}}\n"))
        .await
        .unwrap();

    let err = read_bundles_jsonl(&path).await.unwrap_err();
    match err {
        SinkError::MalformedLine { line, .. } => assert_eq!(line, 3),
        other => panic!("expected MalformedLine, got {other:?}"),
    }
}
