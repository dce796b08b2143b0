//! Transition Domain Model
//!
//! Value objects shared by the transition detection engine and its sinks:
//! - Award / Contract / Patent: read-only input records
//! - TransitionConfig: validated engine configuration
//! - VendorMatch / SignalResult / Detection: scoring outputs
//! - EvidenceBundle: the exported, self-validating audit record
//!
//! All objects are serializable; bundles are content-addressable (SHA-256 of
//! canonical JSON) and detection ids are derived deterministically from the
//! (award, contract) pair.

pub mod competition;
pub mod config;
pub mod detection;
pub mod digest;
pub mod error;
pub mod evidence;
pub mod records;

pub use competition::CompetitionType;
pub use config::{
    AgencyBonusConfig, CandidateConfig, CompetitionBonusConfig, ConfidenceThresholds,
    GateThresholds, PatentConfig, PipelineConfig, SignalToggle, SignalWeights,
    TechnologyAreaConfig, TextSimilarityConfig, TimingWindow, TransitionConfig, VendorMatchConfig,
    WEIGHT_SUM_TOLERANCE,
};
pub use detection::{
    ConfidenceBand, Detection, SignalKind, SignalResult, ValidationIssue, ValidationIssueKind,
    ValidationReport, VendorMatch, VendorMatchMethod, SCORE_TOLERANCE,
};
pub use digest::{canonical_json, compute_digest, detection_id, sha256_hex};
pub use error::{ConfigError, DomainError, Result};
pub use evidence::{AwardSnapshot, ContractSnapshot, EvidenceBundle, EVIDENCE_SCHEMA_VERSION};
pub use records::{
    non_blank, AgencyRef, AnchorDate, Award, Contract, Patent, TechnologyArea, VendorIdentity,
};

/// Transition domain version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
