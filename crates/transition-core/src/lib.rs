//! Transition Core Library
//!
//! Links research awards to the follow-on contracts their vendors later won.
//! For each award the engine resolves vendor identity across contracts,
//! scores every in-window candidate with six independent signals, classifies
//! the composite score and packages the result as a self-validating evidence
//! bundle.
//!
//! Layout:
//! - `resolver`, `index`, `candidates`: vendor resolution and candidate lookup
//! - `signals`, `scoring`: signal evaluation and the composite score
//! - `evidence`, `engine`: bundle assembly and per-award detection
//! - `pipeline`, `summary`, `gate`, `reporting`: batch runs and their outputs

pub mod candidates;
pub mod engine;
pub mod error;
pub mod evidence;
pub mod gate;
pub mod index;
pub mod metrics;
pub mod obs;
pub mod pipeline;
pub mod reporting;
pub mod resolver;
pub mod scoring;
pub mod signals;
pub mod summary;
pub mod telemetry;
pub mod text;

pub use candidates::{Candidate, CandidateSelector, CandidateSet, CandidateStats};
pub use engine::{AwardDetections, TransitionEngine};
pub use error::{PipelineError, PipelineResult};
pub use evidence::{summary_line, EvidenceBuilder, ScoredPair};
pub use gate::{evaluate_quality_gate, GateRule, GateVerdict, QualityGateRuleSet, Violation};
pub use index::{IndexStats, IndexedContract, PatentIndex, VendorIndex};
pub use metrics::{EngineMetrics, MetricsSnapshot};
pub use pipeline::{CancellationToken, DetectionRun};
pub use reporting::{
    read_summary_artifact, render_summary_md, write_summary_artifact, write_summary_md,
};
pub use resolver::{
    IdentifierStrategy, LookupScope, MatchStrategy, NameSimilarityStrategy, NormalizedIdentity,
    VendorResolver,
};
pub use scoring::{CompositeScore, CompositeScorer, ConfidenceClassifier};
pub use signals::agency::{AgencyHierarchy, AgencyRelation};
pub use signals::{evaluate_all, Evaluate, SignalContext, SignalOutcome};
pub use summary::{FlaggedDetection, RunStatus, RunSummary, ScoreStats, SummaryBuilder};
pub use telemetry::{init_tracing, LogFormat};

pub use transition_domain;
pub use transition_state;

/// Transition core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
