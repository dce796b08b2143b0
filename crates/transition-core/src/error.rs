//! Error taxonomy for detection runs.
//!
//! Per-record data problems never surface here: they degrade to "absent"
//! inside the engine. Only configuration, sink, cancellation and worker
//! failures halt a run.

use thiserror::Error;
use transition_domain::ConfigError;
use transition_state::SinkError;

use crate::summary::RunSummary;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("bundle sink failed: {0}")]
    Sink(#[from] SinkError),

    /// Cancellation stopped dispatch. In-flight awards completed and their
    /// bundles were delivered; the partial summary is attached.
    #[error("run cancelled after {} of {} awards", summary.awards_processed, summary.awards_total)]
    Cancelled { summary: Box<RunSummary> },

    #[error("worker failed: {0}")]
    Worker(String),
}

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

impl PipelineError {
    /// Partial summary of a cancelled run.
    pub fn partial_summary(&self) -> Option<&RunSummary> {
        match self {
            PipelineError::Cancelled { summary } => Some(summary),
            _ => None,
        }
    }
}
