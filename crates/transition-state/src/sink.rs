//! Sink trait definitions.
//!
//! A `BundleSink` receives evidence bundles as soon as they are built. The
//! engine never reads them back; downstream graph loaders and report
//! generators consume whatever the sink persisted.
//!
//! In-memory fakes are provided for testing via the `fakes` module; the
//! `jsonl` module writes line-delimited JSON files.

use async_trait::async_trait;
use transition_domain::EvidenceBundle;

use crate::error::SinkResult;

/// Destination for evidence bundles.
///
/// Guarantees:
/// - Bundles are write-once: accepting a second bundle with an already
///   accepted `detection_id` fails with `SinkError::AlreadyWritten` and
///   leaves the first bundle untouched.
/// - Accepted bundles are persisted unchanged (no field rewriting).
/// - Safe to share across tasks; `accept` may be called concurrently.
#[async_trait]
pub trait BundleSink: Send + Sync {
    /// Accept one bundle.
    async fn accept(&self, bundle: &EvidenceBundle) -> SinkResult<()>;

    /// Flush buffered output. Called once at the end of a run.
    async fn flush(&self) -> SinkResult<()>;
}
