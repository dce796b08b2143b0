//! In-memory fakes for sink traits (testing only)
//!
//! Provides `MemoryBundleSink`, which satisfies the `BundleSink` contract
//! without touching the filesystem.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use transition_domain::EvidenceBundle;

use crate::error::{SinkError, SinkResult};
use crate::sink::BundleSink;

#[derive(Debug, Default)]
struct MemoryState {
    bundles: Vec<EvidenceBundle>,
    seen: HashSet<String>,
    flushes: usize,
}

/// In-memory sink backed by a `Vec<EvidenceBundle>` in arrival order.
#[derive(Debug, Default)]
pub struct MemoryBundleSink {
    state: Mutex<MemoryState>,
}

impl MemoryBundleSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepted bundles in arrival order.
    pub fn bundles(&self) -> Vec<EvidenceBundle> {
        self.state
            .lock()
            .map(|s| s.bundles.clone())
            .unwrap_or_default()
    }

    /// Accepted bundles ordered by (award id, contract id), independent of
    /// the order workers delivered them in.
    pub fn sorted_bundles(&self) -> Vec<EvidenceBundle> {
        let mut bundles = self.bundles();
        bundles.sort_by(|a, b| {
            (a.award_id.as_str(), a.contract_id.as_str())
                .cmp(&(b.award_id.as_str(), b.contract_id.as_str()))
        });
        bundles
    }

    pub fn len(&self) -> usize {
        self.state.lock().map(|s| s.bundles.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of `flush` calls observed.
    pub fn flush_count(&self) -> usize {
        self.state.lock().map(|s| s.flushes).unwrap_or(0)
    }
}

#[async_trait]
impl BundleSink for MemoryBundleSink {
    async fn accept(&self, bundle: &EvidenceBundle) -> SinkResult<()> {
        let mut state = self.state.lock().map_err(|_| SinkError::LockPoisoned)?;
        if !state.seen.insert(bundle.detection_id.clone()) {
            return Err(SinkError::AlreadyWritten {
                detection_id: bundle.detection_id.clone(),
            });
        }
        state.bundles.push(bundle.clone());
        Ok(())
    }

    async fn flush(&self) -> SinkResult<()> {
        let mut state = self.state.lock().map_err(|_| SinkError::LockPoisoned)?;
        state.flushes += 1;
        Ok(())
    }
}
