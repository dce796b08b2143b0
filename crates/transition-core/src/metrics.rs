//! Atomic counters for engine observability.
//!
//! Each [`TransitionEngine`](crate::engine::TransitionEngine) owns one
//! `EngineMetrics`; counters are incremented silently at the call site. Call
//! [`EngineMetrics::flush`] to emit current values as a single
//! `tracing::info!` event (e.g. at the end of a run).

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Lightweight atomic counters, no allocations, no locking.
#[derive(Debug, Default)]
pub struct EngineMetrics {
    awards_processed: AtomicU64,
    candidates_scored: AtomicU64,
    detections_emitted: AtomicU64,
    validation_failures: AtomicU64,
    awards_cancelled: AtomicU64,
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub awards_processed: u64,
    pub candidates_scored: u64,
    pub detections_emitted: u64,
    pub validation_failures: u64,
    pub awards_cancelled: u64,
}

impl EngineMetrics {
    pub const fn new() -> Self {
        Self {
            awards_processed: AtomicU64::new(0),
            candidates_scored: AtomicU64::new(0),
            detections_emitted: AtomicU64::new(0),
            validation_failures: AtomicU64::new(0),
            awards_cancelled: AtomicU64::new(0),
        }
    }

    pub fn inc_awards_processed(&self) {
        self.awards_processed.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "awards_processed", "counter incremented");
    }

    pub fn add_candidates_scored(&self, n: u64) {
        self.candidates_scored.fetch_add(n, Ordering::Relaxed);
        tracing::trace!(metric = "candidates_scored", n, "counter incremented");
    }

    pub fn add_detections_emitted(&self, n: u64) {
        self.detections_emitted.fetch_add(n, Ordering::Relaxed);
        tracing::trace!(metric = "detections_emitted", n, "counter incremented");
    }

    pub fn inc_validation_failures(&self) {
        self.validation_failures.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "validation_failures", "counter incremented");
    }

    pub fn add_awards_cancelled(&self, n: u64) {
        self.awards_cancelled.fetch_add(n, Ordering::Relaxed);
        tracing::trace!(metric = "awards_cancelled", n, "counter incremented");
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            awards_processed: self.awards_processed.load(Ordering::Relaxed),
            candidates_scored: self.candidates_scored.load(Ordering::Relaxed),
            detections_emitted: self.detections_emitted.load(Ordering::Relaxed),
            validation_failures: self.validation_failures.load(Ordering::Relaxed),
            awards_cancelled: self.awards_cancelled.load(Ordering::Relaxed),
        }
    }

    /// Emit all current counter values as a single `info!` event.
    ///
    /// Call this at natural boundaries (end of a run) rather than on every
    /// increment.
    pub fn flush(&self) {
        let s = self.snapshot();
        tracing::info!(
            metric = "flush",
            awards_processed = s.awards_processed,
            candidates_scored = s.candidates_scored,
            detections_emitted = s.detections_emitted,
            validation_failures = s.validation_failures,
            awards_cancelled = s.awards_cancelled,
        );
    }

    /// Reset all counters to zero (useful in tests).
    pub fn reset(&self) {
        self.awards_processed.store(0, Ordering::Relaxed);
        self.candidates_scored.store(0, Ordering::Relaxed);
        self.detections_emitted.store(0, Ordering::Relaxed);
        self.validation_failures.store(0, Ordering::Relaxed);
        self.awards_cancelled.store(0, Ordering::Relaxed);
    }
}
