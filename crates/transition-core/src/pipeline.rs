//! Bounded parallel batch runner.
//!
//! Awards are independent, so each one is scored on the blocking pool
//! (`spawn_blocking`) against indexes shared read-only through `Arc`. A
//! semaphore bounds how many awards are in flight; a permit is held until the
//! award's bundles have been delivered to the sink.
//!
//! Cancellation is observed before each dispatch. Awards already in flight
//! finish and deliver every bundle, so per-award output is all or nothing.
//! Sink failures and worker panics stop dispatch and fail the run.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{watch, Semaphore};
use tokio::task::{JoinError, JoinSet};
use tracing::{warn, Instrument};
use transition_domain::{Award, Contract, Patent};
use transition_state::BundleSink;
use uuid::Uuid;

use crate::engine::{AwardDetections, TransitionEngine};
use crate::error::{PipelineError, PipelineResult};
use crate::index::{PatentIndex, VendorIndex};
use crate::obs::{self, RunSpan};
use crate::summary::{RunStatus, RunSummary, SummaryBuilder};

/// Cooperative cancellation flag backed by a `watch` channel.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    tx: Arc<watch::Sender<bool>>,
    rx: watch::Receiver<bool>,
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancellationToken {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            tx: Arc::new(tx),
            rx,
        }
    }

    /// Stop dispatching new awards. Idempotent.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once [`cancel`](Self::cancel) has been called.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        loop {
            let cancelled = *rx.borrow_and_update();
            if cancelled {
                return;
            }
            // The sender lives as long as `self`, so this only errors on drop.
            if rx.changed().await.is_err() {
                return;
            }
        }
    }
}

/// One run's shared, read-only inputs.
#[derive(Debug, Clone)]
pub struct DetectionRun {
    engine: Arc<TransitionEngine>,
    index: Arc<VendorIndex>,
    patents: Arc<PatentIndex>,
}

type WorkerOutput = PipelineResult<AwardDetections>;

impl DetectionRun {
    /// Index `contracts` and `patents` once for the run.
    pub fn new(engine: Arc<TransitionEngine>, contracts: Vec<Contract>, patents: Vec<Patent>) -> Self {
        Self::from_parts(
            engine,
            Arc::new(VendorIndex::build(contracts)),
            Arc::new(PatentIndex::build(patents)),
        )
    }

    pub fn from_parts(
        engine: Arc<TransitionEngine>,
        index: Arc<VendorIndex>,
        patents: Arc<PatentIndex>,
    ) -> Self {
        Self {
            engine,
            index,
            patents,
        }
    }

    pub fn engine(&self) -> &TransitionEngine {
        &self.engine
    }

    pub fn index(&self) -> &VendorIndex {
        &self.index
    }

    /// Score `awards` and stream every bundle to `sink`.
    ///
    /// Returns the run summary, or `PipelineError::Cancelled` carrying the
    /// partial summary when `cancel` fired before every award was dispatched.
    pub async fn run(
        &self,
        awards: Vec<Award>,
        sink: Arc<dyn BundleSink>,
        cancel: &CancellationToken,
    ) -> PipelineResult<RunSummary> {
        let run_id = Uuid::new_v4();
        self.run_inner(run_id, awards, sink, cancel)
            .instrument(obs::run_span(&run_id.to_string()))
            .await
    }

    async fn run_inner(
        &self,
        run_id: Uuid,
        awards: Vec<Award>,
        sink: Arc<dyn BundleSink>,
        cancel: &CancellationToken,
    ) -> PipelineResult<RunSummary> {
        let run_label = run_id.to_string();
        let clock = Instant::now();
        let max_in_flight = self.engine.config().pipeline.max_concurrent_awards;
        obs::emit_run_started(&run_label, awards.len(), self.index.len(), self.patents.len());

        let semaphore = Arc::new(Semaphore::new(max_in_flight));
        let mut builder = SummaryBuilder::new(run_id, awards.len(), self.index.stats().clone());
        let mut workers: JoinSet<WorkerOutput> = JoinSet::new();
        let mut failure: Option<PipelineError> = None;
        let mut cancelled = false;

        for award in awards {
            if cancel.is_cancelled() {
                cancelled = true;
                break;
            }
            let permit = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    cancelled = true;
                    break;
                }
                permit = Arc::clone(&semaphore).acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(e) => {
                        failure = Some(PipelineError::Worker(e.to_string()));
                        break;
                    }
                },
            };

            while let Some(joined) = workers.try_join_next() {
                absorb(&mut builder, &mut failure, joined);
            }
            if failure.is_some() {
                break;
            }

            let engine = Arc::clone(&self.engine);
            let index = Arc::clone(&self.index);
            let patents = Arc::clone(&self.patents);
            let sink = Arc::clone(&sink);
            let span_id = run_label.clone();
            workers.spawn(async move {
                let _permit = permit;
                let detections = tokio::task::spawn_blocking(move || {
                    let _span = RunSpan::enter(&span_id);
                    engine.detect_award(&award, &index, &patents)
                })
                .await
                .map_err(|e| PipelineError::Worker(e.to_string()))?;

                for bundle in &detections.bundles {
                    sink.accept(bundle).await?;
                }
                Ok(detections)
            });
        }

        while let Some(joined) = workers.join_next().await {
            absorb(&mut builder, &mut failure, joined);
        }

        if let Some(err) = failure {
            warn!(run_id = %run_label, error = %err, "detection run failed");
            return Err(err);
        }
        sink.flush().await?;

        let status = if cancelled {
            RunStatus::Cancelled
        } else {
            RunStatus::Completed
        };
        let summary = builder.finish(status);
        let metrics = self.engine.metrics();
        if cancelled {
            metrics.add_awards_cancelled(summary.awards_not_dispatched as u64);
            obs::emit_run_cancelled(
                &run_label,
                summary.awards_processed,
                summary.awards_not_dispatched,
            );
        }
        obs::emit_run_finished(
            &run_label,
            clock.elapsed().as_millis() as u64,
            summary.detections,
            summary.validation_failures,
            summary.is_clean(),
        );
        metrics.flush();

        if cancelled {
            return Err(PipelineError::Cancelled {
                summary: Box::new(summary),
            });
        }
        Ok(summary)
    }
}

fn absorb(
    builder: &mut SummaryBuilder,
    failure: &mut Option<PipelineError>,
    joined: Result<WorkerOutput, JoinError>,
) {
    match joined {
        Ok(Ok(detections)) => builder.record(&detections),
        Ok(Err(err)) => {
            failure.get_or_insert(err);
        }
        Err(join_err) => {
            failure.get_or_insert(PipelineError::Worker(join_err.to_string()));
        }
    }
}
