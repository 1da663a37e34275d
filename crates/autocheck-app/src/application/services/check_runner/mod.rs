mod execution;

use autocheck_domain::cancellation::CancellationToken;
use autocheck_domain::check::CheckDefinition;
use autocheck_domain::events::{BatchSummary, EventSink};
use autocheck_domain::secrets::SecretStore;
use autocheck_domain::shared::BatchId;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Executes one batch of checks, in order, on its own task.
///
/// A runner is single-use: `start` consumes it. Everything the batch reports
/// goes through the runner's `EventSink`, already bound to the batch id.
pub struct CheckRunner {
    batch: BatchId,
    sink: EventSink,
    secrets: Arc<dyn SecretStore>,
    cancel: CancellationToken,
}

impl CheckRunner {
    pub fn new(sink: EventSink, secrets: Arc<dyn SecretStore>) -> Self {
        let batch = BatchId::new();
        Self {
            sink: sink.for_batch(batch.clone()),
            batch,
            secrets,
            cancel: CancellationToken::new(),
        }
    }

    pub fn batch(&self) -> &BatchId {
        &self.batch
    }

    /// Spawn the batch and return at once.
    ///
    /// `on_finished` runs exactly once, after the last check and right before
    /// `BatchFinished` is emitted, whatever way the batch ends (including a
    /// panic inside the runner or the task being aborted).
    pub fn start<F>(self, checks: Vec<CheckDefinition>, on_finished: F) -> RunnerHandle
    where
        F: FnOnce(&BatchSummary) + Send + 'static,
    {
        info!(
            "🚀 Starting batch {} for tab {} ({} checks)",
            self.batch,
            self.sink.tab(),
            checks.len()
        );

        let batch = self.batch.clone();
        let cancel = self.cancel.clone();
        let join = tokio::spawn(self.run_batch(checks, on_finished));

        RunnerHandle {
            batch,
            cancel,
            join,
        }
    }
}

/// Owner's view of a running batch
#[derive(Debug)]
pub struct RunnerHandle {
    batch: BatchId,
    cancel: CancellationToken,
    join: JoinHandle<BatchSummary>,
}

impl RunnerHandle {
    pub fn batch(&self) -> &BatchId {
        &self.batch
    }

    /// Stop before the next check. Idempotent.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Wait for the batch to end by itself
    pub async fn join(self) -> Option<BatchSummary> {
        match self.join.await {
            Ok(summary) => Some(summary),
            Err(e) => {
                warn!("⚠️  Batch {} worker ended abnormally: {}", self.batch, e);
                None
            }
        }
    }

    /// Give the batch `grace` to finish, then abort it. Returns whether it
    /// finished on its own.
    pub async fn wait_or_abort(mut self, grace: Duration) -> bool {
        match tokio::time::timeout(grace, &mut self.join).await {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                warn!("⚠️  Batch {} worker ended abnormally: {}", self.batch, e);
                true
            }
            Err(_) => {
                warn!(
                    "⏱️  Batch {} did not stop within {:?}, aborting",
                    self.batch, grace
                );
                self.join.abort();
                // Bounded: a check that blocks its thread cannot be aborted
                let _ = tokio::time::timeout(grace, &mut self.join).await;
                false
            }
        }
    }
}
