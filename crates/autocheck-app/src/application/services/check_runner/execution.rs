use autocheck_domain::check::{CheckContext, CheckDefinition, CheckOutcome, Severity};
use autocheck_domain::events::{BatchSummary, EventSink, RunnerEventKind};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use super::CheckRunner;

impl CheckRunner {
    #[instrument(skip_all, fields(tab = %self.sink.tab(), batch = %self.batch))]
    pub(super) async fn run_batch<F>(self, checks: Vec<CheckDefinition>, on_finished: F) -> BatchSummary
    where
        F: FnOnce(&BatchSummary) + Send + 'static,
    {
        let mut completion = BatchCompletion {
            sink: self.sink.clone(),
            summary: BatchSummary::new(checks.len()),
            in_flight: None,
            on_finished: Some(on_finished),
        };

        self.sink.log(
            format!("Starting check run for system {}", self.sink.system()),
            Severity::Info,
        );

        let run = AssertUnwindSafe(self.run_checks(&checks, &mut completion))
            .catch_unwind()
            .await;

        if let Err(panic) = run {
            let reason = panic_message(&*panic);
            error!("❌ Batch {} aborted by a panic: {}", self.batch, reason);
            self.sink
                .log(format!("Check run aborted: {}", reason), Severity::Error);
        }

        completion.finish()
    }

    async fn run_checks<F>(&self, checks: &[CheckDefinition], completion: &mut BatchCompletion<F>)
    where
        F: FnOnce(&BatchSummary),
    {
        for definition in checks {
            if self.cancel.is_cancelled() {
                info!("🛑 Batch {} cancelled before '{}'", self.batch, definition.name());
                self.sink.log("Check run cancelled", Severity::Warning);
                return;
            }

            let name = definition.name().to_string();
            completion.in_flight = Some(name.clone());
            self.sink
                .emit(RunnerEventKind::CheckStarted { name: name.clone() });
            self.sink
                .log(format!("Starting check: {}", name), Severity::Info);

            let outcome = self.invoke(definition).await;

            let mut line = format!("Finished: {}: {}", name, outcome.label());
            if let Some(detail) = outcome.message() {
                line.push_str(&format!(" ({})", detail));
            }
            self.sink.log(line, outcome.severity());

            completion.in_flight = None;
            self.sink.emit(RunnerEventKind::CheckFinished {
                name,
                outcome: outcome.clone(),
            });
            completion.summary.record(&outcome);
        }
    }

    /// Run one check; errors and panics become a failed outcome
    async fn invoke(&self, definition: &CheckDefinition) -> CheckOutcome {
        let ctx = CheckContext::new(
            definition.name(),
            self.sink.clone(),
            self.cancel.clone(),
            Arc::clone(&self.secrets),
        );
        let check = definition.check();

        let reason = match AssertUnwindSafe(check.run(&ctx)).catch_unwind().await {
            Ok(Ok(outcome)) => return outcome,
            Ok(Err(e)) => format!("{:#}", e),
            Err(panic) => format!("panicked: {}", panic_message(&*panic)),
        };

        warn!("⚠️  Check '{}' crashed: {}", definition.name(), reason);
        self.sink.log(
            format!("Check {} crashed: {}", definition.name(), reason),
            Severity::Error,
        );
        CheckOutcome::failure(reason)
    }
}

/// Finishes the batch exactly once: explicitly on the normal path, from
/// `Drop` when the task is aborted mid-check.
struct BatchCompletion<F>
where
    F: FnOnce(&BatchSummary),
{
    sink: EventSink,
    summary: BatchSummary,
    in_flight: Option<String>,
    on_finished: Option<F>,
}

impl<F> BatchCompletion<F>
where
    F: FnOnce(&BatchSummary),
{
    fn finish(mut self) -> BatchSummary {
        self.complete();
        self.summary.clone()
    }

    fn complete(&mut self) {
        let Some(on_finished) = self.on_finished.take() else {
            return;
        };

        if let Some(name) = self.in_flight.take() {
            let outcome = CheckOutcome::cancelled().with_message("interrupted");
            self.summary.record(&outcome);
            self.sink
                .emit(RunnerEventKind::CheckFinished { name, outcome });
        }
        self.summary.skipped = self
            .summary
            .total
            .saturating_sub(self.summary.completed());

        self.sink.log(
            format!("Check run for system {} finished", self.sink.system()),
            Severity::Info,
        );
        info!("🏁 Batch finished for tab {}: {}", self.sink.tab(), self.summary);

        on_finished(&self.summary);
        self.sink.emit(RunnerEventKind::BatchFinished {
            summary: self.summary.clone(),
        });
    }
}

impl<F> Drop for BatchCompletion<F>
where
    F: FnOnce(&BatchSummary),
{
    fn drop(&mut self) {
        self.complete();
    }
}

pub(super) fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
