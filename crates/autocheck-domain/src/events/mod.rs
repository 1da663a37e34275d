use chrono::{DateTime, Local};
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::check::{CheckOutcome, OutcomeKind, Severity};
use crate::shared::{BatchId, SystemId, TabId};

mod sink;

pub use sink::EventSink;

/// One message on the outbound channel towards the presentation layer
#[derive(Debug, Clone, Serialize)]
pub struct RunnerEvent {
    pub tab: TabId,
    pub system: SystemId,
    /// `None` for notices that are not tied to a batch (e.g. rejections)
    pub batch: Option<BatchId>,
    pub kind: RunnerEventKind,
    pub occurred_at: DateTime<Local>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RunnerEventKind {
    CheckStarted {
        name: String,
    },
    CheckFinished {
        name: String,
        outcome: CheckOutcome,
    },
    BatchFinished {
        summary: BatchSummary,
    },
    /// Transient countdown while a gated check waits; never logged
    WaitProgress {
        name: String,
        remaining: Duration,
    },
    LogLine {
        message: String,
        severity: Severity,
    },
    /// The tab's visible log should be emptied
    LogCleared,
    /// Every check in the tab went back to `Default`
    StatusesReset,
}

impl RunnerEventKind {
    /// Superseded by the next update instead of kept in the log
    pub fn is_transient(&self) -> bool {
        matches!(self, RunnerEventKind::WaitProgress { .. })
    }
}

/// Tally of one batch, reported with `BatchFinished`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub cancelled: usize,
    /// Checks never started because cancellation was observed first
    pub skipped: usize,
}

impl BatchSummary {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    pub fn record(&mut self, outcome: &CheckOutcome) {
        match outcome.kind() {
            OutcomeKind::Succeeded => self.succeeded += 1,
            OutcomeKind::Failed => self.failed += 1,
            OutcomeKind::Cancelled => self.cancelled += 1,
        }
    }

    pub fn completed(&self) -> usize {
        self.succeeded + self.failed + self.cancelled
    }

    pub fn was_interrupted(&self) -> bool {
        self.skipped > 0 || self.cancelled > 0
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "total={}, succeeded={}, failed={}, cancelled={}, skipped={}",
            self.total, self.succeeded, self.failed, self.cancelled, self.skipped
        )
    }
}

/// Synchronous tap on events as they are emitted, before they reach the channel
pub trait EventObserver: Send + Sync {
    fn observe(&self, kind: &RunnerEventKind);
}

pub type EventSender = mpsc::UnboundedSender<RunnerEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<RunnerEvent>;

/// The single outbound channel; exactly one presentation reader owns the receiver
pub fn event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_records_each_outcome_kind() {
        let mut summary = BatchSummary::new(4);
        summary.record(&CheckOutcome::success());
        summary.record(&CheckOutcome::failure("x"));
        summary.record(&CheckOutcome::cancelled());
        summary.skipped = 1;

        assert_eq!(summary.completed(), 3);
        assert!(summary.was_interrupted());
        assert_eq!(
            summary.to_string(),
            "total=4, succeeded=1, failed=1, cancelled=1, skipped=1"
        );
    }

    #[test]
    fn test_only_wait_progress_is_transient() {
        let progress = RunnerEventKind::WaitProgress {
            name: "Проверка PowerBi".to_string(),
            remaining: Duration::from_secs(60),
        };
        assert!(progress.is_transient());
        assert!(!RunnerEventKind::LogCleared.is_transient());
        assert!(!RunnerEventKind::CheckStarted {
            name: "x".to_string()
        }
        .is_transient());
    }
}
