use chrono::Local;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::{EventObserver, EventSender, RunnerEvent, RunnerEventKind};
use crate::check::Severity;
use crate::shared::{BatchId, SystemId, TabId};

/// Tab-scoped handle onto the outbound event channel.
///
/// Every `LogLine` is also mirrored into tracing so the diagnostic log keeps
/// the same record the operator saw.
#[derive(Clone)]
pub struct EventSink {
    tx: EventSender,
    tab: TabId,
    system: SystemId,
    batch: Option<BatchId>,
    observers: Vec<Arc<dyn EventObserver>>,
}

impl EventSink {
    pub fn new(tx: EventSender, tab: TabId, system: SystemId, batch: Option<BatchId>) -> Self {
        Self {
            tx,
            tab,
            system,
            batch,
            observers: Vec::new(),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn EventObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Same tab and observers, bound to another batch
    pub fn for_batch(&self, batch: BatchId) -> Self {
        Self {
            batch: Some(batch),
            ..self.clone()
        }
    }

    pub fn tab(&self) -> &TabId {
        &self.tab
    }

    pub fn system(&self) -> &SystemId {
        &self.system
    }

    pub fn batch(&self) -> Option<&BatchId> {
        self.batch.as_ref()
    }

    pub fn emit(&self, kind: RunnerEventKind) {
        if let RunnerEventKind::LogLine { message, severity } = &kind {
            self.trace_log_line(message, *severity);
        }

        for observer in &self.observers {
            observer.observe(&kind);
        }

        let event = RunnerEvent {
            tab: self.tab.clone(),
            system: self.system.clone(),
            batch: self.batch.clone(),
            kind,
            occurred_at: Local::now(),
        };

        if self.tx.send(event).is_err() {
            debug!(tab = %self.tab, "Presentation channel closed, dropping event");
        }
    }

    pub fn log(&self, message: impl Into<String>, severity: Severity) {
        self.emit(RunnerEventKind::LogLine {
            message: message.into(),
            severity,
        });
    }

    fn trace_log_line(&self, message: &str, severity: Severity) {
        let tab = self.tab.as_str();
        match severity {
            Severity::Error => error!(target: "autocheck::checks", tab, "{}", message),
            Severity::Warning => warn!(target: "autocheck::checks", tab, "{}", message),
            Severity::Info | Severity::Success => {
                info!(target: "autocheck::checks", tab, severity = severity.as_str(), "{}", message)
            }
        }
    }
}
