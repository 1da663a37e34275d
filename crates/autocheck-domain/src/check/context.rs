use std::sync::Arc;
use std::time::Duration;

use crate::cancellation::CancellationToken;
use crate::events::{EventSink, RunnerEventKind};
use crate::secrets::SecretStore;
use crate::shared::{DomainError, SystemId, TabId};

use super::value_objects::Severity;

/// Everything a running check may touch: its tab's log view, the batch's
/// cancellation flag and the credential store.
#[derive(Clone)]
pub struct CheckContext {
    check_name: String,
    sink: EventSink,
    cancel: CancellationToken,
    secrets: Arc<dyn SecretStore>,
}

impl CheckContext {
    pub fn new(
        check_name: impl Into<String>,
        sink: EventSink,
        cancel: CancellationToken,
        secrets: Arc<dyn SecretStore>,
    ) -> Self {
        Self {
            check_name: check_name.into(),
            sink,
            cancel,
            secrets,
        }
    }

    pub fn check_name(&self) -> &str {
        &self.check_name
    }

    pub fn tab(&self) -> &TabId {
        self.sink.tab()
    }

    pub fn system(&self) -> &SystemId {
        self.sink.system()
    }

    /// Append a line to the tab's log view
    pub fn log(&self, message: impl Into<String>, severity: Severity) {
        self.sink.log(message, severity);
    }

    /// Publish a transient countdown; not part of the permanent log
    pub fn report_wait_progress(&self, remaining: Duration) {
        self.sink.emit(RunnerEventKind::WaitProgress {
            name: self.check_name.clone(),
            remaining,
        });
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Look up a stored credential
    pub fn secret(&self, service: &str, account: &str) -> Result<Option<String>, DomainError> {
        self.secrets.get_secret(service, account)
    }
}
