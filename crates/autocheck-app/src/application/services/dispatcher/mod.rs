use autocheck_domain::cancellation::CancellationToken;
use autocheck_domain::catalogue::TabDefinition;
use autocheck_domain::check::{CheckDefinition, CheckStatus, Severity, StatusBoard};
use autocheck_domain::events::{EventSender, EventSink, RunnerEventKind};
use autocheck_domain::schedule::TimeOfDay;
use autocheck_domain::secrets::SecretStore;
use autocheck_domain::shared::{BatchId, DomainError, SystemId, TabId};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::{info, instrument, warn};

use super::check_runner::{CheckRunner, RunnerHandle};
use super::scheduled_check::ScheduledCheck;
use super::system_locks::{SystemLockGuard, SystemLockRegistry};
use super::wait_gate::WaitGate;

struct ActiveSession {
    batch: BatchId,
    cancel: CancellationToken,
    /// Taken by `shutdown` while it waits for the worker
    handle: Option<RunnerHandle>,
    /// Shared with the batch's completion hook; whichever runs first frees it
    lock: Arc<Mutex<Option<SystemLockGuard>>>,
}

fn release(lock: &Mutex<Option<SystemLockGuard>>) {
    drop(lock.lock().unwrap_or_else(|e| e.into_inner()).take());
}

enum BatchRequest<'a> {
    Single(&'a str),
    All { include_scheduled: bool },
}

/// Per-tab controller: turns operator intents into at most one running batch.
///
/// All methods return immediately; the batch itself runs on its own task.
pub struct Dispatcher {
    tab: Arc<TabDefinition>,
    locks: Arc<SystemLockRegistry>,
    sink: EventSink,
    secrets: Arc<dyn SecretStore>,
    gate: WaitGate,
    scheduled_at: TimeOfDay,
    session: Arc<Mutex<Option<ActiveSession>>>,
    statuses: Arc<StatusBoard>,
}

impl Dispatcher {
    pub fn new(
        tab: TabDefinition,
        locks: Arc<SystemLockRegistry>,
        events: EventSender,
        secrets: Arc<dyn SecretStore>,
        gate: WaitGate,
        scheduled_at: TimeOfDay,
    ) -> Self {
        let statuses = Arc::new(StatusBoard::new(tab.check_names()));
        let sink = EventSink::new(events, tab.id().clone(), tab.system().clone(), None)
            .with_observer(statuses.clone());

        Self {
            tab: Arc::new(tab),
            locks,
            sink,
            secrets,
            gate,
            scheduled_at,
            session: Arc::new(Mutex::new(None)),
            statuses,
        }
    }

    pub fn tab_id(&self) -> &TabId {
        self.tab.id()
    }

    pub fn system(&self) -> &SystemId {
        self.tab.system()
    }

    pub fn tab(&self) -> &TabDefinition {
        &self.tab
    }

    fn lock_session(&self) -> MutexGuard<'_, Option<ActiveSession>> {
        self.session.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Run one check by name. The scheduled check, addressed by name, runs
    /// immediately without waiting for its target time.
    #[instrument(skip(self), fields(tab = %self.tab.id()))]
    pub fn run_single(&self, check_name: &str) -> Result<BatchId, DomainError> {
        self.launch(BatchRequest::Single(check_name))
    }

    /// Run every regular check in order, plus the time-gated one last when asked
    #[instrument(skip(self), fields(tab = %self.tab.id()))]
    pub fn run_all(&self, include_scheduled: bool) -> Result<BatchId, DomainError> {
        self.launch(BatchRequest::All { include_scheduled })
    }

    /// Ask the running batch to stop before its next check. Returns whether
    /// there was anything to cancel.
    pub fn cancel_all(&self) -> bool {
        let session = self.lock_session();
        match session.as_ref() {
            Some(active) => {
                if !active.cancel.is_cancelled() {
                    info!("🛑 Cancelling batch {} on tab {}", active.batch, self.tab.id());
                    self.sink.log("Cancelling check run", Severity::Warning);
                    active.cancel.cancel();
                }
                true
            }
            None => false,
        }
    }

    /// Controls stay disabled while this is true
    pub fn is_busy(&self) -> bool {
        self.lock_session().is_some()
    }

    pub fn statuses(&self) -> Vec<(String, CheckStatus)> {
        self.statuses.snapshot()
    }

    pub fn status_board(&self) -> Arc<StatusBoard> {
        Arc::clone(&self.statuses)
    }

    /// Cancel, give the worker `grace` to wind down, then abort it. Statuses
    /// go back to `Default` and the tab's log is cleared. Returns whether the
    /// worker stopped on its own.
    ///
    /// A worker that still has not unwound after the abort is abandoned: its
    /// session slot and system lock are released here.
    pub async fn shutdown(&self, grace: Duration) -> bool {
        let handle = {
            let mut session = self.lock_session();
            session.as_mut().and_then(|active| {
                active.cancel.cancel();
                active.handle.take()
            })
        };

        let stopped = match handle {
            Some(handle) => {
                let batch = handle.batch().clone();
                let stopped = handle.wait_or_abort(grace).await;
                if !stopped {
                    let mut session = self.lock_session();
                    if session.as_ref().map(|s| &s.batch) == Some(&batch) {
                        if let Some(abandoned) = session.take() {
                            release(&abandoned.lock);
                            warn!(
                                "⚠️  Tab {} released system {} held by batch {}",
                                self.tab.id(),
                                self.tab.system(),
                                batch
                            );
                        }
                    }
                }
                stopped
            }
            None => true,
        };

        self.sink.emit(RunnerEventKind::StatusesReset);
        self.sink.emit(RunnerEventKind::LogCleared);
        stopped
    }

    fn launch(&self, request: BatchRequest<'_>) -> Result<BatchId, DomainError> {
        let mut session = self.lock_session();

        if let Some(active) = session.as_ref() {
            warn!(
                "⚠️  Tab {} rejected a request: batch {} still running",
                self.tab.id(),
                active.batch
            );
            self.sink
                .log("A check run is already in progress", Severity::Warning);
            return Err(DomainError::AlreadyRunning(self.tab.id().to_string()));
        }

        let guard = self.locks.try_acquire(self.tab.system()).map_err(|e| {
            warn!("⚠️  Tab {} rejected a request: {}", self.tab.id(), e);
            self.sink.log(
                format!("System {} is busy with another tab", e.system),
                Severity::Warning,
            );
            DomainError::SystemBusy(e.system.to_string())
        })?;

        let checks = self.resolve(&request)?;

        if let BatchRequest::All { .. } = request {
            self.sink.emit(RunnerEventKind::StatusesReset);
            self.sink.emit(RunnerEventKind::LogCleared);
        }

        let runner = CheckRunner::new(self.sink.clone(), Arc::clone(&self.secrets));
        let batch = runner.batch().clone();

        let lock = Arc::new(Mutex::new(Some(guard)));
        let held = Arc::clone(&lock);
        let slot = Arc::clone(&self.session);
        let finished_batch = batch.clone();
        let handle = runner.start(checks, move |_summary| {
            let mut session = slot.lock().unwrap_or_else(|e| e.into_inner());
            if session.as_ref().map(|s| &s.batch) == Some(&finished_batch) {
                *session = None;
            }
            drop(session);
            release(&held);
        });

        *session = Some(ActiveSession {
            batch: batch.clone(),
            cancel: handle.cancellation(),
            handle: Some(handle),
            lock,
        });

        Ok(batch)
    }

    fn resolve(&self, request: &BatchRequest<'_>) -> Result<Vec<CheckDefinition>, DomainError> {
        match request {
            BatchRequest::Single(name) => self
                .tab
                .find_check(name)
                .cloned()
                .map(|check| vec![check])
                .ok_or_else(|| {
                    DomainError::CheckNotFound(format!("{} (tab {})", name, self.tab.id()))
                }),
            BatchRequest::All { include_scheduled } => {
                let mut checks = self.tab.checks().to_vec();
                if *include_scheduled {
                    let scheduled = self.tab.scheduled().ok_or_else(|| {
                        DomainError::ScheduledCheckUnavailable(self.tab.id().to_string())
                    })?;
                    checks.push(CheckDefinition::new(
                        scheduled.name(),
                        ScheduledCheck::new(scheduled.check(), self.scheduled_at, self.gate.clone()),
                    ));
                }
                Ok(checks)
            }
        }
    }
}

#[cfg(test)]
mod tests;
