#![allow(dead_code)]

use async_trait::async_trait;
use autocheck_domain::catalogue::{Catalogue, TabDefinition};
use autocheck_domain::check::{Check, CheckContext, CheckDefinition, CheckOutcome};
use autocheck_domain::events::{event_channel, EventReceiver, RunnerEvent, RunnerEventKind};
use autocheck_domain::schedule::TimeOfDay;
use autocheck_domain::shared::{BatchId, SystemId, TabId};
use autocheck_infrastructure::clock::AnchoredClock;
use autocheck_infrastructure::secrets::InMemorySecretStore;
use autocheck_lib::application::services::{SessionRegistry, WaitGate};
use chrono::NaiveDate;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

pub fn ok(name: &str) -> CheckDefinition {
    CheckDefinition::from_fn(name, |_| Ok(CheckOutcome::success()))
}

pub fn throwing(name: &str) -> CheckDefinition {
    CheckDefinition::from_fn(name, |_| Err(anyhow::anyhow!("connection refused")))
}

pub fn tab(id: &str, system: &str, checks: Vec<CheckDefinition>) -> TabDefinition {
    TabDefinition::new(TabId::from_string(id), SystemId::from_string(system), checks)
}

/// Blocks until the test releases it, then succeeds
pub struct GatedCheck {
    release: Arc<Notify>,
}

impl GatedCheck {
    pub fn new() -> (Self, Arc<Notify>) {
        let release = Arc::new(Notify::new());
        (
            Self {
                release: Arc::clone(&release),
            },
            release,
        )
    }
}

#[async_trait]
impl Check for GatedCheck {
    async fn run(&self, _ctx: &CheckContext) -> anyhow::Result<CheckOutcome> {
        self.release.notified().await;
        Ok(CheckOutcome::success())
    }
}

/// Never returns and never looks at cancellation
pub struct HangingCheck;

#[async_trait]
impl Check for HangingCheck {
    async fn run(&self, _ctx: &CheckContext) -> anyhow::Result<CheckOutcome> {
        std::future::pending::<()>().await;
        Ok(CheckOutcome::success())
    }
}

/// Synchronous body that sleeps on its thread, as a blocking driver call would
pub fn sleeping(name: &str, duration: Duration) -> CheckDefinition {
    CheckDefinition::from_fn(name, move |_| {
        std::thread::sleep(duration);
        Ok(CheckOutcome::success())
    })
}

/// Blocks the worker thread it is polled on, so an abort cannot land
/// until the sleep is over
pub struct ThreadBlockingCheck(pub Duration);

#[async_trait]
impl Check for ThreadBlockingCheck {
    async fn run(&self, _ctx: &CheckContext) -> anyhow::Result<CheckOutcome> {
        std::thread::sleep(self.0);
        Ok(CheckOutcome::success())
    }
}

/// Registry over `tabs` whose clock starts at 2024-03-04 `hour`:`minute`
/// and follows tokio time
pub fn registry_at(
    tabs: Vec<TabDefinition>,
    hour: u32,
    minute: u32,
) -> (SessionRegistry, EventReceiver) {
    let catalogue = Catalogue::new(tabs).expect("valid catalogue");
    let start = NaiveDate::from_ymd_opt(2024, 3, 4)
        .and_then(|d| d.and_hms_opt(hour, minute, 0))
        .expect("valid start time");
    let gate = WaitGate::new(
        Arc::new(AnchoredClock::starting_at(start)),
        Duration::from_secs(10),
        Duration::from_secs(60),
    );
    let (tx, rx) = event_channel();
    let registry = SessionRegistry::new(
        catalogue,
        tx,
        Arc::new(InMemorySecretStore::new()),
        gate,
        TimeOfDay::new(9, 15).expect("valid time"),
    );
    (registry, rx)
}

/// Collect events up to and including `batch`'s `BatchFinished`
pub async fn until_finished(rx: &mut EventReceiver, batch: &BatchId) -> Vec<RunnerEvent> {
    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        let done = matches!(event.kind, RunnerEventKind::BatchFinished { .. })
            && event.batch.as_ref() == Some(batch);
        events.push(event);
        if done {
            break;
        }
    }
    events
}

/// Wait until `name` reports `CheckStarted`
pub async fn until_started(rx: &mut EventReceiver, name: &str) -> Vec<RunnerEvent> {
    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        let done = matches!(&event.kind, RunnerEventKind::CheckStarted { name: n } if n == name);
        events.push(event);
        if done {
            break;
        }
    }
    events
}

pub fn drain(rx: &mut EventReceiver) -> Vec<RunnerEvent> {
    std::iter::from_fn(|| rx.try_recv().ok()).collect()
}

/// Lifecycle events in a compact, comparable form
pub fn lifecycle(events: &[RunnerEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|event| match &event.kind {
            RunnerEventKind::CheckStarted { name } => Some(format!("Started({})", name)),
            RunnerEventKind::CheckFinished { name, outcome } => {
                Some(format!("Finished({},{})", name, outcome.is_success()))
            }
            RunnerEventKind::BatchFinished { .. } => Some("BatchFinished".to_string()),
            _ => None,
        })
        .collect()
}
