use super::*;
use autocheck_domain::check::{CheckOutcome, OutcomeKind};
use autocheck_domain::events::{event_channel, EventReceiver, RunnerEvent};
use autocheck_domain::shared::ErrorCode;
use autocheck_infrastructure::clock::AnchoredClock;
use autocheck_infrastructure::secrets::InMemorySecretStore;
use chrono::NaiveDate;

fn ok(name: &str) -> CheckDefinition {
    CheckDefinition::from_fn(name, |_| Ok(CheckOutcome::success()))
}

fn p_tab() -> TabDefinition {
    TabDefinition::new(
        TabId::from_string("П"),
        SystemId::from_string("P"),
        vec![ok("Проверка адаптера")],
    )
    .with_scheduled(ok("Проверка PowerBi"))
}

fn dispatcher_at(tab: TabDefinition, hour: u32, minute: u32) -> (Dispatcher, EventReceiver) {
    let (tx, rx) = event_channel();
    let start = NaiveDate::from_ymd_opt(2024, 3, 4)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap();
    let gate = WaitGate::new(
        Arc::new(AnchoredClock::starting_at(start)),
        Duration::from_secs(10),
        Duration::from_secs(60),
    );
    let dispatcher = Dispatcher::new(
        tab,
        Arc::new(SystemLockRegistry::new()),
        tx,
        Arc::new(InMemorySecretStore::new()),
        gate,
        TimeOfDay::new(9, 15).unwrap(),
    );
    (dispatcher, rx)
}

async fn next_batch_finished(rx: &mut EventReceiver) -> Vec<RunnerEvent> {
    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        let done = matches!(event.kind, RunnerEventKind::BatchFinished { .. });
        events.push(event);
        if done {
            break;
        }
    }
    events
}

#[tokio::test]
async fn test_unknown_check_is_rejected_without_locking() {
    let (dispatcher, _rx) = dispatcher_at(p_tab(), 8, 0);

    let err = dispatcher.run_single("Проверка чего-то").unwrap_err();

    assert_eq!(err.code(), ErrorCode::CheckNotFound);
    assert!(!dispatcher.is_busy());
    assert!(!dispatcher.locks.is_locked(dispatcher.system()));
}

#[tokio::test]
async fn test_scheduled_unavailable_on_tab_without_one() {
    let tab = TabDefinition::new(
        TabId::from_string("G"),
        SystemId::from_string("G"),
        vec![ok("Проверка сервисов системы")],
    );
    let (dispatcher, _rx) = dispatcher_at(tab, 8, 0);

    let err = dispatcher.run_all(true).unwrap_err();

    assert_eq!(err.code(), ErrorCode::ScheduledCheckUnavailable);
    assert!(!dispatcher.is_busy());
    assert!(!dispatcher.locks.is_locked(&SystemId::from_string("G")));
}

#[tokio::test]
async fn test_cancel_all_when_idle_is_a_no_op() {
    let (dispatcher, mut rx) = dispatcher_at(p_tab(), 8, 0);

    assert!(!dispatcher.cancel_all());
    assert!(rx.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_scheduled_check_by_name_runs_without_waiting() {
    let (dispatcher, mut rx) = dispatcher_at(p_tab(), 8, 0);
    let started = tokio::time::Instant::now();

    dispatcher.run_single("Проверка PowerBi").unwrap();
    let events = next_batch_finished(&mut rx).await;

    assert_eq!(started.elapsed(), Duration::ZERO);
    assert!(!events
        .iter()
        .any(|e| matches!(e.kind, RunnerEventKind::WaitProgress { .. })));
    assert_eq!(
        dispatcher.statuses(),
        vec![
            ("Проверка адаптера".to_string(), CheckStatus::Default),
            ("Проверка PowerBi".to_string(), CheckStatus::Success),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_run_all_with_scheduled_waits_for_target() {
    let (dispatcher, mut rx) = dispatcher_at(p_tab(), 9, 0);
    let started = tokio::time::Instant::now();

    dispatcher.run_all(true).unwrap();
    assert!(dispatcher.is_busy());
    let events = next_batch_finished(&mut rx).await;

    assert_eq!(started.elapsed(), Duration::from_secs(15 * 60));
    assert!(!dispatcher.is_busy());

    let order: Vec<_> = events
        .iter()
        .filter_map(|e| match &e.kind {
            RunnerEventKind::CheckStarted { name } => Some(name.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(order, vec!["Проверка адаптера", "Проверка PowerBi"]);
    assert!(dispatcher
        .statuses()
        .iter()
        .all(|(_, status)| *status == CheckStatus::Success));
}

#[tokio::test(start_paused = true)]
async fn test_cancel_during_wait_yields_cancelled_outcome() {
    let (dispatcher, mut rx) = dispatcher_at(p_tab(), 8, 0);

    dispatcher.run_all(true).unwrap();
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert!(dispatcher.cancel_all());

    let events = next_batch_finished(&mut rx).await;
    let powerbi = events
        .iter()
        .find_map(|e| match &e.kind {
            RunnerEventKind::CheckFinished { name, outcome } if name == "Проверка PowerBi" => {
                Some(outcome.clone())
            }
            _ => None,
        })
        .unwrap();

    assert_eq!(powerbi.kind(), OutcomeKind::Cancelled);
    assert!(!dispatcher.is_busy());
    assert_eq!(
        dispatcher.statuses(),
        vec![
            ("Проверка адаптера".to_string(), CheckStatus::Success),
            ("Проверка PowerBi".to_string(), CheckStatus::Default),
        ]
    );
}

#[tokio::test]
async fn test_run_all_resets_statuses_and_clears_log_first() {
    let (dispatcher, mut rx) = dispatcher_at(p_tab(), 8, 0);

    dispatcher.run_single("Проверка адаптера").unwrap();
    next_batch_finished(&mut rx).await;

    dispatcher.run_all(false).unwrap();
    let events = next_batch_finished(&mut rx).await;

    assert!(matches!(events[0].kind, RunnerEventKind::StatusesReset));
    assert!(matches!(events[1].kind, RunnerEventKind::LogCleared));
    assert!(events[0].batch.is_none());
}
