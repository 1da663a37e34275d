use autocheck_domain::check::{CheckContext, Severity};
use autocheck_domain::schedule::{next_occurrence, Clock, TimeOfDay};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Cancellable "sleep until wall-clock time".
///
/// The deadline is fixed when the wait starts; the clock is then polled at
/// `poll_interval`, never sleeping past the deadline. Cancellation is seen at
/// the next poll.
#[derive(Clone)]
pub struct WaitGate {
    clock: Arc<dyn Clock>,
    poll_interval: Duration,
    progress_interval: Duration,
}

impl WaitGate {
    pub fn new(clock: Arc<dyn Clock>, poll_interval: Duration, progress_interval: Duration) -> Self {
        Self {
            clock,
            poll_interval: poll_interval.max(Duration::from_millis(1)),
            progress_interval,
        }
    }

    /// `true` once the target is reached, `false` if the batch was cancelled first
    pub async fn await_time(&self, target: TimeOfDay, ctx: &CheckContext) -> bool {
        let deadline = next_occurrence(self.clock.now(), target);
        info!(
            "⏰ '{}' waiting until {}",
            ctx.check_name(),
            deadline.format("%Y-%m-%d %H:%M")
        );
        ctx.log(
            format!("Waiting until {} to run {}", target, ctx.check_name()),
            Severity::Info,
        );

        let mut until_progress = Duration::ZERO;

        loop {
            if ctx.is_cancelled() {
                debug!("🛑 Wait for '{}' cancelled", ctx.check_name());
                return false;
            }

            let now = self.clock.now();
            let remaining = match (deadline - now).to_std() {
                Ok(remaining) if !remaining.is_zero() => remaining,
                // Deadline reached or passed
                _ => return true,
            };

            if until_progress.is_zero() {
                ctx.report_wait_progress(remaining);
                until_progress = self.progress_interval;
            }

            let nap = remaining.min(self.poll_interval);
            tokio::time::sleep(nap).await;
            until_progress = until_progress.saturating_sub(nap);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autocheck_domain::cancellation::CancellationToken;
    use autocheck_domain::events::{event_channel, EventReceiver, EventSink, RunnerEventKind};
    use autocheck_domain::shared::{SystemId, TabId};
    use autocheck_infrastructure::clock::AnchoredClock;
    use autocheck_infrastructure::secrets::InMemorySecretStore;
    use chrono::{NaiveDate, NaiveDateTime};
    use tokio::time::Instant;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 4)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn setup(start: NaiveDateTime) -> (WaitGate, CheckContext, EventReceiver) {
        let (tx, rx) = event_channel();
        let sink = EventSink::new(tx, TabId::from_string("П"), SystemId::from_string("P"), None);
        let ctx = CheckContext::new(
            "Проверка PowerBi",
            sink,
            CancellationToken::new(),
            Arc::new(InMemorySecretStore::new()),
        );
        let gate = WaitGate::new(
            Arc::new(AnchoredClock::starting_at(start)),
            Duration::from_secs(10),
            Duration::from_secs(60),
        );
        (gate, ctx, rx)
    }

    fn kinds(rx: &mut EventReceiver) -> Vec<RunnerEventKind> {
        let mut out = Vec::new();
        while let Ok(event) = rx.try_recv() {
            out.push(event.kind);
        }
        out
    }

    #[tokio::test(start_paused = true)]
    async fn test_target_equal_to_now_returns_immediately() {
        let (gate, ctx, mut rx) = setup(at(9, 15));
        let started = Instant::now();

        assert!(gate.await_time(TimeOfDay::new(9, 15).unwrap(), &ctx).await);
        assert_eq!(started.elapsed(), Duration::ZERO);

        let events = kinds(&mut rx);
        assert_eq!(events.len(), 1, "only the waiting line: {:?}", events);
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_until_target_later_today() {
        let (gate, ctx, mut rx) = setup(at(8, 0));
        let started = Instant::now();

        assert!(gate.await_time(TimeOfDay::new(9, 15).unwrap(), &ctx).await);
        assert_eq!(started.elapsed(), Duration::from_secs(75 * 60));

        let events = kinds(&mut rx);
        let log_lines = events
            .iter()
            .filter(|k| matches!(k, RunnerEventKind::LogLine { .. }))
            .count();
        let progress: Vec<_> = events
            .iter()
            .filter_map(|k| match k {
                RunnerEventKind::WaitProgress { remaining, .. } => Some(*remaining),
                _ => None,
            })
            .collect();

        assert_eq!(log_lines, 1);
        assert_eq!(progress.len(), 75);
        assert_eq!(progress[0], Duration::from_secs(75 * 60));
        assert_eq!(progress[1], Duration::from_secs(74 * 60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_passed_target_rolls_over_to_tomorrow() {
        let (gate, ctx, mut rx) = setup(at(10, 0));

        let waiting = tokio::spawn({
            let gate = gate.clone();
            let ctx = ctx.clone();
            async move { gate.await_time(TimeOfDay::new(9, 15).unwrap(), &ctx).await }
        });

        tokio::time::sleep(Duration::from_secs(1)).await;
        let first = kinds(&mut rx)
            .into_iter()
            .find_map(|k| match k {
                RunnerEventKind::WaitProgress { remaining, .. } => Some(remaining),
                _ => None,
            })
            .unwrap();
        assert_eq!(first, Duration::from_secs((23 * 60 + 15) * 60));

        ctx.cancellation().cancel();
        assert!(!waiting.await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_is_seen_within_one_poll() {
        let (gate, ctx, _rx) = setup(at(8, 0));
        let cancel = ctx.cancellation().clone();
        let started = Instant::now();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(25)).await;
            cancel.cancel();
        });

        assert!(!gate.await_time(TimeOfDay::new(9, 15).unwrap(), &ctx).await);
        assert_eq!(started.elapsed(), Duration::from_secs(30));
    }
}
