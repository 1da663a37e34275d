use autocheck_domain::schedule::Clock;
use chrono::NaiveDateTime;
use tokio::time::Instant;

/// Local wall-clock time of the host
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}

/// Wall clock that starts at a chosen instant and then advances with the
/// tokio timer, so it follows paused time under `tokio::time::pause`.
#[derive(Debug, Clone, Copy)]
pub struct AnchoredClock {
    start: NaiveDateTime,
    origin: Instant,
}

impl AnchoredClock {
    pub fn starting_at(start: NaiveDateTime) -> Self {
        Self {
            start,
            origin: Instant::now(),
        }
    }
}

impl Clock for AnchoredClock {
    fn now(&self) -> NaiveDateTime {
        let elapsed = chrono::Duration::from_std(self.origin.elapsed()).unwrap_or(chrono::Duration::MAX);
        self.start
            .checked_add_signed(elapsed)
            .unwrap_or(NaiveDateTime::MAX)
    }
}
