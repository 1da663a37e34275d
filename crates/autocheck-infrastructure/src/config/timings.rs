use autocheck_domain::schedule::{TimeOfDay, DEFAULT_SCHEDULED_TIME};
use std::time::Duration;

/// Durations and wall-clock targets used by the runner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerTimings {
    /// When the scheduled check is released
    pub scheduled_at: TimeOfDay,

    /// How often a waiting check looks at the clock
    pub wait_poll: Duration,

    /// How often a waiting check publishes its countdown
    pub wait_progress: Duration,

    /// How long shutdown waits for cancelled batches before aborting them
    pub shutdown_grace: Duration,
}

impl Default for RunnerTimings {
    fn default() -> Self {
        Self {
            scheduled_at: DEFAULT_SCHEDULED_TIME,
            wait_poll: Duration::from_secs(10),
            wait_progress: Duration::from_secs(60),
            shutdown_grace: Duration::from_secs(2),
        }
    }
}
