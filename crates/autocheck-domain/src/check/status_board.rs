use std::sync::{Mutex, MutexGuard};

use crate::events::{EventObserver, RunnerEventKind};

use super::value_objects::CheckStatus;

/// Per-tab check statuses, derived from runner events.
///
/// Keeps the catalogue order so snapshots line up with what the tab shows.
#[derive(Debug, Default)]
pub struct StatusBoard {
    entries: Mutex<Vec<(String, CheckStatus)>>,
}

impl StatusBoard {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: Mutex::new(
                names
                    .into_iter()
                    .map(|name| (name.into(), CheckStatus::Default))
                    .collect(),
            ),
        }
    }

    fn entries(&self) -> MutexGuard<'_, Vec<(String, CheckStatus)>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn status(&self, name: &str) -> Option<CheckStatus> {
        self.entries()
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, status)| *status)
    }

    pub fn snapshot(&self) -> Vec<(String, CheckStatus)> {
        self.entries().clone()
    }

    pub fn set(&self, name: &str, status: CheckStatus) {
        let mut entries = self.entries();
        match entries.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = status,
            None => entries.push((name.to_string(), status)),
        }
    }

    pub fn reset(&self) {
        for entry in self.entries().iter_mut() {
            entry.1 = CheckStatus::Default;
        }
    }

    pub fn apply(&self, kind: &RunnerEventKind) {
        match kind {
            RunnerEventKind::CheckStarted { name } => self.set(name, CheckStatus::Running),
            RunnerEventKind::CheckFinished { name, outcome } => self.set(name, outcome.status()),
            RunnerEventKind::StatusesReset => self.reset(),
            _ => {}
        }
    }
}

impl EventObserver for StatusBoard {
    fn observe(&self, kind: &RunnerEventKind) {
        self.apply(kind);
    }
}
