use autocheck_domain::events::{event_channel, EventReceiver};
use autocheck_domain::schedule::Clock;
use autocheck_domain::secrets::SecretStore;
use autocheck_domain::shared::DomainError;
use autocheck_infrastructure::config::{AppConfig, RunnerTimings};
use std::sync::Arc;
use tracing::info;

use crate::application::catalogue::catalogue_from_layout;
use crate::application::services::{SessionRegistry, WaitGate};

/// Everything a command needs, wired once at startup
pub struct AppState {
    pub registry: Arc<SessionRegistry>,
    pub timings: RunnerTimings,
}

impl AppState {
    /// Build the catalogue and one dispatcher per tab. The returned receiver
    /// is the single reader of every tab's events.
    pub fn bootstrap(
        config: &AppConfig,
        secrets: Arc<dyn SecretStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<(Self, EventReceiver), DomainError> {
        let timings = config.timings();
        let catalogue = catalogue_from_layout(&config.layout())?;
        let (tx, rx) = event_channel();

        let gate = WaitGate::new(clock, timings.wait_poll, timings.wait_progress);
        let registry = SessionRegistry::new(catalogue, tx, secrets, gate, timings.scheduled_at);

        info!(
            "✅ Application state ready ({} tabs, scheduled at {})",
            registry.dispatchers().len(),
            timings.scheduled_at
        );

        Ok((
            Self {
                registry: Arc::new(registry),
                timings,
            },
            rx,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autocheck_domain::shared::TabId;
    use autocheck_infrastructure::clock::LocalClock;
    use autocheck_infrastructure::config::TabLayout;
    use autocheck_infrastructure::secrets::InMemorySecretStore;

    #[test]
    fn test_bootstrap_with_builtin_layout() {
        let (state, _rx) = AppState::bootstrap(
            &AppConfig::default(),
            Arc::new(InMemorySecretStore::new()),
            Arc::new(LocalClock),
        )
        .unwrap();

        assert_eq!(state.registry.dispatchers().len(), 6);
        assert_eq!(state.timings, RunnerTimings::default());
        assert!(state.registry.tab(&TabId::from_string("П")).is_ok());
    }

    #[test]
    fn test_bootstrap_rejects_invalid_layout() {
        let config = AppConfig {
            tabs: Some(vec![TabLayout {
                id: "X".to_string(),
                system: "X".to_string(),
                checks: vec!["same".to_string(), "same".to_string()],
                scheduled_check: None,
                credential: None,
            }]),
            ..AppConfig::default()
        };

        let result = AppState::bootstrap(
            &config,
            Arc::new(InMemorySecretStore::new()),
            Arc::new(LocalClock),
        );
        assert!(result.is_err());
    }
}
