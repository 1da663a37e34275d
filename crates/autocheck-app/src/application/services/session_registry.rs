use autocheck_domain::catalogue::Catalogue;
use autocheck_domain::events::EventSender;
use autocheck_domain::schedule::TimeOfDay;
use autocheck_domain::secrets::SecretStore;
use autocheck_domain::shared::{DomainError, TabId};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use super::dispatcher::Dispatcher;
use super::system_locks::SystemLockRegistry;
use super::wait_gate::WaitGate;

/// Every tab's dispatcher, built once from the catalogue. All of them share
/// one lock registry, so tabs aliasing a system serialize against each other.
pub struct SessionRegistry {
    dispatchers: Vec<Arc<Dispatcher>>,
    locks: Arc<SystemLockRegistry>,
}

impl SessionRegistry {
    pub fn new(
        catalogue: Catalogue,
        events: EventSender,
        secrets: Arc<dyn SecretStore>,
        gate: WaitGate,
        scheduled_at: TimeOfDay,
    ) -> Self {
        let locks = Arc::new(SystemLockRegistry::new());
        let dispatchers = catalogue
            .into_tabs()
            .into_iter()
            .map(|tab| {
                Arc::new(Dispatcher::new(
                    tab,
                    Arc::clone(&locks),
                    events.clone(),
                    Arc::clone(&secrets),
                    gate.clone(),
                    scheduled_at,
                ))
            })
            .collect::<Vec<_>>();

        info!("✅ Session registry ready with {} tabs", dispatchers.len());
        Self { dispatchers, locks }
    }

    pub fn tab(&self, id: &TabId) -> Result<Arc<Dispatcher>, DomainError> {
        self.dispatchers
            .iter()
            .find(|d| d.tab_id() == id)
            .cloned()
            .ok_or_else(|| DomainError::TabNotFound(id.to_string()))
    }

    pub fn dispatchers(&self) -> &[Arc<Dispatcher>] {
        &self.dispatchers
    }

    pub fn locks(&self) -> &Arc<SystemLockRegistry> {
        &self.locks
    }

    pub fn any_busy(&self) -> bool {
        self.dispatchers.iter().any(|d| d.is_busy())
    }

    /// Cancel everything, wait up to `grace` for all workers together, abort
    /// the rest. Never waits longer than about twice `grace`.
    pub async fn shutdown(&self, grace: Duration) {
        let busy = self.dispatchers.iter().filter(|d| d.is_busy()).count();
        info!("🛑 Shutting down {} tabs ({} busy)", self.dispatchers.len(), busy);

        for dispatcher in &self.dispatchers {
            dispatcher.cancel_all();
        }

        let results = join_all(self.dispatchers.iter().map(|d| d.shutdown(grace))).await;

        let aborted = results.iter().filter(|stopped| !**stopped).count();
        if aborted > 0 {
            warn!("⚠️  {} batches were aborted after {:?}", aborted, grace);
        }
        info!("✅ Shutdown complete");
    }
}
