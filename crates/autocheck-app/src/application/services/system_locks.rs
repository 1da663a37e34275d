use autocheck_domain::shared::SystemId;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::debug;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("System {system} is already running checks")]
pub struct LockUnavailable {
    pub system: SystemId,
}

/// Held for the lifetime of one batch. Dropping it releases the system.
#[derive(Debug)]
pub struct SystemLockGuard {
    system: SystemId,
    _guard: OwnedMutexGuard<()>,
}

impl Drop for SystemLockGuard {
    fn drop(&mut self) {
        debug!(system = %self.system, "🔓 System lock released");
    }
}

/// One gate per system identity, created lazily and shared by every tab
/// that targets that system.
#[derive(Debug, Default)]
pub struct SystemLockRegistry {
    locks: Mutex<HashMap<SystemId, Arc<AsyncMutex<()>>>>,
}

impl SystemLockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn gate(&self, system: &SystemId) -> Arc<AsyncMutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        Arc::clone(locks.entry(system.clone()).or_default())
    }

    /// Never waits: either the system is free right now or the caller is told so.
    pub fn try_acquire(&self, system: &SystemId) -> Result<SystemLockGuard, LockUnavailable> {
        let guard = self
            .gate(system)
            .try_lock_owned()
            .map_err(|_| LockUnavailable {
                system: system.clone(),
            })?;

        debug!(system = %system, "🔒 System lock acquired");
        Ok(SystemLockGuard {
            system: system.clone(),
            _guard: guard,
        })
    }

    pub fn is_locked(&self, system: &SystemId) -> bool {
        self.gate(system).try_lock().is_err()
    }

    /// Scoped form of [`try_acquire`](Self::try_acquire) for a check body
    /// that touches the system outside a dispatched batch. The lock is
    /// released on every exit path, including a panic unwinding out of `body`.
    ///
    /// Batches do not use this: their guard lives in the completion hook so it
    /// is freed before `BatchFinished` is emitted.
    pub async fn with_lock<F, Fut, T>(&self, system: &SystemId, body: F) -> Result<T, LockUnavailable>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let _guard = self.try_acquire(system)?;
        Ok(body().await)
    }
}
