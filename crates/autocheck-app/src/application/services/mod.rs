mod check_runner;
mod dispatcher;
mod scheduled_check;
mod session_registry;
mod system_locks;
mod wait_gate;

pub use check_runner::{CheckRunner, RunnerHandle};
pub use dispatcher::Dispatcher;
pub use scheduled_check::ScheduledCheck;
pub use session_registry::SessionRegistry;
pub use system_locks::{LockUnavailable, SystemLockGuard, SystemLockRegistry};
pub use wait_gate::WaitGate;
