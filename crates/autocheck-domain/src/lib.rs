// Domain layer - check model, events and scheduling primitives
// No dependencies on infrastructure or presentation layers

pub mod cancellation;
pub mod catalogue;
pub mod check;
pub mod events;
pub mod schedule;
pub mod secrets;
pub mod shared;

// Re-exports for convenience
pub use cancellation::CancellationToken;
pub use events::{RunnerEvent, RunnerEventKind};
pub use shared::{BatchId, DomainError, SystemId, TabId};
