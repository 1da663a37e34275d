use async_trait::async_trait;
use autocheck_domain::check::{Check, CheckContext, CheckOutcome, Severity};
use autocheck_domain::schedule::TimeOfDay;
use std::sync::Arc;
use tracing::info;

use super::wait_gate::WaitGate;

/// Runs the wrapped check once the wall clock reaches `target`.
///
/// While waiting it holds nothing but its batch's system lock; cancelling the
/// batch ends the wait with a `Cancelled` outcome and the inner check never runs.
pub struct ScheduledCheck {
    inner: Arc<dyn Check>,
    target: TimeOfDay,
    gate: WaitGate,
}

impl ScheduledCheck {
    pub fn new(inner: Arc<dyn Check>, target: TimeOfDay, gate: WaitGate) -> Self {
        Self {
            inner,
            target,
            gate,
        }
    }
}

#[async_trait]
impl Check for ScheduledCheck {
    async fn run(&self, ctx: &CheckContext) -> anyhow::Result<CheckOutcome> {
        if !self.gate.await_time(self.target, ctx).await {
            ctx.log(
                format!("Scheduled run of {} cancelled", ctx.check_name()),
                Severity::Warning,
            );
            return Ok(CheckOutcome::cancelled());
        }

        info!("⏰ Target time {} reached for '{}'", self.target, ctx.check_name());
        ctx.log(
            format!("{} reached, running {}", self.target, ctx.check_name()),
            Severity::Info,
        );
        self.inner.run(ctx).await
    }
}
