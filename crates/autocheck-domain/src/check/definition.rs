use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

use super::context::CheckContext;
use super::value_objects::CheckOutcome;

/// One independently invokable unit of status verification.
///
/// Returning `Err` (or panicking) is treated by the runner as an unexpected
/// crash: it is converted into a failed outcome and the batch continues. A
/// check that merely detects a problem should return
/// `Ok(CheckOutcome::failure(..))` instead.
#[async_trait]
pub trait Check: Send + Sync {
    async fn run(&self, ctx: &CheckContext) -> anyhow::Result<CheckOutcome>;
}

/// Adapter turning a synchronous closure into a [`Check`].
///
/// The closure runs on tokio's blocking pool, so a body that sleeps or does
/// blocking I/O never pins a runtime worker. Panics are resumed on the
/// calling task.
pub struct FnCheck<F>(Arc<F>);

impl<F> FnCheck<F>
where
    F: Fn(&CheckContext) -> anyhow::Result<CheckOutcome> + Send + Sync + 'static,
{
    pub fn new(f: F) -> Self {
        Self(Arc::new(f))
    }
}

#[async_trait]
impl<F> Check for FnCheck<F>
where
    F: Fn(&CheckContext) -> anyhow::Result<CheckOutcome> + Send + Sync + 'static,
{
    async fn run(&self, ctx: &CheckContext) -> anyhow::Result<CheckOutcome> {
        let f = Arc::clone(&self.0);
        let ctx = ctx.clone();

        match tokio::task::spawn_blocking(move || f(&ctx)).await {
            Ok(result) => result,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(e) => Err(anyhow::anyhow!("check body did not complete: {}", e)),
        }
    }
}

/// A named check as it appears in a tab's catalogue
#[derive(Clone)]
pub struct CheckDefinition {
    name: String,
    check: Arc<dyn Check>,
}

impl CheckDefinition {
    pub fn new(name: impl Into<String>, check: impl Check + 'static) -> Self {
        Self {
            name: name.into(),
            check: Arc::new(check),
        }
    }

    pub fn from_fn<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&CheckContext) -> anyhow::Result<CheckOutcome> + Send + Sync + 'static,
    {
        Self::new(name, FnCheck::new(f))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn check(&self) -> Arc<dyn Check> {
        Arc::clone(&self.check)
    }
}

impl fmt::Debug for CheckDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckDefinition")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
