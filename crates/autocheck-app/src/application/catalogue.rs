use async_trait::async_trait;
use autocheck_domain::catalogue::{Catalogue, TabDefinition};
use autocheck_domain::check::{Check, CheckContext, CheckDefinition, CheckOutcome, Severity};
use autocheck_domain::shared::{DomainError, SystemId, TabId};
use autocheck_infrastructure::config::{default_layout, SecretRef, TabLayout};
use tracing::debug;

/// Stand-in body for catalogue checks: confirms the tab's credential is
/// reachable and reports success.
pub struct PlaceholderCheck {
    credential: Option<SecretRef>,
}

impl PlaceholderCheck {
    pub fn new(credential: Option<SecretRef>) -> Self {
        Self { credential }
    }
}

#[async_trait]
impl Check for PlaceholderCheck {
    async fn run(&self, ctx: &CheckContext) -> anyhow::Result<CheckOutcome> {
        if let Some(credential) = &self.credential {
            match ctx.secret(&credential.service, &credential.account)? {
                Some(_) => debug!("🔑 Credential {} found", credential.service),
                None => ctx.log(
                    format!(
                        "No stored credential for {} ({})",
                        credential.service, credential.account
                    ),
                    Severity::Warning,
                ),
            }
        }

        ctx.log(
            format!("{}: completed successfully", ctx.check_name()),
            Severity::Success,
        );
        Ok(CheckOutcome::success())
    }
}

fn definition(name: &str, credential: &Option<SecretRef>) -> CheckDefinition {
    CheckDefinition::new(name, PlaceholderCheck::new(credential.clone()))
}

pub fn catalogue_from_layout(layout: &[TabLayout]) -> Result<Catalogue, DomainError> {
    let tabs = layout
        .iter()
        .map(|tab| {
            let checks = tab
                .checks
                .iter()
                .map(|name| definition(name, &tab.credential))
                .collect();
            let tab_definition = TabDefinition::new(
                TabId::from_string(&tab.id),
                SystemId::from_string(&tab.system),
                checks,
            );
            match &tab.scheduled_check {
                Some(name) => tab_definition.with_scheduled(definition(name, &tab.credential)),
                None => tab_definition,
            }
        })
        .collect();

    Catalogue::new(tabs)
}

pub fn builtin_catalogue() -> Result<Catalogue, DomainError> {
    catalogue_from_layout(&default_layout())
}
