use std::collections::HashSet;

use crate::check::CheckDefinition;
use crate::shared::{DomainError, SystemId, TabId};

/// Checks offered by one tab, in display order, plus the optional time-gated
/// check that only runs as part of an extended batch.
#[derive(Debug, Clone)]
pub struct TabDefinition {
    id: TabId,
    system: SystemId,
    checks: Vec<CheckDefinition>,
    scheduled: Option<CheckDefinition>,
}

impl TabDefinition {
    pub fn new(id: TabId, system: SystemId, checks: Vec<CheckDefinition>) -> Self {
        Self {
            id,
            system,
            checks,
            scheduled: None,
        }
    }

    pub fn with_scheduled(mut self, check: CheckDefinition) -> Self {
        self.scheduled = Some(check);
        self
    }

    pub fn id(&self) -> &TabId {
        &self.id
    }

    pub fn system(&self) -> &SystemId {
        &self.system
    }

    pub fn checks(&self) -> &[CheckDefinition] {
        &self.checks
    }

    pub fn scheduled(&self) -> Option<&CheckDefinition> {
        self.scheduled.as_ref()
    }

    /// Regular checks first, then the scheduled one
    pub fn find_check(&self, name: &str) -> Option<&CheckDefinition> {
        self.checks
            .iter()
            .chain(self.scheduled.iter())
            .find(|c| c.name() == name)
    }

    /// Every check name the tab shows, scheduled check last
    pub fn check_names(&self) -> Vec<String> {
        self.checks
            .iter()
            .chain(self.scheduled.iter())
            .map(|c| c.name().to_string())
            .collect()
    }

    fn validate(&self) -> Result<(), DomainError> {
        if self.id.as_str().trim().is_empty() {
            return Err(DomainError::Validation("Tab id cannot be empty".to_string()));
        }
        if self.system.as_str().trim().is_empty() {
            return Err(DomainError::Validation(format!(
                "Tab '{}' has no system identity",
                self.id
            )));
        }

        let mut seen = HashSet::new();
        for name in self.check_names() {
            if name.trim().is_empty() {
                return Err(DomainError::Validation(format!(
                    "Tab '{}' has a check with an empty name",
                    self.id
                )));
            }
            if !seen.insert(name.clone()) {
                return Err(DomainError::Validation(format!(
                    "Tab '{}' lists check '{}' twice",
                    self.id, name
                )));
            }
        }
        Ok(())
    }
}

/// All tabs, validated once at startup
#[derive(Debug, Clone, Default)]
pub struct Catalogue {
    tabs: Vec<TabDefinition>,
}

impl Catalogue {
    pub fn new(tabs: Vec<TabDefinition>) -> Result<Self, DomainError> {
        let mut ids = HashSet::new();
        for tab in &tabs {
            tab.validate()?;
            if !ids.insert(tab.id().clone()) {
                return Err(DomainError::Validation(format!(
                    "Duplicate tab id: {}",
                    tab.id()
                )));
            }
        }
        Ok(Self { tabs })
    }

    pub fn tab(&self, id: &TabId) -> Result<&TabDefinition, DomainError> {
        self.tabs
            .iter()
            .find(|t| t.id() == id)
            .ok_or_else(|| DomainError::TabNotFound(id.to_string()))
    }

    pub fn tabs(&self) -> &[TabDefinition] {
        &self.tabs
    }

    pub fn into_tabs(self) -> Vec<TabDefinition> {
        self.tabs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::CheckOutcome;

    fn check(name: &str) -> CheckDefinition {
        CheckDefinition::from_fn(name, |_| Ok(CheckOutcome::success()))
    }

    fn tab(id: &str, system: &str, names: &[&str]) -> TabDefinition {
        TabDefinition::new(
            TabId::from_string(id),
            SystemId::from_string(system),
            names.iter().map(|n| check(n)).collect(),
        )
    }

    #[test]
    fn test_find_check_includes_scheduled() {
        let t = tab("П", "P", &["Проверка адаптера П"]).with_scheduled(check("Проверка PowerBi"));

        assert!(t.find_check("Проверка адаптера П").is_some());
        assert!(t.find_check("Проверка PowerBi").is_some());
        assert!(t.find_check("missing").is_none());
        assert_eq!(
            t.check_names(),
            vec!["Проверка адаптера П".to_string(), "Проверка PowerBi".to_string()]
        );
    }

    #[test]
    fn test_tabs_may_share_a_system() {
        let catalogue = Catalogue::new(vec![tab("М", "M", &["a"]), tab("МИ", "M", &["b"])])
            .expect("aliased tabs are allowed");

        let mi = catalogue.tab(&TabId::from_string("МИ")).unwrap();
        assert_eq!(mi.system().as_str(), "M");
    }

    #[test]
    fn test_duplicate_tab_rejected() {
        let result = Catalogue::new(vec![tab("A", "A", &["a"]), tab("A", "B", &["b"])]);
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_duplicate_check_name_rejected() {
        let result = Catalogue::new(vec![tab("G", "G", &["x"]).with_scheduled(check("x"))]);
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_unknown_tab_lookup() {
        let catalogue = Catalogue::new(vec![tab("K", "K", &["k"])]).unwrap();
        let err = catalogue.tab(&TabId::from_string("Z")).unwrap_err();
        assert_eq!(err.code(), crate::shared::ErrorCode::TabNotFound);
    }
}
