use autocheck_domain::secrets::SecretStore;
use autocheck_domain::shared::DomainError;
use std::collections::HashMap;
use std::env::{self, VarError};
use std::sync::RwLock;

const ENV_PREFIX: &str = "AUTOCHECK_SECRET";

/// Process-local credentials, filled at startup or by tests
#[derive(Debug, Default)]
pub struct InMemorySecretStore {
    secrets: RwLock<HashMap<(String, String), String>>,
}

impl InMemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, service: &str, account: &str, secret: impl Into<String>) {
        self.secrets
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert((service.to_string(), account.to_string()), secret.into());
    }

    pub fn with_secret(self, service: &str, account: &str, secret: impl Into<String>) -> Self {
        self.insert(service, account, secret);
        self
    }
}

impl SecretStore for InMemorySecretStore {
    fn get_secret(&self, service: &str, account: &str) -> Result<Option<String>, DomainError> {
        let secrets = self
            .secrets
            .read()
            .map_err(|_| DomainError::SecretUnavailable("secret store lock poisoned".to_string()))?;
        Ok(secrets
            .get(&(service.to_string(), account.to_string()))
            .cloned())
    }
}

/// Reads `AUTOCHECK_SECRET_<SERVICE>_<ACCOUNT>` from the environment
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSecretStore;

impl EnvSecretStore {
    pub fn variable_name(service: &str, account: &str) -> String {
        format!("{}_{}_{}", ENV_PREFIX, sanitize(service), sanitize(account))
    }
}

fn sanitize(part: &str) -> String {
    part.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}

impl SecretStore for EnvSecretStore {
    fn get_secret(&self, service: &str, account: &str) -> Result<Option<String>, DomainError> {
        let name = Self::variable_name(service, account);
        match env::var(&name) {
            Ok(value) => Ok(Some(value)),
            Err(VarError::NotPresent) => Ok(None),
            Err(VarError::NotUnicode(_)) => Err(DomainError::SecretUnavailable(format!(
                "{} is not valid UTF-8",
                name
            ))),
        }
    }
}
