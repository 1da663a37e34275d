use crate::shared::DomainError;

/// Read access to stored credentials, keyed by service and account.
///
/// `Ok(None)` means nothing is stored; `Err` means the store itself could not
/// be consulted.
#[cfg_attr(test, mockall::automock)]
pub trait SecretStore: Send + Sync {
    fn get_secret(&self, service: &str, account: &str) -> Result<Option<String>, DomainError>;
}
