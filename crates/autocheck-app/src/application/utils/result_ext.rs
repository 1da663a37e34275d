use autocheck_domain::shared::DomainError;

/// Maps technical failures (I/O, serialization, runtime) onto the domain error
pub trait ResultExt<T, E> {
    /// `result.to_infra_err()?`
    fn to_infra_err(self) -> Result<T, DomainError>;
}

impl<T, E: std::fmt::Display> ResultExt<T, E> for Result<T, E> {
    fn to_infra_err(self) -> Result<T, DomainError> {
        self.map_err(|e| DomainError::Infrastructure(e.to_string()))
    }
}
