use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! define_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            pub fn from_string(s: &str) -> Self {
                Self(s.to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::from_string(s)
            }
        }
    };
}

// Backend system a batch targets; the unit of mutual exclusion.
define_id!(SystemId);
// Presentation tab owning one dispatcher.
define_id!(TabId);
// One run of one-or-more checks.
define_id!(BatchId);

/// Error codes for structured error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Dispatch (1xxx)
    AlreadyRunning = 1001,
    SystemBusy = 1002,

    // Catalogue (2xxx)
    TabNotFound = 2001,
    CheckNotFound = 2002,
    ScheduledCheckUnavailable = 2003,

    // Secrets (4xxx)
    SecretUnavailable = 4001,

    // Infrastructure (5xxx)
    InfrastructureError = 5001,

    // Validation (6xxx)
    ValidationError = 6001,
    InvalidInput = 6002,
}

impl ErrorCode {
    /// Get error code as integer
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Get error severity
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ErrorCode::AlreadyRunning | ErrorCode::SystemBusy => ErrorSeverity::Warning,

            ErrorCode::TabNotFound
            | ErrorCode::CheckNotFound
            | ErrorCode::ScheduledCheckUnavailable
            | ErrorCode::ValidationError
            | ErrorCode::InvalidInput => ErrorSeverity::Info,

            ErrorCode::SecretUnavailable | ErrorCode::InfrastructureError => ErrorSeverity::Error,
        }
    }

    /// Check if the rejected request can be issued again later
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ErrorCode::AlreadyRunning | ErrorCode::SystemBusy)
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
}

#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("A check run is already in progress: {0}")]
    AlreadyRunning(String),

    #[error("System is busy: {0}")]
    SystemBusy(String),

    #[error("Tab not found: {0}")]
    TabNotFound(String),

    #[error("Check not found: {0}")]
    CheckNotFound(String),

    #[error("No scheduled check configured: {0}")]
    ScheduledCheckUnavailable(String),

    #[error("Secret unavailable: {0}")]
    SecretUnavailable(String),

    #[error("Infrastructure error: {0}")]
    Infrastructure(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl DomainError {
    /// Get error code
    pub fn code(&self) -> ErrorCode {
        match self {
            DomainError::AlreadyRunning(_) => ErrorCode::AlreadyRunning,
            DomainError::SystemBusy(_) => ErrorCode::SystemBusy,
            DomainError::TabNotFound(_) => ErrorCode::TabNotFound,
            DomainError::CheckNotFound(_) => ErrorCode::CheckNotFound,
            DomainError::ScheduledCheckUnavailable(_) => ErrorCode::ScheduledCheckUnavailable,
            DomainError::SecretUnavailable(_) => ErrorCode::SecretUnavailable,
            DomainError::Infrastructure(_) => ErrorCode::InfrastructureError,
            DomainError::Validation(_) => ErrorCode::ValidationError,
            DomainError::InvalidInput(_) => ErrorCode::InvalidInput,
        }
    }

    /// Get error severity
    pub fn severity(&self) -> ErrorSeverity {
        self.code().severity()
    }

    /// Check if error is recoverable
    pub fn is_recoverable(&self) -> bool {
        self.code().is_recoverable()
    }
}
