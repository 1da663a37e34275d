use serde::{Deserialize, Serialize};

/// Severity of a line shown in a tab's log view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutcomeKind {
    Succeeded,
    Failed,
    /// The check was interrupted before it could decide (e.g. a cancelled wait)
    Cancelled,
}

/// Result of exactly one check invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckOutcome {
    kind: OutcomeKind,
    message: Option<String>,
}

impl CheckOutcome {
    pub fn success() -> Self {
        Self {
            kind: OutcomeKind::Succeeded,
            message: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            kind: OutcomeKind::Failed,
            message: Some(message.into()),
        }
    }

    pub fn cancelled() -> Self {
        Self {
            kind: OutcomeKind::Cancelled,
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn kind(&self) -> OutcomeKind {
        self.kind
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn is_success(&self) -> bool {
        self.kind == OutcomeKind::Succeeded
    }

    /// Status a finished check settles into. A cancelled check never ran to a
    /// verdict, so it goes back to `Default`.
    pub fn status(&self) -> CheckStatus {
        match self.kind {
            OutcomeKind::Succeeded => CheckStatus::Success,
            OutcomeKind::Failed => CheckStatus::Error,
            OutcomeKind::Cancelled => CheckStatus::Default,
        }
    }

    /// Log severity used when reporting this outcome
    pub fn severity(&self) -> Severity {
        match self.kind {
            OutcomeKind::Succeeded => Severity::Success,
            OutcomeKind::Failed => Severity::Error,
            OutcomeKind::Cancelled => Severity::Warning,
        }
    }

    pub fn label(&self) -> &'static str {
        match self.kind {
            OutcomeKind::Succeeded => "Succeeded",
            OutcomeKind::Failed => "FAILED",
            OutcomeKind::Cancelled => "Cancelled",
        }
    }
}

/// Presentation-facing state of one check in a tab
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    #[default]
    Default,
    Running,
    Success,
    Error,
}
