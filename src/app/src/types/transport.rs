use serde::{Deserialize, Serialize};

use super::{ConsoleError, Severity};

/// Result of one request to the device as seen by the caller.
///
/// All four cases are distinguishable so each can be reported with its own
/// severity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum TransportOutcome {
    Success { status: u16, body: String },
    Failure { status: u16, body: String },
    NetworkError { message: String },
    Aborted,
}

impl TransportOutcome {
    /// Classify a completed response by its status code.
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        if (200..300).contains(&status) {
            Self::Success { status, body }
        } else {
            Self::Failure { status, body }
        }
    }

    /// Log severity a request with this outcome is reported with.
    pub fn severity(&self) -> Severity {
        match self {
            Self::Success { .. } => Severity::Info,
            Self::Failure { .. } | Self::NetworkError { .. } => Severity::Error,
            Self::Aborted => Severity::Warning,
        }
    }

    /// Response text on success, the matching [`ConsoleError`] otherwise.
    pub fn into_result(self) -> Result<String, ConsoleError> {
        match self {
            Self::Success { body, .. } => Ok(body),
            Self::Failure { status, body } => Err(ConsoleError::Http { status, body }),
            Self::NetworkError { message } => Err(ConsoleError::Network(message)),
            Self::Aborted => Err(ConsoleError::UserAbort),
        }
    }
}
