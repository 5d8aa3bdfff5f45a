use thiserror::Error;

use super::Severity;

/// Inbound payload was not valid JSON for the target record.
///
/// Loading never commits a partially parsed record, so the previously held
/// state is still intact when this is returned.
#[derive(Debug, Error)]
#[error("malformed JSON: {0}")]
pub struct ParseError(#[from] serde_json::Error);

/// Everything that can go wrong in a single console operation.
///
/// None of these is fatal: handlers log them and return the UI to an
/// interactive state.
#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The device answered with a non-2xx status.
    #[error("{status} {body}")]
    Http { status: u16, body: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("canceled by user")]
    UserAbort,
}

impl ConsoleError {
    /// Log severity the failure is reported with.
    pub fn severity(&self) -> Severity {
        match self {
            Self::UserAbort => Severity::Warning,
            _ => Severity::Error,
        }
    }
}
