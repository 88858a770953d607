//! Error taxonomy shared by the calendar engine and the HTTP shell

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalendarError {
    /// Malformed or missing caller parameters, detected before the engine runs
    #[error("{0}")]
    InvalidInput(String),

    /// Holiday source could not be read or returned unusable data
    #[error("holiday service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Engine received values its callers are supposed to have rejected
    #[error("contract violation: {0}")]
    ContractViolation(String),
}

impl CalendarError {
    /// Whether the failure is the caller's fault (HTTP 400) rather than ours (HTTP 503)
    pub fn is_client_error(&self) -> bool {
        matches!(self, CalendarError::InvalidInput(_))
    }

    /// Error code rendered in JSON error bodies
    pub fn code(&self) -> &'static str {
        match self {
            CalendarError::InvalidInput(_) => "InvalidParameters",
            CalendarError::ServiceUnavailable(_) | CalendarError::ContractViolation(_) => {
                "ServerError"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, CalendarError>;
