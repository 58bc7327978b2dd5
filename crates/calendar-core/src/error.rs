//! Error types for calendar operations.

use thiserror::Error;

use crate::repository::RepositoryError;

/// Names of every import format the detector understands, in detection order.
pub const SUPPORTED_FORMATS: &str =
    "Chronicle, Simple Calendar, Calendaria, Fantasy-Calendar.com";

/// Errors that can occur while building, advancing, importing or persisting a calendar.
#[derive(Error, Debug)]
pub enum CalendarError {
    /// Input failed a domain rule (zero months, negative leap days, bad visibility, ...).
    #[error("Validation error: {0}")]
    Validation(String),

    /// The campaign already owns a calendar.
    #[error("Calendar already exists for campaign {0}")]
    AlreadyExists(String),

    /// A calendar or event lookup came back empty.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The detector matched none of the known schemas.
    #[error("Unrecognized calendar format: expected one of {SUPPORTED_FORMATS}")]
    UnrecognizedFormat,

    /// A format was detected but its payload could not be decoded.
    #[error("Failed to decode {format} calendar: {message}")]
    Decode {
        format: &'static str,
        message: String,
    },

    /// The repository collaborator failed.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// JSON encoding of the native schema failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Coarse classification an outer layer can map onto status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    UnrecognizedFormat,
    Decode,
    Internal,
}

impl CalendarError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CalendarError::Validation(_) | CalendarError::AlreadyExists(_) => ErrorKind::Validation,
            CalendarError::NotFound(_) => ErrorKind::NotFound,
            CalendarError::UnrecognizedFormat => ErrorKind::UnrecognizedFormat,
            CalendarError::Decode { .. } => ErrorKind::Decode,
            CalendarError::Repository(_) | CalendarError::Json(_) => ErrorKind::Internal,
        }
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        CalendarError::Validation(message.into())
    }

    pub(crate) fn decode(format: &'static str, message: impl Into<String>) -> Self {
        CalendarError::Decode {
            format,
            message: message.into(),
        }
    }
}

/// Convenience alias used throughout calendar-core.
pub type Result<T> = std::result::Result<T, CalendarError>;
