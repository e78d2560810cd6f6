//! Persistence and reminder validation errors

use thiserror::Error;

/// Failure while writing persisted state
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode {namespace}: {source}")]
    Encode {
        namespace: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("store lock poisoned: {0}")]
    Lock(String),
}

/// Rejected reminder input or a failed save
#[derive(Debug, Error)]
pub enum ReminderError {
    #[error("reminder text must not be empty")]
    EmptyText,
    #[error("'{0}' is not a number of minutes")]
    InvalidDelay(String),
    #[error("delay must be at least one minute, got {0}")]
    NonPositiveDelay(i64),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ReminderError {
    /// Whether the error came from user input rather than persistence
    pub fn is_invalid_input(&self) -> bool {
        !matches!(self, ReminderError::Store(_))
    }
}
