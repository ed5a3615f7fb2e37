//! Error types for the notesync core library.

use thiserror::Error;

/// All errors that can occur within the notesync core library.
#[derive(Debug, Error)]
pub enum SyncError {
    /// An outbound wire record could not be built, or a remote entity could
    /// not be absorbed. The driver must treat the sync step as failed.
    #[error("Action failed: {message}")]
    ActionFailed {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A row cursor was asked for a column it does not expose.
    #[error("Missing column: {0}")]
    MissingColumn(usize),

    /// A local row record does not have the expected shape.
    #[error("Invalid local record: {0}")]
    InvalidLocalRecord(String),

    /// A SQLite row access failed.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// An I/O operation on the filesystem failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Structured data could not be (de)serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias that pins the error type to [`SyncError`].
pub type Result<T> = std::result::Result<T, SyncError>;

impl SyncError {
    /// Builds an [`SyncError::ActionFailed`] with no underlying cause.
    pub fn action_failed(message: impl Into<String>) -> Self {
        Self::ActionFailed {
            message: message.into(),
            source: None,
        }
    }

    /// Builds an [`SyncError::ActionFailed`] that wraps `cause`.
    pub fn action_failed_with<E>(message: impl Into<String>, cause: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ActionFailed {
            message: message.into(),
            source: Some(Box::new(cause)),
        }
    }

    /// Returns a short, human-readable message suitable for display to the end user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::ActionFailed { message, .. } => format!("Sync step failed: {message}"),
            Self::MissingColumn(column) => format!("Local note row is incomplete (column {column})"),
            Self::InvalidLocalRecord(msg) => format!("Local note is unreadable: {msg}"),
            Self::Database(e) => format!("Failed to read local notes: {e}"),
            Self::Io(e) => format!("File error: {e}"),
            Self::Json(e) => format!("Data format error: {e}"),
        }
    }
}
