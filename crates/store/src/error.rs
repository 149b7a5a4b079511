//! Error types for the markdown report store

use std::path::PathBuf;
use thiserror::Error;

/// Result type for store operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the report store
#[derive(Error, Debug)]
pub enum Error {
    /// Directory creation, read or write failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Report could not be rendered to markdown
    #[error("Failed to encode report {note_id}: {source}")]
    Encode {
        note_id: String,
        #[source]
        source: daybook_core::Error,
    },

    /// Path or date outside the journal's partition scheme
    #[error("Invalid journal partition: {0}")]
    InvalidPartition(PathBuf),
}

impl Error {
    /// Create an encode error for a report
    pub fn encode(note_id: impl Into<String>, source: daybook_core::Error) -> Self {
        Self::Encode { note_id: note_id.into(), source }
    }

    /// Create an invalid partition error
    pub fn invalid_partition(path: impl Into<PathBuf>) -> Self {
        Self::InvalidPartition(path.into())
    }
}

impl From<Error> for daybook_core::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Io(e) => daybook_core::Error::Io(e),
            Error::Encode { source, .. } => source,
            other => daybook_core::Error::Other(other.to_string()),
        }
    }
}
