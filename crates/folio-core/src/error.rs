//! Error types for folio.

use thiserror::Error;
use uuid::Uuid;

/// Result type alias using folio's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for folio operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Input rejected before touching storage (empty/oversized query, bad name)
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Manuscript absent, deleted, or under the wrong category
    #[error("Manuscript not found: {0}")]
    ManuscriptNotFound(Uuid),

    /// A category partition is unreachable or its store errored
    #[error("Partition '{category}' unavailable: {reason}")]
    PartitionUnavailable { category: String, reason: String },

    /// A mutation matched zero records after validation passed
    #[error("Storage write failed: {0}")]
    StorageWrite(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl Error {
    /// True when the error means one partition was unreachable rather than
    /// the query having no matches. The coordinator uses this to isolate
    /// per-partition failures instead of aborting the whole fan-out.
    pub fn is_partition_unavailable(&self) -> bool {
        matches!(self, Error::PartitionUnavailable { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_validation() {
        let err = Error::Validation("query must not be empty".to_string());
        assert_eq!(err.to_string(), "Invalid input: query must not be empty");
    }

    #[test]
    fn test_error_display_not_found() {
        let err = Error::NotFound("category 'diet'".to_string());
        assert_eq!(err.to_string(), "Not found: category 'diet'");
    }

    #[test]
    fn test_error_display_manuscript_not_found() {
        let id = Uuid::nil();
        let err = Error::ManuscriptNotFound(id);
        assert_eq!(err.to_string(), format!("Manuscript not found: {}", id));
    }

    #[test]
    fn test_error_display_partition_unavailable() {
        let err = Error::PartitionUnavailable {
            category: "beauty".to_string(),
            reason: "timed out".to_string(),
        };
        assert_eq!(err.to_string(), "Partition 'beauty' unavailable: timed out");
        assert!(err.is_partition_unavailable());
    }

    #[test]
    fn test_error_display_storage_write() {
        let err = Error::StorageWrite("update matched no rows".to_string());
        assert_eq!(err.to_string(), "Storage write failed: update matched no rows");
        assert!(!err.is_partition_unavailable());
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number").unwrap_err();
        let err: Error = json_err.into();
        match err {
            Error::Serialization(msg) => assert!(!msg.is_empty()),
            _ => panic!("Expected Serialization error"),
        }
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        match err {
            Error::Io(_) => {}
            _ => panic!("Expected Io error"),
        }
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }
}
