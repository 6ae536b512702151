//! Error types and handling for the pairing service
//!
//! Domain failures (validation, conflict, not found) surface to callers as
//! 4xx responses. Storage faults are not recovered; they fail the request.

use thiserror::Error;

/// Main result type used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the pairing service
#[derive(Error, Debug)]
pub enum Error {
    /// A required field was missing or empty
    #[error("{0}")]
    Validation(String),

    /// The resource already exists
    #[error("{0}")]
    Conflict(String),

    /// The resource does not exist
    #[error("{0}")]
    NotFound(String),

    /// Storage layer errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Prometheus metrics errors
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    /// I/O errors outside the storage layer (binding, serving)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A blocking task panicked or was cancelled
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Storage-specific errors
#[derive(Error, Debug)]
pub enum StorageError {
    /// Reading or writing the backing file failed
    #[error("I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The persisted document could not be encoded or decoded
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The persisted document parsed but broke a schema rule
    #[error("Data corruption detected: {0}")]
    Corruption(String),
}

impl Error {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a conflict error
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Check if this is a client error (4xx equivalent)
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::Validation(_) | Error::Conflict(_) | Error::NotFound(_)
        )
    }

    /// Check if this is a server error (5xx equivalent)
    pub fn is_server_error(&self) -> bool {
        !self.is_client_error()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_errors_display_message_verbatim() {
        assert_eq!(Error::validation("Name is required.").to_string(), "Name is required.");
        assert_eq!(Error::conflict("User already exists.").to_string(), "User already exists.");
        assert_eq!(Error::not_found("User not found.").to_string(), "User not found.");
    }

    #[test]
    fn test_error_classification() {
        assert!(Error::validation("x").is_client_error());
        assert!(Error::conflict("x").is_client_error());
        assert!(Error::not_found("x").is_client_error());

        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: Error = StorageError::Io(io).into();
        assert!(err.is_server_error());
        assert!(matches!(err, Error::Storage(StorageError::Io(_))));

        let addr_in_use = std::io::Error::new(std::io::ErrorKind::AddrInUse, "in use");
        assert!(Error::from(addr_in_use).is_server_error());

        assert!(Error::config("bad").is_server_error());
    }
}
