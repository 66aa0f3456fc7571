//! Error types for Biblio.
//!
//! All Biblio crates share this error enum. Variants are coarse by design:
//! callers branch on the failure class (access, not-found, backend), not on
//! backend-specific detail.

/// Errors that can occur in Biblio operations.
///
/// Marked `#[non_exhaustive]` to allow adding new error classes without
/// breaking changes.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Requester identity could not be resolved or is not allowed.
    #[error("Access error: {message}")]
    Access {
        /// What went wrong
        message: String,
    },

    /// A referenced document does not exist in the index.
    #[error("Document not found: {id}")]
    DocumentNotFound {
        /// Document id that was not found
        id: String,
    },

    /// Search backend failure (query execution, fetch by id).
    #[error("Search error: {message}")]
    Search {
        /// Human-readable error message
        message: String,
        /// Source error if available
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Preference or favorite storage failure.
    #[error("Storage error: {message}")]
    Storage {
        /// Human-readable error message
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// What configuration is problematic
        message: String,
    },

    /// I/O error (file operations, network, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience `Result` type alias for Biblio operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns whether this error is retryable.
    ///
    /// Retry, if any, belongs to the transport client or an outer layer;
    /// this classification only informs it.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Search { .. } => true,
            Error::Storage { .. } => true,
            Error::Io(_) => true,
            Error::Access { .. } => false,
            Error::DocumentNotFound { .. } => false,
            Error::Config { .. } => false,
            Error::Serialization(_) => false,
        }
    }

    /// Creates a new access error.
    pub fn access<S: Into<String>>(message: S) -> Self {
        Error::Access {
            message: message.into(),
        }
    }

    /// Creates a new document-not-found error.
    pub fn document_not_found<S: Into<String>>(id: S) -> Self {
        Error::DocumentNotFound { id: id.into() }
    }

    /// Creates a new search error with a message.
    pub fn search<S: Into<String>>(message: S) -> Self {
        Error::Search {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new search error with a message and source error.
    pub fn search_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Search {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a new storage error.
    pub fn storage<S: Into<String>>(message: S) -> Self {
        Error::Storage {
            message: message.into(),
        }
    }

    /// Creates a new configuration error.
    pub fn config<S: Into<String>>(message: S) -> Self {
        Error::Config {
            message: message.into(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::access("user not found");
        assert_eq!(err.to_string(), "Access error: user not found");

        let err = Error::document_not_found("doc-42");
        assert_eq!(err.to_string(), "Document not found: doc-42");
    }

    #[test]
    fn test_retryable_classification() {
        assert!(Error::search("index timeout").is_retryable());
        assert!(Error::storage("connection reset").is_retryable());
        assert!(!Error::access("forbidden").is_retryable());
        assert!(!Error::document_not_found("x").is_retryable());
        assert!(!Error::config("bad port").is_retryable());
    }

    #[test]
    fn test_search_error_with_source() {
        let io_error = std::io::Error::other("connection refused");
        let err = Error::search_with_source("query failed", io_error);
        assert!(err.to_string().contains("query failed"));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: Error = io_error.into();
        assert!(err.is_retryable());
    }

    #[test]
    fn test_serde_error_not_retryable() {
        let serde_err = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let err: Error = serde_err.into();
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_error_implements_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}
