//! Error types for mediaenc.

use thiserror::Error;

/// Main error type for mediaenc operations.
#[derive(Error, Debug)]
pub enum MediaEncError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Operation failed: {0}")]
    OperationFailed(String),

    #[error("Object disposed: {0}")]
    ObjectDisposed(String),

    #[error("Encoder error: {0}")]
    Encoder(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for mediaenc operations.
pub type Result<T> = std::result::Result<T, MediaEncError>;
