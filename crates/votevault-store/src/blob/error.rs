//! Blob storage error types.

use thiserror::Error;

/// Errors that can occur during blob storage operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BlobError {
    /// I/O error (file system, lock poisoning, injected fault)
    #[error("I/O error: {0}")]
    Io(String),

    /// Record name is not a safe single file name
    #[error("invalid record name: {0:?}")]
    InvalidName(String),
}

impl From<std::io::Error> for BlobError {
    fn from(err: std::io::Error) -> Self {
        BlobError::Io(err.to_string())
    }
}
