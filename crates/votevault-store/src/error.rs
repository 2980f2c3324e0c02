//! Store error types.
//!
//! Defines errors that can occur while reading or writing vote records:
//! - `CodecError`: the error-correction envelope could not be reversed
//! - `StoreError`: everything a [`crate::RecordStore`] operation can surface
//!
//! Lower layers ([`votevault_crypto::CryptoError`], [`crate::BlobError`]) are
//! folded into `StoreError` so callers match on one taxonomy.

use thiserror::Error;
use votevault_crypto::CryptoError;

use crate::{blob::BlobError, config::ConfigError};

/// Errors from reversing the forward-error-correction envelope
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// A codeword holds more corrupted bytes than the parity can repair
    #[error("codeword {block} exceeds the correction capacity")]
    UnrecoverableCorruption {
        /// Zero-based index of the failing codeword
        block: usize,
    },

    /// The final codeword is too short to hold any data
    ///
    /// Happens when bytes were lost from the end of the file.
    #[error("encoded stream truncated: {len} bytes")]
    Truncated {
        /// Total length of the encoded stream
        len: usize,
    },
}

/// Errors that can occur during record store operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Supplied PIN does not match the registry's verifier
    #[error("PIN does not match the registry")]
    PinMismatch,

    /// Vote file is damaged beyond what error correction can repair
    #[error("vote file unrecoverable: {0}")]
    UnrecoverableCorruption(#[source] CodecError),

    /// Vote file decoded but failed authentication (wrong key or tampering)
    #[error("vote file failed authentication")]
    AuthenticationFailure,

    /// Vote file uses an envelope version this build cannot read
    #[error("unsupported vote envelope version: {0}")]
    UnsupportedEnvelope(u8),

    /// Candidate file does not exist
    #[error("registry not found: {name}")]
    NotFound {
        /// Registry name that was requested
        name: String,
    },

    /// I/O error (file system or backend)
    #[error("I/O error: {0}")]
    Io(String),

    /// Bytes were read but do not form a valid registry or tally record
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// Serialization of a registry or tally record failed
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Record name cannot be used as a file name
    #[error("invalid record name: {0:?}")]
    InvalidName(String),

    /// Category collides with the reserved PIN sentinel key
    #[error("category name is reserved: {0:?}")]
    ReservedCategory(String),

    /// Category appears more than once in one registry
    #[error("duplicate category: {0:?}")]
    DuplicateCategory(String),

    /// Candidate appears more than once within one category
    #[error("duplicate candidate {candidate:?} in category {category:?}")]
    DuplicateCandidate {
        /// Category holding the duplicate
        category: String,
        /// Repeated candidate name
        candidate: String,
    },

    /// Category name cannot be fingerprinted unambiguously
    #[error("invalid category {name:?}: {reason}")]
    InvalidCategory {
        /// Rejected category name
        name: String,
        /// Why it was rejected
        reason: &'static str,
    },

    /// Store configuration is invalid
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// OS random number generator failed
    #[error("entropy source failed: {0}")]
    Entropy(String),
}

impl StoreError {
    /// Returns true if this error means existing votes could not be read.
    ///
    /// A store operation hitting one of these aborts without writing, so the
    /// damaged file stays on disk untouched for inspection or recovery.
    pub fn is_data_loss_risk(&self) -> bool {
        match self {
            Self::UnrecoverableCorruption(_) => true,
            Self::AuthenticationFailure => true,
            Self::UnsupportedEnvelope(_) => true,
            Self::Deserialization(_) => true,

            Self::PinMismatch => false,
            Self::NotFound { .. } => false,
            Self::Io(_) => false,
            Self::Serialization(_) => false,
            Self::InvalidName(_) => false,
            Self::ReservedCategory(_) => false,
            Self::DuplicateCategory(_) => false,
            Self::DuplicateCandidate { .. } => false,
            Self::InvalidCategory { .. } => false,
            Self::Config(_) => false,
            Self::Entropy(_) => false,
        }
    }
}

impl From<CryptoError> for StoreError {
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::PinMismatch => Self::PinMismatch,
            CryptoError::AuthenticationFailure => Self::AuthenticationFailure,
            CryptoError::UnsupportedVersion(version) => Self::UnsupportedEnvelope(version),
            CryptoError::Truncated { .. } => Self::Deserialization(err.to_string()),
        }
    }
}

impl From<CodecError> for StoreError {
    fn from(err: CodecError) -> Self {
        Self::UnrecoverableCorruption(err)
    }
}

impl From<BlobError> for StoreError {
    fn from(err: BlobError) -> Self {
        match err {
            BlobError::Io(msg) => Self::Io(msg),
            BlobError::InvalidName(name) => Self::InvalidName(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corruption_is_data_loss_risk() {
        let err = StoreError::from(CodecError::UnrecoverableCorruption { block: 2 });
        assert!(err.is_data_loss_risk());
        assert!(StoreError::AuthenticationFailure.is_data_loss_risk());
    }

    #[test]
    fn pin_mismatch_is_not_data_loss_risk() {
        assert!(!StoreError::PinMismatch.is_data_loss_risk());
    }

    #[test]
    fn crypto_errors_map_onto_store_taxonomy() {
        assert_eq!(StoreError::from(CryptoError::PinMismatch), StoreError::PinMismatch);
        assert_eq!(
            StoreError::from(CryptoError::AuthenticationFailure),
            StoreError::AuthenticationFailure
        );
        assert_eq!(
            StoreError::from(CryptoError::UnsupportedVersion(7)),
            StoreError::UnsupportedEnvelope(7)
        );
    }

    #[test]
    fn error_display() {
        let err = StoreError::from(CodecError::UnrecoverableCorruption { block: 3 });
        assert_eq!(
            err.to_string(),
            "vote file unrecoverable: codeword 3 exceeds the correction capacity"
        );
    }
}
