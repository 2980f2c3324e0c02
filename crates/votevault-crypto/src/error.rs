//! Error types for votevault cryptographic operations

use thiserror::Error;

/// Errors from PIN derivation and envelope encryption
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Supplied PIN does not hash to the stored verifier
    #[error("PIN does not match the stored verifier")]
    PinMismatch,

    /// Authentication tag did not verify (wrong key or tampered ciphertext)
    #[error("envelope authentication failed")]
    AuthenticationFailure,

    /// Envelope carries a format version this build cannot read
    #[error("unsupported envelope version: {0}")]
    UnsupportedVersion(u8),

    /// Envelope is shorter than its fixed header and tag
    #[error("envelope truncated: {len} bytes, need at least {min}")]
    Truncated {
        /// Actual envelope length
        len: usize,
        /// Minimum length of a well-formed envelope
        min: usize,
    },
}

impl CryptoError {
    /// Returns true if retrying with a different PIN could succeed.
    ///
    /// Every other variant means the stored envelope itself is bad, and no
    /// PIN will recover it.
    pub fn is_wrong_pin(&self) -> bool {
        match self {
            Self::PinMismatch => true,

            Self::AuthenticationFailure => false,
            Self::UnsupportedVersion(_) => false,
            Self::Truncated { .. } => false,
        }
    }
}
