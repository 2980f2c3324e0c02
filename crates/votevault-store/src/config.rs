//! Record store configuration.

use std::path::PathBuf;

use thiserror::Error;

/// Default directory for unencrypted candidate registries
pub const DEFAULT_CANDIDATES_DIR: &str = "candidates";

/// Default directory for encrypted vote files
pub const DEFAULT_VOTES_DIR: &str = "votes";

/// Default Reed-Solomon parity bytes per codeword (repairs 80 bytes)
pub const DEFAULT_PARITY_BYTES: usize = 160;

/// Default registry key holding the PIN verifier
pub const DEFAULT_PIN_SENTINEL_KEY: &str = "-#*KEY*#-";

/// Largest parity count that still leaves one data byte per codeword
pub const MAX_PARITY_BYTES: usize = 254;

/// Invalid store configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Parity count outside `2..=254`
    #[error("parity bytes must be between 2 and 254, got {0}")]
    ParityOutOfRange(usize),

    /// Parity count is odd, so half of it is not a whole correction capacity
    #[error("parity bytes must be even, got {0}")]
    OddParity(usize),

    /// Sentinel key is empty
    #[error("PIN sentinel key must not be empty")]
    EmptySentinel,
}

/// Configuration for a [`crate::RecordStore`].
///
/// Passed in at construction; the store holds no other global settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Directory holding `<name>.dat` candidate registries
    pub candidates_dir: PathBuf,
    /// Directory holding `<name>.dat` vote files
    pub votes_dir: PathBuf,
    /// Reed-Solomon parity bytes appended to every 255-byte codeword
    pub parity_bytes: usize,
    /// Registry key reserved for the PIN verifier
    pub pin_sentinel_key: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            candidates_dir: PathBuf::from(DEFAULT_CANDIDATES_DIR),
            votes_dir: PathBuf::from(DEFAULT_VOTES_DIR),
            parity_bytes: DEFAULT_PARITY_BYTES,
            pin_sentinel_key: DEFAULT_PIN_SENTINEL_KEY.to_string(),
        }
    }
}

impl StoreConfig {
    /// Check the configuration before a store is built from it.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_parity(self.parity_bytes)?;

        if self.pin_sentinel_key.is_empty() {
            return Err(ConfigError::EmptySentinel);
        }

        Ok(())
    }
}

/// Parity must be even and leave room for at least one data byte.
pub(crate) fn validate_parity(parity_bytes: usize) -> Result<(), ConfigError> {
    if !(2..=MAX_PARITY_BYTES).contains(&parity_bytes) {
        return Err(ConfigError::ParityOutOfRange(parity_bytes));
    }
    if parity_bytes % 2 != 0 {
        return Err(ConfigError::OddParity(parity_bytes));
    }
    Ok(())
}
