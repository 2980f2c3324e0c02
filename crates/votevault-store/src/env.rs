//! Entropy source abstraction for envelope nonces.
//!
//! Decouples the record store from the OS RNG. Production uses
//! [`OsEntropy`]; tests use [`SeededEntropy`] so sealed envelopes are
//! reproducible.

use std::cell::Cell;

use crate::error::StoreError;

/// Source of random bytes for envelope nonces.
///
/// # Invariants
///
/// - Production implementations use cryptographically secure entropy
/// - Successive calls never repeat output (nonce reuse under one key breaks
///   XChaCha20-Poly1305 confidentiality)
pub trait Entropy {
    /// Fill `buffer` with random bytes.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Entropy` if the source is unavailable. The store
    /// aborts before writing anything.
    fn fill_bytes(&self, buffer: &mut [u8]) -> Result<(), StoreError>;
}

/// Production entropy from the operating system RNG.
///
/// Uses getrandom (e.g. `getrandom(2)` on Linux, `BCryptGenRandom` on
/// Windows).
#[derive(Debug, Clone, Copy, Default)]
pub struct OsEntropy;

impl Entropy for OsEntropy {
    fn fill_bytes(&self, buffer: &mut [u8]) -> Result<(), StoreError> {
        getrandom::fill(buffer).map_err(|e| StoreError::Entropy(e.to_string()))
    }
}

/// Deterministic entropy for tests and simulation.
///
/// SplitMix64 stream from a fixed seed. Never use for real vote files.
#[derive(Debug, Clone)]
pub struct SeededEntropy {
    state: Cell<u64>,
}

impl SeededEntropy {
    /// Create a stream starting at `seed`.
    pub fn new(seed: u64) -> Self {
        Self { state: Cell::new(seed) }
    }

    fn next_u64(&self) -> u64 {
        let state = self.state.get().wrapping_add(0x9E37_79B9_7F4A_7C15);
        self.state.set(state);

        let mut z = state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }
}

impl Entropy for SeededEntropy {
    fn fill_bytes(&self, buffer: &mut [u8]) -> Result<(), StoreError> {
        for chunk in buffer.chunks_mut(8) {
            let bytes = self.next_u64().to_be_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
        Ok(())
    }
}
