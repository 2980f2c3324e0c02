//! votevault Cryptographic Primitives
//!
//! Cryptographic building blocks for the vote record store. Pure functions
//! with deterministic outputs. Callers provide random nonces for deterministic
//! testing.
//!
//! # Key Lifecycle
//!
//! A single PIN guards each registered event. The PIN is hashed once at
//! registration and the hash (the verifier) is stored next to the candidate
//! list. Every later operation re-derives the tally key from the verifier and
//! the PIN the user just typed; the key is never persisted or cached.
//!
//! ```text
//! PIN ──SHA-256──► PinVerifier (persisted, unencrypted)
//!  │                    │
//!  │        verify_pin  │ (derivation gate)
//!  ▼                    ▼
//! HKDF(salt = verifier, ikm = PIN) → DerivedKey (transient)
//!        │
//!        ▼
//! XChaCha20-Poly1305 → version || nonce || ciphertext || tag
//! ```
//!
//! # Security
//!
//! PIN gate:
//! - [`derive_key`] refuses to produce a key unless the PIN hashes to the
//!   stored verifier, so a wrong PIN can never decrypt or overwrite a tally
//! - Verifier comparison is constant time
//!
//! Key hygiene:
//! - [`DerivedKey`] is zeroized on drop and never implements `Clone`
//!
//! Authenticity:
//! - AEAD tag covers the ciphertext and the envelope version byte
//! - Failed authentication tag -> reject the whole envelope
//!
//! Anonymity of the tally:
//! - Tallies are keyed by [`Fingerprint`], a SHA-224 digest of
//!   `category::candidate`, so the vote file never holds candidate names

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod cipher;
mod error;
pub mod fingerprint;
pub mod pin;

pub use cipher::{ENVELOPE_VERSION, NONCE_SIZE, SEAL_OVERHEAD, open, seal};
pub use error::CryptoError;
pub use fingerprint::{FINGERPRINT_SIZE, Fingerprint};
pub use pin::{
    DerivedKey, KEY_SIZE, PIN_VERIFIER_SIZE, PinVerifier, derive_key, hash_pin, verify_pin,
};
