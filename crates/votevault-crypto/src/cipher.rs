//! Envelope encryption using `XChaCha20-Poly1305`
//!
//! All functions are pure - the nonce must be provided by the caller.
//! The record store draws a fresh random nonce for every write.
//!
//! Sealed layout:
//! `[version: 1] + [nonce: 24] + [ciphertext: n] + [tag: 16]`

use chacha20poly1305::{
    XChaCha20Poly1305, XNonce,
    aead::{Aead, KeyInit, Payload},
};

use crate::{error::CryptoError, pin::DerivedKey};

/// Current envelope format version
pub const ENVELOPE_VERSION: u8 = 1;

/// `XChaCha20` nonce size (24 bytes)
pub const NONCE_SIZE: usize = 24;

/// Poly1305 tag size (16 bytes)
const TAG_SIZE: usize = 16;

/// Version byte plus nonce
const HEADER_SIZE: usize = 1 + NONCE_SIZE;

/// Bytes added by [`seal`] on top of the plaintext
pub const SEAL_OVERHEAD: usize = HEADER_SIZE + TAG_SIZE;

/// Encrypt `plaintext` into a self-contained envelope.
///
/// # Security
///
/// - Version byte is authenticated as associated data, so a downgrade or
///   rewritten version fails the tag check
/// - Caller MUST provide a fresh random nonce per call in production
pub fn seal(key: &DerivedKey, plaintext: &[u8], nonce: [u8; NONCE_SIZE]) -> Vec<u8> {
    let cipher = XChaCha20Poly1305::new(key.as_bytes().into());
    let aad = [ENVELOPE_VERSION];

    let Ok(ciphertext) =
        cipher.encrypt(XNonce::from_slice(&nonce), Payload { msg: plaintext, aad: &aad })
    else {
        unreachable!("XChaCha20-Poly1305 encryption cannot fail with valid inputs");
    };

    let mut sealed = Vec::with_capacity(HEADER_SIZE + ciphertext.len());
    sealed.push(ENVELOPE_VERSION);
    sealed.extend_from_slice(&nonce);
    sealed.extend_from_slice(&ciphertext);
    sealed
}

/// Decrypt an envelope produced by [`seal`].
///
/// Fails closed: either the full plaintext is returned or nothing is.
///
/// # Errors
///
/// - `Truncated`: shorter than header + tag
/// - `UnsupportedVersion`: unknown version byte
/// - `AuthenticationFailure`: wrong key or tampered envelope
pub fn open(key: &DerivedKey, sealed: &[u8]) -> Result<Vec<u8>, CryptoError> {
    if sealed.len() < SEAL_OVERHEAD {
        return Err(CryptoError::Truncated { len: sealed.len(), min: SEAL_OVERHEAD });
    }

    let (header, ciphertext) = sealed.split_at(HEADER_SIZE);
    let version = header[0];
    if version != ENVELOPE_VERSION {
        return Err(CryptoError::UnsupportedVersion(version));
    }

    let cipher = XChaCha20Poly1305::new(key.as_bytes().into());
    let nonce = XNonce::from_slice(&header[1..]);
    let aad = [version];

    cipher
        .decrypt(nonce, Payload { msg: ciphertext, aad: &aad })
        .map_err(|_| CryptoError::AuthenticationFailure)
}
