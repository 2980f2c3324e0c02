//! PIN verification and tally key derivation

use std::fmt;

use hkdf::Hkdf;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use crate::error::CryptoError;

/// Size of a PIN verifier (SHA-256 output)
pub const PIN_VERIFIER_SIZE: usize = 32;

/// Size of a derived key (XChaCha20-Poly1305 key length)
pub const KEY_SIZE: usize = 32;

/// HKDF info label for tally keys
const TALLY_KEY_LABEL: &[u8] = b"votevaultTallyKeyV1";

/// One-way digest of the registry PIN.
///
/// Stored unencrypted inside the candidate registry. Knowing it does not
/// yield the tally key: [`derive_key`] also needs the raw PIN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PinVerifier([u8; PIN_VERIFIER_SIZE]);

impl PinVerifier {
    /// Wrap raw verifier bytes (e.g. loaded from a registry file).
    pub fn from_bytes(bytes: [u8; PIN_VERIFIER_SIZE]) -> Self {
        Self(bytes)
    }

    /// Parse a verifier from a slice. `None` unless exactly 32 bytes.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        <[u8; PIN_VERIFIER_SIZE]>::try_from(bytes).ok().map(Self)
    }

    /// Raw verifier bytes.
    pub fn as_bytes(&self) -> &[u8; PIN_VERIFIER_SIZE] {
        &self.0
    }
}

/// Symmetric key for the tally envelope.
///
/// Recomputed on every store operation and dropped at its end. Not `Clone`;
/// key bytes are zeroized on drop.
pub struct DerivedKey {
    key: [u8; KEY_SIZE],
}

impl DerivedKey {
    /// 32-byte key for XChaCha20-Poly1305.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.key
    }
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DerivedKey([REDACTED])")
    }
}

impl PartialEq for DerivedKey {
    fn eq(&self, other: &Self) -> bool {
        self.key[..].ct_eq(&other.key[..]).into()
    }
}

impl Eq for DerivedKey {}

impl Drop for DerivedKey {
    fn drop(&mut self) {
        self.key.zeroize();
    }
}

/// Hash a raw PIN into its verifier.
///
/// Unsalted SHA-256: one PIN per registry, and the verifier must be
/// reproducible from the PIN alone.
pub fn hash_pin(pin: &[u8]) -> PinVerifier {
    PinVerifier(Sha256::digest(pin).into())
}

/// Check a PIN against a stored verifier in constant time.
pub fn verify_pin(verifier: &PinVerifier, pin: &[u8]) -> bool {
    hash_pin(pin).0[..].ct_eq(&verifier.0[..]).into()
}

/// Derive the tally key from the stored verifier and a raw PIN.
///
/// The PIN check is part of derivation: a PIN that does not hash to
/// `verifier` yields [`CryptoError::PinMismatch`] and no key.
///
/// # Security
///
/// - Bound to both inputs: verifier is the HKDF salt, PIN is the IKM
/// - Deterministic: read and write paths re-derive the same key without it
///   ever being stored
pub fn derive_key(verifier: &PinVerifier, pin: &[u8]) -> Result<DerivedKey, CryptoError> {
    if !verify_pin(verifier, pin) {
        return Err(CryptoError::PinMismatch);
    }

    let hkdf = Hkdf::<Sha256>::new(Some(&verifier.as_bytes()[..]), pin);

    let mut key = [0u8; KEY_SIZE];
    let Ok(()) = hkdf.expand(TALLY_KEY_LABEL, &mut key) else {
        unreachable!("32 bytes is a valid HKDF-SHA256 output length");
    };

    Ok(DerivedKey { key })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_pin_matches_sha256() {
        let verifier = hash_pin(b"1234");
        assert_eq!(
            hex::encode(verifier.as_bytes()),
            "03ac674216f3e15c761ee1a5e255f067953623c8b388b4459e13f978d7c846f4"
        );
    }

    #[test]
    fn derive_is_deterministic() {
        let verifier = hash_pin(b"1234");

        let key1 = derive_key(&verifier, b"1234").unwrap();
        let key2 = derive_key(&verifier, b"1234").unwrap();

        assert_eq!(key1, key2, "same inputs must produce same key");
    }

    #[test]
    fn wrong_pin_is_rejected() {
        let verifier = hash_pin(b"1234");

        let result = derive_key(&verifier, b"4321");

        assert_eq!(result.unwrap_err(), CryptoError::PinMismatch);
    }

    #[test]
    fn different_pins_produce_different_keys() {
        let key_a = derive_key(&hash_pin(b"1234"), b"1234").unwrap();
        let key_b = derive_key(&hash_pin(b"12345"), b"12345").unwrap();

        assert_ne!(key_a, key_b);
    }

    #[test]
    fn key_is_not_the_verifier() {
        let verifier = hash_pin(b"1234");
        let key = derive_key(&verifier, b"1234").unwrap();

        assert_ne!(key.as_bytes(), verifier.as_bytes());
    }

    #[test]
    fn works_with_empty_pin() {
        let verifier = hash_pin(b"");
        assert!(derive_key(&verifier, b"").is_ok());
        assert!(derive_key(&verifier, b"0").is_err());
    }

    #[test]
    fn verify_pin_accepts_only_matching_pin() {
        let verifier = hash_pin(b"hunter2");

        assert!(verify_pin(&verifier, b"hunter2"));
        assert!(!verify_pin(&verifier, b"hunter3"));
        assert!(!verify_pin(&verifier, b""));
    }

    #[test]
    fn verifier_from_slice_requires_exact_length() {
        let verifier = hash_pin(b"1234");

        assert_eq!(PinVerifier::from_slice(verifier.as_bytes()), Some(verifier));
        assert_eq!(PinVerifier::from_slice(&[0u8; 31]), None);
        assert_eq!(PinVerifier::from_slice(&[0u8; 33]), None);
    }

    #[test]
    fn debug_redacts_key_material() {
        let key = derive_key(&hash_pin(b"1234"), b"1234").unwrap();
        assert_eq!(format!("{key:?}"), "DerivedKey([REDACTED])");
    }
}
