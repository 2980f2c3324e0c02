//! Selection fingerprints
//!
//! A fingerprint names a (category, candidate) pair without carrying the
//! names themselves. Tallies are keyed by fingerprint, so a decrypted vote
//! file reveals counts but not who they belong to unless the registry is at
//! hand.

use std::fmt;

use sha2::{Digest, Sha224};

/// Size of a fingerprint (SHA-224 output)
pub const FINGERPRINT_SIZE: usize = 28;

/// Separator between category and candidate in the hashed input
const SEPARATOR: &[u8] = b"::";

/// SHA-224 digest of `category::candidate`.
///
/// # Invariants
///
/// - Stable across processes and platforms (UTF-8 bytes, no salt)
/// - Unambiguous as long as category names never contain `::`; the registry
///   rejects such names
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fingerprint([u8; FINGERPRINT_SIZE]);

impl Fingerprint {
    /// Fingerprint a candidate within a category.
    pub fn of(category: &str, candidate: &str) -> Self {
        let mut hasher = Sha224::new();
        hasher.update(category.as_bytes());
        hasher.update(SEPARATOR);
        hasher.update(candidate.as_bytes());
        Self(hasher.finalize().into())
    }

    /// Wrap raw digest bytes (e.g. loaded from a tally record).
    pub fn from_bytes(bytes: [u8; FINGERPRINT_SIZE]) -> Self {
        Self(bytes)
    }

    /// Parse a fingerprint from a slice. `None` unless exactly 28 bytes.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        <[u8; FINGERPRINT_SIZE]>::try_from(bytes).ok().map(Self)
    }

    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; FINGERPRINT_SIZE] {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

// Short form keeps log lines readable
impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint(")?;
        for byte in &self.0[..4] {
            write!(f, "{byte:02x}")?;
        }
        write!(f, "..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_answer() {
        assert_eq!(
            Fingerprint::of("Mayor", "Alice").to_string(),
            "850f0fc9ee5088b18a765a3031e120a9bd134cd47aee3ed5d8b0fe38"
        );
        assert_eq!(
            hex::encode(Fingerprint::of("Mayor", "Bob").as_bytes()),
            "cd8007ffe4053c8c6a73ce5d32b235a524252c539a9ff1cae62f8ac5"
        );
    }

    #[test]
    fn same_name_in_different_categories_differs() {
        assert_ne!(Fingerprint::of("Mayor", "Alice"), Fingerprint::of("Sheriff", "Alice"));
    }

    #[test]
    fn category_and_candidate_are_not_interchangeable() {
        assert_ne!(Fingerprint::of("Alice", "Mayor"), Fingerprint::of("Mayor", "Alice"));
    }

    #[test]
    fn roundtrips_through_slice() {
        let fp = Fingerprint::of("Mayor", "Alice");
        assert_eq!(Fingerprint::from_slice(fp.as_bytes()), Some(fp));
        assert_eq!(Fingerprint::from_slice(&[0u8; 27]), None);
    }

    #[test]
    fn debug_is_abbreviated() {
        let fp = Fingerprint::of("Mayor", "Alice");
        assert_eq!(format!("{fp:?}"), "Fingerprint(850f0fc9..)");
    }
}
