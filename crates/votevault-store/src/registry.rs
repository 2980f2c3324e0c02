//! Candidate registry and its on-disk schema.
//!
//! The registry file is unencrypted CBOR. Only the tally is secret; the
//! candidate list has to be readable to render ballots before a PIN is
//! entered.
//!
//! Layout: a single CBOR map in registration order.
//!
//! ```text
//! {
//!   "Mayor":     ["Alice", "Bob"],        // category -> candidate names
//!   "Sheriff":   ["Carol"],
//!   "-#*KEY*#-": h'03ac6742...'           // sentinel -> 32-byte PIN verifier
//! }
//! ```

use std::collections::HashSet;

use ciborium::Value;
use votevault_crypto::{Fingerprint, PinVerifier, verify_pin};

use crate::error::StoreError;

/// Ordered category -> candidate names, as entered by the administrator.
pub type RegistryContents = Vec<(String, Vec<String>)>;

/// Separator used by [`Fingerprint::of`]; forbidden inside category names
const FINGERPRINT_SEPARATOR: &str = "::";

/// One ballot category and its fixed candidate list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    name: String,
    candidates: Box<[String]>,
}

impl Category {
    /// Category name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Candidates in registration order.
    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    /// Fingerprint for `candidate`, `None` if not in this category.
    pub fn fingerprint_of(&self, candidate: &str) -> Option<Fingerprint> {
        self.candidates
            .iter()
            .any(|name| name == candidate)
            .then(|| Fingerprint::of(&self.name, candidate))
    }

    /// `(candidate, fingerprint)` pairs in registration order.
    pub fn fingerprints(&self) -> impl Iterator<Item = (&str, Fingerprint)> + '_ {
        self.candidates.iter().map(|name| (name.as_str(), Fingerprint::of(&self.name, name)))
    }
}

/// Immutable candidate registry for one voting event.
///
/// # Invariants
///
/// - Category names are unique, non-empty, free of `::`, and never equal to
///   the PIN sentinel key
/// - Candidate names are unique within their category
/// - The PIN verifier is fixed at registration and never changes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateRegistry {
    name: String,
    categories: Vec<Category>,
    pin_verifier: PinVerifier,
}

impl CandidateRegistry {
    /// Build a registry, validating every category against `sentinel`.
    ///
    /// # Errors
    ///
    /// - `ReservedCategory`: a category equals the sentinel key
    /// - `DuplicateCategory` / `DuplicateCandidate`: repeated names
    /// - `InvalidCategory`: empty name or one containing `::`
    pub fn new(
        name: impl Into<String>,
        contents: RegistryContents,
        pin_verifier: PinVerifier,
        sentinel: &str,
    ) -> Result<Self, StoreError> {
        let mut seen = HashSet::with_capacity(contents.len());
        let mut categories = Vec::with_capacity(contents.len());

        for (category, candidates) in contents {
            validate_category(&category, sentinel)?;
            if !seen.insert(category.clone()) {
                return Err(StoreError::DuplicateCategory(category));
            }

            let mut names = HashSet::with_capacity(candidates.len());
            for candidate in &candidates {
                if !names.insert(candidate.as_str()) {
                    return Err(StoreError::DuplicateCandidate {
                        category,
                        candidate: candidate.clone(),
                    });
                }
            }

            categories.push(Category { name: category, candidates: candidates.into() });
        }

        Ok(Self { name: name.into(), categories, pin_verifier })
    }

    /// Name the registry was registered or loaded under.
    ///
    /// Also names the vote file.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stored PIN verifier.
    pub fn pin_verifier(&self) -> &PinVerifier {
        &self.pin_verifier
    }

    /// Categories in registration order.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Look up a category by name.
    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|category| category.name == name)
    }

    /// Fingerprint for a registered `(category, candidate)` pair.
    ///
    /// `None` if either name is unknown, so callers can reject a ballot
    /// before anything reaches the store.
    pub fn fingerprint(&self, category: &str, candidate: &str) -> Option<Fingerprint> {
        self.category(category)?.fingerprint_of(candidate)
    }

    /// Check a PIN against the stored verifier. Never fails.
    pub fn verify_pin(&self, pin: &[u8]) -> bool {
        verify_pin(&self.pin_verifier, pin)
    }

    /// Serialize to the CBOR registry file format.
    pub(crate) fn to_cbor(&self, sentinel: &str) -> Result<Vec<u8>, StoreError> {
        let mut entries = Vec::with_capacity(self.categories.len() + 1);
        for category in &self.categories {
            let candidates =
                category.candidates.iter().map(|name| Value::Text(name.clone())).collect();
            entries.push((Value::Text(category.name.clone()), Value::Array(candidates)));
        }
        entries.push((
            Value::Text(sentinel.to_string()),
            Value::Bytes(self.pin_verifier.as_bytes().to_vec()),
        ));

        let mut bytes = Vec::new();
        ciborium::into_writer(&Value::Map(entries), &mut bytes)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(bytes)
    }

    /// Parse a CBOR registry file.
    ///
    /// Any structural problem, including a missing or malformed verifier and
    /// names that [`new`](Self::new) would reject, is a `Deserialization`
    /// error.
    pub(crate) fn from_cbor(name: &str, bytes: &[u8], sentinel: &str) -> Result<Self, StoreError> {
        let value: Value =
            ciborium::from_reader(bytes).map_err(|e| StoreError::Deserialization(e.to_string()))?;

        let Value::Map(entries) = value else {
            return Err(malformed("registry is not a map"));
        };

        let mut pin_verifier = None;
        let mut contents = Vec::with_capacity(entries.len());

        for (key, value) in entries {
            let Value::Text(key) = key else {
                return Err(malformed("registry key is not text"));
            };

            if key == sentinel {
                let Value::Bytes(bytes) = value else {
                    return Err(malformed("PIN verifier is not a byte string"));
                };
                let verifier = PinVerifier::from_slice(&bytes)
                    .ok_or_else(|| malformed("PIN verifier has the wrong length"))?;
                if pin_verifier.replace(verifier).is_some() {
                    return Err(malformed("PIN verifier appears twice"));
                }
                continue;
            }

            let Value::Array(items) = value else {
                return Err(malformed("candidate list is not an array"));
            };
            let candidates = items
                .into_iter()
                .map(|item| match item {
                    Value::Text(candidate) => Ok(candidate),
                    _ => Err(malformed("candidate name is not text")),
                })
                .collect::<Result<Vec<_>, _>>()?;

            contents.push((key, candidates));
        }

        let pin_verifier = pin_verifier.ok_or_else(|| malformed("PIN verifier missing"))?;

        Self::new(name, contents, pin_verifier, sentinel)
            .map_err(|e| StoreError::Deserialization(e.to_string()))
    }
}

fn validate_category(category: &str, sentinel: &str) -> Result<(), StoreError> {
    if category == sentinel {
        return Err(StoreError::ReservedCategory(category.to_string()));
    }
    if category.is_empty() {
        return Err(StoreError::InvalidCategory {
            name: category.to_string(),
            reason: "name is empty",
        });
    }
    if category.contains(FINGERPRINT_SEPARATOR) {
        return Err(StoreError::InvalidCategory {
            name: category.to_string(),
            reason: "name contains \"::\"",
        });
    }
    Ok(())
}

fn malformed(reason: &str) -> StoreError {
    StoreError::Deserialization(reason.to_string())
}
