//! Vote tallies keyed by selection fingerprint.
//!
//! A [`TallyMapping`] only ever exists in two places: in memory for the
//! duration of one store operation, and sealed inside the vote file. It is
//! loaded whole, merged and rewritten whole.

use std::collections::{BTreeMap, btree_map};

use serde::{Deserialize, Serialize};
use votevault_crypto::{FINGERPRINT_SIZE, Fingerprint};

use crate::error::StoreError;

/// Current tally record schema version
pub const TALLY_RECORD_VERSION: u8 = 1;

/// Count per fingerprint. Absent fingerprints count as zero.
///
/// # Invariants
///
/// - Every stored count is at least 1
/// - Iteration order is fingerprint order, so serialization is canonical
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TallyMapping {
    counts: BTreeMap<Fingerprint, u64>,
}

/// On-disk schema of a tally, sealed inside the vote envelope.
#[derive(Serialize, Deserialize)]
struct TallyRecord {
    version: u8,
    counts: Vec<([u8; FINGERPRINT_SIZE], u64)>,
}

impl TallyMapping {
    /// Empty tally (no votes cast yet).
    pub fn new() -> Self {
        Self::default()
    }

    /// Votes recorded for `fingerprint`, zero if none.
    pub fn count(&self, fingerprint: &Fingerprint) -> u64 {
        self.counts.get(fingerprint).copied().unwrap_or(0)
    }

    /// Votes recorded for `fingerprint`, `None` if it never received one.
    ///
    /// Lets the reporting layer tell "no votes" apart from "not a
    /// candidate", which matters for picking winners.
    pub fn get(&self, fingerprint: &Fingerprint) -> Option<u64> {
        self.counts.get(fingerprint).copied()
    }

    /// Number of distinct fingerprints with at least one vote.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// True if no votes have been recorded.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts (saturating).
    pub fn total(&self) -> u64 {
        self.counts.values().fold(0, |sum, count| sum.saturating_add(*count))
    }

    /// Iterate `(fingerprint, count)` pairs in fingerprint order.
    pub fn iter(&self) -> btree_map::Iter<'_, Fingerprint, u64> {
        self.counts.iter()
    }

    /// Add one vote for `fingerprint`.
    ///
    /// Saturates at `u64::MAX` rather than wrapping to zero.
    pub fn record(&mut self, fingerprint: Fingerprint) {
        let count = self.counts.entry(fingerprint).or_insert(0);
        *count = count.saturating_add(1);
    }

    /// Merge a batch of selections into this tally.
    ///
    /// Each fingerprint is an independent +1, so the result does not depend
    /// on the order of `selections`. Duplicates count separately: a batch may
    /// carry several ballots choosing the same candidate. Fingerprints are
    /// not checked against any registry here.
    #[must_use]
    pub fn merge(mut self, selections: impl IntoIterator<Item = Fingerprint>) -> Self {
        for fingerprint in selections {
            self.record(fingerprint);
        }
        self
    }

    /// Serialize to the versioned CBOR tally record.
    pub(crate) fn to_cbor(&self) -> Result<Vec<u8>, StoreError> {
        let record = TallyRecord {
            version: TALLY_RECORD_VERSION,
            counts: self.counts.iter().map(|(fp, count)| (*fp.as_bytes(), *count)).collect(),
        };

        let mut bytes = Vec::new();
        ciborium::into_writer(&record, &mut bytes)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(bytes)
    }

    /// Parse a versioned CBOR tally record.
    ///
    /// Rejects unknown versions, duplicate fingerprints and zero counts.
    pub(crate) fn from_cbor(bytes: &[u8]) -> Result<Self, StoreError> {
        let record: TallyRecord =
            ciborium::from_reader(bytes).map_err(|e| StoreError::Deserialization(e.to_string()))?;

        if record.version != TALLY_RECORD_VERSION {
            return Err(StoreError::Deserialization(format!(
                "unsupported tally record version {}",
                record.version
            )));
        }

        let mut counts = BTreeMap::new();
        for (bytes, count) in record.counts {
            let fingerprint = Fingerprint::from_bytes(bytes);
            if count == 0 {
                return Err(StoreError::Deserialization(format!(
                    "zero count for {fingerprint}"
                )));
            }
            if counts.insert(fingerprint, count).is_some() {
                return Err(StoreError::Deserialization(format!(
                    "duplicate fingerprint {fingerprint}"
                )));
            }
        }

        Ok(Self { counts })
    }
}

impl FromIterator<Fingerprint> for TallyMapping {
    fn from_iter<I: IntoIterator<Item = Fingerprint>>(iter: I) -> Self {
        Self::new().merge(iter)
    }
}

impl<'a> IntoIterator for &'a TallyMapping {
    type Item = (&'a Fingerprint, &'a u64);
    type IntoIter = btree_map::Iter<'a, Fingerprint, u64>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> Fingerprint {
        Fingerprint::of("Mayor", "Alice")
    }

    fn bob() -> Fingerprint {
        Fingerprint::of("Mayor", "Bob")
    }

    #[test]
    fn merge_counts_duplicates_separately() {
        let tally = TallyMapping::new().merge([alice(), bob(), alice()]);

        assert_eq!(tally.count(&alice()), 2);
        assert_eq!(tally.count(&bob()), 1);
        assert_eq!(tally.total(), 3);
    }

    #[test]
    fn merge_is_order_independent() {
        let forward = TallyMapping::new().merge([alice(), bob(), alice()]);
        let reverse = TallyMapping::new().merge([alice(), alice(), bob()]);
        let shuffled = TallyMapping::new().merge([bob(), alice(), alice()]);

        assert_eq!(forward, reverse);
        assert_eq!(forward, shuffled);
    }

    #[test]
    fn merge_accumulates_onto_existing() {
        let existing = TallyMapping::new().merge([alice()]);

        let merged = existing.merge([alice()]);

        assert_eq!(merged.count(&alice()), 2);
    }

    #[test]
    fn empty_batch_is_identity() {
        let existing = TallyMapping::new().merge([bob()]);

        assert_eq!(existing.clone().merge([]), existing);
    }

    #[test]
    fn absent_fingerprint_counts_zero() {
        let tally = TallyMapping::new().merge([alice()]);

        assert_eq!(tally.count(&bob()), 0);
        assert_eq!(tally.get(&bob()), None);
        assert_eq!(tally.get(&alice()), Some(1));
    }

    #[test]
    fn record_saturates() {
        let mut tally = TallyMapping::new();
        tally.counts.insert(alice(), u64::MAX);

        tally.record(alice());

        assert_eq!(tally.count(&alice()), u64::MAX);
    }

    #[test]
    fn cbor_roundtrip() {
        let tally: TallyMapping = [alice(), bob(), alice()].into_iter().collect();

        let bytes = tally.to_cbor().unwrap();

        assert_eq!(TallyMapping::from_cbor(&bytes).unwrap(), tally);
    }

    #[test]
    fn empty_cbor_roundtrip() {
        let bytes = TallyMapping::new().to_cbor().unwrap();

        assert!(TallyMapping::from_cbor(&bytes).unwrap().is_empty());
    }

    #[test]
    fn serialization_is_canonical() {
        let a = TallyMapping::new().merge([alice(), bob()]);
        let b = TallyMapping::new().merge([bob(), alice()]);

        assert_eq!(a.to_cbor().unwrap(), b.to_cbor().unwrap());
    }

    #[test]
    fn rejects_unknown_version() {
        let record = TallyRecord { version: 9, counts: vec![] };
        let mut bytes = Vec::new();
        ciborium::into_writer(&record, &mut bytes).unwrap();

        let err = TallyMapping::from_cbor(&bytes).unwrap_err();

        assert!(matches!(err, StoreError::Deserialization(msg) if msg.contains("version 9")));
    }

    #[test]
    fn rejects_duplicate_fingerprints() {
        let record = TallyRecord {
            version: TALLY_RECORD_VERSION,
            counts: vec![(*alice().as_bytes(), 1), (*alice().as_bytes(), 2)],
        };
        let mut bytes = Vec::new();
        ciborium::into_writer(&record, &mut bytes).unwrap();

        assert!(TallyMapping::from_cbor(&bytes).is_err());
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            TallyMapping::from_cbor(b"not cbor at all"),
            Err(StoreError::Deserialization(_))
        ));
    }
}
