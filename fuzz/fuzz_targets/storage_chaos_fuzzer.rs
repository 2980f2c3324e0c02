//! Fuzz target for RecordStore under storage failures
//!
//! Drives a sequence of ballots, reads and corruption events through a
//! record store whose vote backend is a `ChaoticStore`.
//!
//! # Strategy
//!
//! - Variable write failure rates (0% to 90%)
//! - Ballots with arbitrary picks, including wrong-PIN attempts
//! - Byte flips in the stored vote file, within and beyond FEC capacity
//!
//! # Invariants
//!
//! - RecordStore NEVER panics on storage errors or damaged files
//! - A failed write leaves the previous tally readable and unchanged
//! - While the file is repairable, the tally equals the merge of every
//!   successful ballot
//! - Once the file is beyond repair, every later store fails closed and the
//!   damaged bytes are never overwritten

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use votevault_crypto::Fingerprint;
use votevault_store::{
    BlobStore, ChaoticStore, MemoryStore, RecordStore, SeededEntropy, StoreConfig, StoreError,
    TallyMapping,
};

const PIN: &[u8] = b"1234";

#[derive(Debug, Clone, Arbitrary)]
struct ChaosScenario {
    /// Seed for ChaoticStore and nonce RNGs
    chaos_seed: u64,
    /// Failure rate 0-9 maps to 0%-90%
    failure_rate_tenth: u8,
    /// Sequence of operations to perform
    operations: Vec<ChaosOperation>,
}

#[derive(Debug, Clone, Arbitrary)]
enum ChaosOperation {
    /// Cast a ballot picking candidates by index
    Vote { picks: Vec<u8> },
    /// Cast a ballot with the wrong PIN
    VoteWrongPin { pick: u8 },
    /// Read the tally back
    Read,
    /// Flip bytes at the given positions of the stored vote file
    Corrupt { positions: Vec<u16> },
}

fuzz_target!(|scenario: ChaosScenario| {
    let failure_rate = f64::from(scenario.failure_rate_tenth % 10) / 10.0;

    let votes = MemoryStore::new();
    let Ok(store) = RecordStore::with_backends(
        &StoreConfig::default(),
        ChaoticStore::with_seed(MemoryStore::new(), 0.0, scenario.chaos_seed),
        ChaoticStore::with_seed(votes.clone(), failure_rate, scenario.chaos_seed),
        SeededEntropy::new(scenario.chaos_seed),
    ) else {
        unreachable!("default config is valid");
    };
    let capacity = store.codec().correction_capacity();

    let contents = vec![
        ("Mayor".to_string(), vec!["Alice".to_string(), "Bob".to_string()]),
        ("Sheriff".to_string(), vec!["Carol".to_string()]),
    ];
    let Ok(registry) = store.register("town", PIN, contents) else {
        unreachable!("registry writes never fail");
    };
    let fingerprints: Vec<Fingerprint> = registry
        .categories()
        .iter()
        .flat_map(|category| category.fingerprints().map(|(_, fp)| fp))
        .collect();

    let mut expected = TallyMapping::new();
    // Flips applied since the last clean write
    let mut damage = 0usize;

    for op in scenario.operations.into_iter().take(64) {
        let before = votes.read("town").ok().flatten();

        match op {
            ChaosOperation::Vote { picks } => {
                let selections: Vec<_> = picks
                    .iter()
                    .take(16)
                    .map(|&i| fingerprints[usize::from(i) % fingerprints.len()])
                    .collect();

                match store.store_votes(&registry, PIN, &selections) {
                    Ok(()) => {
                        expected = expected.merge(selections);
                        damage = 0;
                    },
                    Err(StoreError::Io(_)) => {
                        assert_eq!(votes.read("town").ok().flatten(), before);
                    },
                    Err(e) if e.is_data_loss_risk() => {
                        assert_eq!(votes.read("town").ok().flatten(), before);
                    },
                    Err(e) => panic!("unexpected error: {e:?}"),
                }
            },
            ChaosOperation::VoteWrongPin { pick } => {
                let selection = fingerprints[usize::from(pick) % fingerprints.len()];
                let result = store.store_votes(&registry, b"0000", &[selection]);

                assert_eq!(result, Err(StoreError::PinMismatch));
                assert_eq!(votes.read("town").ok().flatten(), before);
            },
            ChaosOperation::Read => match store.read_votes(&registry, PIN) {
                Ok(tally) => assert_eq!(tally, expected),
                Err(e) => assert!(damage > capacity && e.is_data_loss_risk(), "unexpected {e:?}"),
            },
            ChaosOperation::Corrupt { positions } => {
                let Some(mut bytes) = before.filter(|b| !b.is_empty()) else { continue };
                for position in positions.iter().take(128) {
                    let index = usize::from(*position) % bytes.len();
                    bytes[index] ^= 0x5A;
                }
                damage += positions.len().min(128);
                let Ok(()) = votes.write("town", &bytes) else {
                    unreachable!("memory writes never fail");
                };
            },
        }
    }
});
