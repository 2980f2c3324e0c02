//! Chaos property tests for the record store
//!
//! Runs the full seal/FEC pipeline over `ChaoticStore` and checks:
//! - A failed write never loses or alters previously recorded votes
//! - The persisted tally always equals the merge of every successful batch
//! - Corruption within the correction capacity is invisible to callers

use proptest::prelude::*;
use votevault_crypto::Fingerprint;
use votevault_store::{
    BlobStore, CandidateRegistry, ChaoticStore, MemoryStore, RecordStore, SeededEntropy,
    StoreConfig, StoreError, TallyMapping,
};

const PIN: &[u8] = b"1234";

type ChaosStore = RecordStore<ChaoticStore<MemoryStore>, SeededEntropy>;

fn candidates() -> Vec<(String, Vec<String>)> {
    vec![
        ("Mayor".to_string(), vec!["Alice".to_string(), "Bob".to_string(), "Eve".to_string()]),
        ("Sheriff".to_string(), vec!["Frank".to_string(), "Grace".to_string()]),
    ]
}

fn all_fingerprints(registry: &CandidateRegistry) -> Vec<Fingerprint> {
    registry
        .categories()
        .iter()
        .flat_map(|category| category.fingerprints().map(|(_, fp)| fp))
        .collect()
}

/// Store whose vote writes go through the given chaos settings
fn chaos_store(
    votes: &MemoryStore,
    failure_rate: f64,
    corrupt_bytes: usize,
    seed: u64,
) -> ChaosStore {
    RecordStore::with_backends(
        &StoreConfig::default(),
        ChaoticStore::with_seed(MemoryStore::new(), 0.0, seed),
        ChaoticStore::with_seed(votes.clone(), failure_rate, seed)
            .with_corruption(corrupt_bytes),
        SeededEntropy::new(seed),
    )
    .unwrap()
}

/// Batches of indices into the registry's fingerprint list
fn batches() -> impl Strategy<Value = Vec<Vec<usize>>> {
    prop::collection::vec(prop::collection::vec(0usize..5, 0..8), 1..12)
}

#[test]
fn prop_failed_writes_preserve_tally() {
    proptest!(|(
        failure_rate in 0.0..0.9,
        seed in any::<u64>(),
        batches in batches(),
    )| {
        let votes = MemoryStore::new();
        let store = chaos_store(&votes, failure_rate, 0, seed);
        let registry = store.register("town", PIN, candidates()).unwrap();
        let fingerprints = all_fingerprints(&registry);

        let mut expected = TallyMapping::new();

        for batch in batches {
            let selections: Vec<_> = batch.iter().map(|&i| fingerprints[i]).collect();

            match store.store_votes(&registry, PIN, &selections) {
                Ok(()) => expected = expected.merge(selections),
                Err(StoreError::Io(_)) => {}
                Err(e) => panic!("unexpected error: {e:?}"),
            }

            // ORACLE: persisted tally is exactly the successful batches
            prop_assert_eq!(store.read_votes(&registry, PIN).unwrap(), expected.clone());
        }
    });
}

#[test]
fn prop_repairable_corruption_is_invisible() {
    proptest!(|(
        seed in any::<u64>(),
        corrupt_bytes in 1usize..=80,
        batches in batches(),
    )| {
        // Default parity repairs 80 bytes per codeword; total flips never exceed that
        let votes = MemoryStore::new();
        let store = chaos_store(&votes, 0.0, corrupt_bytes, seed);
        let registry = store.register("town", PIN, candidates()).unwrap();
        let fingerprints = all_fingerprints(&registry);

        let mut expected = TallyMapping::new();

        for batch in batches {
            let selections: Vec<_> = batch.iter().map(|&i| fingerprints[i]).collect();

            store.store_votes(&registry, PIN, &selections).unwrap();
            expected = expected.merge(selections);

            prop_assert_eq!(store.read_votes(&registry, PIN).unwrap(), expected.clone());
        }
    });
}

#[test]
fn prop_merge_is_order_independent() {
    proptest!(|(indices in prop::collection::vec(0usize..5, 0..40), seed in any::<u64>())| {
        let forward_votes = MemoryStore::new();
        let reverse_votes = MemoryStore::new();
        let forward = chaos_store(&forward_votes, 0.0, 0, seed);
        let reverse = chaos_store(&reverse_votes, 0.0, 0, seed);
        let registry = forward.register("town", PIN, candidates()).unwrap();
        reverse.register("town", PIN, candidates()).unwrap();
        let fingerprints = all_fingerprints(&registry);

        let selections: Vec<_> = indices.iter().map(|&i| fingerprints[i]).collect();
        for fp in &selections {
            forward.store_votes(&registry, PIN, &[*fp]).unwrap();
        }
        for fp in selections.iter().rev() {
            reverse.store_votes(&registry, PIN, &[*fp]).unwrap();
        }

        let total = selections.len() as u64;
        let forward_tally = forward.read_votes(&registry, PIN).unwrap();
        prop_assert_eq!(forward_tally.total(), total);
        prop_assert_eq!(forward_tally, reverse.read_votes(&registry, PIN).unwrap());
    });
}

#[test]
fn chaos_runs_are_reproducible() {
    let run = |seed| {
        let votes = MemoryStore::new();
        let store = chaos_store(&votes, 0.5, 0, seed);
        let registry = store.register("town", PIN, candidates()).unwrap();
        let alice = registry.fingerprint("Mayor", "Alice").unwrap();

        let outcomes: Vec<_> =
            (0..20).map(|_| store.store_votes(&registry, PIN, &[alice]).is_ok()).collect();
        (outcomes, votes.read("town").unwrap())
    };

    assert_eq!(run(99), run(99));
}
