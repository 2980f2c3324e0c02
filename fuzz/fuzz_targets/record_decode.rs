//! Fuzz target for on-disk record parsing
//!
//! Plants arbitrary bytes as a candidate file and as a vote file, then loads
//! them through the record store. Exercises the CBOR registry parser, the
//! FEC decoder, envelope opening and the tally parser end to end.
//!
//! # Invariants
//!
//! - Loading NEVER panics on hostile files
//! - A parsed registry never contains the sentinel as a category
//! - A PIN the registry rejects never reaches the vote file

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use votevault_store::{
    BlobStore, DEFAULT_PIN_SENTINEL_KEY, MemoryStore, RecordStore, SeededEntropy, StoreConfig,
    StoreError,
};

#[derive(Debug, Arbitrary)]
struct Input {
    candidate_file: Vec<u8>,
    vote_file: Vec<u8>,
    pin: Vec<u8>,
}

fuzz_target!(|input: Input| {
    let candidates = MemoryStore::new();
    let votes = MemoryStore::new();
    let Ok(store) = RecordStore::with_backends(
        &StoreConfig::default(),
        candidates.clone(),
        votes.clone(),
        SeededEntropy::new(0),
    ) else {
        unreachable!("default config is valid");
    };

    let Ok(()) = candidates.write("event", &input.candidate_file) else {
        unreachable!("memory writes never fail");
    };
    let Ok(()) = votes.write("event", &input.vote_file) else {
        unreachable!("memory writes never fail");
    };

    let Ok(registry) = store.load_registry("event") else {
        return;
    };
    assert!(registry.category(DEFAULT_PIN_SENTINEL_KEY).is_none());

    match store.read_votes(&registry, &input.pin) {
        // Nothing is ever decrypted under a PIN the registry rejects
        Ok(_) => assert!(registry.verify_pin(&input.pin)),
        Err(e) => assert_eq!(e == StoreError::PinMismatch, !registry.verify_pin(&input.pin)),
    }
});
