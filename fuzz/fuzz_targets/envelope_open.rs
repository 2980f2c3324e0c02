//! Fuzz target for the sealed tally envelope
//!
//! Tests `open` with arbitrary bytes and with mutated genuine envelopes.
//!
//! # Invariants
//!
//! - `open` NEVER panics, whatever the length or version byte
//! - Any single-byte change to a sealed envelope is rejected
//! - An untouched envelope always opens to its plaintext

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use votevault_crypto::{NONCE_SIZE, derive_key, hash_pin, open, seal};

#[derive(Debug, Arbitrary)]
struct Input {
    pin: Vec<u8>,
    nonce: [u8; NONCE_SIZE],
    plaintext: Vec<u8>,
    garbage: Vec<u8>,
    flip_at: usize,
    flip_mask: u8,
}

fuzz_target!(|input: Input| {
    let Ok(key) = derive_key(&hash_pin(&input.pin), &input.pin) else {
        unreachable!("a PIN always matches its own verifier");
    };

    let _ = open(&key, &input.garbage);

    let sealed = seal(&key, &input.plaintext, input.nonce);
    assert_eq!(open(&key, &sealed).ok().as_ref(), Some(&input.plaintext));

    if input.flip_mask != 0 {
        let mut tampered = sealed;
        let index = input.flip_at % tampered.len();
        tampered[index] ^= input.flip_mask;
        assert!(open(&key, &tampered).is_err());
    }
});
