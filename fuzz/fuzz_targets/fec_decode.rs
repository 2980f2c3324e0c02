//! Fuzz target for FecCodec::decode
//!
//! Feeds arbitrary streams to the Reed-Solomon decoder at an arbitrary
//! (valid) parity to find:
//! - Panics on short, oversized or garbage codewords
//! - Length arithmetic errors in the codeword split
//!
//! Decoding must never panic. When it succeeds, re-encoding the result and
//! decoding again must be stable.

#![no_main]

use libfuzzer_sys::fuzz_target;
use votevault_store::FecCodec;

fuzz_target!(|input: (u8, &[u8])| {
    let (parity_seed, data) = input;
    // Even values in 2..=254
    let parity = (usize::from(parity_seed % 127) + 1) * 2;
    let Ok(codec) = FecCodec::new(parity) else {
        unreachable!("parity {parity} is always valid");
    };

    if let Ok(decoded) = codec.decode(data) {
        let reencoded = codec.encode(&decoded);
        assert_eq!(codec.decode(&reencoded).ok(), Some(decoded));
    }

    // Clean streams always roundtrip
    let encoded = codec.encode(data);
    assert_eq!(encoded.len(), codec.encoded_len(data.len()));
    assert_eq!(codec.decode(&encoded).ok().as_deref(), Some(data));
});
