//! Reed-Solomon forward error correction for sealed tally envelopes.
//!
//! The sealed envelope is cut into blocks of `255 - parity` bytes and each
//! block is written as a systematic Reed-Solomon codeword over GF(2^8):
//!
//! ```text
//! [data: <= 255 - p][parity: p] [data][parity] ... [data: short][parity: p]
//! ```
//!
//! Every codeword is exactly 255 bytes except the last, so a decoder can
//! re-split the stream without a length header. Each codeword independently
//! repairs up to `p / 2` corrupted bytes.
//!
//! FEC wraps the ciphertext, not the plaintext: a single flipped bit in
//! ciphertext fails the whole AEAD tag, so corruption has to be repaired
//! before decryption ever sees the bytes.

use reed_solomon::{Decoder, Encoder};

use crate::{
    config::{ConfigError, validate_parity},
    error::CodecError,
};

/// Length of a full Reed-Solomon codeword over GF(2^8)
pub const CODEWORD_SIZE: usize = 255;

/// Systematic Reed-Solomon codec with a fixed parity count per codeword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FecCodec {
    parity: usize,
}

impl FecCodec {
    /// Create a codec appending `parity` bytes to every codeword.
    ///
    /// # Errors
    ///
    /// - `ParityOutOfRange`: not in `2..=254`
    /// - `OddParity`: correction capacity would not be a whole byte count
    pub fn new(parity: usize) -> Result<Self, ConfigError> {
        validate_parity(parity)?;
        Ok(Self { parity })
    }

    /// Parity bytes per codeword.
    pub fn parity(&self) -> usize {
        self.parity
    }

    /// Corrupted bytes each codeword can repair.
    pub fn correction_capacity(&self) -> usize {
        self.parity / 2
    }

    /// Payload bytes carried by a full codeword.
    pub fn block_len(&self) -> usize {
        CODEWORD_SIZE - self.parity
    }

    /// Length of `encode(data)` for a payload of `data_len` bytes.
    pub fn encoded_len(&self, data_len: usize) -> usize {
        data_len + data_len.div_ceil(self.block_len()) * self.parity
    }

    /// Append parity to every block of `data`.
    ///
    /// Empty input encodes to empty output.
    pub fn encode(&self, data: &[u8]) -> Vec<u8> {
        let encoder = Encoder::new(self.parity);

        let mut encoded = Vec::with_capacity(self.encoded_len(data.len()));
        for block in data.chunks(self.block_len()) {
            let codeword = encoder.encode(block);
            encoded.extend_from_slice(codeword.data());
            encoded.extend_from_slice(codeword.ecc());
        }

        debug_assert_eq!(encoded.len(), self.encoded_len(data.len()));
        encoded
    }

    /// Repair, validate and strip parity from an encoded stream.
    ///
    /// # Errors
    ///
    /// - `UnrecoverableCorruption`: a codeword has more than
    ///   [`correction_capacity`](Self::correction_capacity) bad bytes
    /// - `Truncated`: the last codeword cannot hold any data
    pub fn decode(&self, encoded: &[u8]) -> Result<Vec<u8>, CodecError> {
        self.decode_with_repairs(encoded).map(|(data, _)| data)
    }

    /// Like [`decode`](Self::decode), also returning how many codewords
    /// needed repair.
    pub fn decode_with_repairs(&self, encoded: &[u8]) -> Result<(Vec<u8>, usize), CodecError> {
        let decoder = Decoder::new(self.parity);

        let mut data = Vec::with_capacity(encoded.len());
        let mut repaired = 0;

        for (block, codeword) in encoded.chunks(CODEWORD_SIZE).enumerate() {
            if codeword.len() <= self.parity {
                return Err(CodecError::Truncated { len: encoded.len() });
            }

            let (payload, parity) = codeword.split_at(codeword.len() - self.parity);

            let mut buffer = codeword.to_vec();
            let corrected = decoder
                .correct(&mut buffer, None)
                .map_err(|_| CodecError::UnrecoverableCorruption { block })?;

            if corrected.data() != payload || corrected.ecc() != parity {
                repaired += 1;
            }
            data.extend_from_slice(corrected.data());
        }

        Ok((data, repaired))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> FecCodec {
        FecCodec::new(160).unwrap()
    }

    fn payload(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i * 7 + 3) as u8).collect()
    }

    #[test]
    fn encode_decode_roundtrip() {
        let data = payload(300);

        let encoded = codec().encode(&data);

        assert_eq!(codec().decode(&encoded).unwrap(), data);
    }

    #[test]
    fn empty_roundtrip() {
        assert!(codec().encode(&[]).is_empty());
        assert_eq!(codec().decode(&[]).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn encoding_is_systematic() {
        let data = payload(95);

        let encoded = codec().encode(&data);

        assert_eq!(encoded.len(), CODEWORD_SIZE);
        assert_eq!(&encoded[..95], data.as_slice());
    }

    #[test]
    fn encoded_len_matches_layout() {
        let codec = codec();

        assert_eq!(codec.encoded_len(0), 0);
        assert_eq!(codec.encoded_len(1), 161);
        assert_eq!(codec.encoded_len(95), 255);
        assert_eq!(codec.encoded_len(96), 255 + 161);
        assert_eq!(codec.encode(&payload(96)).len(), 255 + 161);
    }

    #[test]
    fn repairs_up_to_capacity_in_one_codeword() {
        let codec = codec();
        let data = payload(200);
        let mut encoded = codec.encode(&data);

        for byte in encoded.iter_mut().take(codec.correction_capacity()) {
            *byte ^= 0xFF;
        }

        let (decoded, repaired) = codec.decode_with_repairs(&encoded).unwrap();
        assert_eq!(decoded, data);
        assert_eq!(repaired, 1);
    }

    #[test]
    fn repairs_capacity_in_every_codeword() {
        let codec = codec();
        let data = payload(400);
        let mut encoded = codec.encode(&data);

        for start in (0..encoded.len()).step_by(CODEWORD_SIZE) {
            for offset in 0..codec.correction_capacity() {
                encoded[start + offset * 2] ^= 0x5A;
            }
        }

        assert_eq!(codec.decode(&encoded).unwrap(), data);
    }

    #[test]
    fn clean_stream_reports_no_repairs() {
        let codec = codec();
        let encoded = codec.encode(&payload(150));

        let (_, repaired) = codec.decode_with_repairs(&encoded).unwrap();

        assert_eq!(repaired, 0);
    }

    #[test]
    fn beyond_capacity_is_unrecoverable() {
        let codec = codec();
        let mut encoded = codec.encode(&payload(300));

        // Second codeword loses one byte more than it can repair
        for byte in encoded[CODEWORD_SIZE..].iter_mut().take(codec.correction_capacity() + 1) {
            *byte ^= 0xFF;
        }

        assert_eq!(codec.decode(&encoded), Err(CodecError::UnrecoverableCorruption { block: 1 }));
    }

    #[test]
    fn parity_only_tail_is_truncated() {
        let codec = codec();
        let encoded = codec.encode(&payload(95));
        let mut damaged = encoded.clone();
        damaged.extend_from_slice(&encoded[95..]);

        assert_eq!(codec.decode(&damaged), Err(CodecError::Truncated { len: damaged.len() }));
    }

    #[test]
    fn small_parity_codec() {
        let codec = FecCodec::new(2).unwrap();
        let data = payload(1000);
        let mut encoded = codec.encode(&data);

        encoded[10] ^= 0x01;
        encoded[300] ^= 0x80;

        assert_eq!(codec.block_len(), 253);
        assert_eq!(codec.decode(&encoded).unwrap(), data);
    }

    #[test]
    fn rejects_invalid_parity() {
        assert_eq!(FecCodec::new(255), Err(ConfigError::ParityOutOfRange(255)));
        assert_eq!(FecCodec::new(161), Err(ConfigError::OddParity(161)));
    }
}
