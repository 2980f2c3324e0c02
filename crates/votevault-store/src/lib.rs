//! votevault Record Store
//!
//! Persists candidate registries and the sealed, error-corrected vote tally
//! for each registered event. Two directories, one record per event in each:
//!
//! ```text
//! candidates/<name>.dat   CBOR map: category -> [candidate...], sentinel -> PIN verifier
//! votes/<name>.dat        FEC( version || nonce || XChaCha20-Poly1305(CBOR tally) || tag )
//! ```
//!
//! # Data Flow
//!
//! ```text
//! selections ──┐
//!              ▼
//! existing ──► merge ──► CBOR ──► seal ──► FEC encode ──► atomic write
//!    ▲
//!    └── open ◄── FEC decode (repairs p/2 bytes per codeword) ◄── read
//! ```
//!
//! # Failure Model
//!
//! - A wrong PIN is rejected before any key exists
//! - An existing vote file that cannot be decoded, authenticated or parsed
//!   aborts the write; the file is never replaced by a tally that would drop
//!   earlier votes
//! - Writes replace the whole file atomically, so a failed write leaves the
//!   previous tally intact
//!
//! # Storage Backends
//!
//! - [`FileStore`]: one directory per record kind, production
//! - [`MemoryStore`]: shared in-memory map for tests
//! - [`ChaoticStore`]: wraps another backend with write failures and
//!   byte-level corruption for chaos testing

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod blob;
pub mod codec;
mod config;
mod env;
mod error;
mod registry;
mod store;
mod tally;

pub use blob::{BlobError, BlobStore, ChaoticStore, FileStore, MemoryStore};
pub use codec::{CODEWORD_SIZE, FecCodec};
pub use config::{
    ConfigError, DEFAULT_CANDIDATES_DIR, DEFAULT_PARITY_BYTES, DEFAULT_PIN_SENTINEL_KEY,
    DEFAULT_VOTES_DIR, MAX_PARITY_BYTES, StoreConfig,
};
pub use env::{Entropy, OsEntropy, SeededEntropy};
pub use error::{CodecError, StoreError};
pub use registry::{CandidateRegistry, Category, RegistryContents};
pub use store::RecordStore;
pub use tally::{TALLY_RECORD_VERSION, TallyMapping};
