//! Blob storage abstraction for registry and vote files
//!
//! A blob is the whole content of one named record. Backends only ever read
//! or replace a blob in full; there is no append and no partial write. The
//! trait is synchronous: every operation completes before the next begins.

mod chaotic;
mod error;
mod file;
mod memory;

pub use chaotic::ChaoticStore;
pub use error::BlobError;
pub use file::FileStore;
pub use memory::MemoryStore;

/// File extension for every record
pub const RECORD_EXTENSION: &str = "dat";

/// Whole-blob storage keyed by record name.
///
/// # Invariants
///
/// - `write` replaces atomically: a concurrent or later `read` sees either
///   the previous blob or the new one, never a mix
/// - A failed `write` leaves the previous blob intact
pub trait BlobStore {
    /// Read a whole blob.
    ///
    /// Returns `None` if no blob exists under `name`.
    fn read(&self, name: &str) -> Result<Option<Vec<u8>>, BlobError>;

    /// Replace the blob under `name` with `bytes`.
    fn write(&self, name: &str, bytes: &[u8]) -> Result<(), BlobError>;
}

/// Check that `name` can be used as a single file name.
///
/// Rejects empty names, path separators, `.`/`..`, and NUL so a record name
/// can never escape its directory.
pub fn validate_name(name: &str) -> Result<(), BlobError> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0'])
        || name.starts_with('.');

    if invalid {
        return Err(BlobError::InvalidName(name.to_string()));
    }
    Ok(())
}
