#![allow(clippy::disallowed_types, reason = "Synchronous in-memory operations only")]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use super::{BlobError, BlobStore, validate_name};

/// In-memory blob storage for testing and simulation
///
/// Clones share the same underlying map, so a test can hand one clone to a
/// [`crate::RecordStore`] and inspect or damage records through another.
/// Names are validated exactly like [`super::FileStore`] does.
#[derive(Clone, Default)]
pub struct MemoryStore {
    blobs: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MemoryStore {
    /// Create a new empty `MemoryStore`
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> Result<usize, BlobError> {
        Ok(self.lock()?.len())
    }

    /// True if nothing has been written.
    pub fn is_empty(&self) -> Result<bool, BlobError> {
        Ok(self.lock()?.is_empty())
    }

    /// Remove a record, returning its last content.
    pub fn remove(&self, name: &str) -> Result<Option<Vec<u8>>, BlobError> {
        Ok(self.lock()?.remove(name))
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, Vec<u8>>>, BlobError> {
        self.blobs.lock().map_err(|_| BlobError::Io("memory store lock poisoned".to_string()))
    }
}

impl BlobStore for MemoryStore {
    fn read(&self, name: &str) -> Result<Option<Vec<u8>>, BlobError> {
        validate_name(name)?;
        Ok(self.lock()?.get(name).cloned())
    }

    fn write(&self, name: &str, bytes: &[u8]) -> Result<(), BlobError> {
        validate_name(name)?;
        self.lock()?.insert(name.to_string(), bytes.to_vec());
        Ok(())
    }
}
