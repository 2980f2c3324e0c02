//! Directory-backed blob storage.
//!
//! Each record is one `<name>.dat` file. Writes go to a temp file in the
//! same directory, are synced, then renamed over the target, so a crash or
//! failed write never leaves a half-written record behind.

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use super::{BlobError, BlobStore, RECORD_EXTENSION, validate_name};

/// Prefix of in-flight temp files, so stray ones are recognizable
const TEMP_PREFIX: &str = ".votevault-";

/// Blob storage in a single directory.
///
/// The directory must already exist; creating it is the caller's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Store records under `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the records.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the record named `name`.
    ///
    /// # Errors
    ///
    /// Returns `BlobError::InvalidName` if `name` is not a safe file name.
    pub fn path_of(&self, name: &str) -> Result<PathBuf, BlobError> {
        validate_name(name)?;
        Ok(self.dir.join(format!("{name}.{RECORD_EXTENSION}")))
    }
}

impl BlobStore for FileStore {
    fn read(&self, name: &str) -> Result<Option<Vec<u8>>, BlobError> {
        let path = self.path_of(name)?;

        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(BlobError::Io(format!("{}: {e}", path.display()))),
        }
    }

    fn write(&self, name: &str, bytes: &[u8]) -> Result<(), BlobError> {
        let path = self.path_of(name)?;

        let mut temp = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .tempfile_in(&self.dir)
            .map_err(|e| BlobError::Io(format!("{}: {e}", self.dir.display())))?;

        temp.write_all(bytes)?;
        temp.as_file().sync_all()?;

        temp.persist(&path)
            .map_err(|e| BlobError::Io(format!("{}: {}", path.display(), e.error)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn missing_record_reads_as_none() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());

        assert_eq!(store.read("absent").unwrap(), None);
        assert!(!dir.path().join("absent.dat").exists());
    }

    #[test]
    fn write_then_read() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());

        store.write("town", b"first").unwrap();
        store.write("town", b"second").unwrap();

        assert_eq!(store.read("town").unwrap(), Some(b"second".to_vec()));
        assert!(dir.path().join("town.dat").is_file());
    }

    #[test]
    fn no_temp_files_left_behind() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());

        store.write("a", b"1").unwrap();
        store.write("b", b"2").unwrap();
        store.write("a", b"3").unwrap();

        let mut names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .collect();
        names.sort();
        assert_eq!(names, ["a.dat", "b.dat"]);
    }

    #[test]
    fn write_into_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nope"));

        assert!(matches!(store.write("town", b"x"), Err(BlobError::Io(_))));
    }

    #[test]
    fn path_traversal_is_rejected() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());

        assert!(matches!(store.write("../escape", b"x"), Err(BlobError::InvalidName(_))));
        assert!(matches!(store.read("../escape"), Err(BlobError::InvalidName(_))));
    }
}
