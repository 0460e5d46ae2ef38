//! File-backed key-value storage.
//!
//! Each key maps to `<dir>/<key>.json`. Writes go through a temp file in the
//! same directory and are renamed into place, so readers never observe a
//! half-written value.

use super::{validate_key, KeyValueStore, StorageResult};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const VALUE_FILE_EXTENSION: &str = "json";

/// Directory of one-file-per-key values.
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    dir: PathBuf,
}

impl FileKeyValueStore {
    /// Opens a store rooted at `dir`, creating the directory when missing.
    pub fn open(dir: impl AsRef<Path>) -> StorageResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn value_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.{VALUE_FILE_EXTENSION}"))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        validate_key(key)?;
        match fs::read(self.value_path(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&self, key: &str, value: &[u8]) -> StorageResult<()> {
        validate_key(key)?;
        let mut staged = NamedTempFile::new_in(&self.dir)?;
        staged.write_all(value)?;
        staged.as_file().sync_all()?;
        staged
            .persist(self.value_path(key))
            .map_err(|err| err.error)?;
        Ok(())
    }
}
