//! File-backed key-value store rooted in the client state directory.
//!
//! Each key maps to one file. Writes land in a hidden staging file first and
//! are renamed over the target so a crash never leaves a half-written
//! session blob behind.

use std::io;
use std::path::{Path, PathBuf};

use cap_std::{ambient_authority, fs::Dir};
use tracing::debug;

use crate::domain::ports::{KeyValueStore, StorageError};

/// [`KeyValueStore`] keeping one file per key under a directory.
#[derive(Debug)]
pub struct FileKeyValueStore {
    root: PathBuf,
    dir: Dir,
}

impl FileKeyValueStore {
    /// Open (creating if needed) the state directory at `root`.
    pub fn open(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        Dir::create_ambient_dir_all(&root, ambient_authority())?;
        let dir = Dir::open_ambient_dir(&root, ambient_authority())?;
        Ok(Self { root, dir })
    }

    /// Directory the store writes into.
    pub fn root(&self) -> &Path {
        self.root.as_path()
    }

    fn file_name(key: &str) -> Result<&Path, StorageError> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.'));
        if valid {
            Ok(Path::new(key))
        } else {
            Err(StorageError::io(key, "key is not a plain file name"))
        }
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = Self::file_name(key)?;
        match self.dir.read_to_string(path) {
            Ok(value) => Ok(Some(value)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) if error.kind() == io::ErrorKind::InvalidData => {
                Err(StorageError::corrupt(key, error.to_string()))
            }
            Err(error) => Err(StorageError::io(key, error.to_string())),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = Self::file_name(key)?;
        let staging = format!(".{key}.tmp");
        self.dir
            .write(&staging, value.as_bytes())
            .map_err(|error| StorageError::io(key, error.to_string()))?;
        self.dir
            .rename(&staging, &self.dir, path)
            .map_err(|error| StorageError::io(key, error.to_string()))?;
        debug!(key, root = %self.root.display(), "stored value");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = Self::file_name(key)?;
        match self.dir.remove_file(path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(StorageError::io(key, error.to_string())),
        }
    }
}
