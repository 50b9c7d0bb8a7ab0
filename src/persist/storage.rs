//! Durable string key/value storage.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;

use fs2::FileExt;
use parking_lot::Mutex;
use thiserror::Error;

/// Errors that can occur when touching the durable store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to read '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write '{path}': {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to lock '{path}': {source}")]
    LockError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to encode '{key}': {source}")]
    EncodeError {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid storage key '{0}'")]
    InvalidKey(String),
}

/// String key/value store shared by every persisted domain.
pub trait Storage: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;
    /// Removing an absent key succeeds.
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Read `key`, hand the current value to `apply` and store what it
    /// returns, as one step. No other writer on the same store can land
    /// between the read and the write.
    fn update(
        &self,
        key: &str,
        apply: &mut dyn FnMut(Option<String>) -> Result<String, StorageError>,
    ) -> Result<(), StorageError>;
}

/// One file per key inside a data directory.
///
/// Every operation holds an exclusive `fs2` lock on `<dir>/.lock`; for
/// [`Storage::update`] the lock spans the whole read-modify-write, so two
/// storefront processes sharing a directory never lose each other's
/// writes. Writes go to a temp file first and are renamed into place.
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.'))
            && !key.starts_with('.');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(key.replace(':', "-")))
    }

    fn lock(&self) -> Result<File, StorageError> {
        let path = self.dir.join(".lock");
        fs::create_dir_all(&self.dir).map_err(|source| StorageError::WriteError {
            path: self.dir.clone(),
            source,
        })?;
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .map_err(|source| StorageError::LockError {
                path: path.clone(),
                source,
            })?;
        file.lock_exclusive()
            .map_err(|source| StorageError::LockError { path, source })?;
        // Released when the handle is dropped.
        Ok(file)
    }
}

impl Storage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        if !self.dir.exists() {
            return Ok(None);
        }
        let _lock = self.lock()?;
        read_file(path)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let _lock = self.lock()?;
        write_file(path, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        if !self.dir.exists() {
            return Ok(());
        }
        let _lock = self.lock()?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::WriteError { path, source }),
        }
    }

    fn update(
        &self,
        key: &str,
        apply: &mut dyn FnMut(Option<String>) -> Result<String, StorageError>,
    ) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let _lock = self.lock()?;
        let current = read_file(path.clone())?;
        let next = apply(current)?;
        write_file(path, &next)
    }
}

fn read_file(path: PathBuf) -> Result<Option<String>, StorageError> {
    match fs::read_to_string(&path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(StorageError::ReadError { path, source }),
    }
}

fn write_file(path: PathBuf, value: &str) -> Result<(), StorageError> {
    let tmp = path.with_extension("tmp");
    let write_tmp = || -> io::Result<()> {
        let mut file = File::create(&tmp)?;
        file.write_all(value.as_bytes())?;
        file.sync_all()
    };
    write_tmp().map_err(|source| StorageError::WriteError {
        path: tmp.clone(),
        source,
    })?;
    fs::rename(&tmp, &path).map_err(|source| StorageError::WriteError { path, source })
}

/// Process-local storage for tests and `--ephemeral` runs.
#[derive(Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.lock().remove(key);
        Ok(())
    }

    fn update(
        &self,
        key: &str,
        apply: &mut dyn FnMut(Option<String>) -> Result<String, StorageError>,
    ) -> Result<(), StorageError> {
        let mut entries = self.entries.lock();
        let next = apply(entries.get(key).cloned())?;
        entries.insert(key.to_string(), next);
        Ok(())
    }
}
