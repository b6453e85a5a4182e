//! # File Backends
//!
//! One JSON file per key inside a directory: key `cart` lives at
//! `<dir>/cart.json`.
//!
//! Writes go to `<key>.json.tmp` first and are renamed into place, so a
//! crash mid-write leaves the previous snapshot intact.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{validate_file_key, StateStorage};
use crate::error::{StorageError, StorageResult};

fn file_path(dir: &Path, key: &str) -> StorageResult<PathBuf> {
    validate_file_key(key)?;
    Ok(dir.join(format!("{}.json", key)))
}

fn temp_path(path: &Path) -> PathBuf {
    path.with_extension("json.tmp")
}

// =============================================================================
// Blocking File Storage
// =============================================================================

/// Blocking file backend.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileStorage { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl StateStorage for FileStorage {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        let path = file_path(&self.dir, key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::io(key, e)),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        let path = file_path(&self.dir, key)?;
        let tmp = temp_path(&path);

        fs::create_dir_all(&self.dir).map_err(|e| StorageError::io(key, e))?;
        fs::write(&tmp, value).map_err(|e| StorageError::io(key, e))?;
        fs::rename(&tmp, &path).map_err(|e| StorageError::io(key, e))
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        let path = file_path(&self.dir, key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::io(key, e)),
        }
    }
}

// =============================================================================
// Async File Storage
// =============================================================================

#[cfg(not(target_arch = "wasm32"))]
pub use self::non_blocking::AsyncFileStorage;

#[cfg(not(target_arch = "wasm32"))]
mod non_blocking {
    use std::io::ErrorKind;
    use std::path::{Path, PathBuf};

    use async_trait::async_trait;
    use tokio::fs;

    use super::{file_path, temp_path};
    use crate::error::{StorageError, StorageResult};
    use crate::storage::AsyncStateStorage;

    /// File backend driven by `tokio::fs`, for hosts where storage is
    /// reached asynchronously.
    #[derive(Debug, Clone)]
    pub struct AsyncFileStorage {
        dir: PathBuf,
    }

    impl AsyncFileStorage {
        pub fn new(dir: impl Into<PathBuf>) -> Self {
            AsyncFileStorage { dir: dir.into() }
        }

        pub fn dir(&self) -> &Path {
            &self.dir
        }
    }

    #[async_trait]
    impl AsyncStateStorage for AsyncFileStorage {
        async fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
            let path = file_path(&self.dir, key)?;
            match fs::read_to_string(&path).await {
                Ok(contents) => Ok(Some(contents)),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
                Err(e) => Err(StorageError::io(key, e)),
            }
        }

        async fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
            let path = file_path(&self.dir, key)?;
            let tmp = temp_path(&path);

            fs::create_dir_all(&self.dir)
                .await
                .map_err(|e| StorageError::io(key, e))?;
            fs::write(&tmp, value)
                .await
                .map_err(|e| StorageError::io(key, e))?;
            fs::rename(&tmp, &path)
                .await
                .map_err(|e| StorageError::io(key, e))
        }

        async fn remove_item(&self, key: &str) -> StorageResult<()> {
            let path = file_path(&self.dir, key)?;
            match fs::remove_file(&path).await {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
                Err(e) => Err(StorageError::io(key, e)),
            }
        }
    }
}
