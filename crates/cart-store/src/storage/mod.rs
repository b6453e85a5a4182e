//! # Storage Backends
//!
//! The key-value capability the store persists into.
//!
//! ## Backend Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Storage Capability                               │
//! │                                                                         │
//! │  StorageBackend                                                         │
//! │  ├── Sync(Arc<dyn StateStorage>)        written inline by the store     │
//! │  │   ├── MemoryStorage                  process-local map               │
//! │  │   ├── FileStorage                    <dir>/<key>.json                │
//! │  │   └── LocalStorage                   browser (default on the web)    │
//! │  │                                                                      │
//! │  └── Async(Arc<dyn AsyncStateStorage>)  written by the AsyncWriter task │
//! │      ├── AsyncFileStorage               <dir>/<key>.json (default)      │
//! │      └── MemoryStorage                  (implements both)               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Backends store raw strings. Encoding the snapshot is the store's job.

mod file;
mod memory;
#[cfg(all(target_arch = "wasm32", feature = "web"))]
mod web;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
#[cfg(not(all(target_arch = "wasm32", feature = "web")))]
use tracing::warn;

use crate::error::{StorageError, StorageResult};

#[cfg(not(target_arch = "wasm32"))]
pub use file::AsyncFileStorage;
pub use file::FileStorage;
pub use memory::MemoryStorage;
#[cfg(all(target_arch = "wasm32", feature = "web"))]
pub use web::LocalStorage;

// =============================================================================
// Capabilities
// =============================================================================

/// Blocking key-value storage.
pub trait StateStorage: Send + Sync {
    /// Reads the value under `key`. `Ok(None)` when the key is absent.
    fn get_item(&self, key: &str) -> StorageResult<Option<String>>;

    /// Writes `value` under `key`, replacing any previous value.
    fn set_item(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Removes `key`. Removing an absent key is not an error.
    fn remove_item(&self, key: &str) -> StorageResult<()>;
}

/// Non-blocking key-value storage, for hosts where storage is only
/// reachable asynchronously.
#[async_trait]
pub trait AsyncStateStorage: Send + Sync {
    async fn get_item(&self, key: &str) -> StorageResult<Option<String>>;

    async fn set_item(&self, key: &str, value: &str) -> StorageResult<()>;

    async fn remove_item(&self, key: &str) -> StorageResult<()>;
}

// =============================================================================
// Backend Handle
// =============================================================================

/// The backend a store persists into. Cheap to clone.
#[derive(Clone)]
pub enum StorageBackend {
    Sync(Arc<dyn StateStorage>),
    Async(Arc<dyn AsyncStateStorage>),
}

/// Whether a backend is written inline or through the writer task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Sync,
    Async,
}

impl StorageBackend {
    /// Wraps a blocking backend.
    pub fn sync(storage: impl StateStorage + 'static) -> Self {
        StorageBackend::Sync(Arc::new(storage))
    }

    /// Wraps a non-blocking backend.
    pub fn asynchronous(storage: impl AsyncStateStorage + 'static) -> Self {
        StorageBackend::Async(Arc::new(storage))
    }

    /// A fresh, empty in-memory backend.
    pub fn memory() -> Self {
        Self::sync(MemoryStorage::new())
    }

    pub fn kind(&self) -> BackendKind {
        match self {
            StorageBackend::Sync(_) => BackendKind::Sync,
            StorageBackend::Async(_) => BackendKind::Async,
        }
    }

    pub fn is_async(&self) -> bool {
        self.kind() == BackendKind::Async
    }
}

impl StorageBackend {
    /// Async file storage under `data_dir`, or a process-local map when
    /// there is no directory to write to.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn durable_or_memory(data_dir: Option<std::path::PathBuf>) -> Self {
        match data_dir {
            Some(dir) => Self::asynchronous(AsyncFileStorage::new(dir)),
            None => {
                warn!("No data directory for the cart, falling back to in-memory storage");
                Self::memory()
            }
        }
    }
}

impl Default for StorageBackend {
    /// Browser localStorage on the web. Elsewhere, async file storage in the
    /// platform data directory, or memory if the platform has none.
    fn default() -> Self {
        #[cfg(all(target_arch = "wasm32", feature = "web"))]
        {
            Self::sync(LocalStorage)
        }
        #[cfg(all(target_arch = "wasm32", not(feature = "web")))]
        {
            warn!("No browser storage without the `web` feature, using in-memory storage");
            Self::memory()
        }
        #[cfg(not(target_arch = "wasm32"))]
        {
            Self::durable_or_memory(crate::config::default_data_dir())
        }
    }
}

impl fmt::Debug for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StorageBackend").field(&self.kind()).finish()
    }
}

// =============================================================================
// Key Validation
// =============================================================================

/// Rejects keys that cannot safely become a file name.
///
/// Allowed: ASCII letters, digits, `-`, `_`, `.`; not empty; not starting
/// with a dot.
pub(crate) fn validate_file_key(key: &str) -> StorageResult<()> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));

    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_file_key() {
        assert!(validate_file_key("cart").is_ok());
        assert!(validate_file_key("my-shop_cart.v2").is_ok());

        assert!(validate_file_key("").is_err());
        assert!(validate_file_key(".hidden").is_err());
        assert!(validate_file_key("../cart").is_err());
        assert!(validate_file_key("a/b").is_err());
        assert!(validate_file_key("a\\b").is_err());
    }

    #[test]
    fn test_backend_kind() {
        assert_eq!(StorageBackend::memory().kind(), BackendKind::Sync);
        assert!(StorageBackend::asynchronous(MemoryStorage::new()).is_async());
    }

    #[tokio::test]
    async fn test_durable_default_backend() {
        let dir = tempfile::tempdir().unwrap();
        let backend = StorageBackend::durable_or_memory(Some(dir.path().to_path_buf()));
        assert!(backend.is_async());

        let StorageBackend::Async(storage) = backend else {
            panic!("expected an async backend");
        };
        storage.set_item("cart", "{}").await.unwrap();
        assert!(dir.path().join("cart.json").exists());

        assert_eq!(StorageBackend::durable_or_memory(None).kind(), BackendKind::Sync);
    }
}
