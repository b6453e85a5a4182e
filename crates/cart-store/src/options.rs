//! # Persistence Options
//!
//! Where and how a [`CartStore`](crate::CartStore) persists its snapshot.
//!
//! ```text
//! PersistOptions
//! ├── name            storage key                  default "cart"
//! ├── version         envelope schema version      default 0
//! ├── storage         StorageBackend               default per target
//! ├── migrate         Option<Arc<MigrateFn>>       default none
//! └── skip_hydration  don't read at construction   default false
//! ```
//!
//! The store keeps its options behind a lock and reads them on every access,
//! so a name or backend change applies to the next read or write.

use std::fmt;
use std::sync::Arc;

use cart_core::{CartSnapshot, CoreResult, MigrateFn, DEFAULT_STORE_NAME, DEFAULT_STORE_VERSION};
use serde_json::Value;

use crate::storage::{BackendKind, StorageBackend};

#[derive(Clone)]
pub struct PersistOptions {
    pub(crate) name: String,
    pub(crate) version: u32,
    pub(crate) storage: StorageBackend,
    pub(crate) migrate: Option<Arc<MigrateFn>>,
    pub(crate) skip_hydration: bool,
}

impl PersistOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage key for the persisted envelope.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    pub fn with_storage(mut self, storage: StorageBackend) -> Self {
        self.storage = storage;
        self
    }

    /// Hook applied when the stored version differs from [`version`](Self::version).
    ///
    /// Without one, mismatched data is ignored and overwritten by the next
    /// mutation.
    pub fn with_migrate<F>(mut self, migrate: F) -> Self
    where
        F: Fn(Value, u32) -> CoreResult<CartSnapshot> + Send + Sync + 'static,
    {
        self.migrate = Some(Arc::new(migrate));
        self
    }

    /// Don't read storage at construction; call `rehydrate` later.
    pub fn with_skip_hydration(mut self, skip: bool) -> Self {
        self.skip_hydration = skip;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn storage(&self) -> &StorageBackend {
        &self.storage
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.storage.kind()
    }

    pub fn has_migrate(&self) -> bool {
        self.migrate.is_some()
    }

    pub fn skip_hydration(&self) -> bool {
        self.skip_hydration
    }

    /// Clones the parts needed for one storage access.
    pub(crate) fn target(&self) -> PersistTarget {
        PersistTarget {
            name: self.name.clone(),
            version: self.version,
            storage: self.storage.clone(),
        }
    }
}

impl Default for PersistOptions {
    fn default() -> Self {
        PersistOptions {
            name: DEFAULT_STORE_NAME.to_string(),
            version: DEFAULT_STORE_VERSION,
            storage: StorageBackend::default(),
            migrate: None,
            skip_hydration: false,
        }
    }
}

impl fmt::Debug for PersistOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistOptions")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("storage", &self.storage)
            .field("migrate", &self.migrate.is_some())
            .field("skip_hydration", &self.skip_hydration)
            .finish()
    }
}

/// Snapshot of the options taken once per read or write.
#[derive(Debug, Clone)]
pub(crate) struct PersistTarget {
    pub name: String,
    pub version: u32,
    pub storage: StorageBackend,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn test_defaults() {
        let options = PersistOptions::default();
        assert_eq!(options.name(), "cart");
        assert_eq!(options.version(), 0);
        assert!(!options.has_migrate());
        assert!(!options.skip_hydration());
    }

    #[test]
    fn test_builder() {
        let options = PersistOptions::new()
            .with_name("shop-cart")
            .with_version(2)
            .with_storage(StorageBackend::asynchronous(MemoryStorage::new()))
            .with_migrate(|_, _| Ok(CartSnapshot::new()))
            .with_skip_hydration(true);

        assert_eq!(options.name(), "shop-cart");
        assert_eq!(options.version(), 2);
        assert_eq!(options.backend_kind(), BackendKind::Async);
        assert!(options.has_migrate());
        assert!(options.skip_hydration());

        let debug = format!("{:?}", options);
        assert!(debug.contains("shop-cart"));
        assert!(debug.contains("migrate: true"));
    }
}
