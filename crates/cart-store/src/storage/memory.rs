//! In-memory backend.
//!
//! Clones share the same map, so a test can keep a handle to inspect what
//! the store wrote.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use super::{AsyncStateStorage, StateStorage};
use crate::error::StorageResult;

#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl StateStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entries().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        self.entries().remove(key);
        Ok(())
    }
}

#[async_trait]
impl AsyncStateStorage for MemoryStorage {
    async fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        StateStorage::get_item(self, key)
    }

    async fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        StateStorage::set_item(self, key, value)
    }

    async fn remove_item(&self, key: &str) -> StorageResult<()> {
        StateStorage::remove_item(self, key)
    }
}
