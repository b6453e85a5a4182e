//! Browser `window.localStorage` backend.
//!
//! The handle is looked up on every call rather than held, since
//! `web_sys::Storage` is neither `Send` nor `Sync`.

use super::StateStorage;
use crate::error::{StorageError, StorageResult};

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorage;

impl LocalStorage {
    fn storage() -> StorageResult<web_sys::Storage> {
        let window = web_sys::window()
            .ok_or_else(|| StorageError::Unavailable("no global window".to_string()))?;

        match window.local_storage() {
            Ok(Some(storage)) => Ok(storage),
            Ok(None) => Err(StorageError::Unavailable(
                "localStorage is disabled".to_string(),
            )),
            Err(e) => Err(StorageError::Unavailable(format!("{:?}", e))),
        }
    }
}

impl StateStorage for LocalStorage {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        Self::storage()?
            .get_item(key)
            .map_err(|e| StorageError::Backend {
                key: key.to_string(),
                reason: format!("{:?}", e),
            })
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        // Quota errors land here.
        Self::storage()?
            .set_item(key, value)
            .map_err(|e| StorageError::Backend {
                key: key.to_string(),
                reason: format!("{:?}", e),
            })
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        Self::storage()?
            .remove_item(key)
            .map_err(|e| StorageError::Backend {
                key: key.to_string(),
                reason: format!("{:?}", e),
            })
    }
}
