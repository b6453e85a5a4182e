//! # Store Configuration
//!
//! Builds [`PersistOptions`] from a config file and the environment.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     CART_STORE_NAME=shop-cart                                          │
//! │     CART_STORE_VERSION=2                                               │
//! │     CART_STORAGE=memory | file | async-file                            │
//! │     CART_DATA_DIR=/var/lib/cart                                        │
//! │     CART_SKIP_HYDRATION=true                                           │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/cart-state/cart.toml (Linux)                             │
//! │     ~/Library/Application Support/com.cart.cart-state/cart.toml (macOS)│
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     name "cart", version 0, async-file storage                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # cart.toml
//! store_name = "cart"
//! version = 0
//! storage = "async-file"    # memory | file | async-file
//! data_dir = "/var/lib/cart" # optional, platform data dir otherwise
//! skip_hydration = false
//! ```

use std::path::{Path, PathBuf};

use cart_core::{DEFAULT_STORE_NAME, DEFAULT_STORE_VERSION};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{ConfigError, ConfigResult};
use crate::options::PersistOptions;
use crate::storage::{FileStorage, StorageBackend};

// =============================================================================
// Storage Kind
// =============================================================================

/// Which backend the configured store writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StorageKind {
    /// Process-local map. Nothing survives a restart. Default on wasm32.
    #[cfg_attr(target_arch = "wasm32", default)]
    Memory,

    /// Blocking `<data_dir>/<store_name>.json`.
    File,

    /// Same layout as `File`, written by the async writer task. Falls back
    /// to memory when no data dir is configured or found.
    #[cfg_attr(not(target_arch = "wasm32"), default)]
    AsyncFile,
}

impl std::fmt::Display for StorageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageKind::Memory => write!(f, "memory"),
            StorageKind::File => write!(f, "file"),
            StorageKind::AsyncFile => write!(f, "async-file"),
        }
    }
}

impl std::str::FromStr for StorageKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" | "mem" => Ok(StorageKind::Memory),
            "file" => Ok(StorageKind::File),
            "async-file" | "async_file" => Ok(StorageKind::AsyncFile),
            other => Err(ConfigError::InvalidValue {
                key: "CART_STORAGE".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

// =============================================================================
// Store Config
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Storage key for the persisted envelope.
    pub store_name: String,

    /// Envelope schema version.
    pub version: u32,

    pub storage: StorageKind,

    /// Directory for file backends. Platform data dir when unset.
    pub data_dir: Option<PathBuf>,

    pub skip_hydration: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            store_name: DEFAULT_STORE_NAME.to_string(),
            version: DEFAULT_STORE_VERSION,
            storage: StorageKind::default(),
            data_dir: None,
            skip_hydration: false,
        }
    }
}

impl StoreConfig {
    /// Loads configuration from file and environment.
    ///
    /// ## Loading Order
    /// 1. Start with defaults
    /// 2. Override with config file (if exists)
    /// 3. Override with environment variables
    /// 4. Validate
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = match config_path.or_else(Self::default_config_path) {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;

        info!(
            store_name = %config.store_name,
            version = config.version,
            storage = %config.storage,
            "Cart store configuration loaded"
        );
        Ok(config)
    }

    /// Loads configuration, falling back to defaults on error.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load cart config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Reads `path` if it exists; a missing file means defaults.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            debug!(?path, "Config file not found, using defaults");
            return Ok(Self::default());
        }

        info!(?path, "Loading cart config from file");
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&contents)?)
    }

    /// Applies `CART_*` overrides. `lookup` is `std::env::var` in
    /// production.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(name) = lookup("CART_STORE_NAME") {
            debug!(name = %name, "Overriding store name from environment");
            self.store_name = name;
        }

        if let Some(version) = lookup("CART_STORE_VERSION") {
            self.version = version
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue {
                    key: "CART_STORE_VERSION".to_string(),
                    value: version.clone(),
                })?;
        }

        if let Some(storage) = lookup("CART_STORAGE") {
            debug!(storage = %storage, "Overriding storage kind from environment");
            self.storage = storage.parse()?;
        }

        if let Some(dir) = lookup("CART_DATA_DIR") {
            self.data_dir = Some(PathBuf::from(dir));
        }

        if let Some(skip) = lookup("CART_SKIP_HYDRATION") {
            self.skip_hydration = match skip.to_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: "CART_SKIP_HYDRATION".to_string(),
                        value: skip,
                    })
                }
            };
        }

        Ok(())
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.store_name.trim().is_empty() {
            return Err(ConfigError::Invalid("store_name must not be empty".into()));
        }

        // File backends turn the name into a file name.
        if self.storage != StorageKind::Memory {
            crate::storage::validate_file_key(&self.store_name).map_err(|_| {
                ConfigError::Invalid(format!(
                    "store_name '{}' cannot be used as a file name",
                    self.store_name
                ))
            })?;
        }

        Ok(())
    }

    /// Directory the file backends write to.
    pub fn resolve_data_dir(&self) -> ConfigResult<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => default_data_dir().ok_or(ConfigError::NoDataDir),
        }
    }

    /// Builds the store options this config describes.
    pub fn into_options(self) -> ConfigResult<PersistOptions> {
        let storage = match self.storage {
            StorageKind::Memory => StorageBackend::memory(),
            StorageKind::File => StorageBackend::sync(FileStorage::new(self.resolve_data_dir()?)),
            #[cfg(not(target_arch = "wasm32"))]
            StorageKind::AsyncFile => {
                StorageBackend::durable_or_memory(self.data_dir.or_else(default_data_dir))
            }
            #[cfg(target_arch = "wasm32")]
            StorageKind::AsyncFile => {
                return Err(ConfigError::Invalid(
                    "async-file storage is not available on wasm32".into(),
                ))
            }
        };

        Ok(PersistOptions::new()
            .with_name(self.store_name)
            .with_version(self.version)
            .with_storage(storage)
            .with_skip_hydration(self.skip_hydration))
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join("cart.toml"))
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "cart", "cart-state")
}

/// Platform data directory for the file backends.
pub(crate) fn default_data_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.data_dir().to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_storage_kind_parsing() {
        assert_eq!("memory".parse::<StorageKind>().unwrap(), StorageKind::Memory);
        assert_eq!("FILE".parse::<StorageKind>().unwrap(), StorageKind::File);
        assert_eq!(
            "async-file".parse::<StorageKind>().unwrap(),
            StorageKind::AsyncFile
        );
        assert!("tape".parse::<StorageKind>().is_err());
        assert_eq!(StorageKind::AsyncFile.to_string(), "async-file");
    }

    #[test]
    fn test_env_overrides() {
        let mut config = StoreConfig::default();
        config
            .apply_overrides(env(&[
                ("CART_STORE_NAME", "shop-cart"),
                ("CART_STORE_VERSION", "3"),
                ("CART_STORAGE", "file"),
                ("CART_DATA_DIR", "/tmp/cart"),
                ("CART_SKIP_HYDRATION", "yes"),
            ]))
            .unwrap();

        assert_eq!(config.store_name, "shop-cart");
        assert_eq!(config.version, 3);
        assert_eq!(config.storage, StorageKind::File);
        assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/cart")));
        assert!(config.skip_hydration);
    }

    #[test]
    fn test_invalid_env_values() {
        let mut config = StoreConfig::default();
        assert!(matches!(
            config.apply_overrides(env(&[("CART_STORE_VERSION", "two")])),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            config.apply_overrides(env(&[("CART_STORAGE", "tape")])),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cart.toml");
        std::fs::write(&path, "store_name = \"shop\"\nstorage = \"async-file\"\n").unwrap();

        let config = StoreConfig::from_file(&path).unwrap();
        assert_eq!(config.store_name, "shop");
        assert_eq!(config.storage, StorageKind::AsyncFile);
        assert_eq!(config.version, 0);
        assert!(!config.skip_hydration);
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig::from_file(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, StoreConfig::default());
    }

    #[test]
    fn test_bad_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cart.toml");
        std::fs::write(&path, "version = \"zero\"").unwrap();

        assert!(matches!(
            StoreConfig::from_file(&path),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_validate() {
        let mut config = StoreConfig::default();
        assert!(config.validate().is_ok());

        config.store_name = "../etc".to_string();
        assert!(config.validate().is_err());
        config.storage = StorageKind::Memory;
        assert!(config.validate().is_ok());
        config.storage = StorageKind::File;
        assert!(config.validate().is_err());

        config.store_name = " ".to_string();
        config.storage = StorageKind::Memory;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_into_options() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig {
            store_name: "shop".to_string(),
            version: 4,
            storage: StorageKind::AsyncFile,
            data_dir: Some(dir.path().to_path_buf()),
            skip_hydration: true,
        };

        let options = config.into_options().unwrap();
        assert_eq!(options.name(), "shop");
        assert_eq!(options.version(), 4);
        assert!(options.storage().is_async());
        assert!(options.skip_hydration());
    }

    #[tokio::test]
    async fn test_default_config_round_trips_through_open() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig {
            data_dir: Some(dir.path().to_path_buf()),
            ..StoreConfig::default()
        };
        assert_eq!(config.storage, StorageKind::AsyncFile);

        let store = crate::CartStore::open(config.clone().into_options().unwrap()).await;
        store
            .add_to_cart(crate::CartItem::new("123", "Product 1").with_price(10.0))
            .unwrap();
        store.open_cart().unwrap();
        store.flush().await.unwrap();

        let reloaded = crate::CartStore::open(config.into_options().unwrap()).await;
        assert_eq!(reloaded.snapshot(), store.snapshot());
        assert_eq!(reloaded.items().len(), 1);
    }

    #[test]
    fn test_file_config_persists_across_stores() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig {
            storage: StorageKind::File,
            data_dir: Some(dir.path().to_path_buf()),
            ..StoreConfig::default()
        };

        let store = crate::CartStore::new(config.clone().into_options().unwrap());
        store.open_cart().unwrap();
        assert!(dir.path().join("cart.json").exists());

        let reloaded = crate::CartStore::new(config.into_options().unwrap());
        assert!(reloaded.is_cart_open());
    }
}
