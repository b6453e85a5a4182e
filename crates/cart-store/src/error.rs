//! # Store Error Types
//!
//! Error types for storage backends, the store, and configuration loading.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Store Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  StorageError   │  │   StoreError    │  │     ConfigError         │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  Io             │  │  Storage  ◄─────┤  │  ReadFailed             │ │
//! │  │  Unavailable    │  │  Core (codec)   │  │  Parse                  │ │
//! │  │  InvalidKey     │  │  NoRuntime      │  │  InvalidValue           │ │
//! │  │  Backend        │  │  WriterClosed   │  │  Invalid                │ │
//! │  │                 │  │  AsyncBackend   │  │  NoDataDir              │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## When Callers See These
//! - Cart mutations never fail because of cart contents. A `StoreError` from
//!   a mutation means the in-memory change was applied but the synchronous
//!   storage write failed.
//! - Async backend write failures are logged and kept for
//!   [`CartStore::take_write_error`](crate::CartStore::take_write_error).
//! - Malformed or mismatched persisted data is never an error; hydration
//!   falls back to the current (initially empty) state.

use std::path::PathBuf;

use cart_core::CoreError;
use thiserror::Error;

/// Result type alias for storage backend operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type alias for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Storage Errors
// =============================================================================

/// Failures reported by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("Storage I/O failed for '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// The backing store does not exist in this environment
    /// (e.g. no `window.localStorage`).
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// Key cannot be used by this backend.
    #[error("Invalid storage key '{0}'")]
    InvalidKey(String),

    /// Backend-specific rejection (quota exceeded, security error, ...).
    #[error("Storage backend rejected '{key}': {reason}")]
    Backend { key: String, reason: String },
}

impl StorageError {
    pub(crate) fn io(key: &str, source: std::io::Error) -> Self {
        StorageError::Io {
            key: key.to_string(),
            source,
        }
    }
}

// =============================================================================
// Store Errors
// =============================================================================

/// Errors surfaced by [`CartStore`](crate::CartStore).
#[derive(Debug, Error)]
pub enum StoreError {
    /// A storage read or write failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The snapshot could not be encoded.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// An async backend needs a Tokio runtime to run its writer task.
    #[error("Async storage requires a running Tokio runtime")]
    NoRuntime,

    /// The background writer stopped before the write could be queued.
    #[error("Storage writer stopped; dropped write for '{0}'")]
    WriterClosed(String),

    /// A blocking operation was requested on an async backend.
    #[error("Storage backend is async; use the async variant of this operation")]
    AsyncBackend,
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors raised while loading [`StoreConfig`](crate::StoreConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file exists but could not be read.
    #[error("Failed to read config file {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for this schema.
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// An environment variable holds an unusable value.
    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: String, value: String },

    /// The resolved configuration breaks a rule.
    #[error("Invalid cart configuration: {0}")]
    Invalid(String),

    /// File storage was selected but no data directory could be found.
    #[error("Could not determine a data directory; set CART_DATA_DIR")]
    NoDataDir,
}
