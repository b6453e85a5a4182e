//! # cart-store: Persistent Cart Store
//!
//! A shopping cart state container that persists every change to a
//! key-value backend and restores it on startup.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          cart-store Internals                           │
//! │                                                                         │
//! │   StoreConfig ──into_options()──► PersistOptions                        │
//! │   (TOML + env)                        │                                 │
//! │                                       ▼                                 │
//! │   UI / app code ─────────────────► CartStore ◄──── SsrGate::select()    │
//! │   add_to_cart, toggle_cart, ...       │            (Pending / Ready)    │
//! │                                       │                                 │
//! │                  ┌────────────────────┼─────────────────────┐           │
//! │                  ▼                    ▼                     ▼           │
//! │            cart-core rules     StorageBackend::Sync   StorageBackend::  │
//! │            (CartSnapshot)      (inline write)         Async             │
//! │                                                       (AsyncWriter)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`store`] - `CartStore`: mutations, reads, hydration, listeners
//! - [`options`] - `PersistOptions`: key, version, backend, migrate hook
//! - [`storage`] - Storage capabilities and backends
//! - [`ssr`] - `Deferred`, `SsrGate`, `with_ssr`
//! - [`config`] - `StoreConfig` loaded from file and environment
//! - [`subscription`] - Listener handles
//! - [`error`] - Storage, store, and config errors
//!
//! ## Example Usage
//!
//! ```rust
//! use cart_store::{CartItem, CartStore, MemoryStorage, PersistOptions, SsrGate, StorageBackend};
//!
//! let memory = MemoryStorage::new();
//! let store = CartStore::new(
//!     PersistOptions::new().with_storage(StorageBackend::sync(memory.clone())),
//! );
//!
//! store.add_to_cart(CartItem::new("123", "Product 1").with_price(10.0)).unwrap();
//! store.toggle_cart().unwrap();
//! assert_eq!(memory.len(), 1);
//!
//! let mut gate = SsrGate::new();
//! assert!(gate.select(&store, |cart| cart.is_cart_open).is_pending());
//! gate.mount();
//! assert_eq!(gate.select(&store, |cart| cart.is_cart_open).ready(), Some(true));
//! ```

pub mod config;
pub mod error;
pub mod options;
pub mod ssr;
pub mod storage;
pub mod store;
pub mod subscription;
mod writer;

// Re-export commonly used types at crate root
pub use config::{StorageKind, StoreConfig};
pub use error::{
    ConfigError, ConfigResult, StorageError, StorageResult, StoreError, StoreResult,
};
pub use options::PersistOptions;
pub use ssr::{with_ssr, Deferred, SsrGate, StateSource};
#[cfg(not(target_arch = "wasm32"))]
pub use storage::AsyncFileStorage;
#[cfg(all(target_arch = "wasm32", feature = "web"))]
pub use storage::LocalStorage;
pub use storage::{
    AsyncStateStorage, BackendKind, FileStorage, MemoryStorage, StateStorage, StorageBackend,
};
pub use store::CartStore;
pub use subscription::{ListenerKind, Subscription};

pub use cart_core::{CartItem, CartSnapshot, CartTotals, CoreError, ProductId};
