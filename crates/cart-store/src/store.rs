//! # Cart Store
//!
//! The state container: owns the current [`CartSnapshot`], applies the
//! cart mutations, persists after each one, and restores from storage.
//!
//! ## Mutation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       CartStore Mutation Flow                           │
//! │                                                                         │
//! │  add_to_cart(item)                                                      │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  ┌───────────────────────── state lock ─────────────────────────────┐  │
//! │  │  prev = state.clone()                                            │  │
//! │  │  CartSnapshot::add_item(item)            (cart-core rule)        │  │
//! │  │  encode {state, version}                                         │  │
//! │  │  Sync backend  ──► set_item(name, json)  (inline)                │  │
//! │  │  Async backend ──► AsyncWriter queue     (FIFO, returns at once) │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  change listeners (next, prev)           outside the lock              │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  Ok(()) or Err(StoreError::Storage)      state already applied          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Hydration
//! ```text
//! on_hydrate listeners
//!     │
//!     ▼
//! get_item(name) ──┬─ Ok(Some(json)) ──► decode ──┬─ ok ─────────► replace state
//!                  │                              │                (write back if migrated)
//!                  │                              └─ bad/mismatch ► warn!, keep state
//!                  ├─ Ok(None) ─────────────────────────────────► keep state
//!                  └─ Err(e) ──────────────────────────────────► warn!, keep state, Err(e)
//!     │
//!     ▼
//! has_hydrated = true ──► on_finish_hydration listeners ──► change listeners
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard};

use cart_core::envelope;
use cart_core::{CartItem, CartSnapshot, CartTotals, CoreError, ProductId};
use tracing::{debug, info, warn};

use crate::error::{StorageResult, StoreError, StoreResult};
use crate::options::{PersistOptions, PersistTarget};
use crate::storage::StorageBackend;
use crate::subscription::{
    ChangeListener, HydrationListener, ListenerKind, Listeners, Subscription,
};
use crate::writer::{AsyncWriter, LastWriteError};

/// Shopping cart state container.
///
/// Construct one at startup and share it (`Arc<CartStore>`) with whatever
/// needs the cart. All methods take `&self`.
pub struct CartStore {
    state: Mutex<CartSnapshot>,
    options: RwLock<PersistOptions>,
    writer: Mutex<Option<AsyncWriter>>,
    last_write_error: LastWriteError,
    hydrated: AtomicBool,
    change_listeners: Listeners<ChangeListener>,
    hydrate_listeners: Listeners<HydrationListener>,
    finish_listeners: Listeners<HydrationListener>,
}

impl CartStore {
    /// Creates a store and, for sync backends, hydrates it from storage.
    ///
    /// Async backends are not read here; use [`open`](Self::open) or call
    /// [`rehydrate_async`](Self::rehydrate_async).
    pub fn new(options: PersistOptions) -> Self {
        let hydrate_now = !options.skip_hydration && !options.storage.is_async();
        let store = Self::unhydrated(options);

        if hydrate_now {
            if let Err(e) = store.rehydrate() {
                warn!(error = %e, "Cart hydration failed, starting from an empty cart");
            }
        }
        store
    }

    /// Creates a store and hydrates it from any backend kind.
    pub async fn open(options: PersistOptions) -> Self {
        let skip = options.skip_hydration;
        let store = Self::unhydrated(options);

        if !skip {
            if let Err(e) = store.rehydrate_async().await {
                warn!(error = %e, "Cart hydration failed, starting from an empty cart");
            }
        }
        store
    }

    fn unhydrated(options: PersistOptions) -> Self {
        info!(
            name = %options.name,
            version = options.version,
            backend = ?options.storage.kind(),
            "Creating cart store"
        );
        CartStore {
            state: Mutex::new(CartSnapshot::default()),
            options: RwLock::new(options),
            writer: Mutex::new(None),
            last_write_error: LastWriteError::default(),
            hydrated: AtomicBool::new(false),
            change_listeners: Listeners::new(ListenerKind::Change),
            hydrate_listeners: Listeners::new(ListenerKind::HydrationStart),
            finish_listeners: Listeners::new(ListenerKind::HydrationFinish),
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Adds one unit of `item`. A product already in the cart has its
    /// quantity bumped by one; the incoming item's quantity is ignored.
    pub fn add_to_cart(&self, item: CartItem) -> StoreResult<()> {
        self.update("add_to_cart", |cart| cart.add_item(item))
    }

    /// Subtracts `quantity` from the product's quantity, removing it when
    /// the result is zero or less. `None` removes the product outright.
    pub fn decrease_item(
        &self,
        product_id: impl Into<ProductId>,
        quantity: Option<i64>,
    ) -> StoreResult<()> {
        let product_id = product_id.into();
        self.update("decrease_item", |cart| {
            cart.decrease_item(&product_id, quantity);
        })
    }

    pub fn remove_from_cart(&self, product_id: impl Into<ProductId>) -> StoreResult<()> {
        let product_id = product_id.into();
        self.update("remove_from_cart", |cart| {
            cart.remove_item(&product_id);
        })
    }

    /// Empties the cart. The open flag is left alone.
    pub fn clear_cart(&self) -> StoreResult<()> {
        self.update("clear_cart", CartSnapshot::clear)
    }

    pub fn open_cart(&self) -> StoreResult<()> {
        self.update("open_cart", CartSnapshot::open)
    }

    pub fn close_cart(&self) -> StoreResult<()> {
        self.update("close_cart", CartSnapshot::close)
    }

    pub fn toggle_cart(&self) -> StoreResult<()> {
        self.update("toggle_cart", CartSnapshot::toggle)
    }

    fn update<F>(&self, op: &'static str, f: F) -> StoreResult<()>
    where
        F: FnOnce(&mut CartSnapshot),
    {
        let target = self.read_options().target();

        // Persisting under the state lock keeps writes in mutation order.
        let (prev, next, persisted) = {
            let mut state = self.lock_state();
            let prev = state.clone();
            f(&mut *state);
            let persisted = self.persist(&target, &state);
            (prev, state.clone(), persisted)
        };

        debug!(
            op,
            items = next.cart_items.len(),
            is_cart_open = next.is_cart_open,
            "Cart updated"
        );
        if let Err(ref e) = persisted {
            warn!(op, key = %target.name, error = %e, "Failed to persist cart");
        }

        self.notify_change(&next, &prev);
        persisted
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Clone of the current state.
    pub fn snapshot(&self) -> CartSnapshot {
        self.lock_state().clone()
    }

    /// Runs `f` against the current state without cloning it.
    ///
    /// ## Usage
    /// ```rust
    /// # use cart_store::{CartStore, PersistOptions, StorageBackend};
    /// let store = CartStore::new(PersistOptions::new().with_storage(StorageBackend::memory()));
    /// let count = store.with_state(|cart| cart.cart_items.len());
    /// assert_eq!(count, 0);
    /// ```
    pub fn with_state<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&CartSnapshot) -> R,
    {
        let state = self.lock_state();
        f(&*state)
    }

    pub fn items(&self) -> Vec<CartItem> {
        self.with_state(|cart| cart.cart_items.clone())
    }

    pub fn is_cart_open(&self) -> bool {
        self.with_state(|cart| cart.is_cart_open)
    }

    pub fn totals(&self) -> CartTotals {
        self.with_state(|cart| CartTotals::from(cart))
    }

    pub fn item(&self, product_id: impl Into<ProductId>) -> Option<CartItem> {
        let product_id = product_id.into();
        self.with_state(|cart| cart.item(&product_id).cloned())
    }

    /// Quantity in the cart, 0 when absent.
    pub fn quantity_of(&self, product_id: impl Into<ProductId>) -> i64 {
        let product_id = product_id.into();
        self.with_state(|cart| cart.quantity_of(&product_id))
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Subsequent reads and writes use `name`. Nothing is moved.
    pub fn set_store_name(&self, name: impl Into<String>) {
        let name = name.into();
        info!(name = %name, "Cart store name changed");
        self.set_options(|options| options.name = name);
    }

    /// Subsequent reads and writes go to `storage`. Nothing is moved.
    pub fn set_storage(&self, storage: StorageBackend) {
        info!(backend = ?storage.kind(), "Cart storage backend changed");
        self.set_options(|options| options.storage = storage);
    }

    /// Edits the options in place; takes effect on the next storage access.
    pub fn set_options<F>(&self, f: F)
    where
        F: FnOnce(&mut PersistOptions),
    {
        let mut options = self.options.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut *options);
    }

    pub fn persist_options(&self) -> PersistOptions {
        self.read_options().clone()
    }

    // =========================================================================
    // Persistence Lifecycle
    // =========================================================================

    /// Re-reads the configured key from a sync backend.
    ///
    /// Returns [`StoreError::AsyncBackend`] for async backends.
    pub fn rehydrate(&self) -> StoreResult<()> {
        let target = self.read_options().target();
        let storage = match &target.storage {
            StorageBackend::Sync(storage) => Arc::clone(storage),
            StorageBackend::Async(_) => return Err(StoreError::AsyncBackend),
        };

        self.begin_hydration();
        let raw = storage.get_item(&target.name);
        self.finish_hydration(&target, raw)
    }

    /// Re-reads the configured key from either backend kind.
    pub async fn rehydrate_async(&self) -> StoreResult<()> {
        let target = self.read_options().target();

        self.begin_hydration();
        let raw = match &target.storage {
            StorageBackend::Sync(storage) => storage.get_item(&target.name),
            StorageBackend::Async(storage) => storage.get_item(&target.name).await,
        };
        self.finish_hydration(&target, raw)
    }

    /// True once the most recent hydration attempt has completed.
    pub fn has_hydrated(&self) -> bool {
        self.hydrated.load(Ordering::Acquire)
    }

    /// Removes the persisted key from the current backend. In-memory state
    /// is untouched.
    pub fn clear_storage(&self) -> StoreResult<()> {
        let target = self.read_options().target();
        match &target.storage {
            StorageBackend::Sync(storage) => storage.remove_item(&target.name)?,
            StorageBackend::Async(storage) => {
                self.writer()?.remove(Arc::clone(storage), target.name.clone())?
            }
        }
        debug!(key = %target.name, "Cleared persisted cart");
        Ok(())
    }

    /// Waits for queued async writes. Immediate for sync backends.
    pub async fn flush(&self) -> StoreResult<()> {
        let writer = self.lock_writer().clone();
        match writer {
            Some(writer) => writer.flush().await,
            None => Ok(()),
        }
    }

    /// Takes the last async write failure, if any.
    pub fn take_write_error(&self) -> Option<StoreError> {
        self.last_write_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    fn begin_hydration(&self) {
        self.hydrated.store(false, Ordering::Release);
        let listeners = self.hydrate_listeners.snapshot();
        if !listeners.is_empty() {
            let state = self.snapshot();
            for listener in listeners {
                listener(&state);
            }
        }
    }

    fn finish_hydration(
        &self,
        target: &PersistTarget,
        raw: StorageResult<Option<String>>,
    ) -> StoreResult<()> {
        let key = target.name.as_str();
        let mut result = Ok(());
        let mut restored = None;

        match raw {
            Ok(Some(raw)) => {
                let migrate = self.read_options().migrate.clone();
                match envelope::decode(&raw, target.version, migrate.as_deref()) {
                    Ok(decoded) => restored = Some(decoded),
                    Err(CoreError::VersionMismatch { stored, expected }) => warn!(
                        key,
                        stored,
                        expected,
                        "Persisted cart has a different version and no migrate hook, ignoring it"
                    ),
                    Err(e) => warn!(key, error = %e, "Could not restore persisted cart"),
                }
            }
            Ok(None) => debug!(key, "No persisted cart found"),
            Err(e) => {
                warn!(key, error = %e, "Failed to read persisted cart");
                result = Err(StoreError::from(e));
            }
        }

        let change = restored.map(|decoded| {
            let mut state = self.lock_state();
            let prev = std::mem::replace(&mut *state, decoded.snapshot);
            if decoded.migrated {
                info!(key, version = target.version, "Migrated persisted cart");
                if let Err(e) = self.persist(target, &state) {
                    warn!(key, error = %e, "Failed to write back migrated cart");
                    result = Err(e);
                }
            }
            (prev, state.clone())
        });

        self.hydrated.store(true, Ordering::Release);
        let state = self.snapshot();
        for listener in self.finish_listeners.snapshot() {
            listener(&state);
        }

        if let Some((prev, next)) = change {
            debug!(key, items = next.cart_items.len(), "Cart hydrated");
            self.notify_change(&next, &prev);
        }
        result
    }

    fn persist(&self, target: &PersistTarget, snapshot: &CartSnapshot) -> StoreResult<()> {
        let raw = envelope::encode(snapshot, target.version)?;
        match &target.storage {
            StorageBackend::Sync(storage) => storage.set_item(&target.name, &raw)?,
            StorageBackend::Async(storage) => {
                self.writer()?
                    .set(Arc::clone(storage), target.name.clone(), raw)?
            }
        }
        Ok(())
    }

    /// The live writer, spawned on the current runtime when there is none
    /// or the previous one died with its runtime.
    fn writer(&self) -> StoreResult<AsyncWriter> {
        let mut slot = self.lock_writer();
        match slot.as_ref() {
            Some(writer) if !writer.is_closed() => Ok(writer.clone()),
            stale => {
                if stale.is_some() {
                    warn!("Async cart writer stopped with its runtime, respawning");
                }
                let writer = AsyncWriter::spawn(Arc::clone(&self.last_write_error))?;
                *slot = Some(writer.clone());
                Ok(writer)
            }
        }
    }

    // =========================================================================
    // Subscriptions
    // =========================================================================

    /// Registers `listener(next, prev)`, called after every change to the
    /// state from a mutation or a hydration.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&CartSnapshot, &CartSnapshot) + Send + Sync + 'static,
    {
        self.change_listeners.add(Arc::new(listener))
    }

    /// Called with the current state when a hydration starts.
    pub fn on_hydrate<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&CartSnapshot) + Send + Sync + 'static,
    {
        self.hydrate_listeners.add(Arc::new(listener))
    }

    /// Called with the resulting state when a hydration finishes, whether
    /// or not anything was restored.
    pub fn on_finish_hydration<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&CartSnapshot) + Send + Sync + 'static,
    {
        self.finish_listeners.add(Arc::new(listener))
    }

    /// Returns false if the listener was already removed.
    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        match subscription.kind() {
            ListenerKind::Change => self.change_listeners.remove(subscription),
            ListenerKind::HydrationStart => self.hydrate_listeners.remove(subscription),
            ListenerKind::HydrationFinish => self.finish_listeners.remove(subscription),
        }
    }

    fn notify_change(&self, next: &CartSnapshot, prev: &CartSnapshot) {
        if next == prev {
            return;
        }
        for listener in self.change_listeners.snapshot() {
            listener(next, prev);
        }
    }

    // =========================================================================
    // Locks
    // =========================================================================

    fn lock_state(&self) -> MutexGuard<'_, CartSnapshot> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_writer(&self) -> MutexGuard<'_, Option<AsyncWriter>> {
        self.writer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_options(&self) -> RwLockReadGuard<'_, PersistOptions> {
        self.options.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for CartStore {
    fn default() -> Self {
        Self::new(PersistOptions::default())
    }
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("state", &*self.lock_state())
            .field("options", &*self.read_options())
            .field("hydrated", &self.has_hydrated())
            .finish()
    }
}
