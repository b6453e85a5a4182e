//! Listener registries for change and hydration callbacks.
//!
//! Callbacks are cloned out of the registry before they run, so a listener
//! may subscribe or unsubscribe from inside its own callback.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use cart_core::CartSnapshot;

/// Called with `(next, prev)` after the state changed.
pub type ChangeListener = dyn Fn(&CartSnapshot, &CartSnapshot) + Send + Sync;

/// Called with the state at the start or end of a hydration.
pub type HydrationListener = dyn Fn(&CartSnapshot) + Send + Sync;

/// Which registry a [`Subscription`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    Change,
    HydrationStart,
    HydrationFinish,
}

/// Handle returned by every `subscribe`-style call. Pass it to
/// [`CartStore::unsubscribe`](crate::CartStore::unsubscribe).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[must_use = "dropping the handle leaves the listener registered with no way to remove it"]
pub struct Subscription {
    id: u64,
    kind: ListenerKind,
}

impl Subscription {
    pub fn kind(&self) -> ListenerKind {
        self.kind
    }
}

// =============================================================================
// Registry
// =============================================================================

pub(crate) struct Listeners<F: ?Sized> {
    kind: ListenerKind,
    next_id: AtomicU64,
    entries: Mutex<Vec<(u64, Arc<F>)>>,
}

impl<F: ?Sized> Listeners<F> {
    pub fn new(kind: ListenerKind) -> Self {
        Listeners {
            kind,
            next_id: AtomicU64::new(1),
            entries: Mutex::new(Vec::new()),
        }
    }

    pub fn add(&self, listener: Arc<F>) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.lock().push((id, listener));
        Subscription {
            id,
            kind: self.kind,
        }
    }

    /// Returns false when the handle was already removed or belongs to
    /// another registry.
    pub fn remove(&self, subscription: Subscription) -> bool {
        if subscription.kind != self.kind {
            return false;
        }
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|(id, _)| *id != subscription.id);
        entries.len() != before
    }

    /// Registration-order copy of the current listeners.
    pub fn snapshot(&self) -> Vec<Arc<F>> {
        self.lock().iter().map(|(_, f)| Arc::clone(f)).collect()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(u64, Arc<F>)>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
