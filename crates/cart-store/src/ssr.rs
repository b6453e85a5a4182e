//! # SSR-Safe Accessor
//!
//! Hides persisted client state from the first render so server and client
//! output match.
//!
//! ## Render Phases
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          SsrGate Lifecycle                              │
//! │                                                                         │
//! │   Server render          First client render         After mount        │
//! │   ─────────────          ───────────────────         ───────────        │
//! │   select() ─► Pending    select() ─► Pending         select() ─► Ready  │
//! │                                │                                        │
//! │                                └──── gate.mount() ───────┘              │
//! │                                                                         │
//! │   Pending ──► Ready happens once per gate and never goes back.          │
//! │   A new mount starts with a new gate.                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The projection runs on every `select`, including while pending, so its
//! cost and panics don't depend on the phase.

use std::sync::Arc;

use cart_core::CartSnapshot;

use crate::store::CartStore;

// =============================================================================
// Deferred
// =============================================================================

/// A value that is not exposed until the first client render has finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Deferred<T> {
    /// Not yet mounted. Render the server-side placeholder.
    Pending,
    Ready(T),
}

impl<T> Default for Deferred<T> {
    fn default() -> Self {
        Deferred::Pending
    }
}

impl<T> Deferred<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, Deferred::Ready(_))
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Deferred::Pending)
    }

    /// The value, if ready.
    pub fn ready(self) -> Option<T> {
        match self {
            Deferred::Ready(value) => Some(value),
            Deferred::Pending => None,
        }
    }

    pub fn as_ref(&self) -> Deferred<&T> {
        match self {
            Deferred::Ready(value) => Deferred::Ready(value),
            Deferred::Pending => Deferred::Pending,
        }
    }

    pub fn map<U, F>(self, f: F) -> Deferred<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Deferred::Ready(value) => Deferred::Ready(f(value)),
            Deferred::Pending => Deferred::Pending,
        }
    }

    pub fn unwrap_or(self, placeholder: T) -> T {
        match self {
            Deferred::Ready(value) => value,
            Deferred::Pending => placeholder,
        }
    }

    pub fn unwrap_or_default(self) -> T
    where
        T: Default,
    {
        self.unwrap_or(T::default())
    }
}

impl<T> From<Deferred<T>> for Option<T> {
    fn from(deferred: Deferred<T>) -> Self {
        deferred.ready()
    }
}

// =============================================================================
// State Source
// =============================================================================

/// Anything that can lend its current state to a projection.
pub trait StateSource {
    type State;

    fn with_state<R>(&self, f: impl FnOnce(&Self::State) -> R) -> R;
}

impl StateSource for CartStore {
    type State = CartSnapshot;

    fn with_state<R>(&self, f: impl FnOnce(&Self::State) -> R) -> R {
        CartStore::with_state(self, f)
    }
}

impl<S: StateSource + ?Sized> StateSource for &S {
    type State = S::State;

    fn with_state<R>(&self, f: impl FnOnce(&Self::State) -> R) -> R {
        (**self).with_state(f)
    }
}

impl<S: StateSource + ?Sized> StateSource for Arc<S> {
    type State = S::State;

    fn with_state<R>(&self, f: impl FnOnce(&Self::State) -> R) -> R {
        (**self).with_state(f)
    }
}

// =============================================================================
// Gate
// =============================================================================

/// Per-mount switch between [`Deferred::Pending`] and [`Deferred::Ready`].
#[derive(Debug, Clone, Default)]
pub struct SsrGate {
    mounted: bool,
}

impl SsrGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the first client render as done. Idempotent.
    pub fn mount(&mut self) {
        self.mounted = true;
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Runs `projection` against `source`'s state; exposes the result only
    /// once mounted.
    pub fn select<S, F, R>(&self, source: &S, projection: F) -> Deferred<R>
    where
        S: StateSource + ?Sized,
        F: FnOnce(&S::State) -> R,
    {
        let value = source.with_state(projection);
        if self.mounted {
            Deferred::Ready(value)
        } else {
            Deferred::Pending
        }
    }
}

/// Free-function form of [`SsrGate::select`].
pub fn with_ssr<S, F, R>(source: &S, gate: &SsrGate, projection: F) -> Deferred<R>
where
    S: StateSource + ?Sized,
    F: FnOnce(&S::State) -> R,
{
    gate.select(source, projection)
}
