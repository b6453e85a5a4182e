//! # Error Types
//!
//! Domain errors for cart-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  cart-core errors (this file)                                          │
//! │  └── CoreError        - Envelope encode/decode, versioning             │
//! │                                                                         │
//! │  cart-store errors (separate crate)                                    │
//! │  ├── StorageError     - Backend I/O failures                           │
//! │  └── StoreError       - What store callers see                         │
//! │                                                                         │
//! │  Flow: CoreError ──┐                                                    │
//! │                    ├──► StoreError ──► caller / tracing                 │
//! │  StorageError ─────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Cart mutations themselves never fail, so nothing here describes a
//! missing item or a bad quantity.

use thiserror::Error;

/// Errors raised while turning a snapshot into stored text and back.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Snapshot could not be serialized.
    #[error("Failed to serialize cart snapshot: {0}")]
    Serialization(#[source] serde_json::Error),

    /// Stored text is not a valid envelope or snapshot.
    ///
    /// ## When This Occurs
    /// - The stored value is not JSON
    /// - An item is missing `productId`, `name` or `quantity`
    /// - A field has the wrong JSON type
    #[error("Failed to deserialize cart snapshot: {0}")]
    Deserialization(#[source] serde_json::Error),

    /// Stored envelope was written by a different schema version and no
    /// migration is configured.
    #[error("Persisted cart version {stored} does not match expected version {expected}")]
    VersionMismatch { stored: u32, expected: u32 },

    /// A configured migration rejected the persisted state.
    #[error("Cart migration from version {from} failed: {reason}")]
    MigrationFailed { from: u32, reason: String },
}

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;
