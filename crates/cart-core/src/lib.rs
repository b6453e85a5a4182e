//! # cart-core: Pure Cart Rules
//!
//! The cart data model and every mutation rule, as pure functions with
//! zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Cart State Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 UI layer (server + client render)               │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ SsrGate / CartStore                    │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 cart-store (persistence, hydration)             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ cart-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────────┐  ┌───────────┐              │   │
//! │  │   │   types   │  │     cart      │  │ envelope  │              │   │
//! │  │   │ ProductId │  │ CartSnapshot  │  │ encode    │              │   │
//! │  │   │ CartItem  │  │ CartTotals    │  │ decode    │              │   │
//! │  │   └───────────┘  └───────────────┘  └───────────┘              │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO STORAGE • PURE FUNCTIONS                         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - `ProductId`, `CartItem`
//! - [`cart`] - `CartSnapshot` and its mutations, `CartTotals`
//! - [`envelope`] - The versioned stored document
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use cart_core::{CartItem, CartSnapshot, ProductId};
//!
//! let mut cart = CartSnapshot::new();
//! cart.add_item(CartItem::new("123", "Product 1").with_price(10.0));
//! cart.add_item(CartItem::new("123", "Product 1").with_price(10.0));
//! assert_eq!(cart.quantity_of(&ProductId::from("123")), 2);
//!
//! cart.decrease_item(&ProductId::from("123"), Some(2));
//! assert!(cart.is_empty());
//! ```

pub mod cart;
pub mod envelope;
pub mod error;
pub mod types;

pub use cart::{CartSnapshot, CartTotals};
pub use envelope::{Decoded, MigrateFn, PersistedEnvelope};
pub use error::{CoreError, CoreResult};
pub use types::{CartItem, ProductId};

/// Storage key used when no store name is configured.
pub const DEFAULT_STORE_NAME: &str = "cart";

/// Schema version written when none is configured.
pub const DEFAULT_STORE_VERSION: u32 = 0;
