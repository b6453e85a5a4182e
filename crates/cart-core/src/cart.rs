//! # Cart Rules
//!
//! The in-memory cart snapshot and every mutation the store exposes.
//!
//! ## Mutation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Mutations                                       │
//! │                                                                         │
//! │  Operation              Item present?        Effect                     │
//! │  ─────────              ─────────────        ──────                     │
//! │                                                                         │
//! │  add_item(item) ──────► yes ───────────────► quantity += 1              │
//! │                   └───► no ────────────────► push(item, quantity = 1)   │
//! │                                                                         │
//! │  decrease_item(id, q) ► q = None ──────────► remove entry               │
//! │                   └───► q = Some(n) ───────► quantity -= n              │
//! │                                              (<= 0 removes the entry)   │
//! │                                                                         │
//! │  remove_item(id) ─────► yes ───────────────► remove entry               │
//! │                                                                         │
//! │  Absent ids are ignored by every operation. Nothing here fails.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::{CartItem, ProductId};

/// The persisted cart state: items plus the open/closed flag.
///
/// ## Invariants
/// - Items are unique by `product_id`
/// - Every item has `quantity > 0`
/// - `is_cart_open` is independent of the items
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartSnapshot {
    /// Items in insertion order.
    #[serde(default)]
    pub cart_items: Vec<CartItem>,

    /// Whether the cart drawer is open.
    #[serde(default)]
    pub is_cart_open: bool,
}

impl CartSnapshot {
    /// Creates an empty, closed cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an item or bumps the quantity of the existing entry by one.
    ///
    /// The quantity carried by `item` is ignored. When the product is
    /// already present its stored fields (name, price, metadata) are kept.
    /// Duplicate entries from a hydrated snapshot are each bumped.
    pub fn add_item(&mut self, item: CartItem) {
        let mut found = false;
        for existing in self
            .cart_items
            .iter_mut()
            .filter(|i| i.product_id == item.product_id)
        {
            existing.quantity = existing.quantity.saturating_add(1);
            found = true;
        }

        if !found {
            self.cart_items.push(CartItem { quantity: 1, ..item });
        }
    }

    /// Decreases an item's quantity, or removes it outright.
    ///
    /// ## Behavior
    /// - `quantity == None`: removes the entry whatever its quantity
    /// - `quantity == Some(n)`: subtracts `n`; a result `<= 0` removes it
    /// - Product not in cart: no-op
    /// - Duplicate entries are each decreased
    ///
    /// Returns `true` if the cart changed.
    pub fn decrease_item(&mut self, product_id: &ProductId, quantity: Option<i64>) -> bool {
        let Some(amount) = quantity else {
            return self.remove_item(product_id);
        };

        let mut changed = false;
        self.cart_items.retain_mut(|item| {
            if &item.product_id != product_id {
                return true;
            }
            changed = true;
            item.quantity = item.quantity.saturating_sub(amount);
            item.quantity > 0
        });
        changed
    }

    /// Removes an item by product id. Returns `true` if it was present.
    pub fn remove_item(&mut self, product_id: &ProductId) -> bool {
        let initial_len = self.cart_items.len();
        self.cart_items.retain(|i| &i.product_id != product_id);
        self.cart_items.len() != initial_len
    }

    /// Empties the cart. The open flag is left alone.
    pub fn clear(&mut self) {
        self.cart_items.clear();
    }

    pub fn open(&mut self) {
        self.is_cart_open = true;
    }

    pub fn close(&mut self) {
        self.is_cart_open = false;
    }

    pub fn toggle(&mut self) {
        self.is_cart_open = !self.is_cart_open;
    }

    /// Looks up an item by product id.
    pub fn item(&self, product_id: &ProductId) -> Option<&CartItem> {
        self.cart_items.iter().find(|i| &i.product_id == product_id)
    }

    /// Quantity held for a product, zero when absent.
    pub fn quantity_of(&self, product_id: &ProductId) -> i64 {
        self.item(product_id).map_or(0, |i| i.quantity)
    }

    /// Returns the number of unique items in the cart.
    pub fn item_count(&self) -> usize {
        self.cart_items.len()
    }

    /// Returns the total quantity of all items.
    pub fn total_quantity(&self) -> i64 {
        self.cart_items.iter().map(|i| i.quantity).sum()
    }

    /// Sum of every line total.
    pub fn subtotal(&self) -> f64 {
        self.cart_items.iter().map(CartItem::line_total).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.cart_items.is_empty()
    }
}

/// Cart totals summary for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub item_count: usize,
    #[ts(type = "number")]
    pub total_quantity: i64,
    pub subtotal: f64,
}

impl From<&CartSnapshot> for CartTotals {
    fn from(cart: &CartSnapshot) -> Self {
        CartTotals {
            item_count: cart.item_count(),
            total_quantity: cart.total_quantity(),
            subtotal: cart.subtotal(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
