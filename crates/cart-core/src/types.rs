//! # Domain Types
//!
//! The item-level types shared by the cart rules and the store.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐        ┌───────────────────────────────┐          │
//! │  │   ProductId     │        │          CartItem             │          │
//! │  │  ─────────────  │        │  ───────────────────────────  │          │
//! │  │  Text("123")    │◄───────│  productId    (unique key)    │          │
//! │  │  Number(123)    │        │  name                         │          │
//! │  └─────────────────┘        │  price        (optional)      │          │
//! │                             │  quantity     (> 0)           │          │
//! │                             │  cartQuantity / imageSrc /    │          │
//! │                             │  inStock      (display only)  │          │
//! │                             └───────────────────────────────┘          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Format
//! Field names are camelCase on the wire so a JavaScript front end can read
//! the persisted snapshot unchanged.

use std::fmt;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// =============================================================================
// Product Identifier
// =============================================================================

/// Identifies a product within the cart.
///
/// Serialized untagged, so `"123"` and `123` are both valid on the wire.
/// A text id never equals a numeric id, even when they print the same.
/// Numeric ids keep whatever JSON number was stored (`1.5`, `2^70`), and
/// compare by their JSON form, so `1` and `1.0` are distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProductId {
    /// Numeric id (`123`).
    Number(serde_json::Number),
    /// String id (`"sku-123"`).
    Text(String),
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductId::Number(n) => write!(f, "{}", n),
            ProductId::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for ProductId {
    fn from(value: &str) -> Self {
        ProductId::Text(value.to_string())
    }
}

impl From<String> for ProductId {
    fn from(value: String) -> Self {
        ProductId::Text(value)
    }
}

impl From<i64> for ProductId {
    fn from(value: i64) -> Self {
        ProductId::Number(value.into())
    }
}

impl From<u64> for ProductId {
    fn from(value: u64) -> Self {
        ProductId::Number(value.into())
    }
}

impl From<serde_json::Number> for ProductId {
    fn from(value: serde_json::Number) -> Self {
        ProductId::Number(value)
    }
}

impl From<&ProductId> for ProductId {
    fn from(value: &ProductId) -> Self {
        value.clone()
    }
}

// =============================================================================
// Cart Item
// =============================================================================

/// A product held in the cart.
///
/// ## Invariants
/// - `quantity > 0` while the item is in a cart
/// - `cart_quantity`, `image_src` and `in_stock` are display metadata only;
///   no cart rule reads them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Unique key within the cart.
    #[ts(type = "string | number")]
    pub product_id: ProductId,

    /// Display label.
    pub name: String,

    /// Unit price, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub price: Option<f64>,

    /// Units held.
    #[ts(type = "number")]
    pub quantity: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional, type = "number")]
    pub cart_quantity: Option<i64>,

    /// Older snapshots spell this `imagesrc`.
    #[serde(default, alias = "imagesrc", skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub image_src: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub in_stock: Option<bool>,
}

impl CartItem {
    /// Creates an item with a quantity of one and no display metadata.
    ///
    /// ## Example
    /// ```rust
    /// use cart_core::CartItem;
    ///
    /// let item = CartItem::new("123", "Product 1").with_price(10.0);
    /// assert_eq!(item.quantity, 1);
    /// assert_eq!(item.price, Some(10.0));
    /// ```
    pub fn new(product_id: impl Into<ProductId>, name: impl Into<String>) -> Self {
        CartItem {
            product_id: product_id.into(),
            name: name.into(),
            price: None,
            quantity: 1,
            cart_quantity: None,
            image_src: None,
            in_stock: None,
        }
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    pub fn with_quantity(mut self, quantity: i64) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn with_cart_quantity(mut self, cart_quantity: i64) -> Self {
        self.cart_quantity = Some(cart_quantity);
        self
    }

    pub fn with_image_src(mut self, image_src: impl Into<String>) -> Self {
        self.image_src = Some(image_src.into());
        self
    }

    pub fn with_in_stock(mut self, in_stock: bool) -> Self {
        self.in_stock = Some(in_stock);
        self
    }

    /// Unit price times quantity. A missing price counts as zero.
    pub fn line_total(&self) -> f64 {
        self.price.unwrap_or(0.0) * self.quantity as f64
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_id_untagged_wire_format() {
        let text: ProductId = serde_json::from_str("\"123\"").unwrap();
        let number: ProductId = serde_json::from_str("123").unwrap();

        assert_eq!(text, ProductId::Text("123".to_string()));
        assert_eq!(number, ProductId::from(123_i64));
        assert_ne!(text, number);
        assert_eq!(serde_json::to_string(&number).unwrap(), "123");
    }

    #[test]
    fn test_product_id_accepts_any_json_number() {
        let fractional: ProductId = serde_json::from_str("1.5").unwrap();
        assert_eq!(fractional.to_string(), "1.5");
        assert_eq!(serde_json::to_string(&fractional).unwrap(), "1.5");

        let large: ProductId = serde_json::from_str("18446744073709551615").unwrap();
        assert_eq!(large, ProductId::from(u64::MAX));

        let raw = r#"{"productId":1.5,"name":"Half","quantity":1}"#;
        let item: CartItem = serde_json::from_str(raw).unwrap();
        assert!(matches!(item.product_id, ProductId::Number(_)));
    }

    #[test]
    fn test_product_id_display() {
        assert_eq!(ProductId::from("abc").to_string(), "abc");
        assert_eq!(ProductId::from(42_i64).to_string(), "42");
    }

    #[test]
    fn test_cart_item_omits_absent_metadata() {
        let item = CartItem::new("123", "Product 1").with_price(10.0);
        let json = serde_json::to_value(&item).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "productId": "123",
                "name": "Product 1",
                "price": 10.0,
                "quantity": 1
            })
        );
    }

    #[test]
    fn test_cart_item_accepts_legacy_image_key() {
        let raw = r#"{"productId":7,"name":"Mug","quantity":2,"imagesrc":"/mug.png","inStock":true}"#;
        let item: CartItem = serde_json::from_str(raw).unwrap();

        assert_eq!(item.product_id, ProductId::from(7_i64));
        assert_eq!(item.image_src.as_deref(), Some("/mug.png"));
        assert_eq!(item.in_stock, Some(true));

        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["imageSrc"], "/mug.png");
    }

    #[test]
    fn test_line_total() {
        let priced = CartItem::new("1", "A").with_price(2.5).with_quantity(4);
        assert!((priced.line_total() - 10.0).abs() < f64::EPSILON);

        let unpriced = CartItem::new("2", "B").with_quantity(3);
        assert_eq!(unpriced.line_total(), 0.0);
    }
}
