//! # Product Panel
//!
//! The three-product cart panel and its floating cart button, rendered as
//! text lines.
//!
//! ```text
//! Cart Status: Open
//! Product 1 - $10 (x2) - $20
//! Product 2 - $15 (x0) - $0
//! Product 3 - $20 (x1) - $20
//! ```
//!
//! Everything the panel shows goes through an [`SsrGate`], so a render
//! before mount shows the empty placeholder panel.

use cart_store::{with_ssr, CartItem, CartSnapshot, CartStore, ProductId, SsrGate, StoreResult};

/// A product on the demo shelf.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub product_id: &'static str,
    pub name: &'static str,
    pub price: f64,
}

impl Product {
    pub fn to_cart_item(&self) -> CartItem {
        CartItem::new(self.product_id, self.name).with_price(self.price)
    }
}

pub fn catalog() -> Vec<Product> {
    vec![
        Product {
            product_id: "123",
            name: "Product 1",
            price: 10.0,
        },
        Product {
            product_id: "456",
            name: "Product 2",
            price: 15.0,
        },
        Product {
            product_id: "789",
            name: "Product 3",
            price: 20.0,
        },
    ]
}

/// One button press on the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Toggle,
    Clear,
    /// `+` next to the product at this catalog index.
    Add(usize),
    /// `-` next to the product at this catalog index.
    Subtract(usize),
}

/// Presses `action`. Unknown catalog indexes do nothing.
pub fn apply(store: &CartStore, products: &[Product], action: Action) -> StoreResult<()> {
    match action {
        Action::Toggle => store.toggle_cart(),
        Action::Clear => store.clear_cart(),
        Action::Add(index) => match products.get(index) {
            Some(product) => store.add_to_cart(product.to_cart_item()),
            None => Ok(()),
        },
        Action::Subtract(index) => match products.get(index) {
            Some(product) => store.decrease_item(product.product_id, Some(1)),
            None => Ok(()),
        },
    }
}

/// The sequence the demo binary plays.
pub fn script() -> Vec<Action> {
    vec![
        Action::Toggle,
        Action::Add(0),
        Action::Add(0),
        Action::Add(2),
        Action::Add(1),
        Action::Subtract(1),
        Action::Subtract(2),
        Action::Add(2),
    ]
}

/// Renders the panel. Before mount the cart reads as empty and closed.
pub fn render_panel(store: &CartStore, gate: &SsrGate, products: &[Product]) -> Vec<String> {
    let cart = with_ssr(store, gate, |cart: &CartSnapshot| cart.clone()).unwrap_or_default();

    let status = if cart.is_cart_open { "Open" } else { "Closed" };
    let mut lines = vec![format!("Cart Status: {}", status)];

    for product in products {
        let quantity = cart.quantity_of(&ProductId::from(product.product_id));
        let total = quantity as f64 * product.price;
        lines.push(format!(
            "{} - ${} (x{}) - ${}",
            product.name, product.price, quantity, total
        ));
    }
    lines
}

/// The floating cart button: hidden while the cart is empty or not yet
/// mounted, otherwise the alert text it would show.
pub fn floating_button(store: &CartStore, gate: &SsrGate) -> Option<String> {
    let items = gate
        .select(store, |cart| cart.cart_items.clone())
        .ready()
        .filter(|items| !items.is_empty())?;

    let dump = serde_json::to_string_pretty(&items).unwrap_or_else(|_| format!("{:?}", items));
    Some(format!("Items in the cart: {}", dump))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cart_store::{PersistOptions, StorageBackend};

    fn memory_store() -> CartStore {
        CartStore::new(PersistOptions::new().with_storage(StorageBackend::memory()))
    }

    fn mounted() -> SsrGate {
        let mut gate = SsrGate::new();
        gate.mount();
        gate
    }

    #[test]
    fn test_script_result() {
        let store = memory_store();
        let products = catalog();
        for action in script() {
            apply(&store, &products, action).unwrap();
        }

        assert_eq!(
            render_panel(&store, &mounted(), &products),
            vec![
                "Cart Status: Open",
                "Product 1 - $10 (x2) - $20",
                "Product 2 - $15 (x0) - $0",
                "Product 3 - $20 (x1) - $20",
            ]
        );
    }

    #[test]
    fn test_unmounted_panel_is_placeholder() {
        let store = memory_store();
        let products = catalog();
        apply(&store, &products, Action::Add(0)).unwrap();
        apply(&store, &products, Action::Toggle).unwrap();

        let lines = render_panel(&store, &SsrGate::new(), &products);
        assert_eq!(lines[0], "Cart Status: Closed");
        assert_eq!(lines[1], "Product 1 - $10 (x0) - $0");
        assert!(floating_button(&store, &SsrGate::new()).is_none());
    }

    #[test]
    fn test_floating_button() {
        let store = memory_store();
        let products = catalog();
        let gate = mounted();
        assert!(floating_button(&store, &gate).is_none());

        apply(&store, &products, Action::Add(1)).unwrap();
        let text = floating_button(&store, &gate).unwrap();
        assert!(text.starts_with("Items in the cart: "));
        assert!(text.contains("\"productId\": \"456\""));

        apply(&store, &products, Action::Clear).unwrap();
        assert!(floating_button(&store, &gate).is_none());
    }

    #[test]
    fn test_out_of_range_action_is_noop() {
        let store = memory_store();
        apply(&store, &catalog(), Action::Add(9)).unwrap();
        apply(&store, &catalog(), Action::Subtract(9)).unwrap();
        assert!(store.items().is_empty());
    }
}
